//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scheduling: SchedulingConfig,
    pub calendar: CalendarConfig,
    pub mail: MailConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Slot allocation and run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// How far ahead of the trigger to search for free time, in days.
    pub horizon_days: u32,
    /// Interview slot length in minutes.
    pub slot_minutes: u32,
    /// At most this many top-ranked candidates get a slot per run.
    pub max_candidates: u32,
    /// Working day start hour, UTC (inclusive).
    pub work_start_hour: u32,
    /// Working day end hour, UTC (exclusive).
    pub work_end_hour: u32,
    /// Access tokens expiring within this margin are refreshed eagerly.
    pub refresh_margin_seconds: u64,
}

/// Calendar provider endpoints and OAuth client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the calendar API.
    pub api_base_url: String,
    /// OAuth token endpoint used for refresh grants.
    pub token_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

/// Outbound notification gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Base URL of the mail delivery service.
    pub api_base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Sender address stamped on every notification.
    pub from_address: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig { path: "hireflow.db".to_string(), pool_size: 8 },
            scheduling: SchedulingConfig {
                horizon_days: constants::DEFAULT_HORIZON_DAYS,
                slot_minutes: constants::DEFAULT_SLOT_MINUTES,
                max_candidates: constants::DEFAULT_MAX_CANDIDATES,
                work_start_hour: constants::DEFAULT_WORK_START_HOUR,
                work_end_hour: constants::DEFAULT_WORK_END_HOUR,
                refresh_margin_seconds: constants::TOKEN_REFRESH_MARGIN_SECS,
            },
            calendar: CalendarConfig {
                api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                client_id: String::new(),
                client_secret: String::new(),
                timeout_seconds: 30,
            },
            mail: MailConfig {
                api_base_url: String::new(),
                api_key: String::new(),
                from_address: "recruiting@example.com".to_string(),
                timeout_seconds: 30,
            },
        }
    }
}
