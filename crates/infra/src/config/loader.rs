//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `HIREFLOW_DB_PATH`: Database file path
//! - `HIREFLOW_DB_POOL_SIZE`: Connection pool size
//! - `HIREFLOW_CALENDAR_API_BASE_URL`: Calendar events API base URL
//! - `HIREFLOW_CALENDAR_TOKEN_URL`: OAuth token endpoint
//! - `HIREFLOW_CALENDAR_CLIENT_ID` / `HIREFLOW_CALENDAR_CLIENT_SECRET`
//! - `HIREFLOW_MAIL_API_BASE_URL`: Mail service base URL
//! - `HIREFLOW_MAIL_API_KEY`: Mail service API key
//! - `HIREFLOW_MAIL_FROM_ADDRESS`: Sender address
//!
//! Optional (scheduling knobs fall back to built-in defaults):
//! - `HIREFLOW_HORIZON_DAYS`, `HIREFLOW_SLOT_MINUTES`,
//!   `HIREFLOW_MAX_CANDIDATES`, `HIREFLOW_WORK_START_HOUR`,
//!   `HIREFLOW_WORK_END_HOUR`, `HIREFLOW_REFRESH_MARGIN_SECONDS`
//! - `HIREFLOW_CALENDAR_TIMEOUT_SECONDS`, `HIREFLOW_MAIL_TIMEOUT_SECONDS`
//!
//! ## File Locations
//! The loader probes `./config.{json,toml}` and `./hireflow.{json,toml}` in
//! the working directory, up to two parent directories, and next to the
//! executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hireflow_domain::{
    constants, CalendarConfig, Config, DatabaseConfig, HireflowError, MailConfig, Result,
    SchedulingConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `HireflowError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present; scheduling knobs
/// and HTTP timeouts have built-in defaults.
///
/// # Errors
/// Returns `HireflowError::Config` if required variables are missing, have
/// invalid values, or describe an unusable working-hour window.
pub fn load_from_env() -> Result<Config> {
    let database = DatabaseConfig {
        path: env_var("HIREFLOW_DB_PATH")?,
        pool_size: env_parse("HIREFLOW_DB_POOL_SIZE")?,
    };

    let scheduling = SchedulingConfig {
        horizon_days: env_parse_or("HIREFLOW_HORIZON_DAYS", constants::DEFAULT_HORIZON_DAYS)?,
        slot_minutes: env_parse_or("HIREFLOW_SLOT_MINUTES", constants::DEFAULT_SLOT_MINUTES)?,
        max_candidates: env_parse_or(
            "HIREFLOW_MAX_CANDIDATES",
            constants::DEFAULT_MAX_CANDIDATES,
        )?,
        work_start_hour: env_parse_or(
            "HIREFLOW_WORK_START_HOUR",
            constants::DEFAULT_WORK_START_HOUR,
        )?,
        work_end_hour: env_parse_or("HIREFLOW_WORK_END_HOUR", constants::DEFAULT_WORK_END_HOUR)?,
        refresh_margin_seconds: env_parse_or(
            "HIREFLOW_REFRESH_MARGIN_SECONDS",
            constants::TOKEN_REFRESH_MARGIN_SECS,
        )?,
    };

    let calendar = CalendarConfig {
        api_base_url: env_var("HIREFLOW_CALENDAR_API_BASE_URL")?,
        token_url: env_var("HIREFLOW_CALENDAR_TOKEN_URL")?,
        client_id: env_var("HIREFLOW_CALENDAR_CLIENT_ID")?,
        client_secret: env_var("HIREFLOW_CALENDAR_CLIENT_SECRET")?,
        timeout_seconds: env_parse_or("HIREFLOW_CALENDAR_TIMEOUT_SECONDS", 30)?,
    };

    let mail = MailConfig {
        api_base_url: env_var("HIREFLOW_MAIL_API_BASE_URL")?,
        api_key: env_var("HIREFLOW_MAIL_API_KEY")?,
        from_address: env_var("HIREFLOW_MAIL_FROM_ADDRESS")?,
        timeout_seconds: env_parse_or("HIREFLOW_MAIL_TIMEOUT_SECONDS", 30)?,
    };

    validate(Config { database, scheduling, calendar, mail })
}

/// Reject configurations the scheduler cannot act on. Working hours must
/// name a non-empty window of whole UTC hours within a single day.
fn validate(config: Config) -> Result<Config> {
    let scheduling = &config.scheduling;
    if scheduling.work_start_hour >= scheduling.work_end_hour
        || scheduling.work_end_hour > 23
    {
        return Err(HireflowError::Config(format!(
            "Invalid working hours: start {} must be before end {} (0-23)",
            scheduling.work_start_hour, scheduling.work_end_hour
        )));
    }
    if scheduling.slot_minutes == 0 {
        return Err(HireflowError::Config("slot_minutes must be positive".to_string()));
    }
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `HireflowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HireflowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HireflowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HireflowError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, detecting the format by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HireflowError::Config(format!("Invalid TOML format: {}", e)))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| HireflowError::Config(format!("Invalid JSON format: {}", e)))?,
        _ => {
            return Err(HireflowError::Config(format!(
                "Unsupported config format: {}",
                extension
            )))
        }
    };
    validate(config)
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, up to two parent directories, and the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("hireflow.json"),
            cwd.join("hireflow.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("hireflow.json"),
                exe_dir.join("hireflow.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        HireflowError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse a required numeric environment variable.
fn env_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key).and_then(|s| {
        s.parse::<T>()
            .map_err(|e| HireflowError::Config(format!("Invalid value for {}: {}", key, e)))
    })
}

/// Parse an optional numeric environment variable, falling back to a
/// default when unset. A set-but-unparseable value is still an error.
fn env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .map_err(|e| HireflowError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
