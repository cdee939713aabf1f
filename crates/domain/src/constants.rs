//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! scheduling engine.

// Slot allocation defaults
pub const DEFAULT_HORIZON_DAYS: u32 = 7;
pub const DEFAULT_SLOT_MINUTES: u32 = 60;
pub const DEFAULT_MAX_CANDIDATES: u32 = 5;
pub const DEFAULT_WORK_START_HOUR: u32 = 9;
pub const DEFAULT_WORK_END_HOUR: u32 = 17;

// Credential lifecycle
pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

// Calendar retry budget
pub const CALENDAR_RETRY_MAX_ATTEMPTS: usize = 4;
pub const CALENDAR_RETRY_INITIAL_DELAY_MS: u64 = 500;
pub const CALENDAR_RETRY_MAX_DELAY_MS: u64 = 5_000;

// Closure worker
pub const CLOSURE_QUEUE_CAPACITY: usize = 64;
pub const RUN_TIMEOUT_SECS: u64 = 120;
