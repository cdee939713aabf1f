//! The scheduling orchestrator and its ports
//!
//! One vacancy-closure trigger drives one pass through credential
//! resolution, availability, allocation, persistence and notification,
//! finishing with a durable run record.

pub mod orchestrator;
pub mod ports;

pub use orchestrator::SchedulingService;
