//! # Hireflow Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Credential lifecycle management with single-flight refresh
//! - Availability derivation and conflict-free slot allocation
//! - The scheduling orchestrator and notification composition
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `hireflow-common` and `hireflow-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod allocator;
pub mod availability;
pub mod credentials;
pub mod notifications;
pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use availability::BusyEvent;
pub use credentials::manager::{CalendarAccess, CredentialManager};
pub use credentials::ports::{CredentialStore, RefreshFailure, RefreshedToken, TokenRefresher};
pub use notifications::NotificationMessage;
pub use scheduling::ports::{
    AvailabilityProvider, InsertOutcome, InterviewRepository, NotificationGateway, RunRepository,
};
pub use scheduling::SchedulingService;
