//! Resilience patterns for fault tolerance
//!
//! Generic retry logic with configurable backoff strategies and jitter.
//! Implementations are generic over the error type so callers decide what
//! counts as retryable via a [`retry::RetryPolicy`].

pub mod retry;

pub use retry::{
    policies, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryPolicy, RetryResult,
};
