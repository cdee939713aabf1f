//! Generic retry strategy implementation
//!
//! A flexible retry mechanism for any operation that might fail transiently.
//! Supports fixed and exponential backoff, jitter, a total-time budget, and
//! caller-defined retry conditions via [`RetryPolicy`].

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("all retry attempts exhausted after {attempts} tries")]
    AttemptsExhausted { attempts: u32, source: E },

    /// The operation failed with a non-retryable error
    #[error("operation failed with non-retryable error: {source}")]
    NonRetryable { source: E },

    /// The retry strategy configuration is invalid
    #[error("invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The total-time budget was exceeded before the operation succeeded
    #[error("retry timeout exceeded after {elapsed:?}")]
    TimeoutExceeded { elapsed: Duration },
}

impl<E> RetryError<E> {
    /// Recover the last underlying error, when one was observed.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source } => Some(source),
            Self::InvalidConfiguration { .. } | Self::TimeoutExceeded { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide whether to retry, optionally with a custom delay.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Retry with the configured backoff delay
    Retry,
    /// Retry after a caller-chosen delay
    RetryAfter(Duration),
    /// Don't retry
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the delay before the given (0-based) retry attempt.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_value(delay.as_millis() as u64)),
            Jitter::Equal => {
                let half = delay.as_millis() as u64 / 2;
                Duration::from_millis(half + random_value(half))
            }
        }
    }
}

/// Pseudo-random value from a timing-based seed. Good enough distribution
/// for jitter without pulling in an RNG dependency.
fn random_value(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = Instant::now().elapsed().subsec_nanos() as u64;
    // LCG constants from Numerical Recipes
    let mut seed = nanos.wrapping_mul(1664525).wrapping_add(1013904223);
    seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    seed % max
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
    /// Maximum total time to spend retrying
    pub max_total_time: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Equal,
            max_total_time: Some(Duration::from_secs(300)),
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        if let BackoffStrategy::Exponential { base, .. } = &self.backoff {
            if *base <= 0.0 {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    pub fn full_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Full;
        self
    }

    pub fn equal_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Equal;
        self
    }

    pub fn max_total_time(mut self, duration: Duration) -> Self {
        self.config.max_total_time = Some(duration);
        self
    }

    pub fn unlimited_time(mut self) -> Self {
        self.config.max_total_time = None;
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            if let Some(max_time) = self.config.max_total_time {
                let elapsed = start.elapsed();
                if elapsed >= max_time {
                    warn!(?elapsed, attempt, "retry time budget exceeded");
                    return Err(RetryError::TimeoutExceeded { elapsed });
                }
            }

            debug!(attempt = attempt + 1, max = self.config.max_attempts, "executing operation");

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.config.max_attempts - 1 {
                        warn!(attempts = attempt + 1, ?error, "all retry attempts exhausted");
                        return Err(RetryError::AttemptsExhausted {
                            attempts: attempt + 1,
                            source: error,
                        });
                    }

                    match self.policy.should_retry(&error, attempt) {
                        RetryDecision::Stop => {
                            debug!(?error, "retry policy determined not to retry");
                            return Err(RetryError::NonRetryable { source: error });
                        }
                        RetryDecision::Retry => {
                            let delay = self.config.backoff.calculate_delay(attempt);
                            let jittered = self.config.jitter.apply(delay);
                            warn!(attempt = attempt + 1, ?jittered, "operation failed, retrying");
                            tokio::time::sleep(jittered).await;
                        }
                        RetryDecision::RetryAfter(custom) => {
                            warn!(attempt = attempt + 1, ?custom, "operation failed, retrying");
                            tokio::time::sleep(custom).await;
                        }
                    }

                    attempt += 1;
                }
            }
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
