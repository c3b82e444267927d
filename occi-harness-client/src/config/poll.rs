//! Bounded polling with exponential backoff.
//!
//! Backend state transitions are asynchronous with respect to the HTTP
//! response, so callers wait for an observable state rather than sleeping for a
//! fixed interval. The backoff curve follows the
//! [gRPC connection backoff specification](https://github.com/grpc/grpc/blob/master/doc/connection-backoff.md);
//! the loop is bounded by a total timeout instead of a retry count.
//!
//! # Example
//!
//! ```ignore
//! use occi_harness_client::{PollPolicy, poll_until};
//! use std::time::Duration;
//!
//! let policy = PollPolicy::new().timeout(Duration::from_secs(60));
//!
//! let polled = poll_until(
//!     &policy,
//!     || client.retrieve(&session, &handle),
//!     |headers| headers.attribute_contains("occi.compute.state=\"active\""),
//! )
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::ClientError;

/// Default configuration values.
pub mod defaults {
    use std::time::Duration;

    /// Delay before the first probe.
    pub const INITIAL_DELAY: Duration = Duration::ZERO;

    /// Delay after the first unsuccessful probe.
    pub const BASE_DELAY: Duration = Duration::from_secs(1);

    /// Multiplier for exponential backoff.
    pub const MULTIPLIER: f64 = 1.6;

    /// Jitter factor (0.2 means +/- 20%).
    pub const JITTER: f64 = 0.2;

    /// Maximum delay between probes.
    pub const MAX_DELAY: Duration = Duration::from_secs(15);

    /// Total window before giving up.
    pub const TIMEOUT: Duration = Duration::from_secs(120);
}

/// Configuration for a bounded poll.
///
/// # Default Values
///
/// - `initial_delay`: 0
/// - `base_delay`: 1 second
/// - `multiplier`: 1.6
/// - `jitter`: 0.2 (20%)
/// - `max_delay`: 15 seconds
/// - `timeout`: 120 seconds
#[derive(Clone, Debug, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first probe.
    pub initial_delay: Duration,

    /// Delay after the first unsuccessful probe.
    pub base_delay: Duration,

    /// Multiplier for exponential backoff. Should be >= 1.0.
    pub multiplier: f64,

    /// Jitter factor for randomizing delays. Value between 0.0 and 1.0.
    pub jitter: f64,

    /// Maximum delay between probes.
    pub max_delay: Duration,

    /// Total time allowed for the condition to hold, measured from the start
    /// of the poll (initial delay included).
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: defaults::INITIAL_DELAY,
            base_delay: defaults::BASE_DELAY,
            multiplier: defaults::MULTIPLIER,
            jitter: defaults::JITTER,
            max_delay: defaults::MAX_DELAY,
            timeout: defaults::TIMEOUT,
        }
    }
}

impl PollPolicy {
    /// Create a new PollPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy for in-process backends that converge within milliseconds.
    pub fn fast() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
            timeout: Duration::from_secs(5),
            jitter: 0.0,
            ..Default::default()
        }
    }

    /// Set the delay before the first probe.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay after the first unsuccessful probe.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between probes.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the total poll window.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the backoff multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is less than 1.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier >= 1.0, "multiplier must be >= 1.0");
        self.multiplier = multiplier;
        self
    }

    /// Set the jitter factor.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is not between 0.0 and 1.0.
    pub fn jitter(mut self, jitter: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&jitter),
            "jitter must be between 0.0 and 1.0"
        );
        self.jitter = jitter;
        self
    }

    /// Validate the policy configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.base_delay > self.max_delay {
            return Err("base_delay must not exceed max_delay");
        }
        if self.multiplier < 1.0 {
            return Err("multiplier must be >= 1.0");
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err("jitter must be between 0.0 and 1.0");
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero");
        }
        Ok(())
    }

    /// Create an ExponentialBackoff from this policy.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.clone())
    }
}

/// Exponential backoff with jitter.
///
/// Yields `base * multiplier^attempt`, jittered and clamped to `max_delay`.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    policy: PollPolicy,
    /// Current delay without jitter, stored as f64 to avoid rounding errors.
    current_delay_secs: f64,
    /// Number of delays handed out.
    attempts: u32,
}

impl ExponentialBackoff {
    pub fn new(policy: PollPolicy) -> Self {
        let current_delay_secs = policy.base_delay.as_secs_f64();
        Self {
            policy,
            current_delay_secs,
            attempts: 0,
        }
    }

    /// Number of delays handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Get the next delay, applying jitter, and advance.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current_delay_secs;

        // delay * (1 + jitter * random(-1, 1))
        let jittered = if self.policy.jitter > 0.0 {
            let jitter_range = self.policy.jitter * 2.0;
            let random_factor = rand::random::<f64>() * jitter_range - self.policy.jitter;
            delay * (1.0 + random_factor)
        } else {
            delay
        };

        let clamped = jittered.min(self.policy.max_delay.as_secs_f64());

        self.current_delay_secs = (self.current_delay_secs * self.policy.multiplier)
            .min(self.policy.max_delay.as_secs_f64());
        self.attempts += 1;

        Duration::from_secs_f64(clamped.max(0.0))
    }
}

/// A probe result that satisfied the predicate.
#[derive(Debug)]
pub struct Polled<T> {
    pub value: T,
    /// Number of probes issued, including the successful one.
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Why a poll did not produce a satisfying value.
#[derive(Debug, thiserror::Error)]
pub enum PollError<T: std::fmt::Debug> {
    /// A probe failed; polling stops at the first failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The predicate never held within the window.
    #[error("condition not met after {attempts} probes in {elapsed:?}")]
    Timeout {
        /// The last probe result.
        last: T,
        attempts: u32,
        elapsed: Duration,
    },

    /// The policy itself is invalid.
    #[error("invalid poll policy: {0}")]
    InvalidPolicy(&'static str),
}

/// Run `probe` until `ready` holds for its result or the policy window closes.
///
/// At least one probe is always issued. Probe errors are returned immediately
/// without further attempts. The sleep before a probe never extends past the
/// deadline.
pub async fn poll_until<F, Fut, T, P>(
    policy: &PollPolicy,
    mut probe: F,
    mut ready: P,
) -> Result<Polled<T>, PollError<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    P: FnMut(&T) -> bool,
    T: std::fmt::Debug,
{
    policy.validate().map_err(PollError::InvalidPolicy)?;

    let start = Instant::now();
    let deadline = start + policy.timeout;
    let mut backoff = policy.backoff();
    let mut attempts = 0u32;

    if !policy.initial_delay.is_zero() {
        tokio::time::sleep_until((start + policy.initial_delay).min(deadline)).await;
    }

    loop {
        let value = probe().await?;
        attempts += 1;

        if ready(&value) {
            return Ok(Polled {
                value,
                attempts,
                elapsed: start.elapsed(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::Timeout {
                last: value,
                attempts,
                elapsed: now - start,
            });
        }

        let delay = backoff.next_delay().min(deadline - now);
        tracing::debug!(
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            "condition not met yet, polling again"
        );
        tokio::time::sleep(delay).await;
    }
}
