//! Harness error types.

use std::time::Duration;

use occi_harness_client::ClientError;

/// Errors raised while running a scenario.
///
/// Only [`HarnessError::Client`] is fatal: it ends the whole run. The other
/// variants fail the current scenario and the run moves on.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Protocol violation or transport failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An expectation did not hold under the fatal assertion policy.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A resource did not reach the expected state within the poll window.
    #[error("{path} did not satisfy {expectation} after {attempts} probes in {waited:?}")]
    Timeout {
        path: String,
        expectation: String,
        waited: Duration,
        attempts: u32,
    },

    /// Invalid configuration or scenario selection.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HarnessError {
    /// Whether this error terminates the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HarnessError::Client(_))
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
