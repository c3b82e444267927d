//! Configuration modules for the OCCI client.
//!
//! This module contains wait configuration:
//! - [`PollPolicy`]: Bounded polling with exponential backoff and jitter
//! - [`poll_until`]: Re-run a probe until its result satisfies a predicate

mod poll;

pub use poll::{ExponentialBackoff, PollError, PollPolicy, Polled, defaults, poll_until};
