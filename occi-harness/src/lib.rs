//! End-to-end conformance harness for OCCI services.
//!
//! Authenticates against an identity service, then drives resource lifecycles
//! (create, list, wait, act, link, destroy) against a service speaking the
//! `text/occi` rendering and reports which scenarios held.
//!
//! ## Failure classes
//!
//! - Protocol violation or transport failure: the run stops and the process
//!   exits non-zero.
//! - Timeout or fatal assertion: the scenario fails, the run continues and
//!   exits non-zero at the end.
//! - Advisory assertion: logged and counted, exit status unaffected.
//!
//! ## Example
//!
//! ```ignore
//! use occi_harness::{Harness, HarnessConfig, Scenario};
//!
//! let config = HarnessConfig::from_env()?;
//! let harness = Harness::connect(config).await?;
//! let report = harness.run(&Scenario::ALL).await;
//! report.print_summary();
//! ```

pub mod config;
mod error;
pub mod expect;
pub mod lifecycle;
pub mod report;
mod runner;
pub mod scenario;

pub use config::{AssertionPolicy, HarnessConfig, HarnessConfigBuilder, WaitStrategy};
pub use error::{HarnessError, Result};
pub use expect::Expectation;
pub use lifecycle::{AssertionRecord, Lifecycle};
pub use report::{Report, ScenarioOutcome, Status};
pub use runner::Harness;
pub use scenario::Scenario;
