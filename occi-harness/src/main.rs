//! Conformance runner.
//!
//! Usage: `occi-harness [SCENARIO...]`
//!
//! Scenarios: discovery, compute, security, storage, invalidation. No
//! arguments runs all of them. Endpoints and credentials come from the
//! `OCCI_*` environment variables; log verbosity from `RUST_LOG`
//! (default `debug`).

use std::process::ExitCode;

use anyhow::Context;
use occi_harness::{Harness, HarnessConfig, Scenario};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let scenarios = Scenario::select(std::env::args().skip(1))?;
    let config = HarnessConfig::from_env()?;
    info!(
        service = %config.service_endpoint,
        identity = %config.identity_endpoint,
        assertions = %config.assertions,
        "starting"
    );

    let harness = Harness::connect(config)
        .await
        .context("failed to acquire a credential")?;
    let report = harness.run(&scenarios).await;
    report.print_summary();

    Ok(report.exit_code())
}
