//! VM lifecycle: create, stop, start, destroy.

use occi_harness_client::{ResourceHandle, collections};
use occi_harness_core::Action;
use tracing::debug;

use super::vm_template;
use crate::error::Result;
use crate::expect::Expectation;
use crate::lifecycle::Lifecycle;

pub async fn run(lc: &mut Lifecycle<'_>) -> Result<()> {
    let vm = lc
        .create_listed(collections::COMPUTE, &vm_template(), &[])
        .await?;
    let outcome = cycle(lc, &vm).await;
    lc.teardown(vm, outcome).await
}

async fn cycle(lc: &mut Lifecycle<'_>, vm: &ResourceHandle) -> Result<()> {
    let state = lc.await_state(vm, &Expectation::compute_active()).await?;
    debug!(attributes = ?state.attributes(), "running");

    lc.act(vm, &Action::stop()).await?;
    let state = lc.await_state(vm, &Expectation::compute_stopped()).await?;
    debug!(attributes = ?state.attributes(), "stopped");
    let not_active = Expectation::compute_not_active();
    lc.check(not_active.holds(&state), || format!("{} should show {}", vm, not_active))?;

    lc.act(vm, &Action::start()).await?;
    lc.await_state(vm, &Expectation::compute_active()).await?;
    Ok(())
}
