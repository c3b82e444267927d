//! Block storage attached to a VM through a storage link.

use occi_harness_client::{ResourceHandle, collections};
use occi_harness_core::{Attribute, Category, Link, names, schemes};
use tracing::debug;

use super::vm_template;
use crate::error::Result;
use crate::expect::Expectation;
use crate::lifecycle::Lifecycle;

/// Device the volume is exposed as inside the VM.
pub const DEVICE_ID: &str = "/dev/vdc";

/// Volume size in GB.
pub const VOLUME_SIZE: &str = "1.0";

pub async fn run(lc: &mut Lifecycle<'_>) -> Result<()> {
    let vm = lc
        .create_listed(collections::COMPUTE, &vm_template(), &[])
        .await?;
    let outcome = with_vm(lc, &vm).await;
    lc.teardown(vm, outcome).await
}

async fn with_vm(lc: &mut Lifecycle<'_>, vm: &ResourceHandle) -> Result<()> {
    let volume = lc
        .create_listed(
            collections::STORAGE,
            &[Category::new("storage", schemes::INFRASTRUCTURE)],
            &[Attribute::new(names::STORAGE_SIZE, VOLUME_SIZE)],
        )
        .await?;
    let outcome = attach(lc, vm, &volume).await;
    lc.teardown(volume, outcome).await
}

async fn attach(lc: &mut Lifecycle<'_>, vm: &ResourceHandle, volume: &ResourceHandle) -> Result<()> {
    lc.await_state(volume, &Expectation::storage_online()).await?;
    lc.await_state(vm, &Expectation::compute_active()).await?;

    let session = lc.session();
    let link = Link::storage(session.absolute_url(vm), session.absolute_url(volume), DEVICE_ID);
    let link_handle = lc
        .client()
        .attach_link(session, collections::STORAGE_LINK, &link)
        .await?;
    let outcome = inspect_link(lc, &link_handle).await;
    lc.teardown(link_handle, outcome).await
}

async fn inspect_link(lc: &mut Lifecycle<'_>, link: &ResourceHandle) -> Result<()> {
    let device = Attribute::new(names::STORAGELINK_DEVICE_ID, DEVICE_ID).to_string();
    let details = lc.await_state(link, &Expectation::contains(device)).await?;
    debug!(attributes = ?details.attributes(), "storage link");
    Ok(())
}
