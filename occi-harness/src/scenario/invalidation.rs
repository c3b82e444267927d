//! Once destroyed, a handle's path is rejected by the service.

use http::Method;
use occi_harness_client::collections;

use super::vm_template;
use crate::error::Result;
use crate::lifecycle::Lifecycle;

pub async fn run(lc: &mut Lifecycle<'_>) -> Result<()> {
    let vm = lc
        .create_listed(collections::COMPUTE, &vm_template(), &[])
        .await?;
    let path = vm.path().to_string();

    lc.client().destroy(lc.session(), vm).await?;

    lc.expect_rejected(Method::GET, &path).await?;
    lc.expect_rejected(Method::DELETE, &path).await
}
