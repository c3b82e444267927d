//! Security groups and instance actions.
//!
//! Defines a security group mixin, creates a rule tagged with it, then boots a
//! VM in the group and drives the floating IP, password and snapshot actions.

use occi_harness_client::{ResourceHandle, collections};
use occi_harness_core::{Action, Attribute, Category, names, schemes};
use tracing::debug;

use super::vm_template;
use crate::error::Result;
use crate::expect::{Expectation, signatures};
use crate::lifecycle::Lifecycle;

pub const GROUP_TERM: &str = "my_grp";
pub const GROUP_SCHEME: &str = "http://www.mystuff.org/sec#";
pub const GROUP_LOCATION: &str = "/mygroups/";

/// The group mixin as registered with the query interface.
pub fn group_definition() -> Category {
    Category::mixin(GROUP_TERM, GROUP_SCHEME, schemes::SECURITY_GROUP, GROUP_LOCATION)
}

/// The group as a tag on a resource.
pub fn group_tag() -> Category {
    Category::new(GROUP_TERM, GROUP_SCHEME)
}

/// Allow tcp/22 from anywhere.
fn ssh_rule() -> (Vec<Category>, Vec<Attribute>) {
    let categories = vec![group_tag(), Category::new("rule", schemes::SECURITY_RULE)];
    let attributes = vec![
        Attribute::new(names::SECURITY_PROTOCOL, "tcp"),
        Attribute::new("occi.network.security.to", 22),
        Attribute::new("occi.network.security.from", 22),
        Attribute::new("occi.network.security.range", "0.0.0.0/0"),
    ];
    (categories, attributes)
}

pub async fn run(lc: &mut Lifecycle<'_>) -> Result<()> {
    lc.client()
        .define_mixin(lc.session(), &group_definition())
        .await?;

    // Rules are created through the compute collection and show up under the
    // group's location.
    let (categories, attributes) = ssh_rule();
    let rule = lc
        .client()
        .create(lc.session(), collections::COMPUTE, &categories, &attributes)
        .await?;
    let outcome = with_rule(lc, &rule).await;
    lc.teardown(rule, outcome).await
}

async fn with_rule(lc: &mut Lifecycle<'_>, rule: &ResourceHandle) -> Result<()> {
    let members = lc.client().list(lc.session(), GROUP_LOCATION).await?;
    debug!(members = ?members, "security group");
    let url = lc.session().absolute_url(rule);
    lc.check(members.contains(&url), || {
        format!("{} should be listed in {}", url, GROUP_LOCATION)
    })?;

    let details = lc
        .await_state(rule, &Expectation::contains(signatures::security_protocol("tcp")))
        .await?;
    debug!(attributes = ?details.attributes(), "security rule");

    let mut template = vm_template();
    template.insert(template.len() - 1, group_tag());
    let vm = lc
        .create_listed(collections::COMPUTE, &template, &[])
        .await?;
    let outcome = instance_actions(lc, &vm).await;
    lc.teardown(vm, outcome).await
}

async fn instance_actions(lc: &mut Lifecycle<'_>, vm: &ResourceHandle) -> Result<()> {
    let active = Expectation::compute_active();
    lc.await_state(vm, &active).await?;

    let actions = [
        Action::instance("alloc_float_ip")
            .with_param(Attribute::new("org.openstack.network.floating.pool", "nova")),
        Action::instance("dealloc_float_ip"),
        Action::instance("chg_pwd")
            .with_param(Attribute::new("org.openstack.credentials.admin_pwd", "new_pass")),
    ];
    for action in &actions {
        lc.act(vm, action).await?;
        lc.await_state(vm, &active).await?;
    }

    lc.act(
        vm,
        &Action::instance("create_image")
            .with_param(Attribute::new("org.openstack.snapshot.image_name", "awesome_ware")),
    )
    .await
}
