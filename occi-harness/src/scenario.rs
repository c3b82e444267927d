//! Conformance scenarios.
//!
//! Each scenario is a sequence of dependent steps driven through a
//! [`Lifecycle`]. Every resource a scenario creates is destroyed before it
//! returns, whatever happened in between.

mod compute;
mod discovery;
mod invalidation;
mod security;
mod storage;

use std::fmt;
use std::str::FromStr;

use occi_harness_core::{Category, schemes};

use crate::error::{HarnessError, Result};
use crate::lifecycle::Lifecycle;

/// Flavor used for every VM.
pub const FLAVOR: &str = "m1.tiny";

/// Image used for every VM.
pub const IMAGE: &str = "cirros-0.3.0-x86_64-uec";

/// Categories of a small VM: flavor, image, then the compute kind.
pub fn vm_template() -> Vec<Category> {
    vec![
        Category::new(FLAVOR, schemes::RESOURCE_TEMPLATE),
        Category::new(IMAGE, schemes::OS_TEMPLATE),
        Category::new("compute", schemes::INFRASTRUCTURE),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Query interface listing.
    Discovery,
    /// VM create, stop, start, destroy.
    Compute,
    /// Security group, rule and floating IP actions.
    Security,
    /// Volume attached to a VM through a storage link.
    Storage,
    /// A destroyed handle is rejected afterwards.
    Invalidation,
}

impl Scenario {
    /// All scenarios in run order.
    pub const ALL: [Scenario; 5] = [
        Scenario::Discovery,
        Scenario::Compute,
        Scenario::Security,
        Scenario::Storage,
        Scenario::Invalidation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Discovery => "discovery",
            Scenario::Compute => "compute",
            Scenario::Security => "security",
            Scenario::Storage => "storage",
            Scenario::Invalidation => "invalidation",
        }
    }

    /// Parse scenario names; an empty selection means all of them.
    pub fn select<I, S>(names: I) -> Result<Vec<Scenario>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<Scenario>>>()?;
        if selected.is_empty() {
            return Ok(Scenario::ALL.to_vec());
        }
        Ok(selected)
    }

    pub async fn run(self, lc: &mut Lifecycle<'_>) -> Result<()> {
        match self {
            Scenario::Discovery => discovery::run(lc).await,
            Scenario::Compute => compute::run(lc).await,
            Scenario::Security => security::run(lc).await,
            Scenario::Storage => storage::run(lc).await,
            Scenario::Invalidation => invalidation::run(lc).await,
        }
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Scenario::ALL.iter().map(Scenario::name).collect();
                HarnessError::Config(format!(
                    "unknown scenario {:?}, expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
