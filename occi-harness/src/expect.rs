//! Expectations over decoded resource attributes.
//!
//! Decoded attribute tokens are opaque strings, so an expectation is a
//! substring test against a rendered signature such as
//! `occi.compute.state="active"`.

use std::fmt;

use occi_harness_core::{Attribute, DecodedHeaders, names};

/// Rendered attribute signatures for well-known states.
pub mod signatures {
    use super::*;

    /// `occi.compute.state="<state>"`.
    pub fn compute_state(state: &str) -> String {
        Attribute::new(names::COMPUTE_STATE, state).to_string()
    }

    /// `occi.network.security.protocol="<protocol>"`.
    pub fn security_protocol(protocol: &str) -> String {
        Attribute::new(names::SECURITY_PROTOCOL, protocol).to_string()
    }

    /// `occi.storage.state="<state>"`.
    pub fn storage_state(state: &str) -> String {
        Attribute::new(names::STORAGE_STATE, state).to_string()
    }
}

/// A predicate over the attribute tokens of a retrieved resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// Some attribute token contains the signature.
    AttributeContains(String),
    /// No attribute token contains the signature.
    AttributeLacks(String),
}

impl Expectation {
    pub fn contains<S: Into<String>>(signature: S) -> Self {
        Expectation::AttributeContains(signature.into())
    }

    pub fn lacks<S: Into<String>>(signature: S) -> Self {
        Expectation::AttributeLacks(signature.into())
    }

    pub fn compute_active() -> Self {
        Self::contains(signatures::compute_state("active"))
    }

    /// Settled in `inactive`, past any transitional state.
    pub fn compute_stopped() -> Self {
        Self::contains(signatures::compute_state("inactive"))
    }

    /// Any state but active, including transitional ones.
    pub fn compute_not_active() -> Self {
        Self::lacks(signatures::compute_state("active"))
    }

    pub fn storage_online() -> Self {
        Self::contains(signatures::storage_state("online"))
    }

    pub fn holds(&self, decoded: &DecodedHeaders) -> bool {
        match self {
            Expectation::AttributeContains(sig) => decoded.attribute_contains(sig),
            Expectation::AttributeLacks(sig) => !decoded.attribute_contains(sig),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::AttributeContains(sig) => write!(f, "attribute containing `{}`", sig),
            Expectation::AttributeLacks(sig) => write!(f, "no attribute containing `{}`", sig),
        }
    }
}
