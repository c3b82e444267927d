//! OCCI attributes.

use std::fmt;

/// Well-known attribute names.
pub mod names {
    pub const TITLE: &str = "occi.core.title";
    pub const SOURCE: &str = "occi.core.source";
    pub const TARGET: &str = "occi.core.target";
    pub const COMPUTE_STATE: &str = "occi.compute.state";
    pub const STORAGE_SIZE: &str = "occi.storage.size";
    pub const STORAGE_STATE: &str = "occi.storage.state";
    pub const STORAGELINK_DEVICE_ID: &str = "occi.storagelink.deviceid";
    pub const SECURITY_PROTOCOL: &str = "occi.network.security.protocol";
}

/// A named attribute value.
///
/// The value is always rendered as a double-quoted string, whatever type it was
/// built from: `Attribute::new("occi.storage.size", 1.0)` renders as
/// `occi.storage.size="1"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    value: String,
}

impl Attribute {
    /// Create an attribute, stringifying `value`.
    pub fn new<N: Into<String>, V: ToString>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}
