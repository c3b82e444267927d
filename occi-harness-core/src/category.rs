//! OCCI categories.
//!
//! A [`Category`] identifies a resource type (kind), a capability (mixin) or an
//! operation (action) by its `(term, scheme)` pair.

use std::fmt;

/// Well-known category schemes.
pub mod schemes {
    /// OCCI infrastructure kinds (`compute`, `storage`, `storagelink`, ...).
    pub const INFRASTRUCTURE: &str = "http://schemas.ogf.org/occi/infrastructure#";

    /// Actions defined on the compute kind (`start`, `stop`, ...).
    pub const COMPUTE_ACTION: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#";

    /// Relation used when defining a security group mixin.
    pub const SECURITY_GROUP: &str = "http://schemas.ogf.org/occi/infrastructure/security#group";

    /// OpenStack resource templates (flavors).
    pub const RESOURCE_TEMPLATE: &str = "http://schemas.openstack.org/template/resource#";

    /// OpenStack OS templates (images).
    pub const OS_TEMPLATE: &str = "http://schemas.openstack.org/template/os#";

    /// OpenStack instance actions (`alloc_float_ip`, `chg_pwd`, ...).
    pub const INSTANCE_ACTION: &str = "http://schemas.openstack.org/instance/action#";

    /// OpenStack security rule kind.
    pub const SECURITY_RULE: &str = "http://schemas.openstack.org/occi/infrastructure/network/security#";
}

/// The class qualifier of a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryClass {
    Kind,
    Mixin,
    Action,
}

impl CategoryClass {
    /// Wire name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryClass::Kind => "kind",
            CategoryClass::Mixin => "mixin",
            CategoryClass::Action => "action",
        }
    }
}

impl fmt::Display for CategoryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category: `(term, scheme)` with optional class, relation and location.
///
/// Renders as `term; scheme="<scheme>"` followed by `; class="..."`,
/// `; rel="..."` and `; location="..."` for each qualifier present.
///
/// # Example
///
/// ```
/// use occi_harness_core::{Category, schemes};
///
/// let compute = Category::new("compute", schemes::INFRASTRUCTURE);
/// assert_eq!(
///     compute.to_string(),
///     r#"compute; scheme="http://schemas.ogf.org/occi/infrastructure#""#
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Category {
    term: String,
    scheme: String,
    class: Option<CategoryClass>,
    rel: Option<String>,
    location: Option<String>,
}

impl Category {
    /// Create a category with just a term and scheme.
    pub fn new<T: Into<String>, S: Into<String>>(term: T, scheme: S) -> Self {
        Self {
            term: term.into(),
            scheme: scheme.into(),
            class: None,
            rel: None,
            location: None,
        }
    }

    /// Create a user-defined mixin rooted at `location`, related to `rel`.
    pub fn mixin<T, S, R, L>(term: T, scheme: S, rel: R, location: L) -> Self
    where
        T: Into<String>,
        S: Into<String>,
        R: Into<String>,
        L: Into<String>,
    {
        Self::new(term, scheme)
            .class(CategoryClass::Mixin)
            .rel(rel)
            .location(location)
    }

    /// Set the class qualifier.
    pub fn class(mut self, class: CategoryClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the relation qualifier.
    pub fn rel<R: Into<String>>(mut self, rel: R) -> Self {
        self.rel = Some(rel.into());
        self
    }

    /// Set the location qualifier.
    pub fn location<L: Into<String>>(mut self, location: L) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn get_class(&self) -> Option<CategoryClass> {
        self.class
    }

    pub fn get_rel(&self) -> Option<&str> {
        self.rel.as_deref()
    }

    pub fn get_location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; scheme=\"{}\"", self.term, self.scheme)?;
        if let Some(class) = self.class {
            write!(f, "; class=\"{}\"", class)?;
        }
        if let Some(rel) = &self.rel {
            write!(f, "; rel=\"{}\"", rel)?;
        }
        if let Some(location) = &self.location {
            write!(f, "; location=\"{}\"", location)?;
        }
        Ok(())
    }
}
