//! Links and actions.

use crate::attribute::{Attribute, names};
use crate::category::{Category, CategoryClass, schemes};

/// A directed, typed relation between two resources.
///
/// Source and target are absolute URLs. On the wire they travel as the
/// `occi.core.source` and `occi.core.target` attributes, ahead of any
/// link-specific attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    category: Category,
    source: String,
    target: String,
    attributes: Vec<Attribute>,
}

impl Link {
    pub fn new<S: Into<String>, T: Into<String>>(category: Category, source: S, target: T) -> Self {
        Self {
            category,
            source: source.into(),
            target: target.into(),
            attributes: Vec::new(),
        }
    }

    /// A `storagelink` attaching a volume to a compute resource as `device_id`.
    pub fn storage<S, T, D>(source: S, target: T, device_id: D) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        D: ToString,
    {
        Self::new(
            Category::new("storagelink", schemes::INFRASTRUCTURE),
            source,
            target,
        )
        .attribute(Attribute::new(names::STORAGELINK_DEVICE_ID, device_id))
    }

    /// Append a link-specific attribute.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// All attributes in wire order: source, target, then the extras.
    pub fn wire_attributes(&self) -> Vec<Attribute> {
        let mut attrs = Vec::with_capacity(self.attributes.len() + 2);
        attrs.push(Attribute::new(names::SOURCE, &self.source));
        attrs.push(Attribute::new(names::TARGET, &self.target));
        attrs.extend(self.attributes.iter().cloned());
        attrs
    }
}

/// A named operation on an existing resource, with at most one parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    category: Category,
    param: Option<Attribute>,
}

impl Action {
    pub fn new(category: Category) -> Self {
        Self {
            category: category.class(CategoryClass::Action),
            param: None,
        }
    }

    /// Compute `stop`.
    pub fn stop() -> Self {
        Self::new(Category::new("stop", schemes::COMPUTE_ACTION))
    }

    /// Compute `start`.
    pub fn start() -> Self {
        Self::new(Category::new("start", schemes::COMPUTE_ACTION))
    }

    /// OpenStack instance action by term (`alloc_float_ip`, `chg_pwd`, ...).
    pub fn instance<T: Into<String>>(term: T) -> Self {
        Self::new(Category::new(term, schemes::INSTANCE_ACTION))
    }

    /// Attach the single parameter, replacing any previous one.
    pub fn with_param(mut self, param: Attribute) -> Self {
        self.param = Some(param);
        self
    }

    /// The action name used in the `?action=` query.
    pub fn name(&self) -> &str {
        self.category.term()
    }

    /// The category as sent on the wire, without the class qualifier.
    ///
    /// Services resolve actions by `(term, scheme)`; the class is implied by
    /// the `?action=` query.
    pub fn wire_category(&self) -> Category {
        Category::new(self.category.term(), self.category.scheme())
    }

    pub fn param(&self) -> Option<&Attribute> {
        self.param.as_ref()
    }
}
