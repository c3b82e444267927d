//! Header names of the `text/occi` rendering.
//!
//! Names are kept lowercase, matching how [`http::HeaderName`] normalizes them.

use http::HeaderName;

/// Media type sent in both `Content-Type` and `Accept`.
pub const MEDIA_TYPE: &str = "text/occi";

/// Kinds, mixins and actions of a resource.
pub const CATEGORY: HeaderName = HeaderName::from_static("category");

/// Links rendered inline on a resource.
pub const LINK: HeaderName = HeaderName::from_static("link");

/// Resource attributes.
pub const X_OCCI_ATTRIBUTE: HeaderName = HeaderName::from_static("x-occi-attribute");

/// Collection members, as absolute URLs.
pub const X_OCCI_LOCATION: HeaderName = HeaderName::from_static("x-occi-location");

/// Location of a newly created resource.
pub const LOCATION: HeaderName = HeaderName::from_static("location");

/// Carries the session credential.
pub const X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");

/// The response headers the decoder recognizes, in a fixed order.
pub const RECOGNIZED: [HeaderName; 5] = [CATEGORY, LINK, X_OCCI_ATTRIBUTE, X_OCCI_LOCATION, LOCATION];
