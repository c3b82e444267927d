//! Core protocol types for the OCCI conformance harness.
//!
//! This crate models the header-encoded resource model of an OCCI service
//! speaking the `text/occi` rendering, where kinds, mixins, links and
//! attributes travel in HTTP header fields rather than in a body.
//!
//! ## Modules
//!
//! - [`headers`]: Header names and the fixed media type
//! - [`category`]: Kind/mixin/action identifiers
//! - [`attribute`]: Quoted `name="value"` attributes
//! - [`link`]: Typed links and actions
//! - [`codec`]: Encoding to and decoding from header values
//!
//! The codec is pure: no I/O, no state, and it never fails. Malformed input is
//! passed through verbatim.

mod attribute;
mod category;
mod codec;
pub mod headers;
mod link;

pub use attribute::*;
pub use category::*;
pub use codec::*;
pub use link::*;
