//! The `text/occi` header codec.
//!
//! Encoding joins rendered categories or attributes into one comma-separated
//! value per header name, preserving caller order. Decoding splits each
//! recognized response header on `,` and trims every token.
//!
//! Tokens are not parsed back into [`Category`] or [`Attribute`] values.
//! A quoted value containing a comma is split like any other; callers match on
//! substrings of the opaque tokens.

use std::fmt::Display;

use http::{HeaderMap, HeaderName};

use crate::attribute::Attribute;
use crate::category::Category;
use crate::headers;

/// Separator placed between entries of one header value.
pub const SEPARATOR: &str = ", ";

/// Join rendered items into a single header value.
///
/// Returns `None` for an empty input so that no header is emitted at all.
pub fn join_values<I, T>(items: I) -> Option<String>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut out: Option<String> = None;
    for item in items {
        append_value(&mut out, &item.to_string());
    }
    out
}

/// Encode categories into one `Category` header value.
pub fn encode_categories(categories: &[Category]) -> Option<String> {
    join_values(categories)
}

/// Encode attributes into one `X-OCCI-Attribute` header value.
pub fn encode_attributes(attributes: &[Attribute]) -> Option<String> {
    join_values(attributes)
}

/// Split a header value into trimmed tokens.
///
/// Never fails; an empty value yields a single empty token.
pub fn decode_value(value: &str) -> Vec<String> {
    value.split(',').map(|token| token.trim().to_string()).collect()
}

fn append_value(slot: &mut Option<String>, token: &str) {
    match slot {
        Some(existing) => {
            existing.push_str(SEPARATOR);
            existing.push_str(token);
        }
        None => *slot = Some(token.to_string()),
    }
}

/// Ordered set of encoded OCCI request headers.
///
/// Holds at most one value per header name. Pushing to a name that already
/// has a value appends to it, so the encoded form of N pushes is a single
/// value with N entries in push order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OcciHeaders {
    entries: Vec<(HeaderName, String)>,
}

impl OcciHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers describing a resource with the given categories and attributes.
    pub fn resource(categories: &[Category], attributes: &[Attribute]) -> Self {
        let mut headers = Self::new();
        headers.extend_categories(categories);
        headers.extend_attributes(attributes);
        headers
    }

    /// Append one already-rendered entry to `name`.
    pub fn push<T: AsRef<str>>(&mut self, name: HeaderName, token: T) -> &mut Self {
        let token = token.as_ref();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, value)) => {
                value.push_str(SEPARATOR);
                value.push_str(token);
            }
            None => self.entries.push((name, token.to_string())),
        }
        self
    }

    pub fn push_category(&mut self, category: &Category) -> &mut Self {
        self.push(headers::CATEGORY, category.to_string())
    }

    pub fn push_attribute(&mut self, attribute: &Attribute) -> &mut Self {
        self.push(headers::X_OCCI_ATTRIBUTE, attribute.to_string())
    }

    /// Append a resource location to `X-OCCI-Location`.
    pub fn push_location<T: AsRef<str>>(&mut self, location: T) -> &mut Self {
        self.push(headers::X_OCCI_LOCATION, location)
    }

    pub fn extend_categories(&mut self, categories: &[Category]) -> &mut Self {
        for category in categories {
            self.push_category(category);
        }
        self
    }

    pub fn extend_attributes(&mut self, attributes: &[Attribute]) -> &mut Self {
        for attribute in attributes {
            self.push_attribute(attribute);
        }
        self
    }

    /// Get the encoded value for `name`.
    pub fn get(&self, name: &HeaderName) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &str)> {
        self.entries.iter().map(|(n, v)| (n, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decoded OCCI response headers.
///
/// Only the recognized headers (see [`headers::RECOGNIZED`]) are kept, each as
/// an ordered list of trimmed tokens. A header absent from the response has no
/// entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedHeaders {
    entries: Vec<(HeaderName, Vec<String>)>,
}

impl DecodedHeaders {
    /// Decode the recognized headers out of a response header map.
    ///
    /// Repeated occurrences of a header are decoded in arrival order and
    /// concatenated. Values that are not valid UTF-8 are decoded lossily.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut entries = Vec::new();
        for name in headers::RECOGNIZED {
            let mut values = map.get_all(&name).iter().peekable();
            if values.peek().is_none() {
                continue;
            }
            let mut tokens = Vec::new();
            for value in values {
                tokens.extend(decode_value(&String::from_utf8_lossy(value.as_bytes())));
            }
            entries.push((name, tokens));
        }
        Self { entries }
    }

    /// Tokens of `name`, if the header was present.
    pub fn get(&self, name: &HeaderName) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tokens)| tokens.as_slice())
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.get(name).is_some()
    }

    pub fn categories(&self) -> &[String] {
        self.get(&headers::CATEGORY).unwrap_or_default()
    }

    pub fn links(&self) -> &[String] {
        self.get(&headers::LINK).unwrap_or_default()
    }

    pub fn attributes(&self) -> &[String] {
        self.get(&headers::X_OCCI_ATTRIBUTE).unwrap_or_default()
    }

    pub fn locations(&self) -> &[String] {
        self.get(&headers::X_OCCI_LOCATION).unwrap_or_default()
    }

    /// First token of the `location` header.
    pub fn location(&self) -> Option<&str> {
        self.get(&headers::LOCATION)
            .and_then(|tokens| tokens.first())
            .map(String::as_str)
    }

    /// Whether any attribute token contains `needle`.
    pub fn attribute_contains(&self, needle: &str) -> bool {
        self.attributes().iter().any(|token| token.contains(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &[String])> {
        self.entries.iter().map(|(n, t)| (n, t.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode the recognized OCCI headers of a response.
pub fn decode_headers(map: &HeaderMap) -> DecodedHeaders {
    DecodedHeaders::from_header_map(map)
}
