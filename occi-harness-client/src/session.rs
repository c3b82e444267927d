//! Session context: credential, service endpoint and resource handles.
//!
//! A [`Session`] is passed explicitly into every [`OcciClient`](crate::OcciClient)
//! call. It is read-only once the credential has been acquired.

use std::fmt;

use http::uri::{Authority, Uri};

use crate::ClientError;

const HTTP_SCHEME: &str = "http://";

/// Opaque bearer credential issued by the identity service.
///
/// The token is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Credential(token.into())
    }

    /// The raw token, for the `X-Auth-Token` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Address of a plain-HTTP service.
///
/// Parsed from `host:port` or `http://host:port`; a trailing slash is ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    authority: Authority,
    origin: String,
}

impl ServiceEndpoint {
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let trimmed = input.trim();
        if trimmed.starts_with("https://") {
            return Err(ClientError::InvalidEndpoint(format!(
                "{trimmed}: only plain http endpoints are supported"
            )));
        }
        let host = trimmed.strip_prefix(HTTP_SCHEME).unwrap_or(trimmed);
        let host = host.trim_end_matches('/');
        if host.is_empty() {
            return Err(ClientError::InvalidEndpoint(format!("{input:?}: empty host")));
        }
        let authority: Authority = host
            .parse()
            .map_err(|e| ClientError::InvalidEndpoint(format!("{input:?}: {e}")))?;
        let origin = format!("{HTTP_SCHEME}{authority}");
        Ok(Self { authority, origin })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// `http://host:port`, without a trailing slash.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Absolute URL of `path` on this endpoint.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }

    /// Reduce a location to its path component.
    ///
    /// A location on this endpoint loses its origin prefix. Any other absolute
    /// URL is reduced to its path and query. Anything unparseable is returned
    /// verbatim.
    pub fn strip_origin(&self, location: &str) -> String {
        if let Some(rest) = location.strip_prefix(self.origin.as_str()) {
            if rest.is_empty() {
                return "/".to_string();
            }
            if rest.starts_with('/') || rest.starts_with('?') {
                return rest.to_string();
            }
        }
        match location.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() => uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            _ => location.to_string(),
        }
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin)
    }
}

/// Location of one resource instance on the service.
///
/// Returned by create operations and consumed by
/// [`OcciClient::destroy`](crate::OcciClient::destroy): after a successful
/// destroy the handle no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    /// Wrap a path such as `/compute/1234`.
    pub fn from_path<S: Into<String>>(path: S) -> Self {
        ResourceHandle(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// `<path>?action=<name>`.
    pub fn action_path(&self, action: &str) -> String {
        format!("{}?action={}", self.0, action)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The session shared by all calls of a run.
#[derive(Clone, Debug)]
pub struct Session {
    credential: Credential,
    service: ServiceEndpoint,
}

impl Session {
    pub fn new(credential: Credential, service: ServiceEndpoint) -> Self {
        Self {
            credential,
            service,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn service(&self) -> &ServiceEndpoint {
        &self.service
    }

    /// Absolute URL of a resource, as the service lists it.
    pub fn absolute_url(&self, handle: &ResourceHandle) -> String {
        self.service.absolute_url(handle.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port() {
        let ep = ServiceEndpoint::parse("127.0.0.1:8787").unwrap();
        assert_eq!(ep.origin(), "http://127.0.0.1:8787");
        assert_eq!(ep.authority().port_u16(), Some(8787));
    }

    #[test]
    fn test_parse_with_scheme_and_trailing_slash() {
        let ep = ServiceEndpoint::parse("http://localhost:5000/").unwrap();
        assert_eq!(ep.origin(), "http://localhost:5000");
    }

    #[test]
    fn test_parse_rejects_https_and_empty() {
        assert!(matches!(
            ServiceEndpoint::parse("https://secure:443"),
            Err(ClientError::InvalidEndpoint(_))
        ));
        assert!(ServiceEndpoint::parse("http://").is_err());
        assert!(ServiceEndpoint::parse("").is_err());
    }

    #[test]
    fn test_absolute_url() {
        let ep = ServiceEndpoint::parse("127.0.0.1:8787").unwrap();
        assert_eq!(ep.absolute_url("/compute/"), "http://127.0.0.1:8787/compute/");
        assert_eq!(ep.absolute_url("compute/"), "http://127.0.0.1:8787/compute/");
    }

    #[test]
    fn test_strip_origin() {
        let ep = ServiceEndpoint::parse("127.0.0.1:8787").unwrap();
        assert_eq!(ep.strip_origin("http://127.0.0.1:8787/compute/42"), "/compute/42");
        assert_eq!(ep.strip_origin("http://127.0.0.1:8787"), "/");
        assert_eq!(ep.strip_origin("http://other:1/storage/7"), "/storage/7");
        assert_eq!(ep.strip_origin("/compute/42"), "/compute/42");
        // Shared textual prefix, different port: not our origin.
        let short = ServiceEndpoint::parse("127.0.0.1:878").unwrap();
        assert_eq!(short.strip_origin("http://127.0.0.1:8787/x"), "/x");
    }

    #[test]
    fn test_handle_action_path() {
        let handle = ResourceHandle::from_path("/compute/42");
        assert_eq!(handle.action_path("stop"), "/compute/42?action=stop");
        assert_eq!(handle.to_string(), "/compute/42");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("secret-token");
        assert_eq!(format!("{:?}", cred), "Credential(<redacted>)");
        assert_eq!(cred.expose(), "secret-token");
    }

    #[test]
    fn test_session_absolute_url() {
        let session = Session::new(
            Credential::new("t"),
            ServiceEndpoint::parse("127.0.0.1:8787").unwrap(),
        );
        let handle = ResourceHandle::from_path("/compute/1");
        assert_eq!(session.absolute_url(&handle), "http://127.0.0.1:8787/compute/1");
    }
}
