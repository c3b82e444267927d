//! Credential acquisition.
//!
//! The identity service is consumed through a single call: exchange an
//! identity and a secret for a bearer token. [`KeystoneV2`] speaks the
//! Keystone v2.0 password flow; [`StaticToken`] hands out a token obtained
//! elsewhere.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use http::{Method, Request, header};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, info_span};

use crate::ClientError;
use crate::client::is_success;
use crate::session::{Credential, ServiceEndpoint};
use crate::transport::{HyperTransport, TransportBody};

/// Path of the Keystone v2.0 token endpoint.
pub const TOKENS_PATH: &str = "/v2.0/tokens";

/// A source of session credentials.
pub trait CredentialSource {
    /// Obtain a credential. Called once per session.
    fn acquire(&self) -> impl Future<Output = Result<Credential, ClientError>> + Send;
}

/// Keystone v2.0 password authentication.
///
/// POSTs `{"auth": {"tenantName", "passwordCredentials": {...}}}` to
/// `/v2.0/tokens` and reads `access.token.id` from the response.
#[derive(Clone)]
pub struct KeystoneV2 {
    endpoint: ServiceEndpoint,
    username: String,
    password: String,
    tenant: Option<String>,
    transport: Option<HyperTransport>,
}

impl fmt::Debug for KeystoneV2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoneV2")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}

impl KeystoneV2 {
    pub fn new<U: Into<String>, P: Into<String>>(endpoint: ServiceEndpoint, username: U, password: P) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password: password.into(),
            tenant: None,
            transport: None,
        }
    }

    /// Scope the token to `tenant`. Defaults to the username.
    pub fn tenant<T: Into<String>>(mut self, tenant: T) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Reuse an existing transport instead of building a default one.
    pub fn with_transport(mut self, transport: HyperTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    fn request_body(&self) -> Result<Bytes, ClientError> {
        let body = TokenRequest {
            auth: Auth {
                tenant_name: self.tenant.as_deref().unwrap_or(&self.username),
                password_credentials: PasswordCredentials {
                    username: &self.username,
                    password: &self.password,
                },
            },
        };
        serde_json::to_vec(&body)
            .map(Bytes::from)
            .map_err(|e| ClientError::Encode(format!("failed to encode token request: {}", e)))
    }

    async fn exchange(&self) -> Result<Credential, ClientError> {
        let transport = match &self.transport {
            Some(transport) => transport.clone(),
            None => HyperTransport::new()?,
        };

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.absolute_url(TOKENS_PATH))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .header(header::CONNECTION, "close")
            .body(TransportBody::new(self.request_body()?))
            .map_err(|e| ClientError::Encode(format!("failed to build token request: {}", e)))?;

        let response = transport.request(request).await?;
        let status = response.status();
        if !is_success(status) {
            let body = String::from_utf8_lossy(response.body()).into_owned();
            error!(status = status.as_u16(), "identity service rejected the credentials");
            return Err(ClientError::UnexpectedStatus {
                method: Method::POST,
                path: TOKENS_PATH.to_string(),
                status,
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let token = parse_token(response.body())?;
        debug!("credential acquired");
        Ok(token)
    }
}

impl CredentialSource for KeystoneV2 {
    async fn acquire(&self) -> Result<Credential, ClientError> {
        let span = info_span!(
            "identity.acquire",
            identity.endpoint = %self.endpoint,
            user = %self.username,
        );
        self.exchange().instrument(span).await
    }
}

/// A pre-issued token.
#[derive(Clone, Debug)]
pub struct StaticToken(Credential);

impl StaticToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        StaticToken(Credential::new(token))
    }
}

impl CredentialSource for StaticToken {
    async fn acquire(&self) -> Result<Credential, ClientError> {
        Ok(self.0.clone())
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    auth: Auth<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Auth<'a> {
    tenant_name: &'a str,
    password_credentials: PasswordCredentials<'a>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
}

#[derive(Deserialize)]
struct Token {
    id: String,
}

/// Extract `access.token.id` from a token response body.
fn parse_token(body: &[u8]) -> Result<Credential, ClientError> {
    let response: TokenResponse = serde_json::from_slice(body)
        .map_err(|e| ClientError::Decode(format!("invalid token response: {}", e)))?;
    if response.access.token.id.is_empty() {
        return Err(ClientError::Decode("token response carries an empty token id".into()));
    }
    Ok(Credential::new(response.access.token.id))
}
