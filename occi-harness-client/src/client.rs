//! The OCCI protocol client.
//!
//! [`OcciClient`] sends one request per call, with the session credential and
//! the encoded OCCI headers attached, and decodes the OCCI headers of the
//! response. Only `200 OK` and `201 Created` count as success.

use bytes::Bytes;
use http::{HeaderValue, Method, Request, StatusCode, header};
use occi_harness_core::headers::{self, MEDIA_TYPE};
use occi_harness_core::{Action, Attribute, Category, DecodedHeaders, Link, OcciHeaders};
use tracing::{Instrument, debug, error, info_span, warn};

use crate::ClientError;
use crate::builder::ClientBuilder;
use crate::session::{ResourceHandle, Session};
use crate::transport::{HyperTransport, TransportBody};

/// Well-known collection paths.
pub mod collections {
    /// Query interface: kinds, mixins and actions the service supports.
    pub const QUERY_INTERFACE: &str = "/-/";
    pub const COMPUTE: &str = "/compute/";
    pub const STORAGE: &str = "/storage/";
    pub const STORAGE_LINK: &str = "/storage/link/";
}

/// Whether `status` is in the success set.
pub fn is_success(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

/// Client for a service speaking the `text/occi` rendering.
///
/// The client holds no session state: every call takes the [`Session`]
/// explicitly and attaches its credential.
///
/// # Example
///
/// ```ignore
/// use occi_harness_client::{OcciClient, collections};
/// use occi_harness_core::{Category, schemes};
///
/// let client = OcciClient::new()?;
/// let handle = client
///     .create(
///         &session,
///         collections::COMPUTE,
///         &[Category::new("compute", schemes::INFRASTRUCTURE)],
///         &[],
///     )
///     .await?;
/// let state = client.retrieve(&session, &handle).await?;
/// client.destroy(&session, handle).await?;
/// ```
#[derive(Clone, Debug)]
pub struct OcciClient {
    transport: HyperTransport,
}

impl OcciClient {
    /// Create a new ClientBuilder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default transport settings.
    pub fn new() -> Result<Self, ClientError> {
        ClientBuilder::new().build()
    }

    /// Create a client over an existing transport.
    ///
    /// This is called by [`ClientBuilder::build`]. Prefer using the builder API.
    pub(crate) fn from_transport(transport: HyperTransport) -> Self {
        Self { transport }
    }

    /// The underlying transport, e.g. to share it with a credential source.
    pub fn transport(&self) -> &HyperTransport {
        &self.transport
    }

    fn build_request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        occi: &OcciHeaders,
    ) -> Result<Request<TransportBody>, ClientError> {
        let url = session.service().absolute_url(path);

        let mut token = HeaderValue::from_str(session.credential().expose())
            .map_err(|e| ClientError::Encode(format!("credential is not a valid header value: {}", e)))?;
        token.set_sensitive(true);

        let mut builder = Request::builder()
            .method(method)
            .uri(&url)
            .header(header::CONTENT_TYPE, MEDIA_TYPE)
            .header(header::ACCEPT, MEDIA_TYPE)
            .header(header::CONNECTION, "close")
            .header(headers::X_AUTH_TOKEN, token);

        for (name, value) in occi.iter() {
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Encode(format!("invalid `{}` value: {}", name, e)))?;
            builder = builder.header(name, value);
        }

        builder
            .body(TransportBody::new(Bytes::new()))
            .map_err(|e| ClientError::Encode(format!("failed to build request for {}: {}", url, e)))
    }

    /// One round trip, whatever the status.
    async fn send(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        occi: &OcciHeaders,
    ) -> Result<http::Response<Bytes>, ClientError> {
        let request = self.build_request(session, method, path, occi)?;
        self.transport.request(request).await
    }

    /// Send one request and decode the OCCI headers of a successful response.
    ///
    /// Any status other than 200 or 201 is logged (reason at error level, body
    /// at warn level) and returned as [`ClientError::UnexpectedStatus`].
    pub async fn execute(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        occi: &OcciHeaders,
    ) -> Result<DecodedHeaders, ClientError> {
        let span = info_span!("occi.request", http.method = %method, url.path = %path);

        async move {
            let response = self.send(session, method.clone(), path, occi).await?;
            let status = response.status();

            if is_success(status) {
                let decoded = DecodedHeaders::from_header_map(response.headers());
                debug!(status = status.as_u16(), headers = decoded.len(), "request succeeded");
                return Ok(decoded);
            }

            let reason = reason_phrase(&response);
            let body = String::from_utf8_lossy(response.body()).into_owned();
            error!(status = status.as_u16(), reason = %reason, "unexpected status");
            warn!(body = %body, "response body");

            Err(ClientError::UnexpectedStatus {
                method,
                path: path.to_string(),
                status,
                reason,
                body,
            })
        }
        .instrument(span)
        .await
    }

    /// Send a request that the service is expected to reject.
    ///
    /// Returns the rejection status. A success status yields
    /// [`ClientError::UnexpectedSuccess`]. Transport failures propagate.
    pub async fn expect_rejection(
        &self,
        session: &Session,
        method: Method,
        path: &str,
    ) -> Result<StatusCode, ClientError> {
        let span = info_span!("occi.probe", http.method = %method, url.path = %path);

        async move {
            let response = self.send(session, method.clone(), path, &OcciHeaders::new()).await?;
            let status = response.status();
            if is_success(status) {
                return Err(ClientError::UnexpectedSuccess {
                    method,
                    path: path.to_string(),
                    status,
                });
            }
            debug!(status = status.as_u16(), "request rejected as expected");
            Ok(status)
        }
        .instrument(span)
        .await
    }

    /// Create a resource in `collection` and return its handle.
    pub async fn create(
        &self,
        session: &Session,
        collection: &str,
        categories: &[Category],
        attributes: &[Attribute],
    ) -> Result<ResourceHandle, ClientError> {
        let occi = OcciHeaders::resource(categories, attributes);
        let decoded = self.execute(session, Method::POST, collection, &occi).await?;
        handle_from_location(session, &decoded)
    }

    /// Absolute URLs of the members of `collection`, as the service renders
    /// them. An absent `X-OCCI-Location` header is an empty listing.
    pub async fn list(&self, session: &Session, collection: &str) -> Result<Vec<String>, ClientError> {
        let decoded = self
            .execute(session, Method::GET, collection, &OcciHeaders::new())
            .await?;
        Ok(decoded.locations().to_vec())
    }

    pub async fn retrieve(
        &self,
        session: &Session,
        handle: &ResourceHandle,
    ) -> Result<DecodedHeaders, ClientError> {
        let decoded = self
            .execute(session, Method::GET, handle.path(), &OcciHeaders::new())
            .await?;
        debug!(resource = %handle, headers = ?decoded, "retrieved");
        Ok(decoded)
    }

    /// Delete a resource. The handle is consumed.
    pub async fn destroy(
        &self,
        session: &Session,
        handle: ResourceHandle,
    ) -> Result<DecodedHeaders, ClientError> {
        self.execute(session, Method::DELETE, handle.path(), &OcciHeaders::new())
            .await
    }

    /// Trigger `action` on a resource. The response carries nothing of interest.
    pub async fn invoke_action(
        &self,
        session: &Session,
        handle: &ResourceHandle,
        action: &Action,
    ) -> Result<(), ClientError> {
        let mut occi = OcciHeaders::new();
        occi.push_category(&action.wire_category());
        if let Some(param) = action.param() {
            occi.push_attribute(param);
        }
        self.execute(session, Method::POST, &handle.action_path(action.name()), &occi)
            .await?;
        Ok(())
    }

    /// Create a link in the link collection `collection`.
    pub async fn attach_link(
        &self,
        session: &Session,
        collection: &str,
        link: &Link,
    ) -> Result<ResourceHandle, ClientError> {
        let occi = OcciHeaders::resource(std::slice::from_ref(link.category()), &link.wire_attributes());
        let decoded = self.execute(session, Method::POST, collection, &occi).await?;
        handle_from_location(session, &decoded)
    }

    /// The query interface listing.
    pub async fn discover(&self, session: &Session) -> Result<DecodedHeaders, ClientError> {
        self.execute(
            session,
            Method::GET,
            collections::QUERY_INTERFACE,
            &OcciHeaders::new(),
        )
        .await
    }

    /// Register a user mixin, such as a security group, with the query
    /// interface. `mixin` should carry a `rel` and a `location`.
    pub async fn define_mixin(&self, session: &Session, mixin: &Category) -> Result<(), ClientError> {
        let mut occi = OcciHeaders::new();
        occi.push_category(mixin);
        self.execute(session, Method::POST, collections::QUERY_INTERFACE, &occi)
            .await?;
        Ok(())
    }
}

fn handle_from_location(session: &Session, decoded: &DecodedHeaders) -> Result<ResourceHandle, ClientError> {
    let location = decoded.location().ok_or(ClientError::MissingHeader("location"))?;
    Ok(ResourceHandle::from_path(session.service().strip_origin(location)))
}

/// The reason phrase as sent, falling back to the canonical one.
fn reason_phrase<B>(response: &http::Response<B>) -> String {
    if let Some(reason) = response.extensions().get::<hyper::ext::ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }
    response
        .status()
        .canonical_reason()
        .unwrap_or("")
        .to_string()
}
