//! Hyper-based HTTP transport.
//!
//! This module provides [`HyperTransport`], the HTTP transport implementation
//! using hyper_util's legacy client with pooling disabled.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;

use crate::ClientError;

/// Request body type sent by the transport.
pub type TransportBody = Full<Bytes>;

/// Type alias for the hyper client with a plain HTTP connector.
type HyperClient = Client<HttpConnector, TransportBody>;

/// HTTP transport using hyper_util's legacy client.
///
/// Each call is exactly one round trip on its own connection: the pool keeps
/// no idle connections, so the socket is closed once the response is read.
///
/// # Example
///
/// ```ignore
/// use occi_harness_client::transport::HyperTransport;
///
/// let transport = HyperTransport::new()?;
/// let response = transport.request(request).await?;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    /// Upper bound on one full round trip, body included.
    request_timeout: Option<Duration>,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a new transport with default settings.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    /// Send a request and read the whole response body.
    pub async fn request(
        &self,
        request: http::Request<TransportBody>,
    ) -> Result<http::Response<Bytes>, ClientError> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.round_trip(request))
                .await
                .map_err(|_| {
                    ClientError::Transport(format!("request timed out after {:?}", limit))
                })?,
            None => self.round_trip(request).await,
        }
    }

    async fn round_trip(
        &self,
        request: http::Request<TransportBody>,
    ) -> Result<http::Response<Bytes>, ClientError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ClientError::Transport(format!("request failed: {}", e)))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read body: {}", e)))?
            .to_bytes();

        Ok(http::Response::from_parts(parts, body))
    }

    /// Get the configured request timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```ignore
/// use occi_harness_client::transport::HyperTransportBuilder;
/// use std::time::Duration;
///
/// let transport = HyperTransportBuilder::new()
///     .connect_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(60))
///     .build()?;
/// ```
#[derive(Debug)]
pub struct HyperTransportBuilder {
    /// Timeout for establishing the TCP connection.
    connect_timeout: Option<Duration>,
    /// Timeout for one full round trip.
    request_timeout: Option<Duration>,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Create a new transport builder with default settings.
    pub fn new() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            request_timeout: None,
        }
    }

    /// Set the TCP connect timeout.
    ///
    /// Default: 10 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the timeout for one full round trip, body included.
    ///
    /// Default: none.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HyperTransport, ClientError> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(self.connect_timeout);
        connector.set_nodelay(true);

        // No idle connections are kept: one connection per request.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Ok(HyperTransport {
            client,
            request_timeout: self.request_timeout,
        })
    }
}
