//! Client builder for the OCCI client.
//!
//! Provides a fluent API for configuring and building an [`OcciClient`].

use std::time::Duration;

use crate::ClientError;
use crate::client::OcciClient;
use crate::transport::{HyperTransport, HyperTransportBuilder};

/// Builder for creating an [`OcciClient`].
///
/// # Example
///
/// ```ignore
/// use occi_harness_client::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .connect_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(60))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    /// Optional pre-configured transport.
    transport: Option<HyperTransport>,
    /// Timeout for establishing a connection.
    connect_timeout: Option<Duration>,
    /// Timeout for one full round trip.
    request_timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-configured transport.
    ///
    /// Timeouts set on this builder are ignored when a transport is given.
    pub fn transport(mut self, transport: HyperTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-request timeout. Unset means no limit.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the [`OcciClient`].
    pub fn build(self) -> Result<OcciClient, ClientError> {
        if let Some(transport) = self.transport {
            return Ok(OcciClient::from_transport(transport));
        }

        let mut builder = HyperTransportBuilder::new();
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.request_timeout {
            builder = builder.request_timeout(timeout);
        }
        Ok(OcciClient::from_transport(builder.build()?))
    }
}
