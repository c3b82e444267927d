//! HTTP transport layer for the OCCI client.
//!
//! This module provides the [`HyperTransport`] type, which handles HTTP
//! communication using hyper_util's legacy client over plain HTTP/1.1.
//!
//! Connections are never pooled: every request opens a fresh connection and
//! closes it once the response body has been read.
//!
//! # Example
//!
//! ```ignore
//! use occi_harness_client::transport::HyperTransport;
//! use std::time::Duration;
//!
//! let transport = HyperTransport::builder()
//!     .request_timeout(Duration::from_secs(30))
//!     .build()?;
//! ```

mod hyper;

pub use hyper::{HyperTransport, HyperTransportBuilder, TransportBody};
