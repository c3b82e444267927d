//! OCCI protocol client.
//!
//! This crate drives a service speaking the `text/occi` rendering over plain
//! HTTP/1.1, built on the header codec in `occi-harness-core`.
//!
//! ## Features
//!
//! - One request per call, no connection pooling
//! - Session credential attached to every request as `X-Auth-Token`
//! - Create, list, retrieve, destroy, actions and links
//! - Query interface discovery and user mixins
//! - Keystone v2.0 credential acquisition
//! - Bounded polling with exponential backoff
//!
//! Any response status other than `200 OK` or `201 Created` is reported as
//! [`ClientError::UnexpectedStatus`].
//!
//! ## Example
//!
//! ```ignore
//! use occi_harness_client::{
//!     CredentialSource, KeystoneV2, OcciClient, ServiceEndpoint, Session, collections,
//! };
//! use occi_harness_core::{Category, schemes};
//!
//! let identity = KeystoneV2::new(ServiceEndpoint::parse("127.0.0.1:5000")?, "admin", "os4all");
//! let session = Session::new(
//!     identity.acquire().await?,
//!     ServiceEndpoint::parse("127.0.0.1:8787")?,
//! );
//!
//! let client = OcciClient::new()?;
//! let handle = client
//!     .create(
//!         &session,
//!         collections::COMPUTE,
//!         &[
//!             Category::new("m1.tiny", schemes::RESOURCE_TEMPLATE),
//!             Category::new("compute", schemes::INFRASTRUCTURE),
//!         ],
//!         &[],
//!     )
//!     .await?;
//!
//! let listed = client.list(&session, collections::COMPUTE).await?;
//! assert!(listed.contains(&session.absolute_url(&handle)));
//!
//! client.destroy(&session, handle).await?;
//! ```
//!
//! ## Waiting for state
//!
//! ```ignore
//! use occi_harness_client::{PollPolicy, poll_until};
//!
//! let polled = poll_until(
//!     &PollPolicy::new(),
//!     || client.retrieve(&session, &handle),
//!     |headers| headers.attribute_contains("occi.compute.state=\"active\""),
//! )
//! .await?;
//! ```

mod builder;
mod client;
pub mod config;
mod error;
mod identity;
mod session;
pub mod transport;

pub use builder::ClientBuilder;
pub use client::{OcciClient, collections, is_success};
pub use config::{ExponentialBackoff, PollError, PollPolicy, Polled, poll_until};
pub use error::ClientError;
pub use identity::{CredentialSource, KeystoneV2, StaticToken, TOKENS_PATH};
pub use session::{Credential, ResourceHandle, ServiceEndpoint, Session};
pub use transport::{HyperTransport, HyperTransportBuilder};

// Re-export the codec so callers need a single dependency.
pub use occi_harness_core as core;
