//! `provisor-broker` — blocking HTTP client for v2 service brokers.
//!
//! Brokers are independently-operated services that actually provision and
//! deprovision resources. This crate speaks their `/v2/service_instances`
//! routes and normalizes every answer into a [`BrokerResponse`] so the rest
//! of the workspace never looks at raw status codes.
//!
//! ```text
//! BrokerEndpoint + ServiceRoute + BrokerVerb
//!     │
//!     ▼
//! BrokerClient::invoke   ← one bounded HTTP round trip, basic auth
//!     │
//!     ▼
//! BrokerResponse         ← Success | Gone | Retryable | Rejected
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{BrokerClient, DEFAULT_TIMEOUT};
pub use error::BrokerClientError;
pub use types::{BrokerEndpoint, BrokerResponse, BrokerVerb, ServiceRoute};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, BrokerClientError>;
