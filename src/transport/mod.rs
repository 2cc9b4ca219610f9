//! Event delivery over HTTP(S).
//!
//! [`HttpTransport`] performs one authenticated POST per event to the
//! collector's store endpoint and maps the result onto a
//! [`SendOutcome`](crate::outcome::SendOutcome).
//!
//! # Delivery semantics
//!
//! - **Sampler rejects**: `Suppressed`, no network I/O.
//! - **2xx**: `Sent` once the response body has been drained.
//! - **403**: `Suppressed` (collector-side disable, not an error).
//! - **429**: `RateLimited`, with the `Retry-After` hint when parseable.
//! - **Anything else** (other statuses, timeouts, refused connections,
//!   serializer failures): `Failed`.
//!
//! Sends are blocking and never retried here; retry hints are returned to the
//! caller.

mod builder;
mod config;
mod connection;
mod http;


pub use builder::HttpTransportBuilder;
pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PROXY_PORT, DEFAULT_READ_TIMEOUT, ProxyConfig,
    ProxyCredentials, TlsPolicy, TransportConfig,
};
pub use http::{HttpTransport, SENTRY_ERROR_HEADER};

use crate::{event::Event, outcome::SendOutcome};

/// Delivers events and reports what happened to each.
pub trait Transport: Send + Sync {
    /// Attempt delivery of `event`, blocking until the outcome is known.
    fn send(&self, event: &Event) -> SendOutcome;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, event: &Event) -> SendOutcome {
        (**self).send(event)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, event: &Event) -> SendOutcome {
        (**self).send(event)
    }
}
