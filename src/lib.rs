//! Blocking delivery of error events to a Sentry-compatible collector.
//!
//! [`HttpTransport`] posts one authenticated event per call and classifies
//! the collector's answer into a [`SendOutcome`]. [`Client`] sits on top,
//! stamping process context onto events and logging outcomes. DSN parsing and
//! `sentry.properties` loading feed both.

pub mod auth;
pub mod client;
pub mod dsn;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod outcome;
pub mod properties;
pub mod rate_limited_warner;
pub mod sampler;
pub mod serializer;
pub mod transport;

pub use client::{Client, ClientContext};
pub use dsn::Dsn;
pub use endpoint::Endpoint;
pub use error::{ConfigError, SendError};
pub use event::{Event, EventId, Level};
pub use outcome::{SendOutcome, SuppressReason};
pub use properties::ClientProperties;
pub use sampler::{EventSampler, RandomEventSampler};
pub use serializer::{EventSerializer, JsonSerializer, MessagePackSerializer};
pub use transport::{
    HttpTransport, HttpTransportBuilder, ProxyConfig, ProxyCredentials, Transport,
};
