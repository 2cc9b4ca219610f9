//! Error types shared by the transport, DSN and properties layers.
//!
//! [`ConfigError`] covers everything that can go wrong while assembling a
//! transport or client; it is fatal and never retried. [`SendError`] is the
//! underlying cause carried by a failed
//! [`SendOutcome`](crate::outcome::SendOutcome).

use std::io;

use thiserror::Error;

/// Errors raised while constructing a transport, client or endpoint.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The collector URL could not be derived or is not usable over HTTP(S).
    #[error("couldn't build a valid collector URL from {url:?}: {reason}")]
    InvalidUrl {
        /// The candidate URL that was rejected.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },
    /// The DSN string is malformed.
    #[error("invalid DSN: {0}")]
    InvalidDsn(String),
    /// Invalid user supplied configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
    /// The TLS connector could not be created.
    #[error("failed to set up TLS: {0}")]
    Tls(#[from] native_tls::Error),
    /// Underlying I/O error whilst reading configuration.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The properties file could not be parsed.
    #[error("failed to read properties: {0}")]
    Properties(#[from] ini::Error),
}

/// Root cause of a failed delivery attempt.
#[derive(Debug, Error)]
pub enum SendError {
    /// The serializer failed before any bytes reached the network.
    #[error("failed to serialize event: {0}")]
    Serialize(#[source] io::Error),
    /// Connecting, writing or waiting for the response failed.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Transport),
    /// The collector answered with a non-success status.
    #[error("collector responded with HTTP {0}")]
    Status(u16),
    /// The response arrived but its body could not be read.
    #[error("failed to read collector response: {0}")]
    ReadResponse(#[source] io::Error),
}

impl SendError {
    /// Returns the HTTP status attached to this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}
