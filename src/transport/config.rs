//! Configuration structures consumed by the HTTP transport.
//!
//! [`HttpTransportBuilder`](super::HttpTransportBuilder) fills and validates
//! these values before [`HttpTransport`](super::HttpTransport) turns them into
//! an agent.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};

use crate::endpoint::Endpoint;

/// Default timeout for establishing the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);
/// Default timeout for each read from (and write to) the connection.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default port used when a proxy host is given without one.
pub const DEFAULT_PROXY_PORT: u16 = 80;

/// Username and password presented to an HTTP proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP proxy routing for one transport.
///
/// Credentials stay scoped to the transport they are configured on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<ProxyCredentials>,
}

impl ProxyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(ProxyCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// `Proxy-Authorization` value for requests forwarded in absolute-URI
    /// form. ureq only authenticates the CONNECT preamble of HTTPS tunnels.
    pub(crate) fn basic_authorization(&self) -> Option<String> {
        self.credentials.as_ref().map(|c| {
            let credentials = format!("{}:{}", c.username, c.password);
            format!("Basic {}", BASE64_STANDARD.encode(credentials.as_bytes()))
        })
    }

    /// Render the proxy as the `http://[user:pass@]host:port` form ureq parses.
    pub(crate) fn to_proxy_url(&self) -> String {
        match &self.credentials {
            Some(c) => format!(
                "http://{}:{}@{}:{}",
                c.username, c.password, self.host, self.port
            ),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// TLS verification policy.
#[derive(Clone, Debug, Default)]
pub struct TlsPolicy {
    /// Accept certificates whose names do not match the collector's host.
    ///
    /// Hostname verification is disabled entirely; chain validation still
    /// applies. Meant for wildcard or internally issued certificates.
    pub accept_invalid_hostnames: bool,
    /// Extra PEM-encoded root certificates to trust.
    pub root_certificates: Vec<Vec<u8>>,
}

/// Immutable configuration of an [`HttpTransport`](super::HttpTransport).
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Collector endpoint and key pair.
    pub endpoint: Endpoint,
    /// Optional HTTP proxy.
    pub proxy: Option<ProxyConfig>,
    /// TLS verification policy.
    pub tls: TlsPolicy,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for reads and writes on an established connection.
    pub read_timeout: Duration,
}

impl TransportConfig {
    /// Configuration with default timeouts and no proxy.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            proxy: None,
            tls: TlsPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_authorization_encodes_credentials() {
        let proxy = ProxyConfig::new("proxy.local", 3128).with_credentials("user", "pass");
        assert_eq!(
            proxy.basic_authorization().as_deref(),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[test]
    fn no_authorization_without_credentials() {
        assert_eq!(ProxyConfig::new("proxy.local", 3128).basic_authorization(), None);
    }
}
