//! Agent construction: timeouts, proxy routing and TLS policy.

use std::sync::Arc;

use log::warn;
use native_tls::{Certificate, TlsConnector};
use ureq::{Agent, AgentBuilder, Proxy};

use crate::error::ConfigError;

use super::config::{ProxyConfig, TlsPolicy, TransportConfig};

/// Build the agent used for every send of one transport.
///
/// Idle connections are never kept, so each send opens a fresh connection
/// and closes it once the response has been dropped. Redirects are not
/// followed; a 3xx is classified like any other non-success status.
pub(crate) fn build_agent(config: &TransportConfig) -> Result<Agent, ConfigError> {
    let mut builder = AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout_read(config.read_timeout)
        .timeout_write(config.read_timeout)
        .max_idle_connections(0)
        .max_idle_connections_per_host(0)
        .redirects(0)
        .tls_connector(Arc::new(tls_connector(&config.tls)?));

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(ureq_proxy(proxy)?);
    }
    if config.tls.accept_invalid_hostnames && config.endpoint.is_secure() {
        warn!(
            "hostname verification is disabled for {}; any certificate name will be accepted",
            config.endpoint.url()
        );
    }
    Ok(builder.build())
}

pub(crate) fn tls_connector(policy: &TlsPolicy) -> Result<TlsConnector, ConfigError> {
    let mut builder = TlsConnector::builder();
    for pem in &policy.root_certificates {
        builder.add_root_certificate(Certificate::from_pem(pem)?);
    }
    if policy.accept_invalid_hostnames {
        builder.danger_accept_invalid_hostnames(true);
    }
    Ok(builder.build()?)
}

pub(crate) fn ureq_proxy(proxy: &ProxyConfig) -> Result<Proxy, ConfigError> {
    if proxy.host.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "proxy host must not be empty".into(),
        ));
    }
    // ureq splits `host:port` on the first colon and cannot take brackets.
    if proxy.host.contains(':') {
        return Err(ConfigError::InvalidConfig(format!(
            "IPv6 proxy address {:?} is not supported",
            proxy.host
        )));
    }
    // The password may hold ':'; everything up to the first one is the user.
    if let Some(creds) = &proxy.credentials
        && creds.username.contains(':')
    {
        return Err(ConfigError::InvalidConfig(
            "proxy username must not contain ':'".into(),
        ));
    }
    Proxy::new(proxy.to_proxy_url())
        .map_err(|e| ConfigError::InvalidConfig(format!("invalid proxy: {e}")))
}
