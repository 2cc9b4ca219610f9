//! Builder for [`HttpTransport`](super::HttpTransport).
//!
//! Exposes proxy routing, TLS policy, timeouts, sampler and serializer
//! choices. Every timeout is either supplied or defaulted here, so a built
//! transport can never send without bounds.

use std::time::Duration;

use crate::{
    dsn::Dsn,
    endpoint::Endpoint,
    error::ConfigError,
    sampler::{EventSampler, RandomEventSampler},
    serializer::EventSerializer,
};

use super::{
    HttpTransport,
    config::{DEFAULT_PROXY_PORT, ProxyConfig, TlsPolicy, TransportConfig},
};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`HttpTransport`] instances.
#[derive(Default)]
pub struct HttpTransportBuilder {
    endpoint: Option<Endpoint>,
    proxy: Option<ProxyConfig>,
    tls: TlsPolicy,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
    sampler: Option<Box<dyn EventSampler>>,
    serializer: Option<Box<dyn EventSerializer>>,
}

impl HttpTransportBuilder {
    /// Create a builder with no endpoint configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated from a DSN and its options.
    ///
    /// Reads `timeout`, `readtimeout`, the `http.proxy.*` family and
    /// `sample.rate`; the `naive` protocol setting disables hostname
    /// verification.
    pub fn from_dsn(dsn: &Dsn) -> Result<Self, ConfigError> {
        let mut builder = Self::new()
            .with_endpoint(dsn.endpoint()?)
            .with_accept_invalid_hostnames(dsn.has_protocol_setting("naive"));

        if let Some(ms) = dsn.option_parsed::<u64>("timeout")? {
            builder = builder.with_connect_timeout_ms(ms);
        }
        if let Some(ms) = dsn.option_parsed::<u64>("readtimeout")? {
            builder = builder.with_read_timeout_ms(ms);
        }
        if let Some(host) = dsn.option("http.proxy.host") {
            let port = dsn
                .option_parsed::<u16>("http.proxy.port")?
                .unwrap_or(DEFAULT_PROXY_PORT);
            let mut proxy = ProxyConfig::new(host, port);
            if let (Some(user), Some(pass)) =
                (dsn.option("http.proxy.user"), dsn.option("http.proxy.password"))
            {
                proxy = proxy.with_credentials(user, pass);
            }
            builder = builder.with_proxy(proxy);
        }
        if let Some(rate) = dsn.option_parsed::<f64>("sample.rate")? {
            builder = builder.with_sampler(RandomEventSampler::new(rate)?);
        }
        Ok(builder)
    }

    /// Set the collector endpoint (required).
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Route requests through an HTTP proxy.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Accept any certificate name for HTTPS collectors.
    ///
    /// This disables hostname verification entirely and must be an explicit
    /// opt-in.
    pub fn with_accept_invalid_hostnames(mut self, accept: bool) -> Self {
        self.tls.accept_invalid_hostnames = accept;
        self
    }

    /// Trust an additional PEM-encoded root certificate.
    pub fn with_root_certificate_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.tls.root_certificates.push(pem.into());
        self
    }

    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the read/write timeout in milliseconds."]
        with_read_timeout_ms,
        read_timeout_ms,
        u64
    );

    /// Gate every send behind `sampler`.
    pub fn with_sampler(mut self, sampler: impl EventSampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Replace the default JSON serializer.
    pub fn with_serializer(mut self, serializer: impl EventSerializer + 'static) -> Self {
        self.serializer = Some(Box::new(serializer));
        self
    }

    fn validate_timeouts(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.read_timeout_ms {
            ensure_positive!(timeout, "read_timeout_ms")?;
        }
        Ok(())
    }

    fn build_config(&self) -> Result<TransportConfig, ConfigError> {
        self.validate_timeouts()?;
        let Some(endpoint) = self.endpoint.clone() else {
            return Err(ConfigError::InvalidConfig(
                "HTTP transport requires an endpoint".into(),
            ));
        };
        let defaults = TransportConfig::new(endpoint);
        Ok(TransportConfig {
            proxy: self.proxy.clone(),
            tls: self.tls.clone(),
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            read_timeout: self
                .read_timeout_ms
                .map_or(defaults.read_timeout, Duration::from_millis),
            ..defaults
        })
    }

    /// Validate the configuration and build the transport.
    pub fn build(self) -> Result<HttpTransport, ConfigError> {
        let config = self.build_config()?;
        let mut transport = HttpTransport::with_config(config)?;
        transport.set_sampler(self.sampler);
        if let Some(serializer) = self.serializer {
            transport.set_serializer(serializer);
        }
        Ok(transport)
    }
}

impl std::fmt::Debug for HttpTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportBuilder")
            .field("endpoint", &self.endpoint)
            .field("proxy", &self.proxy)
            .field("tls", &self.tls)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("sampler", &self.sampler.is_some())
            .finish()
    }
}
