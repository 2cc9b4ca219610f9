//! Collector endpoint descriptor.

use url::Url;

use crate::error::ConfigError;

/// Resolved store URL plus the key pair used to sign requests.
///
/// Immutable once built; each transport owns exactly one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    public_key: String,
    secret_key: Option<String>,
}

impl Endpoint {
    /// Build an endpoint from a base URI and project id.
    ///
    /// The store URL is `{base_uri}api/{project_id}/store/`, concatenated
    /// verbatim, so `base_uri` is expected to end with `/`.
    pub fn new(
        base_uri: &str,
        project_id: &str,
        public_key: impl Into<String>,
        secret_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = store_url(base_uri, project_id)?;
        let public_key = public_key.into();
        if public_key.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "public key must not be empty".into(),
            ));
        }
        Ok(Self {
            url,
            public_key,
            secret_key: secret_key.filter(|s| !s.is_empty()),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref()
    }

    /// Whether requests to this endpoint go over TLS.
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Derive the store URL for a project.
pub fn store_url(base_uri: &str, project_id: &str) -> Result<Url, ConfigError> {
    let candidate = format!("{base_uri}api/{project_id}/store/");
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: candidate.clone(),
        reason,
    };
    if project_id.trim().is_empty() {
        return Err(invalid("project id must not be empty".into()));
    }
    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}
