//! `X-Sentry-Auth` header construction.

use chrono::Utc;

use crate::endpoint::Endpoint;

/// Name of the authentication header.
pub const SENTRY_AUTH_HEADER: &str = "X-Sentry-Auth";
/// Protocol version announced to the collector.
pub const SENTRY_PROTOCOL_VERSION: u8 = 6;
/// Client identifier sent as `User-Agent` and `sentry_client`.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Compute the header value for a request made at `timestamp` (unix seconds).
pub fn auth_header_at(endpoint: &Endpoint, timestamp: i64) -> String {
    let mut header = format!(
        "Sentry sentry_version={SENTRY_PROTOCOL_VERSION},sentry_client={USER_AGENT},\
         sentry_timestamp={timestamp},sentry_key={}",
        endpoint.public_key()
    );
    if let Some(secret) = endpoint.secret_key() {
        header.push_str(",sentry_secret=");
        header.push_str(secret);
    }
    header
}

/// Compute the header value for a request made now.
pub fn auth_header(endpoint: &Endpoint) -> String {
    auth_header_at(endpoint, Utc::now().timestamp())
}
