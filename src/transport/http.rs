//! Blocking HTTP transport.

use std::{
    fmt,
    io::{self, Read},
};

use log::debug;
use ureq::{Agent, Response};

use crate::{
    auth::{SENTRY_AUTH_HEADER, USER_AGENT, auth_header},
    error::{ConfigError, SendError},
    event::Event,
    outcome::{FailedAttempt, SendOutcome, SuppressReason, classify_failure},
    sampler::EventSampler,
    serializer::{EventSerializer, JsonSerializer, serialize_to_vec},
};

use super::{
    Transport,
    config::{ProxyConfig, TransportConfig},
    connection::build_agent,
};

/// Header carrying the collector's error detail.
pub const SENTRY_ERROR_HEADER: &str = "X-Sentry-Error";
/// Upper bound on error-body bytes read for the failure message.
const MAX_ERROR_BODY: u64 = 1024;

/// Delivers one event per HTTP POST and classifies the collector's answer.
///
/// Safe to share between threads: configuration is immutable once built and
/// each send opens its own connection.
pub struct HttpTransport {
    config: TransportConfig,
    agent: Agent,
    serializer: Box<dyn EventSerializer>,
    sampler: Option<Box<dyn EventSampler>>,
    proxy_authorization: Option<String>,
}

impl HttpTransport {
    /// Construct the transport from a validated configuration.
    pub fn with_config(config: TransportConfig) -> Result<Self, ConfigError> {
        let agent = build_agent(&config)?;
        // Plain-HTTP requests reach the proxy in absolute-URI form without a
        // CONNECT, so the credentials travel as a request header.
        let proxy_authorization = if config.endpoint.is_secure() {
            None
        } else {
            config.proxy.as_ref().and_then(ProxyConfig::basic_authorization)
        };
        Ok(Self {
            config,
            agent,
            serializer: Box::new(JsonSerializer),
            sampler: None,
            proxy_authorization,
        })
    }

    pub(crate) fn set_sampler(&mut self, sampler: Option<Box<dyn EventSampler>>) {
        self.sampler = sampler;
    }

    /// Replace the serializer. Takes `&mut self`, so it cannot race a send.
    pub fn set_serializer(&mut self, serializer: Box<dyn EventSerializer>) {
        self.serializer = serializer;
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn prepare_request(&self) -> ureq::Request {
        let endpoint = &self.config.endpoint;
        let mut request = self
            .agent
            .request_url("POST", endpoint.url())
            .set("User-Agent", USER_AGENT)
            .set(SENTRY_AUTH_HEADER, &auth_header(endpoint));
        if let Some(content_type) = self.serializer.content_type() {
            request = request.set("Content-Type", content_type);
        }
        if let Some(encoding) = self.serializer.content_encoding() {
            request = request.set("Content-Encoding", encoding);
        }
        if let Some(authorization) = &self.proxy_authorization {
            request = request.set("Proxy-Authorization", authorization);
        }
        request
    }

    fn deliver(&self, event: &Event) -> SendOutcome {
        let body = match serialize_to_vec(self.serializer.as_ref(), event) {
            Ok(body) => body,
            Err(err) => {
                return classify_failure(FailedAttempt::without_response(SendError::Serialize(
                    err,
                )));
            }
        };

        match self.prepare_request().send_bytes(&body) {
            Ok(response) => consume_response(response),
            Err(ureq::Error::Status(code, response)) => {
                classify_failure(failed_response(code, response, SendError::Status(code)))
            }
            Err(ureq::Error::Transport(transport)) => {
                classify_failure(FailedAttempt::without_response(SendError::Transport(transport)))
            }
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, event: &Event) -> SendOutcome {
        if let Some(sampler) = &self.sampler
            && !sampler.should_send(event)
        {
            debug!("event {} rejected by sampler", event.id());
            return SendOutcome::Suppressed {
                reason: SuppressReason::Sampled,
            };
        }
        let outcome = self.deliver(event);
        debug!("event {} delivery outcome: {outcome:?}", event.id());
        outcome
    }
}

/// Drain a response that did not raise an error.
///
/// ureq only errors for statuses of 400 and above, so anything outside 2xx
/// that still lands here (3xx with redirects disabled) is classified too.
fn consume_response(response: Response) -> SendOutcome {
    let status = response.status();
    if !(200..300).contains(&status) {
        return classify_failure(failed_response(status, response, SendError::Status(status)));
    }
    let retry_after = response.header("Retry-After").map(str::to_owned);
    match io::copy(&mut response.into_reader(), &mut io::sink()) {
        Ok(_) => SendOutcome::Sent,
        Err(err) => classify_failure(FailedAttempt {
            status_code: Some(status),
            retry_after,
            detail: None,
            cause: SendError::ReadResponse(err),
        }),
    }
}

fn failed_response(status: u16, response: Response, cause: SendError) -> FailedAttempt {
    let retry_after = response.header("Retry-After").map(str::to_owned);
    let header_detail = response
        .header(SENTRY_ERROR_HEADER)
        .map(str::to_owned)
        .filter(|d| !d.trim().is_empty());
    let detail = header_detail.or_else(|| read_error_body(response));
    FailedAttempt {
        status_code: Some(status),
        retry_after,
        detail,
        cause,
    }
}

// Failing to read the body only loses the detail; classification carries on.
fn read_error_body(response: Response) -> Option<String> {
    let mut raw = Vec::new();
    if let Err(err) = response
        .into_reader()
        .take(MAX_ERROR_BODY)
        .read_to_end(&mut raw)
    {
        debug!("could not read collector error body: {err}");
        return None;
    }
    String::from_utf8_lossy(&raw)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.config.endpoint.url().as_str())
            .field("proxy", &self.config.proxy)
            .field("connect_timeout", &self.config.connect_timeout)
            .field("read_timeout", &self.config.read_timeout)
            .field("sampled", &self.sampler.is_some())
            .finish()
    }
}
