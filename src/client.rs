//! Thin client that stamps context onto events and hands them to a transport.
//!
//! The client owns no delivery policy of its own: it never retries and never
//! queues. It decides how loudly each outcome is logged. Rate limiting is
//! reported through a throttled `warn!` and never as an error.

use std::{collections::BTreeMap, error::Error};

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::{
    dsn::Dsn,
    error::ConfigError,
    event::{Event, EventId, Level},
    outcome::SendOutcome,
    rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner},
    transport::{HttpTransport, HttpTransportBuilder, Transport},
};

/// Process metadata stamped onto every event that lacks it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub release: Option<String>,
    pub dist: Option<String>,
    pub environment: Option<String>,
    pub server_name: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl ClientContext {
    /// Context read from the DSN options `release`, `dist`, `environment`,
    /// `servername` and `tags`.
    pub fn from_dsn(dsn: &Dsn) -> Result<Self, ConfigError> {
        Ok(Self {
            release: dsn.option("release").map(str::to_owned),
            dist: dsn.option("dist").map(str::to_owned),
            environment: dsn.option("environment").map(str::to_owned),
            server_name: dsn.option("servername").map(str::to_owned),
            tags: dsn.tags()?,
        })
    }

    fn apply(&self, event: &mut Event) {
        fill(&mut event.release, &self.release);
        fill(&mut event.dist, &self.dist);
        fill(&mut event.environment, &self.environment);
        fill(&mut event.server_name, &self.server_name);
        for (key, value) in &self.tags {
            event
                .tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    if slot.is_none() {
        slot.clone_from(value);
    }
}

/// Stores the event id when dropped, so unwinding out of a send still
/// records it.
struct RecordLastEventId<'a> {
    slot: &'a Mutex<Option<EventId>>,
    id: &'a EventId,
}

impl Drop for RecordLastEventId<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = Some(self.id.clone());
    }
}

/// Sends events through a [`Transport`] and remembers the last event id.
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    context: ClientContext,
    last_event_id: Mutex<Option<EventId>>,
    throttled: RateLimitedWarner,
}

impl Client<HttpTransport> {
    /// Build a client and its HTTP transport from a DSN.
    pub fn from_dsn(dsn: &Dsn) -> Result<Self, ConfigError> {
        let transport = HttpTransportBuilder::from_dsn(dsn)?.build()?;
        Ok(Self::new(transport, ClientContext::from_dsn(dsn)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, context: ClientContext) -> Self {
        Self {
            transport,
            context,
            last_event_id: Mutex::new(None),
            throttled: RateLimitedWarner::new(DEFAULT_WARN_INTERVAL),
        }
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Identifier of the most recent event handed to the transport.
    pub fn last_event_id(&self) -> Option<EventId> {
        self.last_event_id.lock().clone()
    }

    /// Stamp context onto `event`, deliver it and log the outcome.
    ///
    /// The event id is recorded as the last event id whatever the outcome,
    /// including a panicking transport.
    pub fn send_event(&self, mut event: Event) -> SendOutcome {
        self.context.apply(&mut event);
        let record = RecordLastEventId {
            slot: &self.last_event_id,
            id: event.id(),
        };
        let outcome = self.transport.send(&event);
        drop(record);
        self.log_outcome(&event, &outcome);
        outcome
    }

    /// Send a plain message at `level`.
    pub fn capture_message(&self, message: impl Into<String>, level: Level) -> SendOutcome {
        self.send_event(Event::new(level).with_message(message))
    }

    /// Send an event describing `err` and its source chain.
    pub fn capture_error(&self, err: &(dyn Error + 'static)) -> SendOutcome {
        self.send_event(Event::from_error(err))
    }

    /// Emit any throttled rate-limit warning immediately.
    pub fn flush_warnings(&self) {
        self.throttled.flush(|count| {
            warn!("{count} events were rate limited by the collector");
        });
    }

    fn log_outcome(&self, event: &Event, outcome: &SendOutcome) {
        match outcome {
            SendOutcome::Sent => debug!("event {} sent", event.id()),
            SendOutcome::Suppressed { reason } => {
                debug!("event {} suppressed ({reason:?})", event.id());
            }
            SendOutcome::RateLimited { retry_after_ms, .. } => {
                self.throttled.record();
                self.throttled.warn_if_due(|count| match retry_after_ms {
                    Some(ms) => warn!(
                        "{count} events were rate limited by the collector; retry after {ms} ms"
                    ),
                    None => warn!("{count} events were rate limited by the collector"),
                });
            }
            SendOutcome::Failed {
                message,
                status_code,
                cause,
                ..
            } => match status_code {
                Some(code) => error!(
                    "failed to send event {} (HTTP {code}): {message}: {cause}",
                    event.id()
                ),
                None => error!("failed to send event {}: {message}: {cause}", event.id()),
            },
        }
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("context", &self.context)
            .field("last_event_id", &self.last_event_id())
            .finish()
    }
}
