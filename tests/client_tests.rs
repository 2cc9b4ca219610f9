//! Client behaviour over a scripted transport.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use logtest::Logger;
use parking_lot::Mutex;
use rstest::{fixture, rstest};
use serial_test::serial;

use sentry_courier::{
    Client, ClientContext, Event, Level, SendError, SendOutcome, SuppressReason, Transport,
};

/// Replays canned outcomes and keeps every event it was handed.
#[derive(Default)]
struct ScriptedTransport {
    outcomes: Mutex<VecDeque<SendOutcome>>,
    seen: Mutex<Vec<Event>>,
}

impl ScriptedTransport {
    fn replying(outcomes: impl IntoIterator<Item = SendOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            seen: Mutex::default(),
        }
    }

    fn seen(&self) -> Vec<Event> {
        self.seen.lock().clone()
    }
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport").finish_non_exhaustive()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, event: &Event) -> SendOutcome {
        self.seen.lock().push(event.clone());
        self.outcomes.lock().pop_front().unwrap_or(SendOutcome::Sent)
    }
}

fn rate_limited() -> SendOutcome {
    SendOutcome::RateLimited {
        retry_after_ms: Some(2_000),
        status_code: 429,
    }
}

fn failed() -> SendOutcome {
    SendOutcome::Failed {
        message: "Project is disabled".into(),
        retry_after_ms: None,
        status_code: Some(500),
        cause: SendError::Status(500),
    }
}

#[fixture]
fn context() -> ClientContext {
    ClientContext {
        release: Some("1.4.0".into()),
        environment: Some("staging".into()),
        server_name: Some("web-1".into()),
        tags: [("region".to_owned(), "eu".to_owned())].into(),
        ..Default::default()
    }
}

#[rstest]
#[serial(client_log)]
fn context_fills_only_missing_fields(context: ClientContext) {
    let client = Client::new(ScriptedTransport::default(), context);
    let mut event = Event::new(Level::Warning).with_tag("region", "us");
    event.release = Some("explicit".into());

    client.send_event(event);

    let seen = client.transport().seen();
    assert_eq!(seen.len(), 1);
    let sent = &seen[0];
    assert_eq!(sent.release.as_deref(), Some("explicit"));
    assert_eq!(sent.environment.as_deref(), Some("staging"));
    assert_eq!(sent.server_name.as_deref(), Some("web-1"));
    assert_eq!(sent.tags.get("region").map(String::as_str), Some("us"));
}

#[rstest]
#[case::sent(SendOutcome::Sent)]
#[case::suppressed(SendOutcome::Suppressed { reason: SuppressReason::Sampled })]
#[case::rate_limited(rate_limited())]
#[case::failed(failed())]
#[serial(client_log)]
fn last_event_id_tracks_every_outcome(#[case] outcome: SendOutcome) {
    let client = Client::new(ScriptedTransport::replying([outcome]), ClientContext::default());
    assert!(client.last_event_id().is_none());

    let event = Event::new(Level::Error).with_message("boom");
    let id = event.id().clone();
    client.send_event(event);

    assert_eq!(client.last_event_id(), Some(id));
}

#[derive(Debug)]
struct PanickingTransport;

impl Transport for PanickingTransport {
    fn send(&self, _event: &Event) -> SendOutcome {
        panic!("transport blew up");
    }
}

#[rstest]
#[serial(client_log)]
fn last_event_id_survives_transport_panic() {
    let client = Client::new(PanickingTransport, ClientContext::default());
    let event = Event::new(Level::Fatal);
    let id = event.id().clone();

    let result = panic::catch_unwind(AssertUnwindSafe(|| client.send_event(event)));

    assert!(result.is_err());
    assert_eq!(client.last_event_id(), Some(id));
}

#[rstest]
#[serial(client_log)]
fn capture_helpers_build_events() {
    let client = Client::new(ScriptedTransport::default(), ClientContext::default());
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");

    client.capture_message("hello", Level::Info);
    client.capture_error(&err);

    let seen = client.transport().seen();
    assert_eq!(seen[0].message.as_deref(), Some("hello"));
    assert_eq!(seen[0].level(), Level::Info);
    assert_eq!(seen[1].exception.len(), 1);
    assert_eq!(seen[1].exception[0].value, "config missing");
}

#[rstest]
#[serial(client_log)]
fn rate_limiting_warns_and_failure_errors() {
    let mut logger = Logger::start();
    let client = Client::new(
        ScriptedTransport::replying([rate_limited(), rate_limited(), failed()]),
        ClientContext::default(),
    );

    client.capture_message("first", Level::Error);
    client.capture_message("second", Level::Error);
    client.capture_message("third", Level::Error);
    client.flush_warnings();

    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    while let Some(record) = logger.pop() {
        match record.level() {
            log::Level::Warn => warnings.push(record.args().to_owned()),
            log::Level::Error => errors.push(record.args().to_owned()),
            _ => {}
        }
    }

    // The second rate-limited send is folded into the flushed warning.
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    assert!(warnings[0].contains("1 events were rate limited"));
    assert!(warnings[0].contains("retry after 2000 ms"));
    assert!(warnings[1].contains("1 events were rate limited"));
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("HTTP 500"));
    assert!(errors[0].contains("Project is disabled"));
}
