//! Diagnostic event delivered by the transport.
//!
//! The transport treats events as opaque: it only needs to serialize them and
//! read back [`Event::id`] for correlation. The fields here are the minimum a
//! collector needs to display an error report.

use std::{collections::BTreeMap, error::Error, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Unique identifier of an event: 32 lowercase hexadecimal characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity attached to an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Fatal,
}

/// One entry of an exception chain, outermost first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExceptionValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// A structured error report.
#[derive(Clone, Debug, Serialize)]
pub struct Event {
    event_id: EventId,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Utc>,
    level: Level,
    platform: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exception: Vec<ExceptionValue>,
}

impl Event {
    /// Create an empty event at the given level, stamped with the current time.
    pub fn new(level: Level) -> Self {
        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
            level,
            platform: "other",
            message: None,
            logger: None,
            release: None,
            dist: None,
            environment: None,
            server_name: None,
            tags: BTreeMap::new(),
            extra: BTreeMap::new(),
            exception: Vec::new(),
        }
    }

    /// Create an event describing `err` and every error in its `source()` chain.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut event = Self::new(Level::Error);
        event.message = Some(err.to_string());
        let mut current = Some(err);
        while let Some(e) = current {
            event.exception.push(ExceptionValue {
                kind: error_kind(e),
                value: e.to_string(),
            });
            current = e.source();
        }
        event
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Identifier used to correlate this event with the collector.
    pub fn id(&self) -> &EventId {
        &self.event_id
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// `dyn Error` carries no type name, so the Debug output's leading identifier
// stands in for it (`Custom { .. }` -> `Custom`, `ParseIntError(..)` -> `ParseIntError`).
fn error_kind(err: &dyn Error) -> String {
    let debug = format!("{err:?}");
    let kind: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if kind.is_empty() { "Error".to_owned() } else { kind }
}
