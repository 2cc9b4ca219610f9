//! Event serializers.
//!
//! A serializer decides the request body and, optionally, the
//! `Content-Type` / `Content-Encoding` headers announced with it.

use std::io::{self, Write};

use rmp_serde::Serializer as MsgPackWriter;
use serde::Serialize;

use crate::event::Event;

/// Turns an [`Event`] into request-body bytes.
pub trait EventSerializer: Send + Sync {
    /// Value of the `Content-Type` header, if any.
    fn content_type(&self) -> Option<&str>;

    /// Value of the `Content-Encoding` header, if any.
    fn content_encoding(&self) -> Option<&str> {
        None
    }

    /// Write the serialized event into `sink`.
    fn serialize(&self, event: &Event, sink: &mut dyn Write) -> io::Result<()>;
}

/// JSON body, `application/json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl EventSerializer for JsonSerializer {
    fn content_type(&self) -> Option<&str> {
        Some("application/json")
    }

    fn serialize(&self, event: &Event, sink: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(sink, event).map_err(io::Error::other)
    }
}

/// MessagePack body with named fields, `application/msgpack`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessagePackSerializer;

impl EventSerializer for MessagePackSerializer {
    fn content_type(&self) -> Option<&str> {
        Some("application/msgpack")
    }

    fn serialize(&self, event: &Event, sink: &mut dyn Write) -> io::Result<()> {
        event
            .serialize(&mut MsgPackWriter::new(sink).with_struct_map())
            .map_err(io::Error::other)
    }
}

/// Serialize `event` into an owned buffer.
pub fn serialize_to_vec(serializer: &dyn EventSerializer, event: &Event) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(512);
    serializer.serialize(event, &mut buf)?;
    Ok(buf)
}
