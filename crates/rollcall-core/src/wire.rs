//! Rollcall wire format — the single handshake record.
//!
//! A connection carries exactly one record: a JSON object whose values are
//! strings, terminated by one line feed. The receiver reads up to and
//! including the line feed before parsing anything.
//!
//! ```text
//! {"addr":"127.0.0.1:9001","node_id":"node-A","type":"HELLO"}\n
//! ```
//!
//! Unknown extra fields are tolerated. `type`, `node_id` and `addr` must be
//! present and string-typed when `type` is `HELLO`; records of any other type
//! only need a string `type` and are dropped by the receiver.

use std::fmt;

use serde_json::{Map, Value};

/// The announcement literal — the only message kind the protocol acts on.
pub const HELLO: &str = "HELLO";

/// Record terminator on the stream.
pub const DELIMITER: u8 = b'\n';

// ── Message kind ──────────────────────────────────────────────────────────────

/// Value of the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `"HELLO"` — sender identity and address.
    Hello,
    /// Any other type string. Receivers drop these.
    Other(String),
}

impl MessageKind {
    pub fn from_wire(value: &str) -> Self {
        if value == HELLO {
            Self::Hello
        } else {
            Self::Other(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Hello => HELLO,
            Self::Other(kind) => kind,
        }
    }

    pub fn is_announcement(&self) -> bool {
        matches!(self, Self::Hello)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Handshake message ─────────────────────────────────────────────────────────

/// One handshake record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    kind: MessageKind,
    node_id: String,
    addr: String,
}

impl HandshakeMessage {
    /// Build an announcement for a node reachable at `addr`.
    pub fn hello(node_id: impl Into<String>, addr: impl Into<String>) -> Self {
        Self::new(MessageKind::Hello, node_id, addr)
    }

    pub fn new(kind: MessageKind, node_id: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            kind,
            node_id: node_id.into(),
            addr: addr.into(),
        }
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Serialize to a single delimited record, ready to write to the stream.
    ///
    /// JSON escaping guarantees the delimiter only appears as the final byte.
    pub fn encode(&self) -> Vec<u8> {
        let mut fields = Map::new();
        fields.insert("type".into(), Value::String(self.kind.as_str().to_string()));
        fields.insert("node_id".into(), Value::String(self.node_id.clone()));
        fields.insert("addr".into(), Value::String(self.addr.clone()));

        let mut record = Value::Object(fields).to_string().into_bytes();
        record.push(DELIMITER);
        record
    }

    /// Parse one record. A trailing `\n` (or `\r\n`) is accepted and ignored.
    pub fn decode(record: &[u8]) -> Result<Self, MalformedMessage> {
        let body = strip_delimiter(record);

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| MalformedMessage::Syntax(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(MalformedMessage::NotAnObject);
        };

        let kind = MessageKind::from_wire(required_str(&fields, "type")?);

        if !kind.is_announcement() {
            return Ok(Self {
                kind,
                node_id: optional_str(&fields, "node_id"),
                addr: optional_str(&fields, "addr"),
            });
        }

        let node_id = required_str(&fields, "node_id")?;
        if node_id.is_empty() {
            return Err(MalformedMessage::EmptyNodeId);
        }
        let addr = required_str(&fields, "addr")?;

        Ok(Self::hello(node_id, addr))
    }
}

fn strip_delimiter(record: &[u8]) -> &[u8] {
    let record = record.strip_suffix(&[DELIMITER]).unwrap_or(record);
    record.strip_suffix(b"\r").unwrap_or(record)
}

fn required_str<'a>(
    fields: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, MalformedMessage> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(MalformedMessage::NotAString(name)),
        None => Err(MalformedMessage::MissingField(name)),
    }
}

fn optional_str(fields: &Map<String, Value>, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// The record is not a well-formed handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedMessage {
    #[error("record is not valid JSON: {0}")]
    Syntax(String),
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is not a string")]
    NotAString(&'static str),
    #[error("announcement has an empty node_id")]
    EmptyNodeId,
}
