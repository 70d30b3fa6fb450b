//! Connection-local failures. None of these stop the node.

use std::io;
use std::time::Duration;

use rollcall_core::MalformedMessage;

/// Why an inbound connection was abandoned without a registry update.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed after {received} bytes without a delimiter")]
    Closed { received: usize },
    #[error("record exceeds {limit} bytes")]
    TooLong { limit: usize },
    #[error("no complete record within {0:?}")]
    TimedOut(Duration),
    #[error("malformed handshake: {0}")]
    Malformed(#[from] MalformedMessage),
}

/// Why an outbound announcement was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("connect to {addr} failed: {source}")]
    Connect { addr: String, source: io::Error },
    #[error("connect to {addr} timed out after {timeout:?}")]
    ConnectTimedOut { addr: String, timeout: Duration },
    #[error("write to {addr} failed: {source}")]
    Write { addr: String, source: io::Error },
}

/// Startup identity is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("node id must not be empty")]
    EmptyNodeId,
    #[error("listening address must not be empty")]
    EmptyAddr,
}
