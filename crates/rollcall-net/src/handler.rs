//! Inbound connection handler.
//!
//! One exchange per connection, no reply:
//!   read one delimited record → decode → HELLO? upsert : drop → close.
//! Every failure abandons the connection and leaves the registry untouched.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use rollcall_core::{HandshakeMessage, MessageKind, DELIMITER};

use crate::error::HandshakeError;
use crate::node::NodeContext;

/// What a completed handshake did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The HELLO was written to the registry.
    Registered(HandshakeMessage),
    /// A record of another kind was dropped.
    Ignored(MessageKind),
}

/// Run the handshake on one accepted connection and report the result to
/// the node's observer. The stream is closed when this returns.
pub async fn serve_connection<S>(stream: S, remote: SocketAddr, node: &NodeContext)
where
    S: AsyncRead + Unpin,
{
    let observer = node.observer();
    match handle_connection(stream, node).await {
        Ok(HandshakeOutcome::Registered(hello)) => {
            observer.peer_registered(remote, &hello, node.registry())
        }
        Ok(HandshakeOutcome::Ignored(kind)) => observer.message_ignored(remote, &kind),
        Err(e) => observer.handshake_failed(remote, &e),
    }
}

/// Read and apply exactly one handshake record from `stream`.
pub async fn handle_connection<S>(
    stream: S,
    node: &NodeContext,
) -> Result<HandshakeOutcome, HandshakeError>
where
    S: AsyncRead + Unpin,
{
    let limit = node.settings().message_limit();
    let record = match node.settings().handshake_timeout() {
        Some(deadline) => tokio::time::timeout(deadline, read_record(stream, limit))
            .await
            .map_err(|_| HandshakeError::TimedOut(deadline))??,
        None => read_record(stream, limit).await?,
    };

    let message = HandshakeMessage::decode(&record)?;
    if !message.kind().is_announcement() {
        return Ok(HandshakeOutcome::Ignored(message.kind().clone()));
    }

    node.registry().upsert(message.node_id(), message.addr());
    Ok(HandshakeOutcome::Registered(message))
}

/// Read up to and including the first delimiter, at most `limit` bytes.
async fn read_record<S>(stream: S, limit: Option<usize>) -> Result<Vec<u8>, HandshakeError>
where
    S: AsyncRead + Unpin,
{
    let mut record = Vec::new();
    match limit {
        Some(limit) => {
            let mut reader = BufReader::new(stream.take(limit as u64));
            reader.read_until(DELIMITER, &mut record).await?;
        }
        None => {
            BufReader::new(stream).read_until(DELIMITER, &mut record).await?;
        }
    }

    if record.last() == Some(&DELIMITER) {
        return Ok(record);
    }
    match limit {
        Some(limit) if record.len() >= limit => Err(HandshakeError::TooLong { limit }),
        _ => Err(HandshakeError::Closed {
            received: record.len(),
        }),
    }
}
