//! Observability hook for the handshake path.
//!
//! The core never prints. Every registration and every silently absorbed
//! failure is reported to the node's observer instead.

use std::net::SocketAddr;

use rollcall_core::{HandshakeMessage, MessageKind};

use crate::error::{DialError, HandshakeError};
use crate::peer::PeerRegistry;

/// Receives handshake events. All methods default to doing nothing.
///
/// Called from handler and dialer tasks, so implementations must not block.
pub trait HandshakeObserver: Send + Sync {
    /// A HELLO was recorded. `registry` already contains it.
    fn peer_registered(&self, remote: SocketAddr, hello: &HandshakeMessage, registry: &PeerRegistry) {
        let _ = (remote, hello, registry);
    }

    /// A well-formed record of a kind other than HELLO was dropped.
    fn message_ignored(&self, remote: SocketAddr, kind: &MessageKind) {
        let _ = (remote, kind);
    }

    /// An inbound connection was abandoned.
    fn handshake_failed(&self, remote: SocketAddr, error: &HandshakeError) {
        let _ = (remote, error);
    }

    /// Announcing to a configured peer failed. It is not retried.
    fn announce_failed(&self, peer_addr: &str, error: &DialError) {
        let _ = (peer_addr, error);
    }
}

/// Structured log lines via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HandshakeObserver for TracingObserver {
    fn peer_registered(&self, remote: SocketAddr, hello: &HandshakeMessage, registry: &PeerRegistry) {
        tracing::info!(
            node_id = hello.node_id(),
            addr = hello.addr(),
            %remote,
            peers = registry.len(),
            "peer registered"
        );
    }

    fn message_ignored(&self, remote: SocketAddr, kind: &MessageKind) {
        tracing::debug!(%remote, %kind, "ignoring non-announcement record");
    }

    fn handshake_failed(&self, remote: SocketAddr, error: &HandshakeError) {
        tracing::debug!(%remote, error = %error, "handshake abandoned");
    }

    fn announce_failed(&self, peer_addr: &str, error: &DialError) {
        tracing::warn!(peer = peer_addr, error = %error, "announce failed");
    }
}
