//! rollcall integration test harness.
//!
//! Every test runs its nodes in-process, each with its own context and a
//! listener on 127.0.0.1:0, and talks to them over real loopback TCP.
//! Nodes report handshake events through a channel observer so tests wait
//! on events instead of sleeping.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use rollcall_core::{HandshakeMessage, MessageKind, NetworkConfig};
use rollcall_net::{
    Acceptor, DialError, HandshakeError, HandshakeObserver, NodeContext, NodeIdentity,
    PeerRegistry,
};

mod registration;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Upper bound on how long a test waits for any single event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Registered { node_id: String, addr: String },
    Ignored(String),
    Failed(Failure),
    AnnounceFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Io,
    Closed,
    TooLong,
    TimedOut,
    Malformed,
}

impl From<&HandshakeError> for Failure {
    fn from(e: &HandshakeError) -> Self {
        match e {
            HandshakeError::Io(_) => Self::Io,
            HandshakeError::Closed { .. } => Self::Closed,
            HandshakeError::TooLong { .. } => Self::TooLong,
            HandshakeError::TimedOut(_) => Self::TimedOut,
            HandshakeError::Malformed(_) => Self::Malformed,
        }
    }
}

struct ChannelObserver(mpsc::UnboundedSender<Event>);

impl HandshakeObserver for ChannelObserver {
    fn peer_registered(&self, _: SocketAddr, hello: &HandshakeMessage, _: &PeerRegistry) {
        let _ = self.0.send(Event::Registered {
            node_id: hello.node_id().to_string(),
            addr: hello.addr().to_string(),
        });
    }

    fn message_ignored(&self, _: SocketAddr, kind: &MessageKind) {
        let _ = self.0.send(Event::Ignored(kind.to_string()));
    }

    fn handshake_failed(&self, _: SocketAddr, error: &HandshakeError) {
        let _ = self.0.send(Event::Failed(error.into()));
    }

    fn announce_failed(&self, peer_addr: &str, _: &DialError) {
        let _ = self.0.send(Event::AnnounceFailed(peer_addr.to_string()));
    }
}

/// A running node: context, bound listener, and its event stream.
pub struct TestNode {
    pub node: Arc<NodeContext>,
    pub listen_addr: SocketAddr,
    events: mpsc::UnboundedReceiver<Event>,
    acceptor: JoinHandle<()>,
}

impl TestNode {
    /// Start a node that advertises `advertised` but listens on an
    /// OS-assigned loopback port.
    pub async fn start(id: &str, advertised: &str) -> Result<Self> {
        Self::start_with(id, advertised, NetworkConfig::default()).await
    }

    pub async fn start_with(id: &str, advertised: &str, settings: NetworkConfig) -> Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();
        let identity = NodeIdentity::new(id, advertised)?;
        let node = Arc::new(
            NodeContext::new(identity, settings).with_observer(Arc::new(ChannelObserver(tx))),
        );

        let acceptor = Acceptor::bind("127.0.0.1:0", node.clone()).await?;
        let listen_addr = acceptor.local_addr()?;
        let acceptor = acceptor.spawn();

        Ok(Self {
            node,
            listen_addr,
            events,
            acceptor,
        })
    }

    pub fn dial_addr(&self) -> String {
        self.listen_addr.to_string()
    }

    pub async fn next_event(&mut self) -> Result<Event> {
        tokio::time::timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .context("timed out waiting for a handshake event")?
            .context("event channel closed")
    }

    /// Assert nothing is reported within `window`.
    pub async fn expect_quiet(&mut self, window: Duration) {
        if let Ok(Some(event)) = tokio::time::timeout(window, self.events.recv()).await {
            panic!("unexpected event: {event:?}");
        }
    }

    pub fn acceptor_alive(&self) -> bool {
        !self.acceptor.is_finished()
    }

    /// Open a connection, write `bytes` verbatim, close.
    pub async fn send_raw(&self, bytes: &[u8]) -> Result<()> {
        let mut stream = TcpStream::connect(self.listen_addr).await?;
        stream.write_all(bytes).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        self.acceptor.abort();
    }
}

pub fn registered(node_id: &str, addr: &str) -> Event {
    Event::Registered {
        node_id: node_id.to_string(),
        addr: addr.to_string(),
    }
}
