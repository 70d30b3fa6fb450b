//! Node context — identity, registry, settings and observer for one node.
//!
//! Built once before any task starts and shared as `Arc<NodeContext>` by the
//! acceptor, its handlers, and the dialer. Several contexts can live in one
//! process.

use std::sync::Arc;

use rollcall_core::{HandshakeMessage, NetworkConfig};

use crate::error::IdentityError;
use crate::observer::{HandshakeObserver, TracingObserver};
use crate::peer::PeerRegistry;

/// This node's own `(node_id, addr)`. Fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    node_id: String,
    addr: String,
}

impl NodeIdentity {
    pub fn new(node_id: impl Into<String>, addr: impl Into<String>) -> Result<Self, IdentityError> {
        let (node_id, addr) = (node_id.into(), addr.into());
        if node_id.is_empty() {
            return Err(IdentityError::EmptyNodeId);
        }
        if addr.is_empty() {
            return Err(IdentityError::EmptyAddr);
        }
        Ok(Self { node_id, addr })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The announcement this node sends to its peers.
    pub fn hello(&self) -> HandshakeMessage {
        HandshakeMessage::hello(&self.node_id, &self.addr)
    }
}

pub struct NodeContext {
    identity: NodeIdentity,
    registry: PeerRegistry,
    settings: NetworkConfig,
    observer: Arc<dyn HandshakeObserver>,
}

impl NodeContext {
    /// New context with an empty registry, logging through [`TracingObserver`].
    pub fn new(identity: NodeIdentity, settings: NetworkConfig) -> Self {
        Self {
            identity,
            registry: PeerRegistry::new(),
            settings,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn HandshakeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &NetworkConfig {
        &self.settings
    }

    pub fn observer(&self) -> &dyn HandshakeObserver {
        self.observer.as_ref()
    }
}
