//! Peer registry — tracks which nodes have announced themselves, and where.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Map from node_id to the last address that node announced.
///
/// Cloning shares the same map. One lock guards it, held only for a single
/// map operation and never across I/O. Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<Mutex<HashMap<String, String>>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the address for `node_id`. Last write wins.
    ///
    /// Returns the address this replaced, if any.
    pub fn upsert(&self, node_id: impl Into<String>, addr: impl Into<String>) -> Option<String> {
        let (node_id, addr) = (node_id.into(), addr.into());
        self.lock().insert(node_id, addr)
    }

    /// Point-in-time copy of every entry, ordered by node_id.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock()
            .iter()
            .map(|(id, addr)| (id.clone(), addr.clone()))
            .collect()
    }

    pub fn get(&self, node_id: &str) -> Option<String> {
        self.lock().get(node_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is one map call, so a panic elsewhere cannot
    // leave the map half-written. Keep serving through a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
