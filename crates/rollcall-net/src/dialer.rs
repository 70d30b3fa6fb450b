//! Peer dialer — announce this node to configured peers, once, at startup.
//!
//! Connect, write our HELLO record, close. Unreachable peers are reported to
//! the observer and skipped; nothing is retried.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::addr::dial_target;
use crate::error::DialError;
use crate::node::NodeContext;

/// Send this node's HELLO to `peer_addr`.
pub async fn announce(node: &NodeContext, peer_addr: &str) -> Result<(), DialError> {
    let target = dial_target(peer_addr);
    let connect = TcpStream::connect(target.as_ref());

    let connected = match node.settings().dial_timeout() {
        Some(timeout) => tokio::time::timeout(timeout, connect).await.map_err(|_| {
            DialError::ConnectTimedOut {
                addr: peer_addr.to_string(),
                timeout,
            }
        })?,
        None => connect.await,
    };
    let mut stream = connected.map_err(|source| DialError::Connect {
        addr: peer_addr.to_string(),
        source,
    })?;

    let record = node.identity().hello().encode();
    let write_err = |source| DialError::Write {
        addr: peer_addr.to_string(),
        source,
    };
    stream.write_all(&record).await.map_err(write_err)?;
    stream.shutdown().await.map_err(write_err)?;

    tracing::debug!(peer = peer_addr, "announced");
    Ok(())
}

/// Announce to each peer in order. Returns how many announcements went out.
pub async fn announce_all<I, S>(node: &NodeContext, peers: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut delivered = 0;
    for peer in peers {
        let peer = peer.as_ref();
        match announce(node, peer).await {
            Ok(()) => delivered += 1,
            Err(e) => node.observer().announce_failed(peer, &e),
        }
    }
    delivered
}

/// Split a comma-separated `--peers` value. Blank items are dropped.
pub fn parse_peer_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
