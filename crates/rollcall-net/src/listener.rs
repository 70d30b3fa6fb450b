//! Connection acceptor.
//!
//! Binds the node's TCP listener and spawns one handler task per inbound
//! connection. Accept errors are logged and skipped; the loop only ends
//! with the process.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::addr::listen_target;
use crate::handler::serve_connection;
use crate::node::NodeContext;

/// First pause after a failed accept; doubles per consecutive failure.
const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(5);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

pub struct Acceptor {
    listener: TcpListener,
    node: Arc<NodeContext>,
    /// Caps concurrently running handlers. None = unbounded.
    permits: Option<Arc<Semaphore>>,
}

impl Acceptor {
    /// Bind `listen_addr`. Failure here is fatal for the node.
    pub async fn bind(listen_addr: &str, node: Arc<NodeContext>) -> Result<Self> {
        let listener = TcpListener::bind(listen_target(listen_addr).as_ref())
            .await
            .with_context(|| format!("failed to bind {listen_addr}"))?;

        let permits = node
            .settings()
            .handshake_limit()
            .map(|n| Arc::new(Semaphore::new(n)));

        tracing::info!(
            addr = %listener.local_addr().context("listener has no local address")?,
            node_id = node.identity().node_id(),
            "listening"
        );

        Ok(Self {
            listener,
            node,
            permits,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, one spawned handler each.
    pub async fn run(self) {
        let mut failures = 0u32;
        loop {
            // Wait for a free handler slot before taking the next connection.
            let permit = match &self.permits {
                Some(permits) => permits.clone().acquire_owned().await.ok(),
                None => None,
            };

            let (stream, remote) = match self.listener.accept().await {
                Ok(conn) => {
                    failures = 0;
                    conn
                }
                Err(e) => {
                    // EMFILE and friends persist until a handler exits.
                    let pause = accept_backoff(failures);
                    failures = failures.saturating_add(1);
                    tracing::debug!(error = %e, ?pause, "accept failed");
                    drop(permit);
                    tokio::time::sleep(pause).await;
                    continue;
                }
            };
            tracing::trace!(%remote, "connection accepted");

            let node = self.node.clone();
            tokio::spawn(async move {
                serve_connection(stream, remote, &node).await;
                drop(permit);
            });
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

fn accept_backoff(failures: u32) -> Duration {
    ACCEPT_BACKOFF_MIN
        .saturating_mul(1u32 << failures.min(16))
        .min(ACCEPT_BACKOFF_MAX)
}
