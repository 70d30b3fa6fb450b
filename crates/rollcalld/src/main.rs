//! rollcalld — peer registration node.
//!
//! Listens for one-shot HELLO handshakes, announces itself to `--peers`
//! once at startup, and serves an operator console on stdin.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use rollcall_core::NodeConfig;
use rollcall_net::{announce_all, parse_peer_list, Acceptor, NodeContext, NodeIdentity};

mod console;

use console::{Console, ConsoleObserver};

#[derive(Parser, Debug)]
#[command(name = "rollcalld", version, about = "Peer registration node")]
struct Args {
    /// This node's identifier
    #[arg(long)]
    id: String,

    /// Listening address, host:port (":port" listens on all interfaces)
    #[arg(long)]
    addr: String,

    /// Comma-separated peer addresses to announce to at startup
    #[arg(long, default_value = "")]
    peers: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let identity = NodeIdentity::new(args.id, args.addr).context("invalid node identity")?;
    let config = NodeConfig::load().context("failed to load config")?;
    tracing::info!(
        node_id = identity.node_id(),
        addr = identity.addr(),
        config = %NodeConfig::file_path().display(),
        "rollcalld starting"
    );

    let listen_addr = identity.addr().to_string();
    let node = Arc::new(
        NodeContext::new(identity, config.network)
            .with_observer(Arc::new(ConsoleObserver::default())),
    );

    let acceptor = Acceptor::bind(&listen_addr, node.clone()).await?;
    println!("Listening on {listen_addr}");
    let acceptor_task = acceptor.spawn();

    let peers = parse_peer_list(&args.peers);
    if !peers.is_empty() {
        let delivered = announce_all(&node, &peers).await;
        tracing::info!(delivered, configured = peers.len(), "startup announcements sent");
    }

    let console = Console::new(node.clone());
    let exit_requested = tokio::select! {
        r = console.run() => match r {
            Ok(exit) => exit,
            Err(e) => {
                tracing::error!(error = %e, "console failed");
                false
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            true
        }
    };

    if exit_requested {
        tracing::info!("shutting down");
    } else {
        // No usable operator input; keep serving until interrupted.
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("shutdown signal received"),
            r = acceptor_task => tracing::error!("acceptor exited: {:?}", r),
        }
    }

    // A pending stdin read would hold up runtime shutdown. Handlers are not drained.
    std::process::exit(0)
}
