//! Operator console — line commands on stdin, read-only view of the node.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use rollcall_core::{HandshakeMessage, MessageKind};
use rollcall_net::{
    DialError, HandshakeError, HandshakeObserver, NodeContext, PeerRegistry, TracingObserver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Peers,
    Id,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "peers" => Self::Peers,
            "id" => Self::Id,
            "help" => Self::Help,
            "exit" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub struct Console {
    node: Arc<NodeContext>,
}

impl Console {
    pub fn new(node: Arc<NodeContext>) -> Self {
        Self { node }
    }

    /// Run one command. `Break` means the operator asked to exit.
    pub fn execute(&self, command: &Command, out: &mut impl Write) -> io::Result<ControlFlow<()>> {
        match command {
            Command::Peers => print_peers(self.node.registry(), out)?,
            Command::Id => writeln!(out, "{}", self.node.identity().node_id())?,
            Command::Help => print_help(out)?,
            Command::Exit => return Ok(ControlFlow::Break(())),
            Command::Empty => {}
            Command::Unknown(input) => {
                writeln!(out, "Unknown command: {input}")?;
                writeln!(out, "Type 'help' for the command list.")?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Read commands from stdin until `exit` or end of input.
    ///
    /// Returns true if the operator asked to exit.
    pub async fn run(self) -> io::Result<bool> {
        self.serve(BufReader::new(tokio::io::stdin()), &mut io::stdout())
            .await
    }

    /// Command loop over any line source. Bytes that are not UTF-8 are
    /// replaced, so they surface as an unknown command.
    pub async fn serve<R, W>(&self, mut input: R, out: &mut W) -> io::Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            let flow = self.execute(&Command::parse(&String::from_utf8_lossy(&line)), out)?;
            out.flush()?;
            if flow.is_break() {
                return Ok(true);
            }
        }
        tracing::debug!("console input closed");
        Ok(false)
    }
}

fn print_peers(registry: &PeerRegistry, out: &mut impl Write) -> io::Result<()> {
    let peers = registry.snapshot();
    if peers.is_empty() {
        return writeln!(out, "No peers connected.");
    }
    writeln!(out, "Current peers ({}):", peers.len())?;
    for (node_id, addr) in &peers {
        writeln!(out, "- {node_id} @ {addr}")?;
    }
    writeln!(out, "----")
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  peers   List registered peers")?;
    writeln!(out, "  id      Show this node's id")?;
    writeln!(out, "  help    Show this list")?;
    writeln!(out, "  exit    Stop the node")
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Prints each registration and the updated peer list for the operator.
/// Failures go to the log only.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    log: TracingObserver,
}

impl HandshakeObserver for ConsoleObserver {
    fn peer_registered(&self, remote: SocketAddr, hello: &HandshakeMessage, registry: &PeerRegistry) {
        self.log.peer_registered(remote, hello, registry);

        let mut stdout = io::stdout().lock();
        let printed = writeln!(stdout, "Connected peer: {} ({})", hello.node_id(), hello.addr())
            .and_then(|()| print_peers(registry, &mut stdout))
            .and_then(|()| stdout.flush());
        if let Err(e) = printed {
            tracing::debug!(error = %e, "failed to print peer list");
        }
    }

    fn message_ignored(&self, remote: SocketAddr, kind: &MessageKind) {
        self.log.message_ignored(remote, kind);
    }

    fn handshake_failed(&self, remote: SocketAddr, error: &HandshakeError) {
        self.log.handshake_failed(remote, error);
    }

    fn announce_failed(&self, peer_addr: &str, error: &DialError) {
        self.log.announce_failed(peer_addr, error);
    }
}
