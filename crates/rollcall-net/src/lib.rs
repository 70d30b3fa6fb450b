//! rollcall-net — peer registration over TCP.
//!
//! A node accepts one handshake record per inbound connection and records
//! the sender in its [`PeerRegistry`]. It announces itself to configured
//! peers once at startup. Nothing is acknowledged, retried, or expired.

pub mod addr;
pub mod dialer;
pub mod error;
pub mod handler;
pub mod listener;
pub mod node;
pub mod observer;
pub mod peer;

pub use dialer::{announce, announce_all, parse_peer_list};
pub use error::{DialError, HandshakeError, IdentityError};
pub use handler::{handle_connection, serve_connection, HandshakeOutcome};
pub use listener::Acceptor;
pub use node::{NodeContext, NodeIdentity};
pub use observer::{HandshakeObserver, TracingObserver};
pub use peer::PeerRegistry;
