//! rollcall-core — handshake wire format and node configuration.
//! The networking and daemon crates depend on this one.

pub mod config;
pub mod wire;

pub use config::{ConfigError, NetworkConfig, NodeConfig};
pub use wire::{HandshakeMessage, MalformedMessage, MessageKind, DELIMITER, HELLO};
