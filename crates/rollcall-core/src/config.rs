//! Configuration for a rollcall node.
//!
//! Identity (`--id`, `--addr`, `--peers`) comes from the command line. This
//! file covers the tuning knobs, resolved as: environment → config file →
//! defaults.
//!
//! Config file location:
//!   1. $ROLLCALL_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/rollcall/config.toml
//!   3. ~/.config/rollcall/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Read deadline for the inbound handshake record. 0 = wait forever.
    pub handshake_timeout_secs: u64,
    /// Longest accepted record, delimiter included. 0 = unbounded.
    pub max_message_bytes: usize,
    /// Cap on concurrently running connection handlers. 0 = unbounded.
    pub max_concurrent_handshakes: usize,
    /// Outbound connect deadline for announcements. 0 = OS default.
    pub dial_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: 10,
            max_message_bytes: 4096,
            max_concurrent_handshakes: 1024,
            dial_timeout_secs: 5,
        }
    }
}

impl NetworkConfig {
    pub fn handshake_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.handshake_timeout_secs)
    }

    pub fn dial_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.dial_timeout_secs)
    }

    pub fn handshake_limit(&self) -> Option<usize> {
        (self.max_concurrent_handshakes > 0).then_some(self.max_concurrent_handshakes)
    }

    pub fn message_limit(&self) -> Option<usize> {
        (self.max_message_bytes > 0).then_some(self.max_message_bytes)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("rollcall")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("ROLLCALL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Apply ROLLCALL_NETWORK__* overrides. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let net = &mut self.network;
        if let Some(v) = parsed(&lookup, "ROLLCALL_NETWORK__HANDSHAKE_TIMEOUT_SECS") {
            net.handshake_timeout_secs = v;
        }
        if let Some(v) = parsed(&lookup, "ROLLCALL_NETWORK__MAX_MESSAGE_BYTES") {
            net.max_message_bytes = v;
        }
        if let Some(v) = parsed(&lookup, "ROLLCALL_NETWORK__MAX_CONCURRENT_HANDSHAKES") {
            net.max_concurrent_handshakes = v;
        }
        if let Some(v) = parsed(&lookup, "ROLLCALL_NETWORK__DIAL_TIMEOUT_SECS") {
            net.dial_timeout_secs = v;
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.parse().ok())
}
