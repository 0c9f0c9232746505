//! Server configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! max_body_bytes = 65536
//! read_timeout_ms = 5000
//! ```
//!
//! Omitting `read_timeout_ms` or `request_timeout_ms` keeps the default.
//! There is no way to disable them from TOML; set the field to `None` in code.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

/// Runtime settings for a [`Server`](crate::Server).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interface to bind.
    pub host: IpAddr,

    /// TCP port. `0` lets the OS pick one.
    pub port: u16,

    /// Largest request body accepted for POST and PUT. Larger bodies get `413`.
    pub max_body_bytes: usize,

    /// Idle timeout between two body frames. `None` waits forever.
    pub read_timeout_ms: Option<u64>,

    /// Deadline for a whole request, body and handler included.
    pub request_timeout_ms: Option<u64>,

    /// How long [`Listening::shutdown`](crate::Listening::shutdown) waits for
    /// in-flight connections before aborting them.
    pub shutdown_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            max_body_bytes: 1024 * 1024,
            read_timeout_ms: Some(30_000),
            request_timeout_ms: Some(60_000),
            shutdown_grace_ms: 30_000,
        }
    }
}

impl Config {
    /// Parses a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub(crate) fn limits(&self) -> Limits {
        Limits { max_body_bytes: self.max_body_bytes, read_timeout: self.read_timeout() }
    }
}

/// The subset of [`Config`] the body accumulator needs, copied per server.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub(crate) max_body_bytes: usize,
    pub(crate) read_timeout: Option<Duration>,
}
