//! Cell abstractions for the balancer.
//!
//! A cell is any backend that can receive routed keys. The engine only needs
//! a stable unique key to derive the cell's permutation, plus a total order
//! so every instance sorts the same cell set the same way.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A backend eligible to receive routed keys.
///
/// The key must be unique within a balancer and must never change while the
/// cell is registered: it seeds the cell's slot permutation.
pub trait Cell: Send + Sync + 'static {
    /// Stable unique key for this cell.
    fn unique_key(&self) -> &str;
}

impl Cell for String {
    fn unique_key(&self) -> &str {
        self
    }
}

impl Cell for &'static str {
    fn unique_key(&self) -> &str {
        self
    }
}

/// A `host:port` backend.
///
/// Ordered by host, then port. The unique key is the `host:port` string,
/// computed once on construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
    key: String,
}

impl Endpoint {
    /// Construct a new endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let key = format!("{}:{}", host, port);
        Self { host, port, key }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Cell for Endpoint {
    fn unique_key(&self) -> &str {
        &self.key
    }
}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.host
            .cmp(&other.host)
            .then_with(|| self.port.cmp(&other.port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::invalid(format!("expected host:port, got {:?}", s)))?;
        if host.is_empty() {
            return Err(Error::invalid(format!("missing host in {:?}", s)));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::invalid(format!("bad port in {:?}: {}", s, e)))?;
        Ok(Self::new(host, port))
    }
}
