//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::{env, str::FromStr, time::Duration};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address other nodes use to reach this one; must match how it appears in `PEERS`
    pub node_addr: String,
    /// HTTP server port
    pub server_port: u16,
    /// Byte budget of the hot tier
    pub hot_cache_bytes: usize,
    /// Byte budget of the local tier
    pub local_cache_bytes: usize,
    /// Static membership, this node included
    pub peers: Vec<String>,
    /// Base URL of the origin the cache reads through to
    pub origin_url: String,
    /// Timeout for a single peer request
    pub peer_timeout: Duration,
    /// Timeout for a client lookup, including any peer or origin calls
    pub request_timeout: Duration,
    /// `host:port` resolved periodically for membership; `None` keeps `peers` fixed
    pub discovery_dns: Option<String>,
    /// Seconds between discovery polls
    pub discovery_interval: u64,
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NODE_ADDR` - This node's address (default: 127.0.0.1:3000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `HOT_CACHE_BYTES` - Hot tier budget (default: 8 MiB)
    /// - `LOCAL_CACHE_BYTES` - Local tier budget (default: 64 MiB)
    /// - `PEERS` - Comma-separated node addresses (default: empty)
    /// - `ORIGIN_URL` - Origin base URL (default: http://127.0.0.1:8080)
    /// - `PEER_TIMEOUT_MS` - Peer request timeout (default: 2000)
    /// - `REQUEST_TIMEOUT_MS` - Client lookup timeout (default: 5000)
    /// - `DISCOVERY_DNS` - Optional `host:port` to resolve for membership
    /// - `DISCOVERY_INTERVAL` - Discovery frequency in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            node_addr: env::var("NODE_ADDR").unwrap_or(defaults.node_addr),
            server_port: var_or("SERVER_PORT", defaults.server_port),
            hot_cache_bytes: var_or("HOT_CACHE_BYTES", defaults.hot_cache_bytes),
            local_cache_bytes: var_or("LOCAL_CACHE_BYTES", defaults.local_cache_bytes),
            peers: env::var("PEERS")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.peers),
            origin_url: env::var("ORIGIN_URL").unwrap_or(defaults.origin_url),
            peer_timeout: Duration::from_millis(var_or("PEER_TIMEOUT_MS", 2000)),
            request_timeout: Duration::from_millis(var_or("REQUEST_TIMEOUT_MS", 5000)),
            discovery_dns: env::var("DISCOVERY_DNS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            discovery_interval: var_or("DISCOVERY_INTERVAL", defaults.discovery_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_addr: "127.0.0.1:3000".to_string(),
            server_port: 3000,
            hot_cache_bytes: 8 << 20,
            local_cache_bytes: 64 << 20,
            peers: Vec::new(),
            origin_url: "http://127.0.0.1:8080".to_string(),
            peer_timeout: Duration::from_millis(2000),
            request_timeout: Duration::from_millis(5000),
            discovery_dns: None,
            discovery_interval: 10,
        }
    }
}
