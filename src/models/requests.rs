//! Request DTOs for the cache node API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Serialize};

/// Request body for a peer lookup (POST /peer/get)
///
/// # Fields
/// - `key`: The key to look up
/// - `hops`: How many times this lookup has already been relayed between peers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerGetRequest {
    pub key: String,
    #[serde(default)]
    pub hops: u32,
}

impl PeerGetRequest {
    pub fn new(key: impl Into<String>, hops: u32) -> Self {
        Self {
            key: key.into(),
            hops,
        }
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Request body for a membership update (PUT /peers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPeersRequest {
    /// Full list of live node addresses, this node included
    pub peers: Vec<String>,
}

impl SetPeersRequest {
    pub fn validate(&self) -> Option<String> {
        if self.peers.iter().any(|p| p.trim().is_empty()) {
            return Some("Peer addresses cannot be empty".to_string());
        }
        None
    }
}
