//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies. Lookup responses carry raw value
//! bytes and use headers instead of a JSON body.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, LookupStats};

/// Response body for the membership endpoints (GET/PUT /peers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeersResponse {
    /// This node's own address
    pub me: String,
    /// Every address in the current ring, sorted
    pub members: Vec<String>,
    /// Addresses this node holds a peer handle for (members minus self)
    pub peers: Vec<String>,
}

/// Per-tier statistics with derived hit rate
#[derive(Debug, Clone, Serialize)]
pub struct TierStats {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for TierStats {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hot: TierStats,
    pub local: TierStats,
    pub lookups: LookupStats,
    /// Number of peers with a live handle
    pub peers: usize,
    /// Number of keys with a fetch in flight
    pub in_flight: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
