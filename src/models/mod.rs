//! Request and Response models for the cache node API
//!
//! This module defines the DTOs (Data Transfer Objects) and header names used on the client
//! and peer HTTP surfaces.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{PeerGetRequest, SetPeersRequest};
pub use responses::{ErrorResponse, HealthResponse, PeersResponse, StatsResponse, TierStats};

/// Response header carrying the provenance of a client lookup
pub const SOURCE_HEADER: &str = "x-ringcache-source";

/// Response header telling a peer whether the value came from the serving node's memory tiers
pub const CACHE_HIT_HEADER: &str = "x-ringcache-cache-hit";
