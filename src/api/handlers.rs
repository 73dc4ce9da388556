//! API Handlers
//!
//! HTTP request handlers for the client and peer endpoints.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::models::{
    HealthResponse, PeerGetRequest, PeersResponse, SetPeersRequest, StatsResponse,
    CACHE_HIT_HEADER, SOURCE_HEADER,
};
use crate::node::Cache;
use crate::peer::check_hops;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The node this server fronts
    pub cache: Cache,
    /// Upper bound on a single lookup, peer and origin calls included
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState around the given node.
    pub fn new(cache: Cache, request_timeout: Duration) -> Self {
        Self {
            cache,
            request_timeout,
        }
    }
}

fn peers_response(cache: &Cache) -> PeersResponse {
    let membership = cache.membership();
    PeersResponse {
        me: cache.me().to_string(),
        members: membership.members().to_vec(),
        peers: membership.peer_addresses(),
    }
}

/// Handler for GET /get/:key
///
/// Runs a full lookup and returns the raw value, with its provenance in the
/// `x-ringcache-source` header.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let lookup = state.cache.get_timeout(&key, state.request_timeout).await?;

    Ok(([(SOURCE_HEADER, lookup.source.as_str())], lookup.value).into_response())
}

/// Handler for POST /peer/get
///
/// Serves a lookup relayed by another node. Requests that have already been relayed too many
/// times are refused before the cache is consulted.
pub async fn peer_get_handler(
    State(state): State<AppState>,
    Json(req): Json<PeerGetRequest>,
) -> Result<Response> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    check_hops(req.hops)?;

    let lookup = state
        .cache
        .get_relayed_timeout(&req.key, req.hops, state.request_timeout)
        .await?;
    let cache_hit = if lookup.source.is_cache_hit() {
        "true"
    } else {
        "false"
    };

    Ok(([(CACHE_HIT_HEADER, cache_hit)], lookup.value).into_response())
}

/// Handler for PUT /peers
///
/// Replaces the node's membership with the given address list.
pub async fn set_peers_handler(
    State(state): State<AppState>,
    Json(req): Json<SetPeersRequest>,
) -> Result<Json<PeersResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set_peers(req.peers).await;

    Ok(Json(peers_response(&state.cache)))
}

/// Handler for GET /peers
pub async fn peers_handler(State(state): State<AppState>) -> Json<PeersResponse> {
    Json(peers_response(&state.cache))
}

/// Handler for GET /stats
///
/// Returns tier statistics and lookup counters by provenance.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = &state.cache;

    Json(StatsResponse {
        hot: cache.hot_stats().into(),
        local: cache.local_stats().into(),
        lookups: cache.lookup_stats(),
        peers: cache.membership().peer_addresses().len(),
        in_flight: cache.in_flight(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
