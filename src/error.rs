//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache node.
///
/// Errors are `Clone` because a single coalesced fetch hands the same outcome to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The origin data source failed
    #[error("Origin error: {0}")]
    Origin(String),

    /// A peer could not answer (transport failure or remote error)
    #[error("Peer {addr} failed: {message}")]
    Peer { addr: String, message: String },

    /// A peer request was relayed too many times
    #[error("max peer request count exceeded: {0}")]
    HopLimitExceeded(u32),

    /// A peer handle was used after it was closed
    #[error("Peer handle closed: {0}")]
    PeerClosed(String),

    /// The caller stopped waiting for the result
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Builds a [`CacheError::Peer`] from any displayable failure.
    pub fn peer(addr: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CacheError::Peer {
            addr: addr.into(),
            message: err.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Origin(_) | CacheError::Peer { .. } => StatusCode::BAD_GATEWAY,
            CacheError::HopLimitExceeded(_) => StatusCode::LOOP_DETECTED,
            CacheError::PeerClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
