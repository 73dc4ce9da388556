//! API Routes
//!
//! Configures the Axum router with all node endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_handler, health_handler, peer_get_handler, peers_handler, set_peers_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /get/:key` - Look up a key through the cluster
/// - `POST /peer/get` - Lookup relayed by another node
/// - `GET /peers` - Current membership
/// - `PUT /peers` - Replace membership
/// - `GET /stats` - Tier and lookup statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get/:key", get(get_handler))
        .route("/peer/get", post(peer_get_handler))
        .route("/peers", get(peers_handler).put(set_peers_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruStore;
    use crate::error::CacheError;
    use crate::node::{Cache, GetterFn, Options};
    use crate::peer::HttpPeerFactory;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use bytes::Bytes;
    use std::{sync::Arc, time::Duration};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = Cache::new(Options {
            me: "127.0.0.1:3000".into(),
            hot_store: Arc::new(LruStore::new(1024)),
            local_store: Arc::new(LruStore::new(1024)),
            getter: Arc::new(GetterFn(|key: String| async move {
                Ok::<_, CacheError>(Bytes::from(key))
            })),
            peer_factory: Arc::new(HttpPeerFactory::new(Duration::from_millis(100))),
            peers: vec![],
        });
        create_router(AppState::new(cache, Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/get/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ringcache-source"], "get_local");
    }

    #[tokio::test]
    async fn test_peer_get_wrong_method() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/peer/get")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
