//! API Module
//!
//! HTTP handlers and routing for the node's client and peer surfaces.
//!
//! # Endpoints
//! - `GET /get/:key` - Look up a key through the cluster
//! - `POST /peer/get` - Lookup relayed by another node
//! - `GET /peers`, `PUT /peers` - Read or replace membership
//! - `GET /stats` - Tier and lookup statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
