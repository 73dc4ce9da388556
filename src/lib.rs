//! ringcache - A distributed read-through cache
//!
//! Each node owns a slice of the key space on a consistent-hash ring, serves owned keys from a
//! local LRU tier backed by an origin, and asks the owning peer for everything else.

pub mod api;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod models;
pub mod node;
pub mod peer;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use node::{Cache, Lookup, Options, Provenance};
pub use tasks::spawn_discovery_task;
