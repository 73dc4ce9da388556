//! Peer Module
//!
//! Handles for asking another node for a key, and the hop-count rule that keeps a lookup from
//! bouncing between nodes whose rings disagree.

mod http;

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::node::Lookup;

pub use http::{HttpPeer, HttpPeerFactory};

/// A peer request relayed more than this many times is rejected.
pub const MAX_HOPS: u32 = 10;

/// Rejects a hop count above [`MAX_HOPS`].
pub fn check_hops(hops: u32) -> Result<()> {
    if hops > MAX_HOPS {
        Err(CacheError::HopLimitExceeded(hops))
    } else {
        Ok(())
    }
}

// == Peer Handle ==
/// A connection-like handle to one remote node.
///
/// `get` receives the hop count the request will carry (already incremented by the caller) and
/// returns the remote value tagged [`PeerCache`] or [`PeerGet`].
///
/// [`PeerCache`]: crate::node::Provenance::PeerCache
/// [`PeerGet`]: crate::node::Provenance::PeerGet
#[async_trait]
pub trait PeerHandle: Send + Sync + fmt::Debug {
    /// The remote node's address.
    fn address(&self) -> &str;

    async fn get(&self, key: &str, hops: u32) -> Result<Lookup>;

    /// Releases held resources. Idempotent; calls already in flight may still complete.
    async fn close(&self);
}

// == Peer Handle Factory ==
/// Creates handles for newly seen addresses. Must not block; connecting lazily is fine.
pub trait PeerHandleFactory: Send + Sync {
    fn new_handle(&self, addr: &str) -> Arc<dyn PeerHandle>;
}

impl<F> PeerHandleFactory for F
where
    F: Fn(&str) -> Arc<dyn PeerHandle> + Send + Sync,
{
    fn new_handle(&self, addr: &str) -> Arc<dyn PeerHandle> {
        self(addr)
    }
}
