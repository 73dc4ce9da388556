//! Membership
//!
//! The (ring, peer handles) snapshot a node routes with, and the sources that feed
//! membership changes into a node.

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use tokio::net::lookup_host;

use crate::cluster::HashRing;
use crate::error::{CacheError, Result};
use crate::peer::{PeerHandle, PeerHandleFactory};

// == Membership Snapshot ==
/// One immutable view of cluster membership.
///
/// The ring and the handle map are always published together so that a reader never pairs a
/// ring with handles from another generation.
#[derive(Default)]
pub struct Membership {
    members: Vec<String>,
    ring: HashRing,
    peers: HashMap<String, Arc<dyn PeerHandle>>,
}

impl fmt::Debug for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Membership")
            .field("members", &self.members)
            .field("peers", &self.peers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Membership {
    /// Builds the next generation from `addresses`.
    ///
    /// Handles in `previous` are reused for addresses that remain; new addresses get a handle
    /// from `factory`; `me` never gets one. Returns the new snapshot and the handles that are no
    /// longer referenced by it.
    pub fn next(
        me: &str,
        addresses: &[String],
        previous: &Membership,
        factory: &dyn PeerHandleFactory,
    ) -> (Membership, Vec<Arc<dyn PeerHandle>>) {
        let mut members: Vec<String> = addresses.to_vec();
        members.sort();
        members.dedup();

        let mut peers = HashMap::with_capacity(members.len());
        for addr in members.iter().filter(|addr| addr.as_str() != me) {
            let handle = match previous.peers.get(addr) {
                Some(handle) => Arc::clone(handle),
                None => factory.new_handle(addr),
            };
            peers.insert(addr.clone(), handle);
        }

        let removed = previous
            .peers
            .iter()
            .filter(|(addr, _)| !peers.contains_key(*addr))
            .map(|(_, handle)| Arc::clone(handle))
            .collect();

        let next = Membership {
            ring: HashRing::new(&members),
            members,
            peers,
        };
        (next, removed)
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Sorted addresses in the ring, including this node when it was listed.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Handle for a remote address, if it is a current peer.
    pub fn peer(&self, addr: &str) -> Option<&Arc<dyn PeerHandle>> {
        self.peers.get(addr)
    }

    /// Sorted addresses of the current peers.
    pub fn peer_addresses(&self) -> Vec<String> {
        let mut addrs: Vec<String> = self.peers.keys().cloned().collect();
        addrs.sort();
        addrs
    }

    pub fn handles(&self) -> impl Iterator<Item = &Arc<dyn PeerHandle>> {
        self.peers.values()
    }
}

// == Membership Source ==
/// Reports the current set of live node addresses.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    async fn peers(&self) -> Result<Vec<String>>;
}

/// A fixed address list.
#[derive(Debug, Clone)]
pub struct StaticMembership {
    peers: Vec<String>,
}

impl StaticMembership {
    pub fn new(peers: Vec<String>) -> Self {
        Self { peers }
    }
}

#[async_trait]
impl MembershipSource for StaticMembership {
    async fn peers(&self) -> Result<Vec<String>> {
        Ok(self.peers.clone())
    }
}

/// Resolves a DNS name (e.g. a headless service) to one `ip:port` address per record.
#[derive(Debug, Clone)]
pub struct DnsMembership {
    target: String,
}

impl DnsMembership {
    /// `target` is a `host:port` pair.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl MembershipSource for DnsMembership {
    async fn peers(&self) -> Result<Vec<String>> {
        let addrs = lookup_host(self.target.as_str())
            .await
            .map_err(|e| CacheError::Internal(format!("resolving {}: {e}", self.target)))?;
        let mut peers: Vec<String> = addrs.map(|addr| addr.to_string()).collect();
        peers.sort();
        peers.dedup();
        Ok(peers)
    }
}
