//! Cache Orchestrator
//!
//! Routes each lookup through the hot tier, the local tier, the owning peer and finally the
//! origin, and owns the node's view of cluster membership.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use parking_lot::RwLock;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::info;

use crate::cache::{CacheStats, LookupStats, Store};
use crate::cluster::Membership;
use crate::error::{CacheError, Result};
use crate::node::{Coalescer, Getter, Lookup, Provenance};
use crate::peer::PeerHandleFactory;

/// A value fetched through a peer is copied into the hot tier with probability 1 in this many.
pub const HOT_POPULATION_ODDS: u32 = 5;

// == Options ==
/// Construction parameters for a [`Cache`].
pub struct Options {
    /// This node's own address, as it appears in membership lists
    pub me: String,
    /// Tier for values owned by other nodes
    pub hot_store: Arc<dyn Store>,
    /// Tier for values this node owns
    pub local_store: Arc<dyn Store>,
    pub getter: Arc<dyn Getter>,
    pub peer_factory: Arc<dyn PeerHandleFactory>,
    /// Initial membership, this node included
    pub peers: Vec<String>,
}

// == Lookup Counters ==
#[derive(Debug, Default)]
struct LookupCounters {
    hot_cache: AtomicU64,
    local_cache: AtomicU64,
    local_get: AtomicU64,
    peer_cache: AtomicU64,
    peer_get: AtomicU64,
    peer_fallbacks: AtomicU64,
    errors: AtomicU64,
}

impl LookupCounters {
    fn record(&self, outcome: &Result<Lookup>) {
        let counter = match outcome {
            Ok(lookup) => match lookup.source {
                Provenance::HotCache => &self.hot_cache,
                Provenance::LocalCache => &self.local_cache,
                Provenance::LocalGet => &self.local_get,
                Provenance::PeerCache => &self.peer_cache,
                Provenance::PeerGet => &self.peer_get,
                Provenance::None => return,
            },
            Err(_) => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LookupStats {
        LookupStats {
            hot_cache: self.hot_cache.load(Ordering::Relaxed),
            local_cache: self.local_cache.load(Ordering::Relaxed),
            local_get: self.local_get.load(Ordering::Relaxed),
            peer_cache: self.peer_cache.load(Ordering::Relaxed),
            peer_get: self.peer_get.load(Ordering::Relaxed),
            peer_fallbacks: self.peer_fallbacks.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

struct Inner {
    me: String,
    hot_store: Arc<dyn Store>,
    local_store: Arc<dyn Store>,
    getter: Arc<dyn Getter>,
    peer_factory: Arc<dyn PeerHandleFactory>,
    coalescer: Coalescer<Result<Lookup>>,
    membership: RwLock<Arc<Membership>>,
    update_lock: Mutex<()>,
    counters: LookupCounters,
}

// == Cache ==
/// One node of the distributed cache. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Cache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("me", &self.inner.me)
            .field("membership", &self.inner.snapshot())
            .finish()
    }
}

impl Cache {
    // == Constructor ==
    pub fn new(opts: Options) -> Self {
        let (membership, _) = Membership::next(
            &opts.me,
            &opts.peers,
            &Membership::default(),
            opts.peer_factory.as_ref(),
        );
        Self {
            inner: Arc::new(Inner {
                me: opts.me,
                hot_store: opts.hot_store,
                local_store: opts.local_store,
                getter: opts.getter,
                peer_factory: opts.peer_factory,
                coalescer: Coalescer::new(),
                membership: RwLock::new(Arc::new(membership)),
                update_lock: Mutex::new(()),
                counters: LookupCounters::default(),
            }),
        }
    }

    pub fn me(&self) -> &str {
        &self.inner.me
    }

    // == Get ==
    /// Looks up `key` on behalf of a local caller.
    pub async fn get(&self, key: &str) -> Result<Lookup> {
        self.get_relayed(key, 0).await
    }

    /// Looks up `key` for a request that has already been relayed `hops` times.
    ///
    /// Concurrent lookups for the same key share one execution, whether they came from local
    /// callers or from peers. A relay that loops back onto a key already in flight here waits
    /// on that execution; the loop is broken by the peer timeout of the node that relayed it.
    pub async fn get_relayed(&self, key: &str, hops: u32) -> Result<Lookup> {
        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_owned();

        let outcome = self
            .inner
            .coalescer
            .run(key, move || async move { inner.lookup(&owned_key, hops).await })
            .await
            .and_then(|outcome| outcome);
        self.inner.counters.record(&outcome);
        outcome
    }

    /// Like [`Cache::get`], but gives up with [`CacheError::Cancelled`] once `cancel` resolves.
    ///
    /// Giving up does not abort the underlying fetch; other waiters still receive its result.
    pub async fn get_with_cancel<C>(&self, key: &str, cancel: C) -> Result<Lookup>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => Err(CacheError::Cancelled),
            outcome = self.get(key) => outcome,
        }
    }

    /// Like [`Cache::get_relayed`], but gives up with [`CacheError::Cancelled`] after `timeout`.
    pub async fn get_relayed_timeout(
        &self,
        key: &str,
        hops: u32,
        timeout: Duration,
    ) -> Result<Lookup> {
        tokio::time::timeout(timeout, self.get_relayed(key, hops))
            .await
            .unwrap_or(Err(CacheError::Cancelled))
    }

    /// Like [`Cache::get`], but gives up with [`CacheError::Cancelled`] after `timeout`.
    pub async fn get_timeout(&self, key: &str, timeout: Duration) -> Result<Lookup> {
        self.get_relayed_timeout(key, 0, timeout).await
    }

    // == Set Peers ==
    /// Replaces cluster membership with `peers` (this node's own address may be included).
    ///
    /// Updates are serialized. Lookups never wait on an update except for the final swap, and
    /// always see either the old or the new (ring, handles) pair, never a mix.
    pub async fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let addresses: Vec<String> = peers.into_iter().map(Into::into).collect();
        let _update = self.inner.update_lock.lock().await;

        let current = self.inner.snapshot();
        let (next, removed) = Membership::next(
            &self.inner.me,
            &addresses,
            &current,
            self.inner.peer_factory.as_ref(),
        );

        for handle in &removed {
            handle.close().await;
        }

        info!(
            me = %self.inner.me,
            members = next.members().len(),
            removed = removed.len(),
            "membership updated"
        );
        *self.inner.membership.write() = Arc::new(next);
    }

    /// Current membership snapshot.
    pub fn membership(&self) -> Arc<Membership> {
        self.inner.snapshot()
    }

    /// Closes every peer handle. Lookups in flight may still finish; new peer calls fail over
    /// to the origin.
    pub async fn shutdown(&self) {
        let membership = self.inner.snapshot();
        for handle in membership.handles() {
            handle.close().await;
        }
    }

    // == Stats ==
    pub fn hot_stats(&self) -> CacheStats {
        self.inner.hot_store.stats()
    }

    pub fn local_stats(&self) -> CacheStats {
        self.inner.local_store.stats()
    }

    pub fn lookup_stats(&self) -> LookupStats {
        self.inner.counters.snapshot()
    }

    /// Number of lookups currently executing.
    pub fn in_flight(&self) -> usize {
        self.inner.coalescer.in_flight()
    }
}

impl Inner {
    fn snapshot(&self) -> Arc<Membership> {
        Arc::clone(&self.membership.read())
    }

    async fn lookup(&self, key: &str, hops: u32) -> Result<Lookup> {
        if let Some(value) = self.hot_store.get(key) {
            return Ok(Lookup::new(value, Provenance::HotCache));
        }
        if let Some(value) = self.local_store.get(key) {
            return Ok(Lookup::new(value, Provenance::LocalCache));
        }

        let membership = self.snapshot();
        let owner = match membership.ring().owner(key.as_bytes()) {
            // With no membership at all this node is the only one it knows of.
            None => return self.fetch_owned(key).await,
            Some(owner) if owner == self.me => return self.fetch_owned(key).await,
            Some(owner) => owner,
        };

        if let Some(peer) = membership.peer(owner) {
            match peer.get(key, hops.saturating_add(1)).await {
                Ok(lookup) => {
                    self.maybe_populate_hot(key, &lookup.value);
                    return Ok(lookup);
                }
                Err(_) => {
                    self.counters.peer_fallbacks.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        // Not authoritative for this key: serve it without caching it locally.
        let value = self.getter.get(key).await?;
        Ok(Lookup::new(value, Provenance::LocalGet))
    }

    async fn fetch_owned(&self, key: &str) -> Result<Lookup> {
        let value = self.getter.get(key).await?;
        self.local_store.set(key, value.clone());
        Ok(Lookup::new(value, Provenance::LocalGet))
    }

    fn maybe_populate_hot(&self, key: &str, value: &Bytes) {
        if rand::thread_rng().gen_ratio(1, HOT_POPULATION_ODDS) {
            self.hot_store.set(key, value.clone());
        }
    }
}
