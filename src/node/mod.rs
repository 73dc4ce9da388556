//! Node Module
//!
//! The per-node lookup pipeline: request coalescing, origin access and the orchestrator that
//! routes each lookup to the hot tier, the local tier, the owning peer or the origin.

mod cache;
mod coalesce;
mod origin;

use std::fmt;

use bytes::Bytes;
use serde::Serialize;

pub use cache::{Cache, Options, HOT_POPULATION_ODDS};
pub use coalesce::Coalescer;
pub use origin::{Getter, GetterFn, HttpOrigin};

// == Provenance ==
/// Which tier or path satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    None,
    HotCache,
    LocalCache,
    LocalGet,
    PeerCache,
    PeerGet,
}

impl Provenance {
    /// Wire and log name of the provenance.
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::None => "none",
            Provenance::HotCache => "cache_hot",
            Provenance::LocalCache => "cache_local",
            Provenance::LocalGet => "get_local",
            Provenance::PeerCache => "cache_peer",
            Provenance::PeerGet => "get_peer",
        }
    }

    /// True when a node answered from one of its own memory tiers.
    pub fn is_cache_hit(self) -> bool {
        matches!(self, Provenance::HotCache | Provenance::LocalCache)
    }

    /// Maps a peer's `cache_hit` flag to the provenance seen by the caller.
    pub fn from_peer_cache_hit(cache_hit: bool) -> Self {
        if cache_hit {
            Provenance::PeerCache
        } else {
            Provenance::PeerGet
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Lookup ==
/// A value together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub value: Bytes,
    pub source: Provenance,
}

impl Lookup {
    pub fn new(value: Bytes, source: Provenance) -> Self {
        Self { value, source }
    }
}
