//! Consistent Hash Ring
//!
//! Maps keys to owning peer addresses using CRC32 virtual nodes.

use std::collections::{HashMap, HashSet};

/// Number of ring positions assigned to each peer.
pub const VIRTUAL_NODES: usize = 32;

fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// == Hash Ring ==
/// An immutable consistent-hash ring.
///
/// Each address is hashed [`VIRTUAL_NODES`] times as `"{i}_{address}"`; a key belongs to the
/// first position at or after its own hash, wrapping around to the start of the table. A ring is
/// never modified after construction, membership changes build a new one.
#[derive(Debug, Clone, Default)]
pub struct HashRing {
    hashes: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Builds a ring from peer addresses. Duplicate addresses are collapsed.
    pub fn new<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ring = Self::default();
        let mut seen = HashSet::new();
        for peer in peers {
            let peer = peer.as_ref();
            if !seen.insert(peer.to_owned()) {
                continue;
            }
            for i in 0..VIRTUAL_NODES {
                let hash = checksum(format!("{i}_{peer}").as_bytes());
                ring.hashes.push(hash);
                // Colliding positions go to the smaller address so input order never matters.
                ring.owners
                    .entry(hash)
                    .and_modify(|owner| {
                        if peer < owner.as_str() {
                            *owner = peer.to_owned();
                        }
                    })
                    .or_insert_with(|| peer.to_owned());
            }
        }
        ring.hashes.sort_unstable();
        ring.hashes.dedup();
        ring
    }

    // == Owner ==
    /// Returns the address owning `key`, or `None` for an empty ring.
    pub fn owner(&self, key: &[u8]) -> Option<&str> {
        if self.hashes.is_empty() {
            return None;
        }
        let hash = checksum(key);
        let mut idx = self.hashes.partition_point(|&h| h < hash);
        if idx == self.hashes.len() {
            idx = 0;
        }
        self.owners.get(&self.hashes[idx]).map(String::as_str)
    }

    /// Returns true if the ring has no peers.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Returns the number of ring positions.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }
}
