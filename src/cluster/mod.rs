//! Cluster Module
//!
//! Consistent hashing and membership: which node owns a key, and how the set of nodes changes.

mod membership;
mod ring;


pub use membership::{DnsMembership, Membership, MembershipSource, StaticMembership};
pub use ring::{HashRing, VIRTUAL_NODES};
