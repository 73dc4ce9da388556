//! Background Tasks Module
//!
//! Contains background tasks that run periodically during node operation.
//!
//! # Tasks
//! - Membership discovery: polls a membership source and updates the node's ring

mod discovery;

pub use discovery::spawn_discovery_task;
