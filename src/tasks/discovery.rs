//! Membership Discovery Task
//!
//! Background task that periodically polls a membership source and feeds changes into the node.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cluster::MembershipSource;
use crate::node::Cache;

/// Spawns a background task that polls `source` every `interval_secs` seconds.
///
/// Membership is only replaced when the reported address set differs from the current one.
/// Errors from the source are logged and retried on the next tick.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_discovery_task(
    cache: Cache,
    source: Arc<dyn MembershipSource>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting membership discovery with interval of {} seconds",
            interval_secs
        );

        loop {
            match source.peers().await {
                Ok(mut peers) => {
                    peers.sort();
                    peers.dedup();
                    if cache.membership().members() != peers.as_slice() {
                        cache.set_peers(peers).await;
                    } else {
                        debug!("Membership discovery: no change");
                    }
                }
                Err(e) => warn!(error = %e, "Membership discovery failed"),
            }

            tokio::time::sleep(interval).await;
        }
    })
}
