//! Request Coalescing
//!
//! Collapses concurrent fetches for the same key into one spawned task.

use std::{collections::HashMap, future::Future, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{CacheError, Result};

type Slots<T> = Arc<Mutex<HashMap<String, watch::Receiver<Option<T>>>>>;

// == Coalescer ==
/// At most one in-flight fetch per key.
///
/// The first caller for a key spawns the fetch on the runtime and registers a slot; every caller
/// that arrives while the slot exists subscribes to it and receives a clone of the same result.
/// The fetch runs independently of its callers, so a caller that stops waiting does not abort it.
#[derive(Debug)]
pub struct Coalescer<T> {
    slots: Slots<T>,
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            slots: Arc::default(),
        }
    }
}

/// Clears a key's slot when the fetch task finishes, including by panic.
struct SlotGuard<T> {
    slots: Slots<T>,
    key: String,
}

impl<T> Drop for SlotGuard<T> {
    fn drop(&mut self) {
        self.slots.lock().remove(&self.key);
    }
}

impl<T> Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Returns the result of `fetch` for `key`, sharing one execution among concurrent callers.
    ///
    /// `fetch` is only invoked when no fetch for `key` is in flight.
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut rx = self.subscribe(key, fetch);
        let outcome = rx.wait_for(Option::is_some).await.map(|slot| (*slot).clone());
        match outcome {
            Ok(Some(value)) => Ok(value),
            _ => Err(CacheError::Internal(format!(
                "fetch for key '{key}' ended without a result"
            ))),
        }
    }

    fn subscribe<F, Fut>(&self, key: &str, fetch: F) -> watch::Receiver<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut slots = self.slots.lock();
        if let Some(rx) = slots.get(key) {
            return rx.clone();
        }

        let (tx, rx) = watch::channel(None);
        slots.insert(key.to_owned(), rx.clone());
        drop(slots);

        let guard = SlotGuard {
            slots: Arc::clone(&self.slots),
            key: key.to_owned(),
        };
        let fut = fetch();
        tokio::spawn(async move {
            let guard = guard;
            let value = fut.await;
            // Clear the slot before publishing: any caller that observes the result finds the
            // key free, so its next call starts a fresh fetch.
            drop(guard);
            tx.send_replace(Some(value));
        });
        rx
    }

    /// Number of keys with a fetch in flight.
    pub fn in_flight(&self) -> usize {
        self.slots.lock().len()
    }
}
