//! HTTP Peer Client
//!
//! Peer handles speaking the node's `POST /peer/get` protocol with reqwest.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{PeerGetRequest, CACHE_HIT_HEADER};
use crate::node::{Lookup, Provenance};
use crate::peer::{check_hops, PeerHandle, PeerHandleFactory};

fn base_url(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.trim_end_matches('/').to_string()
    } else {
        format!("http://{addr}")
    }
}

// == HTTP Peer ==
/// Handle for one remote node. Cheap to create: no connection is made until the first call.
#[derive(Debug)]
pub struct HttpPeer {
    addr: String,
    endpoint: String,
    client: Client,
    timeout: Duration,
    closed: AtomicBool,
}

impl HttpPeer {
    pub fn new(addr: &str, client: Client, timeout: Duration) -> Self {
        Self {
            addr: addr.to_string(),
            endpoint: format!("{}/peer/get", base_url(addr)),
            client,
            timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl PeerHandle for HttpPeer {
    fn address(&self) -> &str {
        &self.addr
    }

    async fn get(&self, key: &str, hops: u32) -> Result<Lookup> {
        if self.is_closed() {
            return Err(CacheError::PeerClosed(self.addr.clone()));
        }
        check_hops(hops)?;

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&PeerGetRequest::new(key, hops))
            .send()
            .await
            .map_err(|e| {
                debug!(peer = %self.addr, error = %e, "peer request failed");
                CacheError::peer(&self.addr, e)
            })?;

        match response.status() {
            StatusCode::LOOP_DETECTED => return Err(CacheError::HopLimitExceeded(hops)),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(CacheError::peer(&self.addr, format!("{status}: {body}")));
            }
            _ => {}
        }

        let cache_hit = response
            .headers()
            .get(CACHE_HIT_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let value = response
            .bytes()
            .await
            .map_err(|e| CacheError::peer(&self.addr, e))?;

        Ok(Lookup::new(value, Provenance::from_peer_cache_hit(cache_hit)))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(peer = %self.addr, "peer handle closed");
        }
    }
}

// == HTTP Peer Factory ==
/// Builds [`HttpPeer`] handles sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpPeerFactory {
    client: Client,
    timeout: Duration,
}

impl HttpPeerFactory {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

impl PeerHandleFactory for HttpPeerFactory {
    fn new_handle(&self, addr: &str) -> Arc<dyn PeerHandle> {
        Arc::new(HttpPeer::new(addr, self.client.clone(), self.timeout))
    }
}
