//! Origin Data Source
//!
//! The slow source of truth behind the cache, plus its adapters.

use std::{fmt, future::Future, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{CacheError, Result};

// == Getter ==
/// The origin a node falls back to when no cache tier has the key.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Bytes>;
}

// == Getter Fn ==
/// Adapts an async closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

impl<F> fmt::Debug for GetterFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GetterFn")
    }
}

#[async_trait]
impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Bytes>> + Send,
{
    async fn get(&self, key: &str) -> Result<Bytes> {
        (self.0)(key.to_owned()).await
    }
}

// == HTTP Origin ==
/// Fetches `{base_url}/{key}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    base_url: Url,
    client: Client,
    timeout: Duration,
}

impl HttpOrigin {
    /// Creates an origin rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CacheError::InvalidRequest(format!("bad origin url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::InvalidRequest(format!(
                "origin url {base_url} cannot be a base"
            )));
        }
        Ok(Self {
            base_url,
            client: Client::new(),
            timeout,
        })
    }

    fn url_for(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(key);
        }
        url
    }
}

#[async_trait]
impl Getter for HttpOrigin {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let url = self.url_for(key);
        debug!(%url, "fetching from origin");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CacheError::Origin(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Origin(format!(
                "origin returned {status} for key '{key}'"
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::Origin(e.to_string()))
    }
}
