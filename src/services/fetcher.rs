// src/services/fetcher.rs

//! Page fetching.
//!
//! One GET per call and no retries; retry policy belongs to the crawler.
//! HTTP status codes are recorded, not judged: challenge pages are often
//! served with `200`, so classification is left to the detector.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, TransportError};
use crate::models::{CrawlerConfig, FetchResult};
use crate::utils::http::create_async_client;

/// Source of raw page responses.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page. Only network-level failures are errors.
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResult, TransportError>;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResult, TransportError> {
        let transport = |e: reqwest::Error| TransportError {
            url: url.to_string(),
            cause: describe(&e),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;

        log::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(FetchResult::from_bytes(url, status, &body))
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connect: {e}")
    } else {
        e.to_string()
    }
}
