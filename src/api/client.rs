//! REST Countries HTTP client with connection pooling.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::DirectoryError;

/// `GET url -> JSON`, the only thing the directory needs from the network.
///
/// Implementations report 404 as [`DirectoryError::NotFound`] and every other
/// failure as an opaque transport or status error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> crate::error::Result<Value>;
}

/// Reqwest-backed transport with a persistent connection pool.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .user_agent(concat!("country-directory/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> crate::error::Result<Value> {
        let start = tokio::time::Instant::now();
        debug!(url, "HTTP GET start");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "HTTP GET failed");
            DirectoryError::Transport {
                message: format!("GET {url} failed"),
                source: Some(Box::new(e)),
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::not_found(url));
        }
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| DirectoryError::Transport {
            message: format!("Failed to read response from {url}"),
            source: Some(Box::new(e)),
        })?;

        debug!(
            url,
            bytes = text.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "HTTP GET done"
        );

        Ok(serde_json::from_str(&text)?)
    }
}
