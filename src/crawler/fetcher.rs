//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one HTTP client with a descriptive user agent string
//! - GET requests for chapter and index pages, parsed into documents
//! - GET requests for embedded images, returned as raw bytes
//!
//! There is no retry logic. A non-success status or a transport failure is
//! returned as an error and aborts the crawl.

use crate::config::UserAgentConfig;
use crate::{BinderError, Result};
use reqwest::{Client, Response};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> std::result::Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves pages and images over HTTP
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher around a freshly configured client
    pub fn from_config(config: &UserAgentConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self::new(build_http_client(config, timeout_secs)?))
    }

    /// Fetches a URL and parses the body as an HTML document
    ///
    /// # Errors
    ///
    /// * `BinderError::Fetch` - The server answered with a non-success status
    /// * `BinderError::Http` - The request or body transfer failed
    pub async fn fetch(&self, url: &Url) -> Result<Html> {
        let response = self.get(url).await?;
        let body = response.text().await.map_err(|source| BinderError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(Html::parse_document(&body))
    }

    /// Fetches a URL and returns the raw body bytes
    ///
    /// Same failure contract as [`PageFetcher::fetch`].
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|source| BinderError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(bytes.to_vec())
    }

    async fn get(&self, url: &Url) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| BinderError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BinderError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
