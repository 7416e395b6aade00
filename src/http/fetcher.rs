//! HTTP fetcher implementation
//!
//! This module handles the plain document downloads used by the sitemap crawler and
//! robots.txt retrieval:
//! - Building HTTP clients with browser-like default headers
//! - GET requests with status classification
//! - Content-Type inspection

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Document download failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, timeout, TLS failure, body read failure...
    #[error("HTTP request error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// A successfully downloaded document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value, lower-cased (empty when absent)
    pub content_type: String,
    /// Decoded body
    pub body: String,
}

impl FetchedDocument {
    /// Returns true if the declared content type is an XML flavour
    pub fn is_xml(&self) -> bool {
        self.content_type.contains("xml")
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The outbound HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use seo_lens::config::HttpConfig;
/// use seo_lens::http::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a document with GET and returns its decoded body
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(FetchedDocument)` - 2xx response with its body
/// * `Err(FetchError)` - Transport failure or non-2xx status
pub async fn fetch_document(client: &Client, url: &str) -> Result<FetchedDocument, FetchError> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let body = response.text().await.map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;

    Ok(FetchedDocument {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}
