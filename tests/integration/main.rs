//! Integration tests for SEO-Lens
//!
//! Network-facing operations run against wiremock servers; report files are
//! written to temporary directories.

mod jobs_tests;
mod reports_tests;
mod robots_tests;
mod sitemap_tests;

use seo_lens::config::HttpConfig;

/// HTTP client with short timeouts for mock servers
pub fn test_client() -> reqwest::Client {
    let config = HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..HttpConfig::default()
    };
    seo_lens::http::build_http_client(&config).expect("Failed to build HTTP client")
}
