//! SEO-Lens: an SEO analyst's toolbox
//!
//! This crate crawls sitemaps, evaluates robots.txt compliance, decodes analytics
//! filter URLs, aggregates keyword performance reports and drives remote export jobs.
//! Every operation takes its input plus a [`progress::ProgressSink`] and returns either
//! a complete report (possibly carrying inline error notes) or a single typed error.

pub mod config;
pub mod http;
pub mod jobs;
pub mod keywords;
pub mod output;
pub mod progress;
pub mod query;
pub mod reports;
pub mod robots;
pub mod sitemap;

use thiserror::Error;

/// Main error type for SEO-Lens operations
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] sitemap::SitemapError),

    #[error("Robots.txt error: {0}")]
    Robots(#[from] robots::RobotsError),

    #[error("Filter decode error: {0}")]
    Decode(#[from] query::DecodeError),

    #[error("Keyword aggregation error: {0}")]
    Aggregation(#[from] keywords::AggregationError),

    #[error("Job error: {0}")]
    Job(#[from] jobs::JobError),

    #[error("Download error: {0}")]
    Download(#[from] jobs::DownloadError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for SEO-Lens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use jobs::{JobHandle, JobOutcome, JobStatus};
pub use keywords::{analyze_keywords, WordStat};
pub use progress::{NoProgress, ProgressSink};
pub use query::{decrypt_filter_url, extract_query_params, QueryParamTally};
pub use robots::RobotsRuleSet;
pub use sitemap::{analyze_sitemap, SitemapRow};
