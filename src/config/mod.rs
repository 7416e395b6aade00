//! Configuration module for SEO-Lens
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All sections are optional; running without a config file uses `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use seo_lens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("seo-lens.toml")).unwrap();
//! println!("Stop words: {}", config.keywords.language);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AuthKind, Config, FilterConfig, HttpConfig, JobsConfig, KeywordsConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
