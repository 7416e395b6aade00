//! Shared HTTP plumbing
//!
//! One client is built per operation from [`crate::config::HttpConfig`] and reused for
//! every request that operation makes.

mod fetcher;

pub use fetcher::{build_http_client, fetch_document, FetchError, FetchedDocument};
