//! Robots.txt handling module
//!
//! This module provides functionality for fetching robots.txt files, parsing them once
//! into a [`RobotsRuleSet`] and evaluating batches of URLs against that rule set.

mod matcher;
mod parser;

pub use parser::{RobotsRule, RobotsRuleSet, RuleGroup, RuleKind};

use crate::http::{fetch_document, FetchError};
use reqwest::Client;
use thiserror::Error;

/// Robots.txt errors
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("Robots.txt parse error: {0}")]
    Parse(String),

    #[error("Error retrieving robots.txt: {0}")]
    Fetch(#[from] FetchError),
}

/// Allow/deny verdict for one URL of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsVerdict {
    pub url: String,
    pub allowed: bool,
}

/// Parses a robots.txt body
///
/// Call this once per body and reuse the result for every URL of a batch.
pub fn parse(body: &str) -> Result<RobotsRuleSet, RobotsError> {
    RobotsRuleSet::parse(body)
}

/// Checks if a URL is allowed by a parsed robots.txt
///
/// # Arguments
///
/// * `rules` - The parsed robots.txt data
/// * `user_agent` - The user agent string
/// * `url` - The URL to check
///
/// # Returns
///
/// * `true` - If the URL is allowed
/// * `false` - If the URL is disallowed
pub fn is_allowed(rules: &RobotsRuleSet, user_agent: &str, url: &str) -> bool {
    rules.is_allowed(user_agent, url)
}

/// Evaluates a batch of URLs against one rule set
///
/// Entries are trimmed and blank ones skipped; verdicts keep input order.
pub fn check_urls<I, S>(rules: &RobotsRuleSet, urls: I, user_agent: &str) -> Vec<RobotsVerdict>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .filter_map(|url| {
            let url = url.as_ref().trim();
            if url.is_empty() {
                return None;
            }
            Some(RobotsVerdict {
                url: url.to_string(),
                allowed: rules.is_allowed(user_agent, url),
            })
        })
        .collect()
}

/// Parses `body` once, then evaluates every URL against it
pub fn check_urls_against_robots<I, S>(
    urls: I,
    body: &str,
    user_agent: &str,
) -> Result<Vec<RobotsVerdict>, RobotsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rules = parse(body)?;
    let verdicts = check_urls(&rules, urls, user_agent);
    tracing::info!(
        "Checked {} URLs for '{}': {} blocked",
        verdicts.len(),
        user_agent,
        verdicts.iter().filter(|v| !v.allowed).count()
    );
    Ok(verdicts)
}

/// Downloads a robots.txt body
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - Full URL of the robots.txt file
///
/// # Returns
///
/// * `Ok(String)` - The raw robots.txt content
/// * `Err(RobotsError)` - Failed to fetch
pub async fn fetch_robots_txt(client: &Client, url: &str) -> Result<String, RobotsError> {
    tracing::info!("Fetching robots.txt from {}", url);
    let document = fetch_document(client, url).await?;
    Ok(document.body)
}
