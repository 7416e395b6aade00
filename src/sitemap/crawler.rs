//! Sitemap crawl orchestration
//!
//! Fetches the root document, decides between index and urlset, then walks child
//! sitemaps one after another. Root failures abort the crawl; child failures are
//! recorded inline and the walk continues.

use crate::http::fetch_document;
use crate::progress::ProgressSink;
use crate::sitemap::parser::{parse_sitemap, SitemapDocument, UrlEntry};
use crate::sitemap::{SitemapEntry, SitemapError, SitemapReport, SitemapRow};
use reqwest::Client;
use url::Url;

/// `source_sitemap` value for rows of a root urlset
pub const MAIN_SITEMAP: &str = "main";

/// Share of the progress bar reserved for the root fetch and parse
const ROOT_PROGRESS: usize = 30;

/// Crawls a sitemap (or sitemap index) into a flat row table
///
/// # Arguments
///
/// * `client` - The HTTP client to use for every request of the crawl
/// * `root_url` - URL of the sitemap or sitemap index
/// * `progress` - Receives 10, 20, 30 for the root, then one update per child
///
/// # Returns
///
/// * `Ok(SitemapReport)` - Rows in document order, with inline child errors
/// * `Err(SitemapError)` - The root document could not be fetched or parsed
pub async fn analyze_sitemap(
    client: &Client,
    root_url: &str,
    progress: &dyn ProgressSink,
) -> Result<SitemapReport, SitemapError> {
    tracing::info!("Analyzing sitemap {}", root_url);
    progress.report(10);

    let document = fetch_document(client, root_url).await?;
    progress.report(20);

    if !document.is_xml() {
        return Err(SitemapError::Format {
            url: root_url.to_string(),
            content_type: document.content_type,
        });
    }

    let parsed = parse_sitemap(&document.body).map_err(|source| SitemapError::Parse {
        url: root_url.to_string(),
        source,
    })?;
    progress.report(ROOT_PROGRESS as u8);

    let report = match parsed {
        SitemapDocument::UrlSet(entries) => {
            let entries = extract_rows(&entries, MAIN_SITEMAP);
            progress.report(100);
            SitemapReport::new(entries, None)
        }
        SitemapDocument::Index(children) => {
            let total = children.len();
            tracing::info!("Sitemap index with {} child sitemaps", total);

            let mut entries = Vec::new();
            for (i, child) in children.into_iter().enumerate() {
                match child {
                    Some(child_url) => entries.extend(crawl_child(client, &child_url).await),
                    None => entries.push(SitemapEntry::Error {
                        context: root_url.to_string(),
                        message: format!("<sitemap> #{} has no <loc>", i + 1),
                    }),
                }
                progress.report(child_progress(i + 1, total));
            }
            if total == 0 {
                progress.report(100);
            }
            SitemapReport::new(entries, Some(total))
        }
    };

    tracing::info!(
        "Sitemap analysis finished: {} URL rows, {} inline errors",
        report.url_rows,
        report.errors().count()
    );
    Ok(report)
}

/// Fetches one child of an index and extracts its rows
///
/// Never fails: every problem becomes a single inline error entry.
async fn crawl_child(client: &Client, child_url: &str) -> Vec<SitemapEntry> {
    let inline_error = |message: String| {
        tracing::warn!("Error processing {}: {}", child_url, message);
        vec![SitemapEntry::Error {
            context: child_url.to_string(),
            message,
        }]
    };

    tracing::debug!("Fetching child sitemap {}", child_url);
    let document = match fetch_document(client, child_url).await {
        Ok(document) => document,
        Err(e) => return inline_error(e.to_string()),
    };

    match parse_sitemap(&document.body) {
        Ok(SitemapDocument::UrlSet(entries)) => extract_rows(&entries, &sitemap_name(child_url)),
        Ok(SitemapDocument::Index(_)) => {
            inline_error("nested sitemap index is not traversed".to_string())
        }
        Err(e) => inline_error(format!("XML parsing error: {}", e)),
    }
}

/// Expands urlset entries into rows, one per hreflang alternate
fn extract_rows(entries: &[UrlEntry], source: &str) -> Vec<SitemapEntry> {
    let mut rows = Vec::new();
    for entry in entries {
        let Some(page_url) = &entry.loc else {
            rows.push(SitemapEntry::Error {
                context: source.to_string(),
                message: "<url> without <loc>".to_string(),
            });
            continue;
        };

        if entry.alternates.is_empty() {
            rows.push(SitemapEntry::Row(SitemapRow {
                page_url: page_url.clone(),
                hreflang_url: None,
                hreflang_code: None,
                source_sitemap: source.to_string(),
            }));
            continue;
        }

        for alternate in &entry.alternates {
            rows.push(SitemapEntry::Row(SitemapRow {
                page_url: page_url.clone(),
                hreflang_url: alternate.href.clone(),
                hreflang_code: alternate.hreflang.clone(),
                source_sitemap: source.to_string(),
            }));
        }
    }
    rows
}

/// Progress after `done` of `total` children: 30 + done/total * 70
fn child_progress(done: usize, total: usize) -> u8 {
    let remaining = 100 - ROOT_PROGRESS;
    (ROOT_PROGRESS + done.min(total) * remaining / total.max(1)) as u8
}

/// Last path segment of a sitemap URL
fn sitemap_name(sitemap_url: &str) -> String {
    Url::parse(sitemap_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_else(|| sitemap_url.rsplit('/').next().unwrap_or("").to_string())
}
