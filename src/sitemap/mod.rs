//! Sitemap crawling module
//!
//! This module downloads a sitemap, recurses one level into sitemap indexes and
//! flattens every `<url>` into [`SitemapRow`]s, one per hreflang alternate.

mod crawler;
mod parser;

pub use crawler::{analyze_sitemap, MAIN_SITEMAP};
pub use parser::{
    parse_sitemap, Alternate, SitemapDocument, SitemapParseError, UrlEntry, SITEMAP_NS, XHTML_NS,
};

use crate::http::FetchError;
use thiserror::Error;

/// Document-level sitemap errors; these abort the whole crawl
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Content is not valid XML (Content-Type: {content_type}) for {url}")]
    Format { url: String, content_type: String },

    #[error("XML parsing error for {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: SitemapParseError,
    },
}

/// One page (or one page/alternate pair) listed in a sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapRow {
    pub page_url: String,
    pub hreflang_url: Option<String>,
    /// e.g. `en-US`
    pub hreflang_code: Option<String>,
    /// File name of the sitemap holding the entry, `main` for a root urlset
    pub source_sitemap: String,
}

/// An item of the crawl result stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapEntry {
    Row(SitemapRow),
    /// Non-fatal problem, kept in place so the reader sees where it happened
    Error { context: String, message: String },
}

/// Complete result of a sitemap crawl
#[derive(Debug, Clone, Default)]
pub struct SitemapReport {
    pub entries: Vec<SitemapEntry>,
    /// Number of [`SitemapEntry::Row`] entries
    pub url_rows: usize,
    /// Number of child sitemaps listed, when the root was an index
    pub sitemaps_visited: Option<usize>,
}

impl SitemapReport {
    pub(crate) fn new(entries: Vec<SitemapEntry>, sitemaps_visited: Option<usize>) -> Self {
        let url_rows = entries
            .iter()
            .filter(|e| matches!(e, SitemapEntry::Row(_)))
            .count();
        Self {
            entries,
            url_rows,
            sitemaps_visited,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &SitemapRow> {
        self.entries.iter().filter_map(|e| match e {
            SitemapEntry::Row(row) => Some(row),
            SitemapEntry::Error { .. } => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|e| match e {
            SitemapEntry::Error { context, message } => Some((context.as_str(), message.as_str())),
            SitemapEntry::Row(_) => None,
        })
    }

    /// Trailing summary block
    pub fn summary(&self) -> String {
        let mut summary = format!("Summary:\n{} URLs processed", self.url_rows);
        if let Some(count) = self.sitemaps_visited {
            summary.push_str(&format!("\n{} sitemaps analyzed", count));
        }
        summary
    }
}
