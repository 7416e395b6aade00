//! Keyword performance aggregation
//!
//! Search-console style exports list one query per row with its clicks and
//! impressions. This module breaks queries into words and totals the figures per word.

mod aggregator;
pub mod stopwords;
mod tokenizer;

pub use aggregator::{
    analyze_keywords, average_ctr, CLICKS_COLUMN, IMPRESSIONS_COLUMN, KEYWORD_COLUMN,
};
pub use tokenizer::tokenize;

use crate::reports::ReportError;
use thiserror::Error;

/// File-level aggregation errors
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Unsupported stop-word language '{0}'")]
    UnknownLanguage(String),
}

/// Totals for one word
#[derive(Debug, Clone, PartialEq)]
pub struct WordStat {
    pub word: String,
    /// Number of rows whose keyword contains the word
    pub occurrences: u64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    /// Percent, two decimals; `None` when the word has no impressions
    pub avg_ctr: Option<f64>,
}

/// A data row that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based position among the data rows
    pub row: usize,
    pub message: String,
}

/// Result of a keyword aggregation
#[derive(Debug, Clone, Default)]
pub struct KeywordReport {
    /// Sorted by descending occurrences, ties in first-seen order
    pub stats: Vec<WordStat>,
    pub rows_total: usize,
    pub rows_processed: usize,
    pub row_errors: Vec<RowError>,
}
