use crate::keywords::stopwords::stop_words;
use crate::keywords::tokenizer::tokenize;
use crate::keywords::{AggregationError, KeywordReport, RowError, WordStat};
use crate::progress::{percent_of, ProgressSink};
use crate::reports::{count_rows, ReportReader, ReportSource};
use csv::StringRecord;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;

pub const KEYWORD_COLUMN: &str = "Keyword";
pub const CLICKS_COLUMN: &str = "Clicks";
pub const IMPRESSIONS_COLUMN: &str = "Impressions";

const REQUIRED_COLUMNS: &[&str] = &[KEYWORD_COLUMN, CLICKS_COLUMN, IMPRESSIONS_COLUMN];

#[derive(Debug, Default)]
struct Totals {
    occurrences: u64,
    clicks: u64,
    impressions: u64,
}

struct Columns {
    keyword: usize,
    clicks: usize,
    impressions: usize,
}

/// Aggregates search performance per word
///
/// # Arguments
///
/// * `path` - Report export, plain or zipped, with `Keyword`, `Clicks` and `Impressions` columns
/// * `language` - Stop-word language key
/// * `progress` - Receives the share of rows processed
///
/// # Returns
///
/// * `Ok(KeywordReport)` - Words by descending occurrences plus any per-row errors
/// * `Err(AggregationError)` - The file could not be read or lacks a required column
pub fn analyze_keywords(
    path: &Path,
    language: &str,
    progress: &dyn ProgressSink,
) -> Result<KeywordReport, AggregationError> {
    let stop = stop_words(language)
        .ok_or_else(|| AggregationError::UnknownLanguage(language.to_string()))?;

    let source = ReportSource::from_path(path);
    let total = count_rows(&source, REQUIRED_COLUMNS)?;
    tracing::info!(
        "Analyzing keywords in {} ({} rows, language: {})",
        path.display(),
        total,
        language
    );

    let mut words: IndexMap<String, Totals> = IndexMap::new();
    let mut row_errors = Vec::new();
    let mut rows_processed = 0usize;

    source.with_reader(|r| {
        let mut reader = ReportReader::open(r, REQUIRED_COLUMNS)?;
        let header = reader.header();
        let columns = Columns {
            keyword: header.require(KEYWORD_COLUMN)?,
            clicks: header.require(CLICKS_COLUMN)?,
            impressions: header.require(IMPRESSIONS_COLUMN)?,
        };

        for (row, record) in reader.records() {
            let outcome = match record {
                Ok(record) => accumulate(&record, &columns, &stop, &mut words),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(()) => rows_processed += 1,
                Err(message) => {
                    tracing::warn!("Skipping row {}: {}", row, message);
                    row_errors.push(RowError { row, message });
                }
            }
            progress.report(percent_of(row, total));
        }
        Ok(())
    })?;

    let stats = finish(words);
    tracing::info!(
        "Keyword analysis complete: {} words from {} rows ({} skipped)",
        stats.len(),
        rows_processed,
        row_errors.len()
    );

    Ok(KeywordReport {
        stats,
        rows_total: total,
        rows_processed,
        row_errors,
    })
}

/// Adds one row to the running totals; a word counts once per row
fn accumulate(
    record: &StringRecord,
    columns: &Columns,
    stop: &HashSet<&str>,
    words: &mut IndexMap<String, Totals>,
) -> Result<(), String> {
    let keyword = record
        .get(columns.keyword)
        .ok_or_else(|| format!("missing {} value", KEYWORD_COLUMN))?;
    let clicks = parse_count(record, columns.clicks, CLICKS_COLUMN)?;
    let impressions = parse_count(record, columns.impressions, IMPRESSIONS_COLUMN)?;

    let mut seen = HashSet::new();
    for token in tokenize(keyword, stop) {
        if !seen.insert(token.clone()) {
            continue;
        }
        let totals = words.entry(token).or_default();
        totals.occurrences += 1;
        totals.clicks = totals.clicks.saturating_add(clicks);
        totals.impressions = totals.impressions.saturating_add(impressions);
    }
    Ok(())
}

fn parse_count(record: &StringRecord, index: usize, column: &str) -> Result<u64, String> {
    let raw = record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing {} value", column))?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid {} value '{}'", column, raw))
}

fn finish(words: IndexMap<String, Totals>) -> Vec<WordStat> {
    let mut stats: Vec<WordStat> = words
        .into_iter()
        .map(|(word, totals)| WordStat {
            word,
            occurrences: totals.occurrences,
            total_clicks: totals.clicks,
            total_impressions: totals.impressions,
            avg_ctr: average_ctr(totals.clicks, totals.impressions),
        })
        .collect();
    stats.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    stats
}

/// Click-through rate in percent, rounded to two decimals; undefined without impressions
pub fn average_ctr(clicks: u64, impressions: u64) -> Option<f64> {
    if impressions == 0 {
        return None;
    }
    let ctr = clicks as f64 / impressions as f64 * 100.0;
    Some((ctr * 100.0).round() / 100.0)
}
