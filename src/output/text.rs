//! Plain-text renderings
//!
//! Tab-separated tables meant to be pasted into a spreadsheet, one function per
//! operation result.

use crate::keywords::{KeywordReport, WordStat};
use crate::query::QueryParamTally;
use crate::robots::RobotsVerdict;
use crate::sitemap::{SitemapEntry, SitemapReport};

/// Header line of the sitemap table
pub const SITEMAP_HEADER: &str = "URL\threflang URL\threflang\tSitemap";

/// Header line of the keyword table
pub const KEYWORD_HEADER: &str = "Word\tOccurrences\tTotal Clicks\tTotal Impressions\tAvg CTR";

/// Formats a sitemap crawl as a TSV table followed by the summary block
///
/// Inline errors are printed where they occurred in the crawl order.
pub fn format_sitemap_report(report: &SitemapReport) -> String {
    let mut out = String::new();
    out.push_str(SITEMAP_HEADER);
    out.push('\n');

    for entry in &report.entries {
        match entry {
            SitemapEntry::Row(row) => {
                out.push_str(&format!(
                    "{}\t{}\t{}\t{}\n",
                    row.page_url,
                    row.hreflang_url.as_deref().unwrap_or(""),
                    row.hreflang_code.as_deref().unwrap_or(""),
                    row.source_sitemap
                ));
            }
            SitemapEntry::Error { context, message } => {
                out.push_str(&format!("Error processing {}: {}\n", context, message));
            }
        }
    }

    out.push('\n');
    out.push_str(&report.summary());
    out
}

/// One line per URL, prefixed with an allowed/blocked marker
pub fn format_robots_verdicts(verdicts: &[RobotsVerdict]) -> String {
    let mut out = String::new();
    for verdict in verdicts {
        let marker = if verdict.allowed { "✅" } else { "❌" };
        out.push_str(&format!("{} {}\n", marker, verdict.url));
    }

    let blocked = verdicts.iter().filter(|v| !v.allowed).count();
    out.push_str(&format!(
        "\n{} URLs checked, {} allowed, {} blocked",
        verdicts.len(),
        verdicts.len() - blocked,
        blocked
    ));
    out
}

/// `Name\tCount` lines, most frequent first
pub fn format_param_tally(tally: &QueryParamTally) -> String {
    let mut out = String::from("Name\tCount");
    for (name, count) in tally.sorted() {
        out.push_str(&format!("\n{}\t{}", name, count));
    }
    out
}

/// CTR as `15.00%`, or `n/a` without impressions
pub fn format_ctr(stat: &WordStat) -> String {
    match stat.avg_ctr {
        Some(ctr) => format!("{:.2}%", ctr),
        None => "n/a".to_string(),
    }
}

/// Keyword table, then skipped rows if any
pub fn format_keyword_report(report: &KeywordReport) -> String {
    let mut out = String::from(KEYWORD_HEADER);
    for stat in &report.stats {
        out.push_str(&format!(
            "\n{}\t{}\t{}\t{}\t{}",
            stat.word,
            stat.occurrences,
            stat.total_clicks,
            stat.total_impressions,
            format_ctr(stat)
        ));
    }

    if !report.row_errors.is_empty() {
        out.push_str(&format!(
            "\n\n{} of {} rows skipped:",
            report.row_errors.len(),
            report.rows_total
        ));
        for error in &report.row_errors {
            out.push_str(&format!("\nRow {}: {}", error.row, error.message));
        }
    }
    out
}
