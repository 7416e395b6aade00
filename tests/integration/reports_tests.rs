//! Keyword aggregation and URL extraction on report files

use seo_lens::keywords::{analyze_keywords, AggregationError};
use seo_lens::output::{format_keyword_report, generate_word_cloud_html, CloudOptions};
use seo_lens::query::extract_query_params;
use seo_lens::reports::{read_url_column, ReportError};
use seo_lens::NoProgress;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

const KEYWORDS: &str = "sep=,\n\
Keyword,Clicks,Impressions,Position\n\
chaussures de randonnée,30,200,2.1\n\
chaussures homme,10,100,4.0\n\
\"randonnée, montagne\",0,0,12.5\n\
bâtons de marche,oops,50,8.0\n";

fn zipped(dir: &TempDir, name: &str, inner: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    writer.start_file(inner, FileOptions::default()).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap();
    path
}

#[test]
fn test_keywords_from_zip() {
    let dir = TempDir::new().unwrap();
    let path = zipped(&dir, "keywords.zip", "keywords.csv", KEYWORDS);

    let report = analyze_keywords(&path, "french", &NoProgress).unwrap();
    assert_eq!(report.rows_total, 4);
    assert_eq!(report.rows_processed, 3);
    assert_eq!(report.row_errors.len(), 1);
    assert_eq!(report.row_errors[0].row, 4);

    let summary: Vec<(&str, u64, u64, Option<f64>)> = report
        .stats
        .iter()
        .map(|s| (s.word.as_str(), s.occurrences, s.total_clicks, s.avg_ctr))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("chaussures", 2, 40, Some(13.33)),
            ("randonnée", 2, 30, Some(15.0)),
            ("homme", 1, 10, Some(10.0)),
            ("montagne", 1, 0, None),
        ]
    );

    let table = format_keyword_report(&report);
    assert!(table.contains("\nmontagne\t1\t0\t0\tn/a"));
    assert!(table.contains("Row 4: invalid Clicks value 'oops'"));

    let html = generate_word_cloud_html(&report.stats, &CloudOptions::default());
    assert!(html.contains(">randonnée</span>"));
}

#[test]
fn test_occurrences_match_distinct_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keywords.csv");
    std::fs::write(
        &path,
        "sep=,\nKeyword,Clicks,Impressions\nrust rust,1,10\nrust crate,1,10\ncrate,1,10\n",
    )
    .unwrap();

    let report = analyze_keywords(&path, "english", &NoProgress).unwrap();
    let total: u64 = report.stats.iter().map(|s| s.occurrences).sum();
    assert!(total as usize >= report.rows_processed);
    assert_eq!(report.stats[0].word, "rust");
    assert_eq!(report.stats[0].occurrences, 2);
    assert_eq!(report.stats[1].word, "crate");
    assert_eq!(report.stats[1].occurrences, 2);
}

#[test]
fn test_keywords_missing_file() {
    let result = analyze_keywords(
        std::path::Path::new("/nonexistent/keywords.csv"),
        "english",
        &NoProgress,
    );
    assert!(matches!(
        result,
        Err(AggregationError::Report(ReportError::Io(_)))
    ));
}

#[test]
fn test_url_column_from_zip_feeds_param_tally() {
    let dir = TempDir::new().unwrap();
    let path = zipped(
        &dir,
        "crawl.ZIP",
        "crawl.csv",
        "sep=,\nFull URL,HTTP Code\n\
         https://example.com/shop?color=red&size=m,200\n\
         https://example.com/shop?color=blue,200\n\
         https://example.com/,200\n",
    );

    let urls = read_url_column(&path, &NoProgress).unwrap();
    assert_eq!(urls.len(), 3);

    let tally = extract_query_params(&urls);
    assert_eq!(tally.sorted(), vec![("color", 2), ("size", 1)]);
}
