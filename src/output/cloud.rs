//! HTML tag cloud
//!
//! Renders the most frequent words as a standalone page. Font size follows the
//! occurrence count and colour follows clicks, from red (most clicked) to green.

use crate::config::KeywordsConfig;
use crate::keywords::WordStat;
use crate::output::text::format_ctr;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Hue of the least clicked words, as a fraction of the colour wheel
const MAX_HUE: f64 = 0.4;
const LIGHTNESS: f64 = 0.5;
const SATURATION: f64 = 0.7;

/// Tag cloud rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudOptions {
    pub max_words: usize,
    /// Font size of the least frequent word (px)
    pub min_size: u32,
    /// Font size of the most frequent word (px)
    pub max_size: u32,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            max_words: 100,
            min_size: 10,
            max_size: 50,
        }
    }
}

impl From<&KeywordsConfig> for CloudOptions {
    fn from(config: &KeywordsConfig) -> Self {
        Self {
            max_words: config.cloud_max_words,
            min_size: config.cloud_min_size,
            max_size: config.cloud_max_size,
        }
    }
}

/// Builds the tag cloud page for the top `max_words` words
///
/// `stats` is expected sorted by descending occurrences, as returned by
/// [`crate::keywords::analyze_keywords`].
pub fn generate_word_cloud_html(stats: &[WordStat], options: &CloudOptions) -> String {
    let top = &stats[..stats.len().min(options.max_words)];
    let max_occurrences = top.iter().map(|s| s.occurrences).max().unwrap_or(0);
    let max_clicks = top.iter().map(|s| s.total_clicks).max().unwrap_or(0);

    let items: Vec<String> = top
        .iter()
        .map(|stat| {
            let size = font_size(stat.occurrences, max_occurrences, options);
            let (r, g, b) = click_color(stat.total_clicks, max_clicks);
            let title = format!(
                "Word: {}\nOccurrences: {}\nClicks: {}\nCTR: {}",
                stat.word,
                stat.occurrences,
                stat.total_clicks,
                format_ctr(stat)
            );
            format!(
                "<span class=\"word\" style=\"font-size: {}px; color: rgb({},{},{});\" title=\"{}\">{}</span>",
                size,
                r,
                g,
                b,
                encode_double_quoted_attribute(&title),
                encode_text(&stat.word)
            )
        })
        .collect();

    page(&items.join(" "))
}

/// `min + occurrences / max * (max_size - min_size)`, truncated to whole pixels
fn font_size(occurrences: u64, max_occurrences: u64, options: &CloudOptions) -> u32 {
    if max_occurrences == 0 {
        return options.min_size;
    }
    let ratio = occurrences as f64 / max_occurrences as f64;
    let span = options.max_size.saturating_sub(options.min_size) as f64;
    (options.min_size as f64 + ratio * span) as u32
}

fn click_color(clicks: u64, max_clicks: u64) -> (u8, u8, u8) {
    let normalized = if max_clicks == 0 {
        0.0
    } else {
        clicks as f64 / max_clicks as f64
    };
    let (r, g, b) = hls_to_rgb((1.0 - normalized) * MAX_HUE, LIGHTNESS, SATURATION);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// HLS to RGB, all components in `0.0..=1.0`
pub fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hue_channel(m1, m2, h + 1.0 / 3.0),
        hue_channel(m1, m2, h),
        hue_channel(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

fn page(items: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Tag Cloud</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            text-align: center;
            background-color: #f4f4f4;
        }}
        #word-cloud {{
            display: flex;
            flex-wrap: wrap;
            justify-content: center;
            align-items: center;
            max-width: 1200px;
            margin: 20px auto;
            padding: 20px;
            background-color: white;
            box-shadow: 0 0 10px rgba(0,0,0,0.1);
        }}
        .word {{
            margin: 5px;
            padding: 5px;
            border-radius: 5px;
            transition: transform 0.3s ease;
            cursor: help;
        }}
        .word:hover {{
            transform: scale(1.1);
            box-shadow: 0 0 10px rgba(0,0,0,0.2);
        }}
    </style>
</head>
<body>
    <h1>Tag Cloud</h1>
    <div id="word-cloud">
        {}
    </div>
</body>
</html>
"#,
        items
    )
}
