//! Analytics filter URL decoding
//!
//! Explorer URLs of the analytics app carry their state as JSON documents inside the
//! `context` (filters) and `explorerFilter` (columns) query parameters. Decoding
//! pretty-prints both so an analyst can read or diff them.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Host filter URLs are expected on unless configured otherwise
pub const DEFAULT_FILTER_HOST: &str = "app.botify.com";

/// Filter URL validation failures
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("URL must be on {expected}, got '{found}'")]
    InvalidHost { expected: String, found: String },

    #[error("No filter parameters found in URL")]
    NoQuery,
}

/// Which encoded parameter a section came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `context`
    Filters,
    /// `explorerFilter`
    Columns,
}

impl FilterKind {
    pub fn parameter(self) -> &'static str {
        match self {
            Self::Filters => "context",
            Self::Columns => "explorerFilter",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Filters => "Filters",
            Self::Columns => "Columns",
        }
    }

    fn invalid_note(self) -> &'static str {
        match self {
            Self::Filters => "Error: Context filter is not valid JSON",
            Self::Columns => "Error: Explorer filter is not valid JSON",
        }
    }
}

/// One decoded parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSection {
    pub kind: FilterKind,
    /// Parsed document, or the inline note explaining why it could not be parsed
    pub content: Result<Value, String>,
}

/// Result of decoding a filter URL
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFilter {
    pub sections: Vec<FilterSection>,
}

impl DecodedFilter {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, kind: FilterKind) -> Option<&FilterSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

impl fmt::Display for DecodedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sections.is_empty() {
            return write!(f, "No filters found in URL");
        }

        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &section.content {
                Ok(value) => {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "---{}---", section.kind.label())?;
                    write!(f, "{}", pretty_json(value))?;
                }
                Err(note) => write!(f, "{}", note)?,
            }
        }
        Ok(())
    }
}

/// Decodes a filter URL expected on [`DEFAULT_FILTER_HOST`]
pub fn decrypt_filter_url(url: &str) -> Result<DecodedFilter, DecodeError> {
    decrypt_filter_url_for_host(url, DEFAULT_FILTER_HOST)
}

/// Decodes the `context` and `explorerFilter` parameters of a filter URL
///
/// # Arguments
///
/// * `url` - The explorer URL
/// * `expected_host` - Host (with optional `:port`) the URL must point at
///
/// # Returns
///
/// * `Ok(DecodedFilter)` - Possibly empty; invalid JSON is reported per section
/// * `Err(DecodeError)` - Wrong host or no query string at all
pub fn decrypt_filter_url_for_host(
    url: &str,
    expected_host: &str,
) -> Result<DecodedFilter, DecodeError> {
    let parsed = Url::parse(url.trim()).map_err(|e| DecodeError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let host = host_with_port(&parsed);
    if host != expected_host {
        return Err(DecodeError::InvalidHost {
            expected: expected_host.to_string(),
            found: host,
        });
    }

    if parsed.query().map_or(true, str::is_empty) {
        return Err(DecodeError::NoQuery);
    }

    let mut sections = Vec::new();
    for kind in [FilterKind::Filters, FilterKind::Columns] {
        let Some(raw) = first_value(&parsed, kind.parameter()) else {
            continue;
        };
        let content = serde_json::from_str::<Value>(&raw).map_err(|e| {
            tracing::warn!("Parameter '{}' is not valid JSON: {}", kind.parameter(), e);
            kind.invalid_note().to_string()
        });
        sections.push(FilterSection { kind, content });
    }

    Ok(DecodedFilter { sections })
}

/// Serializes JSON with 4-space indentation, leaving non-ASCII text unescaped
pub fn pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

/// First non-blank value of a query parameter
fn first_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .filter(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .next()
}

fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
