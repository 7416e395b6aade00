//! Query parameter frequency tally

use indexmap::IndexMap;

/// Parameter name → occurrence count across a batch of URLs
///
/// Names keep first-seen order, which is the tie-break of [`QueryParamTally::sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamTally {
    counts: IndexMap<String, usize>,
}

impl QueryParamTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `name`
    pub fn record(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.counts.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries by descending count; equal counts keep first-seen order
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// Parameter names of a URL's query string, in order, one per occurrence
///
/// `?a=1&a=2&b=3` yields `a`, `a`, `b`. Pairs with a blank value (`a=`) or no value at
/// all (`?a`) are skipped.
/// Inputs that are not absolute URLs are handled as well since only the text after
/// the first `?` matters.
pub fn query_param_names(url: &str) -> Vec<String> {
    let without_fragment = url.split('#').next().unwrap_or("");
    let Some((_, query)) = without_fragment.split_once('?') else {
        return Vec::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .map(|(name, _)| name.into_owned())
        .collect()
}

/// Tallies parameter names across a batch of URLs
///
/// # Example
///
/// ```
/// use seo_lens::query::extract_query_params;
///
/// let tally = extract_query_params(["http://x/?a=1&b=2", "http://x/?a=3"]);
/// assert_eq!(tally.get("a"), Some(2));
/// assert_eq!(tally.get("b"), Some(1));
/// ```
pub fn extract_query_params<I, S>(urls: I) -> QueryParamTally
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tally = QueryParamTally::new();
    let mut url_count = 0usize;
    for url in urls {
        url_count += 1;
        for name in query_param_names(url.as_ref()) {
            tally.record(&name);
        }
    }
    tracing::info!(
        "Found {} distinct query parameters in {} URLs",
        tally.len(),
        url_count
    );
    tally
}
