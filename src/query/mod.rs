//! Query-string analysis
//!
//! Two independent tools live here:
//! - a frequency tally of parameter names across a batch of URLs
//! - a decoder for the JSON-in-query filter encoding of analytics explorer URLs

mod filter;
mod params;

pub use filter::{
    decrypt_filter_url, decrypt_filter_url_for_host, pretty_json, DecodeError, DecodedFilter,
    FilterKind, FilterSection, DEFAULT_FILTER_HOST,
};
pub use params::{extract_query_params, query_param_names, QueryParamTally};
