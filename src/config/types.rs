use serde::Deserialize;

/// Main configuration structure for SEO-Lens
///
/// Every section is optional: an empty file yields the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub filter: FilterConfig,
    pub keywords: KeywordsConfig,
    pub jobs: JobsConfig,
}

/// Outbound HTTP configuration for sitemap and robots.txt fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept_language: "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Filter URL decoding configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Host a filter URL must point at
    #[serde(rename = "expected-host")]
    pub expected_host: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_host: crate::query::DEFAULT_FILTER_HOST.to_string(),
        }
    }
}

/// Keyword aggregation and tag cloud configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    /// Default stop-word language
    pub language: String,

    /// Maximum number of words in the tag cloud
    #[serde(rename = "cloud-max-words")]
    pub cloud_max_words: usize,

    /// Smallest tag font size (pixels)
    #[serde(rename = "cloud-min-size")]
    pub cloud_min_size: u32,

    /// Largest tag font size (pixels)
    #[serde(rename = "cloud-max-size")]
    pub cloud_max_size: u32,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            cloud_max_words: 100,
            cloud_min_size: 10,
            cloud_max_size: 50,
        }
    }
}

/// How the remote job API authenticates requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// `Authorization: Token <token>`
    Token,
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `<auth-header>: <token>`
    Header,
}

/// Remote job API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Base URL of the job API (jobs live under `{base}/jobs`)
    #[serde(rename = "api-base-url")]
    pub api_base_url: String,

    /// Authentication scheme
    pub auth: AuthKind,

    /// Header name used when `auth = "header"`
    #[serde(rename = "auth-header")]
    pub auth_header: String,

    /// API token; the `SEO_LENS_API_TOKEN` environment variable takes precedence
    pub token: Option<String>,

    /// Delay between two status polls (seconds)
    #[serde(rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,

    /// Total time budget for a job (seconds)
    #[serde(rename = "max-wait-secs")]
    pub max_wait_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.botify.com/v1".to_string(),
            auth: AuthKind::Token,
            auth_header: "X-Api-Token".to_string(),
            token: None,
            poll_interval_secs: 30,
            max_wait_secs: 3600,
        }
    }
}
