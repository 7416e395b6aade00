//! SEO-Lens main entry point
//!
//! This is the command-line interface for the SEO-Lens toolbox.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use seo_lens::config::{load_config_with_hash, Config};
use seo_lens::http::build_http_client;
use seo_lens::jobs::{download_artifact, HttpJobApi, JobOutcome, JobPoller, TokioClock};
use seo_lens::keywords::analyze_keywords;
use seo_lens::output::{
    format_keyword_report, format_param_tally, format_robots_verdicts, format_sitemap_report,
    generate_word_cloud_html, write_rendering, CloudOptions,
};
use seo_lens::progress::ProgressSink;
use seo_lens::query::{decrypt_filter_url_for_host, extract_query_params};
use seo_lens::reports::read_url_column;
use seo_lens::robots::{check_urls, fetch_robots_txt, RobotsRuleSet};
use seo_lens::sitemap::analyze_sitemap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// SEO-Lens: an SEO analyst's toolbox
///
/// SEO-Lens crawls sitemaps, checks URLs against robots.txt, tallies query
/// parameters, decodes analytics filter URLs, aggregates keyword reports and
/// drives remote export jobs.
#[derive(Parser, Debug)]
#[command(name = "seo-lens")]
#[command(version = "1.0.0")]
#[command(about = "An SEO analyst's toolbox", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every URL and hreflang alternate of a sitemap (or sitemap index)
    Sitemap {
        /// Sitemap URL
        url: String,
    },

    /// Robots.txt retrieval and evaluation
    Robots {
        #[command(subcommand)]
        command: RobotsCommand,
    },

    /// Tally query parameter names across the URLs of a crawl export
    Params {
        /// Crawl export (CSV or zipped CSV, URLs in the first column)
        file: PathBuf,

        /// Read one URL per line instead of a CSV export
        #[arg(long)]
        plain: bool,
    },

    /// Decode the filters and columns encoded in an analytics explorer URL
    DecodeFilter {
        /// Explorer URL
        url: String,
    },

    /// Aggregate clicks and impressions per word of a keyword report
    Keywords {
        /// Keyword export (CSV or zipped CSV)
        file: PathBuf,

        /// Stop-word language (defaults to the configured one)
        #[arg(short, long)]
        language: Option<String>,

        /// Rendering of the result
        #[arg(short, long, value_enum, default_value_t = KeywordFormat::Table)]
        format: KeywordFormat,
    },

    /// Submit an export job, wait for it and optionally fetch the export
    Job {
        /// JSON file holding the job definition
        #[arg(long, value_name = "JSON_FILE")]
        request: PathBuf,

        /// Seconds between two status checks
        #[arg(long)]
        interval: Option<u64>,

        /// Give up after this many seconds
        #[arg(long)]
        max_wait: Option<u64>,

        /// Save the exported file (inflated when gzipped) into this directory
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum RobotsCommand {
    /// Download and print a robots.txt file
    Fetch {
        /// robots.txt URL
        url: String,
    },

    /// Check URLs against a robots.txt file
    Check {
        /// robots.txt location (local file or http(s) URL)
        #[arg(long, value_name = "FILE|URL")]
        robots: String,

        /// User agent to evaluate rules for
        #[arg(long, default_value = "Googlebot")]
        user_agent: String,

        /// File with one URL per line (stdin when omitted)
        #[arg(long, value_name = "FILE")]
        urls: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KeywordFormat {
    /// Tab-separated table
    Table,
    /// Standalone HTML tag cloud
    Cloud,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let rendering = match cli.command {
        Command::Sitemap { url } => handle_sitemap(&config, url, cli.quiet).await?,
        Command::Robots { command } => handle_robots(&config, command).await?,
        Command::Params { file, plain } => handle_params(file, plain, cli.quiet).await?,
        Command::DecodeFilter { url } => handle_decode_filter(&config, &url)?,
        Command::Keywords {
            file,
            language,
            format,
        } => handle_keywords(&config, file, language, format, cli.quiet).await?,
        Command::Job {
            request,
            interval,
            max_wait,
            download,
        } => handle_job(&config, &request, interval, max_wait, download.as_deref()).await?,
    };

    write_rendering(&rendering, cli.output.as_deref())?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_lens=info,warn"),
            1 => EnvFilter::new("seo_lens=debug,info"),
            2 => EnvFilter::new("seo_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Percentage progress rendered as a terminal bar
#[derive(Clone)]
struct BarProgress(ProgressBar);

impl BarProgress {
    fn new(message: &'static str, quiet: bool) -> Self {
        if quiet {
            return Self(ProgressBar::hidden());
        }
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message(message);
        Self(bar)
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn report(&self, percent: u8) {
        self.0.set_position(u64::from(percent.min(100)));
    }
}

/// Handles `sitemap`: crawls on its own task and renders the TSV table
async fn handle_sitemap(config: &Config, url: String, quiet: bool) -> anyhow::Result<String> {
    let client = build_http_client(&config.http)?;
    let bar = BarProgress::new("Analyzing sitemap...", quiet);

    let task_bar = bar.clone();
    let report = tokio::spawn(async move { analyze_sitemap(&client, &url, &task_bar).await })
        .await
        .context("Sitemap task failed")?;
    bar.finish();

    Ok(format_sitemap_report(&report?))
}

/// Handles `robots fetch` and `robots check`
async fn handle_robots(config: &Config, command: RobotsCommand) -> anyhow::Result<String> {
    let client = build_http_client(&config.http)?;

    match command {
        RobotsCommand::Fetch { url } => Ok(fetch_robots_txt(&client, &url).await?),
        RobotsCommand::Check {
            robots,
            user_agent,
            urls,
        } => {
            let body = if robots.starts_with("http://") || robots.starts_with("https://") {
                fetch_robots_txt(&client, &robots).await?
            } else {
                std::fs::read_to_string(&robots)
                    .with_context(|| format!("Failed to read {}", robots))?
            };
            let rules = RobotsRuleSet::parse(&body)?;

            let list = match urls {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut list = String::new();
                    std::io::stdin().read_to_string(&mut list)?;
                    list
                }
            };

            let verdicts = check_urls(&rules, list.lines(), &user_agent);
            if verdicts.is_empty() {
                bail!("No URLs to check");
            }
            tracing::info!(
                "Checked {} URLs against robots.txt for '{}'",
                verdicts.len(),
                user_agent
            );
            Ok(format_robots_verdicts(&verdicts))
        }
    }
}

/// Handles `params`: reads the URL list off the async runtime, then tallies names
async fn handle_params(file: PathBuf, plain: bool, quiet: bool) -> anyhow::Result<String> {
    let bar = BarProgress::new("Reading URLs...", quiet);

    let task_bar = bar.clone();
    let urls = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<String>> {
        if plain {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            task_bar.report(100);
            Ok(text.lines().map(str::to_string).collect())
        } else {
            Ok(read_url_column(&file, &task_bar)?)
        }
    })
    .await
    .context("URL reading task failed")??;
    bar.finish();

    let tally = extract_query_params(&urls);
    Ok(format_param_tally(&tally))
}

/// Handles `decode-filter`
fn handle_decode_filter(config: &Config, url: &str) -> anyhow::Result<String> {
    let decoded = decrypt_filter_url_for_host(url, &config.filter.expected_host)?;
    Ok(decoded.to_string())
}

/// Handles `keywords`: aggregation runs on a blocking thread
async fn handle_keywords(
    config: &Config,
    file: PathBuf,
    language: Option<String>,
    format: KeywordFormat,
    quiet: bool,
) -> anyhow::Result<String> {
    let language = language.unwrap_or_else(|| config.keywords.language.clone());
    let bar = BarProgress::new("Analyzing keywords...", quiet);

    let task_bar = bar.clone();
    let report =
        tokio::task::spawn_blocking(move || analyze_keywords(&file, &language, &task_bar))
            .await
            .context("Keyword task failed")??;
    bar.finish();

    Ok(match format {
        KeywordFormat::Table => format_keyword_report(&report),
        KeywordFormat::Cloud => {
            let options = CloudOptions::from(&config.keywords);
            generate_word_cloud_html(&report.stats, &options)
        }
    })
}

/// Handles `job`: submits and polls until done; Ctrl-C stops the wait
async fn handle_job(
    config: &Config,
    request: &Path,
    interval: Option<u64>,
    max_wait: Option<u64>,
    download: Option<&Path>,
) -> anyhow::Result<String> {
    let body = std::fs::read_to_string(request)
        .with_context(|| format!("Failed to read {}", request.display()))?;
    let request: serde_json::Value = serde_json::from_str(&body)
        .with_context(|| format!("{} is not valid JSON", request.display()))?;

    let mut jobs = config.jobs.clone();
    if let Some(interval) = interval {
        jobs.poll_interval_secs = interval;
    }
    if let Some(max_wait) = max_wait {
        jobs.max_wait_secs = max_wait;
    }
    if jobs.poll_interval_secs == 0 {
        bail!("Poll interval must be at least one second");
    }

    if let Some(dir) = download {
        if !dir.is_dir() {
            bail!("Download directory {} does not exist", dir.display());
        }
    }

    let client = build_http_client(&config.http)?;
    let api = HttpJobApi::from_config(client.clone(), &jobs)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling job wait");
            ctrl_c.cancel();
        }
    });

    let poller = JobPoller::from_config(api, TokioClock::new(), &jobs).with_cancellation(cancel);
    tracing::info!(
        "Polling every {}s for at most {}s",
        jobs.poll_interval_secs,
        jobs.max_wait_secs
    );

    let outcome = tokio::spawn(async move { poller.submit_and_await(&request).await })
        .await
        .context("Job task failed")??;

    let download_url = match outcome {
        JobOutcome::Completed { download_url } => download_url,
        JobOutcome::CompletedWithoutArtifact => {
            return Ok("Job finished without a download URL".to_string())
        }
    };

    let Some(dir) = download else {
        return Ok(format!("Download URL: {}", download_url));
    };
    let artifact = download_artifact(&client, &download_url, dir)
        .await
        .with_context(|| format!("Failed to download {}", download_url))?;
    Ok(format!(
        "Download URL: {}\nSaved to: {}",
        download_url,
        artifact.report_path().display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_keywords_command() {
        let cli = Cli::parse_from([
            "seo-lens",
            "keywords",
            "report.zip",
            "--format",
            "cloud",
            "-l",
            "french",
        ]);
        match cli.command {
            Command::Keywords {
                file,
                language,
                format,
            } => {
                assert_eq!(file, PathBuf::from("report.zip"));
                assert_eq!(language.as_deref(), Some("french"));
                assert_eq!(format, KeywordFormat::Cloud);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_job_download_dir() {
        let cli = Cli::parse_from([
            "seo-lens",
            "job",
            "--request",
            "export.json",
            "--download",
            "exports",
        ]);
        match cli.command {
            Command::Job {
                request,
                download,
                interval,
                ..
            } => {
                assert_eq!(request, PathBuf::from("export.json"));
                assert_eq!(download, Some(PathBuf::from("exports")));
                assert_eq!(interval, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["seo-lens", "decode-filter", "https://x/", "-o", "out.txt", "-vv"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.verbose, 2);
    }
}
