//! Runtime configuration.
//!
//! Every tunable the tracker and the fetcher use is a constructor parameter
//! ([`TrackerConfig`], [`McpConfig`]).  [`Args`] is the command-line /
//! environment surface that produces them.
//!
//! ## For contributors
//!
//! To add a new setting:
//!
//! 1. Add a field to [`Args`] (with an `env = "..."` fallback if it is
//!    something an operator would put in a deployment manifest).
//! 2. Thread it into [`Args::tracker_config`] or [`Args::mcp_config`].
//! 3. Validate it there and add a [`ConfigError`] variant if needed.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::source::McpConfig;

/// Keys tracked when `--countries` is not given.
pub const DEFAULT_COUNTRIES: [&str; 5] = ["Japan", "Germany", "Brazil", "Switzerland", "India"];

/// Undelivered items kept per key before fetching for that key pauses.
pub const DEFAULT_CAPACITY: usize = 3;

/// Pause between two refresh cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound on a single upstream fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// MCP tool invoked through `tools/call`.
pub const DEFAULT_TOOL: &str = "search_perplexity";

/// Natural-language query sent upstream; `{key}` is replaced by the key.
pub const DEFAULT_QUERY_TEMPLATE: &str =
    "Latest financial news about {key} that will affect tariffs and trade policies with {key}";

/// Placeholder substituted in the query template.
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Invalid configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one key must be configured")]
    NoKeys,
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,
    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,
    #[error("query template must contain the {{key}} placeholder")]
    TemplateMissingKey,
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Command-line arguments (each one also readable from the environment).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "news-tracker",
    version,
    about = "Caches fresh per-country news snippets and hands each one out exactly once"
)]
pub struct Args {
    /// JSON-RPC endpoint of the MCP news service.
    #[arg(long, env = "MCP_SERVER_URL")]
    pub mcp_url: String,

    /// Comma-separated list of keys (countries) to track.
    #[arg(
        long,
        env = "NEWS_COUNTRIES",
        value_delimiter = ',',
        default_values = DEFAULT_COUNTRIES
    )]
    pub countries: Vec<String>,

    /// Seconds between refresh cycles.
    #[arg(long, env = "NEWS_INTERVAL_SECS", default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
    pub interval_secs: u64,

    /// Undelivered items kept per key.
    #[arg(long, env = "NEWS_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Seconds before an upstream fetch is abandoned.
    #[arg(long, env = "NEWS_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    /// MCP tool name used for the search.
    #[arg(long, env = "NEWS_MCP_TOOL", default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Query sent upstream; `{key}` is replaced with the key.
    #[arg(long, env = "NEWS_QUERY_TEMPLATE", default_value = DEFAULT_QUERY_TEMPLATE)]
    pub query_template: String,

    /// Run without the terminal console and log to stdout.
    #[arg(long)]
    pub headless: bool,

    /// File that receives the log in every mode.
    #[arg(long, env = "NEWS_LOG_FILE", default_value = "news-tracker.log")]
    pub log_file: PathBuf,
}

impl Args {
    /// Build and validate the tracker configuration.
    pub fn tracker_config(&self) -> Result<TrackerConfig, ConfigError> {
        TrackerConfig::new(
            self.countries.iter().map(String::as_str),
            self.capacity,
            Duration::from_secs(self.interval_secs),
        )
    }

    /// Build and validate the upstream fetcher configuration.
    pub fn mcp_config(&self) -> Result<McpConfig, ConfigError> {
        if !self.query_template.contains(KEY_PLACEHOLDER) {
            return Err(ConfigError::TemplateMissingKey);
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(McpConfig {
            url: self.mcp_url.clone(),
            tool: self.tool.clone(),
            query_template: self.query_template.clone(),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
        })
    }
}

// ---------------------------------------------------------------------------
// Tracker configuration
// ---------------------------------------------------------------------------

/// Settings that shape the cache and its refresh loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// The fixed key set, in processing order.
    pub keys: Vec<String>,
    /// Maximum undelivered items per key.
    pub capacity: usize,
    /// Pause between the end of one refresh cycle and the start of the next.
    pub refresh_interval: Duration,
}

impl TrackerConfig {
    /// Validate and normalise a configuration.
    ///
    /// Keys are trimmed, blank keys are dropped and repeated keys keep only
    /// their first occurrence, so construction order is preserved.
    pub fn new<'a>(
        keys: impl IntoIterator<Item = &'a str>,
        capacity: usize,
        refresh_interval: Duration,
    ) -> Result<Self, ConfigError> {
        let mut unique: Vec<String> = Vec::new();
        for key in keys.into_iter().map(str::trim).filter(|k| !k.is_empty()) {
            if !unique.iter().any(|k| k == key) {
                unique.push(key.to_string());
            }
        }

        if unique.is_empty() {
            return Err(ConfigError::NoKeys);
        }
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if refresh_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(Self {
            keys: unique,
            capacity,
            refresh_interval,
        })
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            keys: DEFAULT_COUNTRIES.iter().map(|k| k.to_string()).collect(),
            capacity: DEFAULT_CAPACITY,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["news-tracker", "--mcp-url", "http://localhost:9/mcp"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn default_config_tracks_five_countries() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.keys, DEFAULT_COUNTRIES);
        assert_eq!(cfg.capacity, 3);
        assert_eq!(cfg.refresh_interval, Duration::from_secs(30));
    }

    #[test]
    fn keys_are_trimmed_and_deduplicated_in_order() {
        let cfg = TrackerConfig::new(
            [" Japan", "Germany ", "", "Japan", "  ", "Brazil"],
            3,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(cfg.keys, ["Japan", "Germany", "Brazil"]);
    }

    #[test]
    fn empty_key_set_is_rejected() {
        let err = TrackerConfig::new(["", " "], 3, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err, ConfigError::NoKeys);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = TrackerConfig::new(["Japan"], 0, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = TrackerConfig::new(["Japan"], 3, Duration::ZERO).unwrap_err();
        assert_eq!(err, ConfigError::ZeroInterval);
    }

    #[test]
    fn args_use_defaults_when_only_url_given() {
        let args = parse(&[]);
        assert_eq!(args.countries, DEFAULT_COUNTRIES);
        assert_eq!(args.interval_secs, 30);
        assert_eq!(args.capacity, 3);
        assert_eq!(args.fetch_timeout_secs, 30);
        assert_eq!(args.tool, DEFAULT_TOOL);
        assert!(!args.headless);
    }

    #[test]
    fn countries_flag_splits_on_commas() {
        let args = parse(&["--countries", "Japan,Germany"]);
        let cfg = args.tracker_config().unwrap();
        assert_eq!(cfg.keys, ["Japan", "Germany"]);
    }

    #[test]
    fn mcp_config_carries_url_tool_and_timeout() {
        let args = parse(&["--tool", "search", "--fetch-timeout-secs", "5"]);
        let mcp = args.mcp_config().unwrap();
        assert_eq!(mcp.url, "http://localhost:9/mcp");
        assert_eq!(mcp.tool, "search");
        assert_eq!(mcp.timeout, Duration::from_secs(5));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let args = parse(&["--query-template", "news please"]);
        assert_eq!(args.mcp_config().unwrap_err(), ConfigError::TemplateMissingKey);
    }

    #[test]
    fn zero_fetch_timeout_is_rejected() {
        let args = parse(&["--fetch-timeout-secs", "0"]);
        assert_eq!(args.mcp_config().unwrap_err(), ConfigError::ZeroTimeout);
    }
}
