//! Configuration management for Quill services.
//!
//! All Quill services share a unified configuration file at `~/.quill/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (QUILL_* prefix)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `QUILL_LOG_LEVEL` → observability.log_level
//! - `QUILL_LOG_FORMAT` → observability.log_format
//! - `QUILL_WATCHLIST` → markets.watchlist (comma-separated symbols)
//! - `QUILL_FETCH_TIMEOUT_SECS` → markets.fetch_timeout_secs
//! - `QUILL_MAX_CONCURRENT_FETCHES` → markets.max_concurrent_fetches

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".quill"),
        |dirs| dirs.home_dir().join(".quill"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure for all Quill services.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Markets engine configuration
    #[serde(default)]
    pub markets: MarketsConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable fallbacks.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.markets.normalize();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        // Log level / format overrides
        if let Ok(level) = std::env::var("QUILL_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("QUILL_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        // Watchlist override (comma-separated symbols)
        if let Ok(list) = std::env::var("QUILL_WATCHLIST") {
            let symbols: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !symbols.is_empty() {
                self.markets.watchlist = symbols;
            }
        }

        // Fetch tuning overrides
        if let Ok(secs) = std::env::var("QUILL_FETCH_TIMEOUT_SECS") {
            if let Ok(v) = secs.parse() {
                self.markets.fetch_timeout_secs = v;
            }
        }
        if let Ok(n) = std::env::var("QUILL_MAX_CONCURRENT_FETCHES") {
            if let Ok(v) = n.parse() {
                self.markets.max_concurrent_fetches = v;
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = config_path();
        let dir = config_dir();

        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Aliases: "level" for backward compatibility with existing config files
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    /// Aliases: "format" for backward compatibility with existing config files
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to exclude from logging.
    ///
    /// These modules will be set to `warn` level to reduce noise.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Markets Configuration
// ============================================================================

/// Markets engine configuration.
///
/// The watchlist is injected here rather than held as process state: scans
/// read whatever list the config carries at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketsConfig {
    /// Symbols scanned when the caller does not supply a universe
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,

    /// Per-call timeout for market data fetches, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Upper bound on concurrent per-symbol fetches during a scan
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Number of ranked candidates a scan returns
    #[serde(default = "default_scan_top_n")]
    pub scan_top_n: usize,

    /// Number of candidates per idea bucket
    #[serde(default = "default_idea_bucket_size")]
    pub idea_bucket_size: usize,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            watchlist: default_watchlist(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            scan_top_n: default_scan_top_n(),
            idea_bucket_size: default_idea_bucket_size(),
        }
    }
}

impl MarketsConfig {
    /// Per-call fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Clamp loaded values into their supported ranges.
    ///
    /// Quote and chart endpoints tolerate 8-15 s timeouts; anything outside
    /// that range in a config file is almost always a typo.
    pub fn normalize(&mut self) {
        self.fetch_timeout_secs = self.fetch_timeout_secs.clamp(8, 15);
        self.max_concurrent_fetches = self.max_concurrent_fetches.max(1);
        self.scan_top_n = self.scan_top_n.max(1);
        self.idea_bucket_size = self.idea_bucket_size.max(1);
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_scan_top_n() -> usize {
    10
}

fn default_idea_bucket_size() -> usize {
    5
}

/// Default watchlist of liquid US large caps.
pub fn default_watchlist() -> Vec<String> {
    [
        // Megacap tech
        "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "AVGO", "AMD", "CRM", "ORCL",
        // Financials
        "JPM", "BAC", "GS", "V", "MA",
        // Healthcare
        "JNJ", "UNH", "LLY", "MRK",
        // Energy
        "XOM", "CVX",
        // Consumer & media
        "WMT", "COST", "PG", "KO", "PEP", "MCD", "HD", "NKE", "DIS", "NFLX",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.markets.fetch_timeout_secs, 10);
        assert_eq!(config.markets.max_concurrent_fetches, 4);
        assert!(config.markets.watchlist.contains(&"AAPL".to_string()));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.markets.watchlist, config.markets.watchlist);
        assert_eq!(parsed.markets.scan_top_n, config.markets.scan_top_n);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "observability": { "level": "debug" },
                "markets": { "watchlist": ["SPY", "QQQ"], "fetch_timeout_secs": 12 }
            }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.markets.watchlist, vec!["SPY", "QQQ"]);
        assert_eq!(config.markets.fetch_timeout_secs, 12);
        // Unspecified fields fall back to defaults
        assert_eq!(config.markets.max_concurrent_fetches, 4);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("QUILL_WATCHLIST", "tsla, nvda,,amd");
        std::env::set_var("QUILL_LOG_LEVEL", "trace");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.markets.watchlist, vec!["TSLA", "NVDA", "AMD"]);
        assert_eq!(config.observability.log_level, "trace");

        std::env::remove_var("QUILL_WATCHLIST");
        std::env::remove_var("QUILL_LOG_LEVEL");
    }

    #[test]
    fn test_normalize_clamps_timeout() {
        let mut markets = MarketsConfig {
            fetch_timeout_secs: 120,
            max_concurrent_fetches: 0,
            ..MarketsConfig::default()
        };
        markets.normalize();
        assert_eq!(markets.fetch_timeout_secs, 15);
        assert_eq!(markets.max_concurrent_fetches, 1);

        let mut markets = MarketsConfig {
            fetch_timeout_secs: 1,
            ..MarketsConfig::default()
        };
        markets.normalize();
        assert_eq!(markets.fetch_timeout_secs, 8);
    }
}
