//! Application configuration for docscout.
//!
//! User config lives at `~/.docscout/docscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docscout";

/// User-Agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("docscout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Config structs (matching docscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl defaults.
    #[serde(default)]
    pub crawl: CrawlSection,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of pages walked at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Retries for transient fetch failures. 0 disables retrying.
    #[serde(default)]
    pub retries: u32,

    /// Base delay for exponential retry backoff.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum link distance from a seed. Unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,

    /// Maximum number of pages to walk. Unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// Glob patterns on the URL path; matching links are never enqueued.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
            retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            max_depth: None,
            max_pages: None,
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_concurrency() -> u32 {
    1
}
fn default_retry_backoff_ms() -> u64 {
    500
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, merged from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Number of pages walked at once (at least 1).
    pub concurrency: u32,
    /// Retries for transient fetch failures.
    pub retries: u32,
    /// Base delay for exponential retry backoff, in ms.
    pub retry_backoff_ms: u64,
    /// Maximum link distance from a seed.
    pub max_depth: Option<u32>,
    /// Maximum number of pages to walk.
    pub max_pages: Option<usize>,
    /// URL path glob patterns excluded from the frontier.
    pub exclude_patterns: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        let crawl = &config.crawl;
        Self {
            timeout_secs: crawl.timeout_secs,
            user_agent: crawl.user_agent.clone(),
            concurrency: crawl.concurrency.max(1),
            retries: crawl.retries,
            retry_backoff_ms: crawl.retry_backoff_ms,
            max_depth: crawl.max_depth,
            max_pages: crawl.max_pages,
            exclude_patterns: crawl.exclude_patterns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docscout/docscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DocScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[crawl]"));
        assert!(toml_str.contains("timeout_secs = 30"));
        // Unlimited limits are left out of the file entirely.
        assert!(!toml_str.contains("max_depth"));
    }

    #[test]
    fn partial_section_falls_back_to_defaults() {
        let toml_str = r#"
[crawl]
concurrency = 4
max_depth = 2
exclude_patterns = ["/docs/api/**"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.concurrency, 4);
        assert_eq!(config.crawl.max_depth, Some(2));
        assert_eq!(config.crawl.max_pages, None);
        assert_eq!(config.crawl.timeout_secs, 30);
        assert_eq!(config.crawl.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.crawl.exclude_patterns, vec!["/docs/api/**"]);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.crawl.retries, 0);
        assert_eq!(config.crawl.retry_backoff_ms, 500);
    }

    #[test]
    fn crawl_config_from_app_config() {
        let mut app = AppConfig::default();
        app.crawl.concurrency = 0;
        app.crawl.max_pages = Some(10);

        let crawl = CrawlConfig::from(&app);
        assert_eq!(crawl.concurrency, 1);
        assert_eq!(crawl.max_pages, Some(10));
        assert_eq!(crawl.timeout_secs, 30);
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("docscout-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[crawl\nconcurrency = ").expect("write fixture");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to parse"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
