//! Shared types, error model, and configuration for docscout.
//!
//! This crate is the foundation depended on by all other docscout crates.
//! It provides:
//! - [`DocScoutError`]: the unified error type
//! - Report types ([`CrawlReport`], [`VisitedPage`], [`PageFailure`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, DEFAULT_USER_AGENT, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{DocScoutError, Result};
pub use types::{CrawlReport, PageFailure, VisitedPage};
