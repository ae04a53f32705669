//! Link discovery for documentation crawls.
//!
//! This crate provides:
//! - [`walker`]: fetch one page and list its same-directory links
//! - [`fetch`]: HTTP fetching with optional retry/backoff
//! - [`link`]: URL normalization keys and scope helpers

pub mod fetch;
pub mod link;
pub mod walker;

pub use fetch::Fetcher;
pub use link::{CandidateUrl, NormalizedKey, authority, base_directory};
pub use walker::{DiscoveredLinks, Walker, extract_links, parse_base};
