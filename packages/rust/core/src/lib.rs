//! Crawl orchestration for docscout.
//!
//! This crate drives the single-page [`docscout_crawler::Walker`] over a
//! breadth-first worklist until every reachable page in scope was visited.

pub mod exclude;
pub mod frontier;
pub mod pipeline;

pub use exclude::ExcludeSet;
pub use frontier::{Frontier, FrontierEntry};
pub use pipeline::{CrawlObserver, SilentObserver, crawl_site};
