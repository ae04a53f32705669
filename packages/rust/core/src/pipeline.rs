//! Breadth-first crawl: seeds → walk → frontier → walk … until exhausted.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use docscout_crawler::{Walker, parse_base};
use docscout_shared::{
    CrawlConfig, CrawlReport, DocScoutError, PageFailure, Result, VisitedPage,
};

use crate::exclude::ExcludeSet;
use crate::frontier::{Frontier, FrontierEntry};

/// Callbacks fired as the crawl progresses.
///
/// This is where a content pipeline hooks in: every successfully walked page
/// is reported exactly once through [`CrawlObserver::page_visited`].
pub trait CrawlObserver: Send + Sync {
    /// Called after a page was fetched and its links merged into the frontier.
    fn page_visited(&self, page: &VisitedPage);
    /// Called when a page could not be walked. The crawl continues.
    fn page_failed(&self, failure: &PageFailure);
    /// Called once when the crawl completes.
    fn done(&self, report: &CrawlReport);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl CrawlObserver for SilentObserver {
    fn page_visited(&self, _page: &VisitedPage) {}
    fn page_failed(&self, _failure: &PageFailure) {}
    fn done(&self, _report: &CrawlReport) {}
}

/// Crawl every page reachable from `seeds`.
///
/// Up to `config.concurrency` pages are walked at once; their results are
/// merged into the frontier in worklist order, so the frontier has a single
/// writer and the visit order does not depend on network timing. A page that
/// fails to fetch is recorded and skipped.
///
/// Only invalid seeds, an empty seed list, a bad exclude pattern, or an HTTP
/// client that cannot be built fail the whole crawl.
#[instrument(skip_all, fields(seeds = seeds.len()))]
pub async fn crawl_site(
    seeds: &[String],
    config: &CrawlConfig,
    observer: &dyn CrawlObserver,
) -> Result<CrawlReport> {
    if seeds.is_empty() {
        return Err(DocScoutError::validation("at least one seed URL is required"));
    }
    for seed in seeds {
        parse_base(seed)?;
    }

    let walker = Walker::new(config)?;
    let excludes = ExcludeSet::new(&config.exclude_patterns)?;
    if !excludes.is_empty() {
        debug!(patterns = ?config.exclude_patterns, "exclude patterns active");
    }
    let batch_size = config.concurrency.max(1) as usize;

    let mut frontier = Frontier::new();
    for seed in seeds {
        frontier.seed(seed);
    }

    let started_at = Utc::now();
    let start = Instant::now();
    let mut visited: Vec<VisitedPage> = Vec::new();
    let mut failures: Vec<PageFailure> = Vec::new();
    let mut skipped: usize = 0;

    info!(
        concurrency = batch_size,
        max_depth = ?config.max_depth,
        max_pages = ?config.max_pages,
        retries = config.retries,
        "starting crawl"
    );

    while !frontier.is_exhausted() {
        let mut budget = batch_size;
        if let Some(max_pages) = config.max_pages {
            let attempted = visited.len() + failures.len();
            if attempted >= max_pages {
                info!(max_pages, pending = frontier.pending(), "page limit reached");
                break;
            }
            budget = budget.min(max_pages - attempted);
        }

        let handles: Vec<_> = frontier
            .next_batch(budget)
            .into_iter()
            .map(|entry| {
                let walker = walker.clone();
                let url = entry.url.clone();
                let handle = tokio::spawn(async move {
                    walker
                        .walk(&url)
                        .await
                        .map(|links| links.collect::<Vec<String>>())
                });
                (entry, handle)
            })
            .collect();

        for (entry, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("walk task failed: {e}")),
            };

            match outcome {
                Ok(links) => {
                    let page = VisitedPage {
                        url: entry.url.clone(),
                        depth: entry.depth,
                        discovered: links.len(),
                    };
                    skipped += enqueue_links(&mut frontier, &excludes, &entry, links, config);
                    observer.page_visited(&page);
                    visited.push(page);
                }
                Err(error) => {
                    warn!(url = %entry.url, %error, "failed to walk page, skipping");
                    let failure = PageFailure {
                        url: entry.url,
                        depth: entry.depth,
                        error,
                    };
                    observer.page_failed(&failure);
                    failures.push(failure);
                }
            }
        }
    }

    let report = CrawlReport {
        seeds: seeds.to_vec(),
        started_at,
        visited,
        failures,
        skipped,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        visited = report.visited.len(),
        failed = report.failures.len(),
        skipped = report.skipped,
        discovered = frontier.seen(),
        duration_ms = report.duration_ms,
        "crawl completed"
    );

    observer.done(&report);
    Ok(report)
}

/// Offer a page's links to the frontier. Returns how many were excluded.
fn enqueue_links(
    frontier: &mut Frontier,
    excludes: &ExcludeSet,
    parent: &FrontierEntry,
    links: Vec<String>,
    config: &CrawlConfig,
) -> usize {
    if config.max_depth.is_some_and(|max| parent.depth >= max) {
        debug!(url = %parent.url, depth = parent.depth, "depth limit reached, not following links");
        return 0;
    }

    let mut excluded = 0;
    for link in links {
        if !excludes.is_empty() && excludes.is_excluded(&link) {
            debug!(%link, "excluded by pattern");
            excluded += 1;
            continue;
        }
        if frontier.offer(link, parent.depth + 1) {
            debug!(depth = parent.depth + 1, pending = frontier.pending(), "link enqueued");
        }
    }
    excluded
}
