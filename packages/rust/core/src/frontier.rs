//! Crawl worklist and visited set.

use std::collections::{HashSet, VecDeque};

use docscout_crawler::NormalizedKey;
use tracing::trace;

/// A URL waiting to be walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    /// Link distance from the nearest seed.
    pub depth: u32,
}

/// FIFO worklist plus the set of every key ever enqueued.
///
/// A key enters `seen` when its URL is enqueued and never leaves, so each
/// page is walked at most once per crawl no matter how many pages link to it
/// or which fragment they use.
#[derive(Debug, Default)]
pub struct Frontier {
    worklist: VecDeque<FrontierEntry>,
    seen: HashSet<NormalizedKey>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a seed at depth 0.
    pub fn seed(&mut self, url: &str) -> bool {
        self.offer(url.to_string(), 0)
    }

    /// Enqueue `url` unless its key was already seen or it does not parse.
    /// Returns whether it was enqueued.
    pub fn offer(&mut self, url: String, depth: u32) -> bool {
        let Some(key) = NormalizedKey::parse(&url) else {
            trace!(%url, "unparseable link");
            return false;
        };
        if self.seen.contains(&key) {
            trace!(%key, "already seen");
            return false;
        }
        self.seen.insert(key);
        self.worklist.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pop up to `n` entries in FIFO order.
    pub fn next_batch(&mut self, n: usize) -> Vec<FrontierEntry> {
        let n = n.min(self.worklist.len());
        self.worklist.drain(..n).collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.worklist.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.worklist.len()
    }

    /// Number of distinct keys ever enqueued.
    pub fn seen(&self) -> usize {
        self.seen.len()
    }
}
