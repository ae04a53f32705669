//! Report types produced by a crawl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VisitedPage / PageFailure
// ---------------------------------------------------------------------------

/// A page that was fetched and scanned for links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedPage {
    /// The URL as it was enqueued (may carry a fragment).
    pub url: String,
    /// Link distance from the nearest seed.
    pub depth: u32,
    /// Number of in-scope links the page yielded.
    pub discovered: usize,
}

/// A page whose walk failed. The crawl carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    /// The URL as it was enqueued.
    pub url: String,
    /// Link distance from the nearest seed.
    pub depth: u32,
    /// Human-readable error.
    pub error: String,
}

// ---------------------------------------------------------------------------
// CrawlReport
// ---------------------------------------------------------------------------

/// Summary of a completed crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Seed URLs the crawl started from.
    pub seeds: Vec<String>,
    /// When the crawl started.
    pub started_at: DateTime<Utc>,
    /// Pages walked successfully, in visit order.
    pub visited: Vec<VisitedPage>,
    /// Pages that could not be walked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PageFailure>,
    /// Discovered links dropped by exclude patterns.
    pub skipped: usize,
    /// Wall-clock duration of the crawl.
    pub duration_ms: u64,
}

impl CrawlReport {
    /// URLs of every successfully visited page, in visit order.
    pub fn visited_urls(&self) -> impl Iterator<Item = &str> {
        self.visited.iter().map(|p| p.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serialization_omits_empty_failures() {
        let report = CrawlReport {
            seeds: vec!["https://example.com/docs/".into()],
            started_at: Utc::now(),
            visited: vec![VisitedPage {
                url: "https://example.com/docs/".into(),
                depth: 0,
                discovered: 3,
            }],
            failures: vec![],
            skipped: 0,
            duration_ms: 12,
        };

        let json = serde_json::to_string(&report).expect("serialize");
        assert!(!json.contains("failures"));

        let parsed: CrawlReport = serde_json::from_str(&json).expect("deserialize");
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.visited_urls().collect::<Vec<_>>(), vec!["https://example.com/docs/"]);
    }
}
