//! Single-page link walker.
//!
//! A walk fetches one HTML page and yields the links on it that stay inside
//! the page's directory on the same host, deduplicated by [`NormalizedKey`]
//! in document order. It never recurses; the crawl loop in `docscout-core`
//! feeds discovered links back in.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, instrument, trace};
use url::Url;

use docscout_shared::{CrawlConfig, DocScoutError, Result};

use crate::fetch::Fetcher;
use crate::link::{CandidateUrl, NormalizedKey, base_directory};

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector parses"));

// ---------------------------------------------------------------------------
// DiscoveredLinks
// ---------------------------------------------------------------------------

/// The links found by one walk, in first-seen document order.
#[derive(Debug, Clone)]
pub struct DiscoveredLinks {
    inner: std::vec::IntoIter<String>,
}

impl Iterator for DiscoveredLinks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DiscoveredLinks {}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Fetches a page and lists its in-scope links.
#[derive(Debug, Clone)]
pub struct Walker {
    fetcher: Fetcher,
}

impl Walker {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
        })
    }

    /// Fetch `base_url` and return the links it contributes to the crawl.
    ///
    /// Fails with [`DocScoutError::InvalidUrl`] before any request if
    /// `base_url` is not absolute, and with [`DocScoutError::Fetch`] if the
    /// page cannot be downloaded. In both cases nothing is yielded.
    #[instrument(skip_all, fields(base_url = %base_url))]
    pub async fn walk(&self, base_url: &str) -> Result<DiscoveredLinks> {
        let base = parse_base(base_url)?;
        let html = self.fetcher.fetch_html(&base).await?;
        let links = extract_links(&html, &base);
        debug!(links = links.len(), "walk complete");
        Ok(links)
    }
}

/// Parse a walk root. It must carry a scheme and a host.
pub fn parse_base(base_url: &str) -> Result<Url> {
    let base =
        Url::parse(base_url).map_err(|e| DocScoutError::invalid_url(base_url, e.to_string()))?;

    match base.host_str() {
        Some(host) if !host.is_empty() => Ok(base),
        _ => Err(DocScoutError::invalid_url(base_url, "URL has no authority")),
    }
}

/// Scan `html` for anchors and keep the ones in scope of `base`.
///
/// Resolution, filtering and deduplication follow the walk rules; this is the
/// network-free half of [`Walker::walk`].
pub fn extract_links(html: &str, base: &Url) -> DiscoveredLinks {
    let doc = Html::parse_document(html);
    let scope = WalkScope::new(base);

    let mut seen: HashSet<NormalizedKey> = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&ANCHOR) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(candidate) = scope.admit(href) else {
            continue;
        };
        if seen.insert(candidate.key()) {
            links.push(candidate.to_link());
        } else {
            trace!(href, "duplicate link");
        }
    }

    DiscoveredLinks {
        inner: links.into_iter(),
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Per-walk filter derived from the base URL.
struct WalkScope<'a> {
    base: &'a Url,
    parts: CandidateUrl,
    directory: String,
}

impl<'a> WalkScope<'a> {
    fn new(base: &'a Url) -> Self {
        let parts = CandidateUrl::from_url(base);
        let directory = base_directory(&parts.path).to_string();
        Self {
            base,
            parts,
            directory,
        }
    }

    /// Resolve `href` and apply the domain and containment filters.
    fn admit(&self, href: &str) -> Option<CandidateUrl> {
        let Ok(resolved) = self.base.join(href) else {
            trace!(href, "unresolvable link");
            return None;
        };
        let candidate = CandidateUrl::from_url(&resolved);

        if !candidate.authority.is_empty() && candidate.authority != self.parts.authority {
            trace!(href, authority = %candidate.authority, "foreign host");
            return None;
        }
        if !candidate.path.starts_with(&self.directory) {
            trace!(href, path = %candidate.path, "outside base directory");
            return None;
        }

        candidate.backfill_scheme(&self.parts)
    }
}
