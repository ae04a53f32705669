//! URL decomposition, normalization keys, and crawl-scope helpers.

use std::fmt;

use url::Url;

// ---------------------------------------------------------------------------
// NormalizedKey
// ---------------------------------------------------------------------------

/// Deduplication identity of a URL: `scheme://authority path [?query]`,
/// fragment stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Key of an already-parsed URL.
    pub fn from_url(url: &Url) -> Self {
        CandidateUrl::from_url(url).key()
    }

    /// Key of a URL string, or `None` if it does not parse as an absolute URL.
    pub fn parse(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(|u| Self::from_url(&u))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// CandidateUrl
// ---------------------------------------------------------------------------

/// A link split into the parts the crawl filters look at.
///
/// Empty query and fragment components are stored as `None`, so `page?`
/// and `page` share a key and `page#` yields no fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub scheme: String,
    /// `host[:port]`, empty for URLs without a host (`mailto:`, `file:///`).
    pub authority: String,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl CandidateUrl {
    pub fn from_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            authority: authority(url),
            path: url.path().to_string(),
            query: non_empty(url.query()),
            fragment: non_empty(url.fragment()),
        }
    }

    /// Rebuild a schemeless candidate on top of `base` as
    /// `{base.scheme}://{base.authority}{path}[?query]`.
    ///
    /// Candidates that already have a scheme are returned unchanged. The
    /// fragment does not survive the rebuild. Returns `None` if the rebuilt
    /// string is not a valid URL.
    pub fn backfill_scheme(self, base: &CandidateUrl) -> Option<Self> {
        if !self.scheme.is_empty() {
            return Some(self);
        }

        let mut rebuilt = format!("{}://{}{}", base.scheme, base.authority, self.path);
        if let Some(query) = &self.query {
            rebuilt.push('?');
            rebuilt.push_str(query);
        }

        Url::parse(&rebuilt).ok().map(|u| Self::from_url(&u))
    }

    pub fn key(&self) -> NormalizedKey {
        let mut key = format!("{}://{}{}", self.scheme, self.authority, self.path);
        if let Some(query) = &self.query {
            key.push('?');
            key.push_str(query);
        }
        NormalizedKey(key)
    }

    /// The string handed to callers: the key, plus `#fragment` when present.
    pub fn to_link(&self) -> String {
        let key = self.key().0;
        match &self.fragment {
            Some(fragment) => format!("{key}#{fragment}"),
            None => key,
        }
    }
}

fn non_empty(part: Option<&str>) -> Option<String> {
    part.filter(|s| !s.is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Scope helpers
// ---------------------------------------------------------------------------

/// `host[:port]` of a URL. Default ports are already dropped by the parser.
pub fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Directory prefix that scopes a walk: the parent directory of the last
/// path segment, ignoring trailing slashes. `/` when there is no parent.
///
/// `/docs/index.html` → `/docs/`, `/docs/guide/` → `/docs/`, `/index.html` → `/`.
pub fn base_directory(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}
