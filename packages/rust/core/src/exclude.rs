//! Path glob patterns that keep discovered links out of the frontier.

use regex::Regex;
use url::Url;

use docscout_shared::{DocScoutError, Result};

/// Compiled exclude patterns, matched against the URL path.
///
/// `**` matches across `/`, `*` matches within one segment, `?` matches a
/// single character.
#[derive(Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                glob_to_regex(p).map_err(|e| {
                    DocScoutError::validation(format!("invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether `url` should stay out of the crawl. URLs that do not parse are
    /// never excluded here; the frontier refuses them on its own.
    pub fn is_excluded(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.patterns.iter().any(|p| p.is_match(parsed.path())),
            Err(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Convert a glob-like pattern to an anchored regex.
fn glob_to_regex(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{escaped}$"))
}
