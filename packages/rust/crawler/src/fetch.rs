//! HTTP page fetching with optional retry on transient failures.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use docscout_shared::{CrawlConfig, DocScoutError, Result};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Downloads HTML documents. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl Fetcher {
    /// Build a fetcher from the crawl configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocScoutError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            retries: config.retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// GET `url` and return the full response body.
    ///
    /// Timeouts, connection errors, 5xx and 429 responses are retried up to
    /// the configured number of times, waiting `backoff * 2^attempt` between
    /// attempts. Anything else fails immediately.
    pub async fn fetch_html(&self, url: &Url) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        %url,
                        error = %e,
                        attempt,
                        max_retries = self.retries,
                        delay_ms = delay.as_millis() as u64,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DocScoutError::fetch(url.as_str(), None, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocScoutError::fetch(
                url.as_str(),
                Some(status.as_u16()),
                format!("HTTP {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| DocScoutError::fetch(url.as_str(), None, format!("body read failed: {e}")))
    }
}

/// Whether a failed fetch is worth another attempt.
fn is_transient(err: &DocScoutError) -> bool {
    match err.status() {
        Some(status) => status >= 500 || status == 429,
        None => err.is_fetch(),
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(retries: u32) -> Fetcher {
        let config = CrawlConfig {
            retries,
            retry_backoff_ms: 0,
            timeout_secs: 5,
            ..CrawlConfig::default()
        };
        Fetcher::new(&config).unwrap()
    }

    fn page_url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{p}", server.uri())).unwrap()
    }

    #[test]
    fn transient_classification() {
        assert!(is_transient(&DocScoutError::fetch("u", Some(503), "x")));
        assert!(is_transient(&DocScoutError::fetch("u", Some(429), "x")));
        assert!(is_transient(&DocScoutError::fetch("u", None, "connection refused")));
        assert!(!is_transient(&DocScoutError::fetch("u", Some(404), "x")));
        assert!(!is_transient(&DocScoutError::validation("x")));
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Docs</h1>"))
            .mount(&server)
            .await;

        let body = fetcher(0)
            .fetch_html(&page_url(&server, "/docs/index.html"))
            .await
            .unwrap();
        assert_eq!(body, "<h1>Docs</h1>");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(path("/missing.html"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        // 404 is not transient, so retries are not spent on it.
        let err = fetcher(3)
            .fetch_html(&page_url(&server, "/missing.html"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let server = MockServer::start().await;
        Mock::given(path("/flaky.html"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(path("/flaky.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let body = fetcher(1)
            .fetch_html(&page_url(&server, "/flaky.html"))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn gives_up_when_retries_are_exhausted() {
        let server = MockServer::start().await;
        Mock::given(path("/down.html"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let err = fetcher(2)
            .fetch_html(&page_url(&server, "/down.html"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn timeout_is_a_transient_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(path("/slow.html"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .expect(2)
            .mount(&server)
            .await;

        let config = CrawlConfig {
            retries: 1,
            retry_backoff_ms: 0,
            timeout_secs: 1,
            ..CrawlConfig::default()
        };
        let err = Fetcher::new(&config)
            .unwrap()
            .fetch_html(&page_url(&server, "/slow.html"))
            .await
            .unwrap_err();
        assert!(err.is_fetch());
        assert_eq!(err.status(), None);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn connection_failure_has_no_status() {
        // Nothing listens on the discard port.
        let url = Url::parse("http://127.0.0.1:9/docs/index.html").unwrap();
        let err = fetcher(0).fetch_html(&url).await.unwrap_err();
        assert!(err.is_fetch());
        assert_eq!(err.status(), None);
    }
}
