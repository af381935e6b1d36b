//! Catalog download.
//!
//! One GET per load, with a `v=<millis>` query parameter so intermediate
//! caches never serve a stale catalog. Transport errors, non-2xx statuses and
//! unparseable bodies all surface as `LoadOutcome::Failed`; nothing retries.

use crate::catalog::CatalogDocument;
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("catalog-widget/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Eq, PartialEq)]
/// Status and raw body of a completed request.
pub struct HttpResponse {
    pub status: i32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues the single GET the widget needs.
///
/// `Err` means the request never produced a response (DNS, TLS, I/O).
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

#[derive(Clone, Debug, Default)]
/// Blocking HTTP(S) fetcher backed by `minreq`.
pub struct MinreqFetcher {
    /// Request timeout in seconds; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Fetcher for MinreqFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let mut request = minreq::get(url)
            .with_header("User-Agent", USER_AGENT)
            .with_header("Cache-Control", "no-store");
        if let Some(secs) = self.timeout_secs {
            request = request.with_timeout(secs);
        }
        let response = request
            .send()
            .map_err(|err| anyhow!("Failed to send request to {url}: {err}"))?;
        Ok(HttpResponse {
            status: response.status_code,
            body: response.into_bytes(),
        })
    }
}

#[derive(Clone, Debug)]
/// Serves a local JSON file as if it were the endpoint.
pub struct FileFetcher {
    pub path: PathBuf,
}

impl Fetcher for FileFetcher {
    fn get(&self, _url: &str) -> Result<HttpResponse> {
        let body = fs::read(&self.path)
            .with_context(|| format!("reading catalog file {}", self.path.display()))?;
        Ok(HttpResponse { status: 200, body })
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: i32 },
    #[error("catalog body is not usable JSON: {0}")]
    Parse(String),
    #[error("catalog already failed to load; the widget does not retry")]
    AlreadyFailed,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(CatalogDocument),
    Failed(LoadError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

/// Append the cache-busting `v` parameter to `url`.
pub fn cache_busted_url(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}v={millis}")
}

/// Current wall-clock time in milliseconds, used as the cache buster.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fetch and parse the catalog at `url`.
pub fn load_catalog(fetcher: &dyn Fetcher, url: &str, millis: i64) -> LoadOutcome {
    let request_url = cache_busted_url(url, millis);
    debug!(url = %request_url, "fetching catalog");

    match fetch_document(fetcher, &request_url) {
        Ok(document) => {
            debug!(items = document.items.len(), "catalog loaded");
            LoadOutcome::Loaded(document)
        }
        Err(err) => {
            warn!(error = %err, "catalog unavailable");
            LoadOutcome::Failed(err)
        }
    }
}

fn fetch_document(fetcher: &dyn Fetcher, url: &str) -> Result<CatalogDocument, LoadError> {
    let response = fetcher
        .get(url)
        .map_err(|err| LoadError::Transport(format!("{err:#}")))?;
    if !response.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    CatalogDocument::parse(&response.body).map_err(|err| LoadError::Parse(format!("{err:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubFetcher {
        response: Option<HttpResponse>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(response: Option<HttpResponse>) -> Self {
            Self {
                response,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn get(&self, url: &str) -> Result<HttpResponse> {
            self.requested.borrow_mut().push(url.to_string());
            self.response
                .clone()
                .ok_or_else(|| anyhow!("connection refused"))
        }
    }

    fn ok(body: &str) -> Option<HttpResponse> {
        Some(HttpResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        })
    }

    #[test]
    fn cache_buster_respects_existing_query() {
        assert_eq!(
            cache_busted_url("https://x.test/services.json", 17),
            "https://x.test/services.json?v=17"
        );
        assert_eq!(
            cache_busted_url("https://x.test/services.json?lang=en", 17),
            "https://x.test/services.json?lang=en&v=17"
        );
    }

    #[test]
    fn loads_items_with_single_request() {
        let fetcher = StubFetcher::new(ok(r#"{"items": [{"title": "Sauna"}]}"#));
        let outcome = load_catalog(&fetcher, "https://x.test/services.json", 99);
        match outcome {
            LoadOutcome::Loaded(doc) => assert_eq!(doc.items[0].title, "Sauna"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            *fetcher.requested.borrow(),
            vec!["https://x.test/services.json?v=99".to_string()]
        );
    }

    #[test]
    fn server_error_fails() {
        let fetcher = StubFetcher::new(Some(HttpResponse {
            status: 500,
            body: b"{\"items\": []}".to_vec(),
        }));
        let outcome = load_catalog(&fetcher, "https://x.test/a.json", 1);
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(LoadError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn transport_and_parse_errors_fail() {
        let offline = StubFetcher::new(None);
        assert!(matches!(
            load_catalog(&offline, "https://x.test/a.json", 1),
            LoadOutcome::Failed(LoadError::Transport(_))
        ));

        let garbage = StubFetcher::new(ok("<html>not json</html>"));
        assert!(matches!(
            load_catalog(&garbage, "https://x.test/a.json", 1),
            LoadOutcome::Failed(LoadError::Parse(_))
        ));
    }

    #[test]
    fn missing_items_array_is_an_empty_catalog() {
        let fetcher = StubFetcher::new(ok(r#"{"services": []}"#));
        match load_catalog(&fetcher, "https://x.test/a.json", 1) {
            LoadOutcome::Loaded(doc) => assert!(doc.items.is_empty()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn file_fetcher_reports_missing_file_as_transport_error() {
        let fetcher = FileFetcher {
            path: PathBuf::from("/definitely/not/here.json"),
        };
        assert!(matches!(
            load_catalog(&fetcher, "file", 1),
            LoadOutcome::Failed(LoadError::Transport(_))
        ));
    }
}
