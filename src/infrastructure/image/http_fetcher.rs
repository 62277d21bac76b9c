//! HTTP byte fetcher.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, trace};

use crate::domain::errors::FetchError;
use crate::domain::ports::ByteFetcherPort;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent sent with image requests.
pub const DEFAULT_USER_AGENT: &str = concat!("imgcache/", env!("CARGO_PKG_VERSION"));

/// Downloads image bytes over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpByteFetcher {
    client: Client,
}

impl HttpByteFetcher {
    /// Creates a fetcher with the given timeout and user agent.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a fetcher with default settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }
}

/// Parses and checks an image URL. Only `http` and `https` are accepted.
///
/// # Errors
/// Returns `FetchError::InvalidUrl` for empty, unparsable or non-HTTP URLs.
pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::invalid_url(url, "empty URL"));
    }
    let parsed = Url::parse(url).map_err(|e| FetchError::invalid_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::invalid_url(
            url,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

/// Accepts 2xx statuses.
///
/// # Errors
/// Returns `FetchError::Http` for any status outside 200-299.
pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::http(status.as_u16()))
    }
}

fn classify(err: &reqwest::Error) -> FetchError {
    let what = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "failed to read body"
    } else {
        "request failed"
    };
    FetchError::transport(format!("{what}: {err}"))
}

#[async_trait]
impl ByteFetcherPort for HttpByteFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let url = parse_url(url)?;
        debug!(url = %url, "Downloading image from network");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(&e))?;

        check_status(response.status())?;

        let bytes = response.bytes().await.map_err(|e| classify(&e))?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        trace!(url = %url, size = bytes.len(), "Downloaded image bytes");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace")]
    #[test_case("not a url" ; "no scheme")]
    #[test_case("/relative/path.png" ; "relative")]
    #[test_case("ftp://example.com/a.png" ; "ftp scheme")]
    #[test_case("file:///tmp/a.png" ; "file scheme")]
    fn test_invalid_urls(url: &str) {
        assert!(matches!(parse_url(url), Err(FetchError::InvalidUrl { .. })));
    }

    #[test_case("https://example.com/testImage.jpg" ; "https")]
    #[test_case("http://127.0.0.1:8080/a.png?size=2" ; "http with query")]
    fn test_valid_urls(url: &str) {
        assert!(parse_url(url).is_ok());
    }

    #[test_case(200, None ; "ok")]
    #[test_case(204, None ; "no content")]
    #[test_case(299, None ; "upper bound")]
    #[test_case(301, Some(301) ; "unresolved redirect")]
    #[test_case(404, Some(404) ; "not found")]
    #[test_case(500, Some(500) ; "server error")]
    fn test_status_classification(code: u16, expected: Option<u16>) {
        let status = StatusCode::from_u16(code).unwrap();
        assert_eq!(check_status(status).err().and_then(|e| e.status()), expected);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let fetcher = HttpByteFetcher::with_defaults().unwrap();
        let result = fetcher.fetch("definitely not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
