//! Port for retrieving raw image bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::FetchError;

/// Fetches the full body behind a URL.
///
/// Implementations validate the URL before any network activity and return the body
/// exactly once, never a partial read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ByteFetcherPort: Send + Sync {
    /// Fetches the bytes at `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
