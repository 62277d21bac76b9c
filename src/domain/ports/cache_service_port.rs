//! Boundary consumed by the UI layer.

use async_trait::async_trait;

use crate::domain::entities::CachedImage;

/// Get-or-fetch access to cached images.
///
/// These are the only two operations a view needs; it never talks to the cache or the
/// fetcher directly.
#[async_trait]
pub trait CacheServicing: Send + Sync {
    /// Returns the image for `key`, fetching and caching it on a miss.
    /// Any failure yields `None`.
    async fn get_image(&self, key: &str) -> Option<CachedImage>;

    /// Stores `image` under `key` without any network activity.
    fn save_image(&self, key: &str, image: CachedImage);
}
