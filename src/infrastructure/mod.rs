//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image handling (caching, fetching, decoding).
pub mod image;

pub use self::config::{AppConfig, CliArgs, ConfigError, ConfigLoader, LogLevel};
pub use self::image::{HttpByteFetcher, ImageCrateDecoder, MemoryImageCache};

use std::sync::Arc;

use crate::application::CacheService;
use crate::domain::errors::FetchError;

/// Wires the memory cache, HTTP fetcher and decoder into a service.
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn build_cache_service(config: &AppConfig) -> Result<CacheService, FetchError> {
    let cache = Arc::new(MemoryImageCache::new(config.cache.limits()));
    let fetcher = Arc::new(HttpByteFetcher::new(
        config.fetch.timeout(),
        &config.fetch.user_agent,
    )?);
    let decoder = Arc::new(ImageCrateDecoder::new());

    Ok(CacheService::new(cache, fetcher, decoder).with_coalescing(config.cache.coalesce_in_flight))
}
