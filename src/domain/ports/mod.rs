mod byte_fetcher_port;
mod cache_service_port;
mod image_cache_port;
mod image_decoder_port;

pub use byte_fetcher_port::ByteFetcherPort;
pub use cache_service_port::CacheServicing;
pub use image_cache_port::{
    CacheLimits, CacheStats, DEFAULT_MAX_COST_BYTES, DEFAULT_MAX_ENTRIES, ImageCachePort,
    StoreOutcome,
};
pub use image_decoder_port::ImageDecoderPort;

#[cfg(test)]
pub mod mocks {
    pub use super::byte_fetcher_port::MockByteFetcherPort;
    pub use super::byte_fetcher_port::mock::StaticFetcher;
}
