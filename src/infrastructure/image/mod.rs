//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction and cost accounting
//! - HTTP byte fetching
//! - Decoding via the `image` crate

pub mod decoder;
pub mod http_fetcher;
pub mod memory_cache;

pub use decoder::ImageCrateDecoder;
pub use http_fetcher::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpByteFetcher};
pub use memory_cache::MemoryImageCache;
