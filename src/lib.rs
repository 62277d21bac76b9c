//! imgcache - A bounded in-memory image cache with fetch-on-miss.
//!
//! Images are addressed by an opaque key, conventionally their URL. A lookup is served
//! from an LRU cache bounded by entry count and total memory cost; on a miss the bytes
//! are downloaded, decoded and stored before being handed back.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the cache service.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

pub use application::CacheService;
pub use domain::{CacheKey, CacheServicing, CachedImage, LoadOutcome};

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "imgcache";
