//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CacheKey, CachedImage, LoadOutcome};
pub use errors::{DecodeError, FetchError, ImageError};
pub use ports::{ByteFetcherPort, CacheServicing, ImageCachePort, ImageDecoderPort};
