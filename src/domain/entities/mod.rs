//! Domain entity definitions.

mod cache_key;
mod cancel;
mod cached_image;

pub use cache_key::CacheKey;
pub use cancel::{CancelToken, LoadOptions};
pub use cached_image::{CachedImage, ImageSource, LoadOutcome, LoadedImage};
