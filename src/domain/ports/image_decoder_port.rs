//! Port for turning bytes into a bitmap.

use crate::domain::entities::CachedImage;
use crate::domain::errors::DecodeError;

/// Decodes encoded image bytes. Must be pure and must not panic on any input.
pub trait ImageDecoderPort: Send + Sync {
    /// Decodes `bytes` into an image.
    fn decode(&self, bytes: &[u8]) -> Result<CachedImage, DecodeError>;
}
