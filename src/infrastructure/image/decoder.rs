//! Image decoding backed by the `image` crate.

use crate::domain::entities::CachedImage;
use crate::domain::errors::DecodeError;
use crate::domain::ports::ImageDecoderPort;

/// Decodes PNG, JPEG and WebP bytes, guessing the format from the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    /// Creates a decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ImageDecoderPort for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<CachedImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::new("empty input"));
        }
        image::load_from_memory(bytes)
            .map(CachedImage::new)
            .map_err(|e| DecodeError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(img: &image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn test_decode_png() {
        let bytes = encode(&image::DynamicImage::new_rgba8(3, 2), image::ImageFormat::Png);

        let decoded = ImageCrateDecoder::new().decode(&bytes).unwrap();

        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
        assert_eq!(decoded.cost(), 24);
    }

    #[test]
    fn test_decode_jpeg() {
        let bytes = encode(&image::DynamicImage::new_rgb8(8, 8), image::ImageFormat::Jpeg);

        let decoded = ImageCrateDecoder::new().decode(&bytes).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = ImageCrateDecoder::new().decode(&[]).unwrap_err();
        assert_eq!(err.reason(), "empty input");
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(ImageCrateDecoder::new().decode(b"<html>not an image</html>").is_err());
    }

    #[test]
    fn test_truncated_png_is_an_error() {
        let bytes = encode(&image::DynamicImage::new_rgb8(16, 16), image::ImageFormat::Png);
        assert!(ImageCrateDecoder::new().decode(&bytes[..bytes.len() / 2]).is_err());
    }
}
