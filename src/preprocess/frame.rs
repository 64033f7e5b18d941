//! Frame normalization before transmission.

use crate::config::PreprocessConfig;
use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;
use tracing::info;

/// A frame ready to be attached to a model request.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// JPEG-encoded bytes.
    pub bytes: Vec<u8>,
    /// Width after preprocessing.
    pub width: u32,
    /// Height after preprocessing.
    pub height: u32,
    /// Whether the frame was downscaled.
    pub resized: bool,
}

/// Converts frames to bounded-size RGB JPEGs.
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    max_height: u32,
    quality: u8,
}

impl ImagePreprocessor {
    /// Create a preprocessor from configuration.
    pub const fn new(config: PreprocessConfig) -> Self {
        Self {
            max_height: config.max_height,
            quality: config.jpeg_quality,
        }
    }

    /// Load, normalize and re-encode one frame.
    ///
    /// Non-RGB frames (greyscale, indexed, alpha) are converted to RGB.
    /// Frames taller than the configured maximum are downscaled with a
    /// Lanczos filter, keeping the aspect ratio.
    pub fn prepare(&self, path: &Path) -> Result<PreparedImage> {
        let decode_err = |source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        };

        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(decode_err)?;

        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());

        let (img, resized) = self.fit(img);
        if resized {
            info!("Resized {name} to {}x{}", img.width(), img.height());
        } else {
            info!(
                "No resize needed for {name} (size: {}x{})",
                img.width(),
                img.height()
            );
        }

        let rgb = img.to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality)
            .encode_image(&rgb)
            .map_err(|source| Error::ImageEncode {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(PreparedImage {
            bytes,
            width: rgb.width(),
            height: rgb.height(),
            resized,
        })
    }

    /// Normalize color and bound the height of a decoded frame.
    fn fit(&self, img: DynamicImage) -> (DynamicImage, bool) {
        let img = match img {
            DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };

        let (width, height) = img.dimensions();
        if height <= self.max_height {
            return (img, false);
        }

        let (new_width, new_height) = scaled_dimensions(width, height, self.max_height);
        (
            img.resize_exact(new_width, new_height, FilterType::Lanczos3),
            true,
        )
    }
}

/// Dimensions after bounding `height` to `max_height`, keeping aspect ratio.
///
/// Width is truncated, never below one pixel.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn scaled_dimensions(width: u32, height: u32, max_height: u32) -> (u32, u32) {
    if height <= max_height {
        return (width, height);
    }
    let aspect = f64::from(width) / f64::from(height);
    let new_width = (f64::from(max_height) * aspect) as u32;
    (new_width.max(1), max_height)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};
    use tempfile::TempDir;

    fn preprocessor() -> ImagePreprocessor {
        ImagePreprocessor::new(PreprocessConfig::default())
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(1920, 1080, 720), (1280, 720));
        assert_eq!(scaled_dimensions(640, 480, 720), (640, 480));
        assert_eq!(scaled_dimensions(1000, 1441, 720), (499, 720));
        assert_eq!(scaled_dimensions(1, 5000, 720), (1, 720));
    }

    #[test]
    fn test_tall_frame_is_downscaled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tall.png");
        RgbImage::from_pixel(1600, 900, Rgb([10, 120, 30]))
            .save(&path)
            .unwrap();

        let prepared = preprocessor().prepare(&path).unwrap();
        assert!(prepared.resized);
        assert_eq!((prepared.width, prepared.height), (1280, 720));

        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (1280, 720));
        assert_eq!(
            image::guess_format(&prepared.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_small_frame_passes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.jpg");
        RgbImage::from_pixel(320, 240, Rgb([200, 200, 200]))
            .save(&path)
            .unwrap();

        let prepared = preprocessor().prepare(&path).unwrap();
        assert!(!prepared.resized);
        assert_eq!((prepared.width, prepared.height), (320, 240));
    }

    #[test]
    fn test_greyscale_and_alpha_become_rgb() {
        let dir = TempDir::new().unwrap();

        let grey = dir.path().join("grey.png");
        GrayImage::from_pixel(64, 48, Luma([128])).save(&grey).unwrap();
        let prepared = preprocessor().prepare(&grey).unwrap();
        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));

        let alpha = dir.path().join("alpha.png");
        RgbaImage::from_pixel(64, 48, image::Rgba([1, 2, 3, 4]))
            .save(&alpha)
            .unwrap();
        let prepared = preprocessor().prepare(&alpha).unwrap();
        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_undecodable_frame_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let result = preprocessor().prepare(&path);
        assert!(matches!(result, Err(Error::ImageDecode { .. })));
    }
}
