//! Image normalization
//!
//! Large photos are downsampled to a bounded resolution before encoding so
//! payload size and downstream storage stay manageable. Only files the
//! intake policy classified as images pass through here.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{GenericImageView, ImageEncoder};
use thiserror::Error;
use tracing::{debug, instrument};

use st_core::config::IntakeConfig;

/// Normalization failures. Terminal for the file, never for the batch.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Could not read {name} as an image: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Could not re-encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Processing of {name} was aborted")]
    Aborted { name: String },
}

impl ProcessingError {
    /// The file the failure belongs to
    pub fn file_name(&self) -> &str {
        match self {
            Self::Decode { name, .. } | Self::Encode { name, .. } | Self::Aborted { name } => name,
        }
    }
}

/// A bounding box for image dimensions. Different upload flows use
/// different bounds, so this is always passed in, never assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl ResizeBounds {
    /// Bound used by the photo-heavy flows (issues, daily progress)
    pub const LANDSCAPE: Self = Self {
        max_width: 1920,
        max_height: 1080,
    };

    /// Bound used by the document-centric flows (projects, tasks)
    pub const SQUARE: Self = Self {
        max_width: 1920,
        max_height: 1920,
    };

    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Target dimensions preserving aspect ratio such that neither dimension
    /// exceeds the bound. Images already within bounds are returned
    /// unchanged; nothing is ever upscaled.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width && height <= self.max_height {
            return (width, height);
        }

        let width_ratio = self.max_width as f64 / width as f64;
        let height_ratio = self.max_height as f64 / height as f64;
        let ratio = width_ratio.min(height_ratio);

        let target_width = ((width as f64 * ratio).round() as u32).clamp(1, self.max_width);
        let target_height = ((height as f64 * ratio).round() as u32).clamp(1, self.max_height);
        (target_width, target_height)
    }
}

/// A normalized image ready for transport encoding
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub data: Bytes,
    /// MIME of `data` (differs from the input when re-encoded)
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    /// Whether the image was actually downsampled
    pub resized: bool,
}

/// Downsamples oversized images and re-encodes them at a fixed quality.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    pub bounds: ResizeBounds,
    /// JPEG quality (0-100) used when re-encoding
    pub jpeg_quality: u8,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            bounds: ResizeBounds::LANDSCAPE,
            jpeg_quality: 80,
        }
    }
}

impl From<&IntakeConfig> for ImageNormalizer {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            bounds: ResizeBounds::new(config.image_max_width, config.image_max_height),
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl ImageNormalizer {
    pub fn new(bounds: ResizeBounds, jpeg_quality: u8) -> Self {
        Self {
            bounds,
            jpeg_quality,
        }
    }

    /// Decode, downsample to the configured bounds, and re-encode.
    ///
    /// Images already within bounds pass through byte-identical, which keeps
    /// the downstream encoding deterministic. Oversized images are resized
    /// and re-encoded as JPEG at the configured quality (lossless sources
    /// become JPEG for size reduction).
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn normalize(&self, name: &str, data: &[u8]) -> Result<NormalizedImage, ProcessingError> {
        let img = image::load_from_memory(data).map_err(|source| ProcessingError::Decode {
            name: name.to_string(),
            source,
        })?;
        let (width, height) = img.dimensions();
        let (target_width, target_height) = self.bounds.fit(width, height);

        if (target_width, target_height) == (width, height) {
            let content_type = image::guess_format(data)
                .map(|format| format.to_mime_type().to_string())
                .unwrap_or_else(|_| "application/octet-stream".to_string());

            debug!(name = name, width, height, "Image within bounds, passed through");
            return Ok(NormalizedImage {
                data: Bytes::copy_from_slice(data),
                content_type,
                width,
                height,
                resized: false,
            });
        }

        let resized = img.resize_exact(target_width, target_height, FilterType::Lanczos3);
        let rgb = resized.to_rgb8();

        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
        encoder
            .write_image(
                rgb.as_raw(),
                target_width,
                target_height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|source| ProcessingError::Encode {
                name: name.to_string(),
                source,
            })?;

        debug!(
            name = name,
            from_width = width,
            from_height = height,
            to_width = target_width,
            to_height = target_height,
            bytes = buf.len(),
            "Image downsampled"
        );

        Ok(NormalizedImage {
            data: Bytes::from(buf),
            content_type: "image/jpeg".to_string(),
            width: target_width,
            height: target_height,
            resized: true,
        })
    }

    /// Run `normalize` on the blocking pool so a batch yields between files.
    pub async fn normalize_blocking(
        &self,
        name: String,
        data: Bytes,
    ) -> Result<NormalizedImage, ProcessingError> {
        let normalizer = self.clone();
        let task_name = name.clone();
        tokio::task::spawn_blocking(move || normalizer.normalize(&task_name, &data))
            .await
            .map_err(|_| ProcessingError::Aborted { name })?
    }
}
