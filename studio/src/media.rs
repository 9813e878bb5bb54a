//! Base image uploads: format detection, size limits, lazy decoding.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use crate::StudioError;

/// Default upload limit (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Formats accepted for base images and logos.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Which uploads are accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub formats: Vec<ImageFormat>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
            formats: SUPPORTED_FORMATS.to_vec(),
        }
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Check size and sniff the format from the file's magic bytes.
    pub fn check(&self, name: &str, bytes: &[u8]) -> Result<ImageFormat, StudioError> {
        if bytes.len() > self.max_bytes {
            return Err(StudioError::TooLarge {
                name: name.to_string(),
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let format = image::guess_format(bytes).map_err(|_| StudioError::UnsupportedFormat {
            name: name.to_string(),
            format: "unknown".into(),
        })?;
        if !self.formats.contains(&format) {
            return Err(StudioError::UnsupportedFormat {
                name: name.to_string(),
                format: format.to_mime_type().to_string(),
            });
        }
        Ok(format)
    }
}

/// An uploaded base image. Immutable once created.
#[derive(Clone)]
pub struct ImageFile {
    pub id: String,
    pub file_name: String,
    format: ImageFormat,
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl ImageFile {
    /// Validate an upload and read its pixel dimensions from the header.
    pub fn load(
        id: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        policy: &UploadPolicy,
    ) -> Result<Self, StudioError> {
        let file_name = file_name.into();
        let bytes: Arc<[u8]> = bytes.into();
        let format = policy.check(&file_name, &bytes)?;

        let (width, height) = ImageReader::with_format(Cursor::new(&bytes[..]), format)
            .into_dimensions()
            .map_err(|error| StudioError::Decode {
                name: file_name.clone(),
                error,
            })?;

        debug!(file_name = %file_name, width, height, ?format, "Loaded image");
        Ok(Self {
            id: id.into(),
            file_name,
            format,
            bytes,
            width,
            height,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the full raster.
    pub fn decode(&self) -> Result<DynamicImage, StudioError> {
        image::load_from_memory_with_format(&self.bytes, self.format).map_err(|error| {
            StudioError::Decode {
                name: self.file_name.clone(),
                error,
            }
        })
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("dimensions", &(self.width, self.height))
            .finish()
    }
}

/// Encode `img` in memory, mainly for tests and in-memory sources.
pub fn encode_image(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([9, 8, 7, 255])));
        encode_image(&img, ImageFormat::Png).unwrap()
    }

    #[test]
    fn load_reads_dimensions_and_mime() {
        let file = ImageFile::load("1", "a.png", png_bytes(12, 7), &UploadPolicy::default()).unwrap();
        assert_eq!(file.dimensions(), (12, 7));
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.decode().unwrap().width(), 12);
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let policy = UploadPolicy::default().with_max_bytes(16);
        assert!(matches!(
            ImageFile::load("1", "big.png", png_bytes(4, 4), &policy),
            Err(StudioError::TooLarge { limit: 16, .. })
        ));
    }

    #[test]
    fn unknown_bytes_are_unsupported() {
        assert!(matches!(
            UploadPolicy::default().check("notes.txt", b"hello world"),
            Err(StudioError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn format_outside_policy_is_unsupported() {
        let policy = UploadPolicy {
            formats: vec![ImageFormat::Jpeg],
            ..UploadPolicy::default()
        };
        assert!(matches!(
            policy.check("a.png", &png_bytes(2, 2)),
            Err(StudioError::UnsupportedFormat { format, .. }) if format == "image/png"
        ));
    }

    #[test]
    fn truncated_image_fails_to_decode_after_upload() {
        let noisy = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255]));
        let bytes = encode_image(&DynamicImage::ImageRgba8(noisy), ImageFormat::Png).unwrap();
        // header survives, pixel data does not
        let truncated = bytes[..bytes.len() / 2].to_vec();
        let file = ImageFile::load("1", "t.png", truncated, &UploadPolicy::default()).unwrap();
        assert!(matches!(file.decode(), Err(StudioError::Decode { .. })));
    }
}
