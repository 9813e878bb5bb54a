//! Export adapter: one compositor pass per image, re-encoded in the base
//! image's own format.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{info, warn};
use watermark_engine::Compositor;

use crate::StudioError;
use crate::media::ImageFile;
use crate::state::StateSnapshot;

pub const EXPORT_PREFIX: &str = "watermarked_";

pub fn export_file_name(original: &str) -> String {
    format!("{EXPORT_PREFIX}{original}")
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub image_id: String,
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct ExportFailure {
    pub image_id: String,
    pub file_name: String,
    pub error: StudioError,
}

/// Result of a batch. `files` follows image-collection order.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub files: Vec<ExportedFile>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ExportAdapter<'a> {
    compositor: &'a Compositor,
}

impl<'a> ExportAdapter<'a> {
    pub fn new(compositor: &'a Compositor) -> Self {
        Self { compositor }
    }

    /// Export every image in `snapshot`. A failing image is recorded and
    /// skipped; the rest of the batch still runs.
    pub fn export_all(&self, snapshot: &StateSnapshot) -> ExportReport {
        let mut report = ExportReport::default();
        for image in snapshot.images.iter() {
            match self.export_one(snapshot, image) {
                Ok(file) => report.files.push(file),
                Err(error) => {
                    warn!(file = %image.file_name, error = %error, "Skipping image in export");
                    report.failures.push(ExportFailure {
                        image_id: image.id.clone(),
                        file_name: image.file_name.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            exported = report.files.len(),
            failed = report.failures.len(),
            revision = snapshot.revision,
            "Export finished"
        );
        report
    }

    pub fn export_one(
        &self,
        snapshot: &StateSnapshot,
        image: &ImageFile,
    ) -> Result<ExportedFile, StudioError> {
        let frame = snapshot.render_image(self.compositor, image)?;
        let bytes = encode_frame(frame, image.format(), &image.file_name)?;
        Ok(ExportedFile {
            image_id: image.id.clone(),
            file_name: export_file_name(&image.file_name),
            mime_type: image.mime_type(),
            bytes,
        })
    }
}

/// Encode a rendered frame. JPEG has no alpha channel, so it is flattened
/// to RGB first.
pub fn encode_frame(
    frame: RgbaImage,
    format: ImageFormat,
    name: &str,
) -> Result<Vec<u8>, StudioError> {
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(frame).to_rgb8()),
        _ => DynamicImage::ImageRgba8(frame),
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|error| StudioError::Encode {
            name: name.to_string(),
            error,
        })?;
    let bytes = buf.into_inner();
    if bytes.is_empty() {
        return Err(StudioError::EmptyEncoding(name.to_string()));
    }
    Ok(bytes)
}

/// Write each artifact to `dir` under its export name.
pub fn write_to_dir(dir: &Path, files: &[ExportedFile]) -> Result<Vec<PathBuf>, StudioError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.file_name);
        std::fs::write(&path, &file.bytes)?;
        info!(path = %path.display(), bytes = file.bytes.len(), "Wrote export");
        written.push(path);
    }
    Ok(written)
}
