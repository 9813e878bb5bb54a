//! Batch watermarking on top of the compositing engine.
//!
//! Holds the editable workspace (base images, ordered logos, pattern mode),
//! and the two call sites of the shared compositor: the preview adapter and
//! the export adapter.

pub mod bootstrap;
pub mod config;
pub mod export;
pub mod media;
pub mod preview;
pub mod state;

#[cfg(test)]
mod tests;

pub use bootstrap::{init_foundation, load_workspace};
pub use config::AppConfig;
pub use export::{ExportAdapter, ExportReport, ExportedFile};
pub use media::{ImageFile, UploadPolicy};
pub use preview::{PreviewAdapter, PreviewFrame, ViewTransform};
pub use state::{StateSnapshot, WorkspaceState};

/// Unified error type for the studio crate.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Logo not found: {0}")]
    LogoNotFound(String),

    #[error("Logo index {index} out of range (len {len})")]
    LogoIndexOutOfRange { index: usize, len: usize },

    #[error("{name} is {size} bytes, limit is {limit}")]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("Unsupported image format for {name}: {format}")]
    UnsupportedFormat { name: String, format: String },

    #[error("Failed to decode {name}: {error}")]
    Decode {
        name: String,
        #[source]
        error: image::ImageError,
    },

    #[error("Failed to encode {name}: {error}")]
    Encode {
        name: String,
        #[source]
        error: image::ImageError,
    },

    #[error("Encoder produced no data for {0}")]
    EmptyEncoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
