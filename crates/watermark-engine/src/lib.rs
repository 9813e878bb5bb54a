//! Watermark compositing engine.
//!
//! Renders an ordered list of logo overlays onto a base image, either as one
//! positioned overlay per logo or as a rotated, offset, tiled pattern fill.
//! The same [`Compositor`] serves live preview and batch export.

pub mod compose;
pub mod compositor;
pub mod logo;
pub mod position;
pub mod resize;
pub mod source;
pub mod tile;
pub mod transform;

// Re-exports for convenience
pub use compositor::Compositor;
pub use logo::{Logo, LogoSettings, LogoUpdate, PatternPreset};
pub use position::Anchor;
pub use source::{DecodeCache, PixelSource};
pub use tile::{PatternTile, TileGeometry, build_tile};

/// Fraction of the smaller canvas dimension used as the nominal pattern tile size.
pub const BASE_TILE_FRACTION: f64 = 0.1;

/// Errors raised while preparing a single logo for compositing.
///
/// The compositor logs these and skips the offending logo; they never abort a
/// render.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to decode logo source {source_id}: {error}")]
    Decode {
        source_id: String,
        #[source]
        error: image::ImageError,
    },

    #[error("Degenerate logo geometry: {width}x{height}")]
    DegenerateLogo { width: u32, height: u32 },

    #[error("Pattern tile collapsed to zero size ({width:.3}x{height:.3})")]
    EmptyTile { width: f64, height: f64 },

    #[error("Overlay collapsed to zero size ({width:.3}x{height:.3})")]
    EmptyOverlay { width: f64, height: f64 },

    #[error("Scaled logo {width}x{height} exceeds the {limit} pixel draw limit")]
    OversizedLogo { width: u32, height: u32, limit: u64 },
}
