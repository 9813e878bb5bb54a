//! Pattern tile construction: one logo plus symmetric transparent margins,
//! sized so that repeating it edge to edge produces the pattern fill.

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::EngineError;
use crate::compose;
use crate::resize;

/// Fractional tile geometry, before rounding to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    pub logo_width: f64,
    pub logo_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl TileGeometry {
    /// Compute geometry for a `lw` x `lh` logo.
    ///
    /// `pattern_size` and the spacings are percentages of `base_size`.
    pub fn compute(
        lw: u32,
        lh: u32,
        pattern_size: f64,
        spacing_x: f64,
        spacing_y: f64,
        base_size: f64,
    ) -> Result<Self, EngineError> {
        let logo_width = (pattern_size / 100.0) * base_size;
        let logo_height = resize::aspect_height(lw, lh, logo_width)?;
        Ok(Self {
            logo_width,
            logo_height,
            margin_x: (spacing_x / 100.0) * base_size,
            margin_y: (spacing_y / 100.0) * base_size,
        })
    }

    /// Tile canvas size in whole pixels, never smaller than 1x1.
    ///
    /// Fractions are truncated, so the pattern period is the whole-pixel
    /// part of logo plus margin.
    pub fn tile_size(&self) -> (u32, u32) {
        (
            truncate_at_least_one(self.logo_width + self.margin_x),
            truncate_at_least_one(self.logo_height + self.margin_y),
        )
    }

    /// Top-left of the logo inside the tile.
    pub fn logo_offset(&self) -> (f64, f64) {
        (self.margin_x / 2.0, self.margin_y / 2.0)
    }
}

/// A rendered tile ready to be repeated.
#[derive(Debug, Clone)]
pub struct PatternTile {
    pub geometry: TileGeometry,
    pub image: RgbaImage,
}

/// Render the tile for `logo`.
///
/// Fails if the logo has a zero dimension or its scaled size rounds to zero
/// pixels; the caller skips the logo in both cases.
pub fn build_tile(
    logo: &DynamicImage,
    pattern_size: f64,
    spacing_x: f64,
    spacing_y: f64,
    base_size: f64,
) -> Result<PatternTile, EngineError> {
    let geometry = TileGeometry::compute(
        logo.width(),
        logo.height(),
        pattern_size,
        spacing_x,
        spacing_y,
        base_size,
    )?;

    let (draw_w, draw_h) = resize::pixel_size(geometry.logo_width, geometry.logo_height)
        .ok_or(EngineError::EmptyTile {
            width: geometry.logo_width,
            height: geometry.logo_height,
        })?;
    resize::check_draw_size(draw_w, draw_h)?;

    let (tile_w, tile_h) = geometry.tile_size();
    resize::check_draw_size(tile_w, tile_h)?;
    let (off_x, off_y) = geometry.logo_offset();

    debug!(
        tile_w,
        tile_h, draw_w, draw_h, off_x, off_y, "Building pattern tile"
    );

    let mut image = RgbaImage::new(tile_w, tile_h);
    let scaled = resize::resize_exact(logo, draw_w, draw_h);
    compose::overlay(
        &mut image,
        &scaled,
        off_x.round() as i64,
        off_y.round() as i64,
        1.0,
    );

    Ok(PatternTile { geometry, image })
}

fn truncate_at_least_one(v: f64) -> u32 {
    if v.is_finite() && v >= 1.0 {
        v.floor().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}
