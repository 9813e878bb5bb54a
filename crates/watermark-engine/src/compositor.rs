//! The single rendering pass shared by preview and export.

use image::{DynamicImage, RgbaImage};
use tracing::{debug, warn};

use crate::logo::Logo;
use crate::source::DecodeCache;
use crate::{BASE_TILE_FRACTION, EngineError, compose, resize, tile, transform};

/// Renders base images with logo overlays.
///
/// Holds only the logo decode cache; every call allocates its own frame, so
/// one compositor can serve preview and export concurrently.
#[derive(Default)]
pub struct Compositor {
    cache: DecodeCache,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_limit(limit: usize) -> Self {
        Self {
            cache: DecodeCache::new(limit),
        }
    }

    pub fn cache(&self) -> &DecodeCache {
        &self.cache
    }

    /// Composite `logos` onto `base` in list order (first is bottom-most).
    ///
    /// The frame has the base image's dimensions. Logos that fail to decode
    /// or have degenerate geometry are skipped with a warning.
    pub fn render(&self, base: &DynamicImage, logos: &[Logo], pattern_mode: bool) -> RgbaImage {
        let mut frame = base.to_rgba8();
        debug!(
            w = frame.width(),
            h = frame.height(),
            logos = logos.len(),
            pattern_mode,
            "Rendering frame"
        );

        for logo in logos {
            if let Err(e) = self.paint_logo(&mut frame, logo, pattern_mode) {
                warn!(logo = %logo.id, error = %e, "Skipping logo");
            }
        }
        frame
    }

    fn paint_logo(
        &self,
        frame: &mut RgbaImage,
        logo: &Logo,
        pattern_mode: bool,
    ) -> Result<(), EngineError> {
        let img = self.cache.get_or_decode(&logo.source)?;
        if pattern_mode {
            paint_pattern(frame, &img, logo)
        } else {
            paint_overlay(frame, &img, logo)
        }
    }
}

/// Draw one overlay centered on the logo's anchor.
fn paint_overlay(frame: &mut RgbaImage, img: &DynamicImage, logo: &Logo) -> Result<(), EngineError> {
    let s = &logo.settings;
    let (cw, ch) = (f64::from(frame.width()), f64::from(frame.height()));

    let logo_w = cw * (s.size() / 100.0);
    let logo_h = resize::aspect_height(img.width(), img.height(), logo_w)?;
    let (fx, fy) = s.center();
    let x = fx * cw - logo_w / 2.0;
    let y = fy * ch - logo_h / 2.0;

    let (draw_w, draw_h) = resize::pixel_size(logo_w, logo_h).ok_or(EngineError::EmptyOverlay {
        width: logo_w,
        height: logo_h,
    })?;
    resize::check_draw_size(draw_w, draw_h)?;

    debug!(logo = %logo.id, x, y, draw_w, draw_h, "Drawing overlay");
    let scaled = resize::resize_exact(img, draw_w, draw_h);
    compose::overlay(
        frame,
        &scaled,
        x.round() as i64,
        y.round() as i64,
        s.opacity() as f32,
    );
    Ok(())
}

/// Fill the whole frame with the logo's transformed tile pattern.
fn paint_pattern(frame: &mut RgbaImage, img: &DynamicImage, logo: &Logo) -> Result<(), EngineError> {
    let s = &logo.settings;
    let (cw, ch) = frame.dimensions();
    let base_size = BASE_TILE_FRACTION * f64::from(cw.min(ch));

    let (spacing_x, spacing_y) = s.pattern_spacing();
    let tile = tile::build_tile(img, s.pattern_size(), spacing_x, spacing_y, base_size)?;

    let (offset_x, offset_y) = s.pattern_offset();
    let matrix = transform::pattern_transform(cw, ch, offset_x, offset_y, s.pattern_rotation());

    compose::fill_pattern(frame, &tile.image, matrix, s.opacity() as f32);
    Ok(())
}
