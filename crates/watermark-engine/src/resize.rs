//! Logo resampling utilities.
//!
//! Provides aspect-ratio math and exact-size resampling using triangle
//! (bilinear) filtering on premultiplied color.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, Rgba32FImage, RgbaImage};
use tracing::debug;

use crate::EngineError;

/// Height that keeps the source aspect ratio at `target_width`.
///
/// Fails for sources with a zero dimension, whose aspect ratio is undefined.
pub fn aspect_height(src_w: u32, src_h: u32, target_width: f64) -> Result<f64, EngineError> {
    if src_w == 0 || src_h == 0 {
        return Err(EngineError::DegenerateLogo {
            width: src_w,
            height: src_h,
        });
    }
    Ok(target_width * (f64::from(src_h) / f64::from(src_w)))
}

/// Round a fractional draw size to whole pixels; `None` if either side rounds to zero.
pub fn pixel_size(width: f64, height: f64) -> Option<(u32, u32)> {
    if !width.is_finite() || !height.is_finite() {
        return None;
    }
    let w = width.round();
    let h = height.round();
    if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
        return None;
    }
    Some((w as u32, h as u32))
}

/// Largest scaled logo, in pixels, that is ever resampled (64 Mi pixels).
pub const MAX_DRAW_PIXELS: u64 = 1 << 26;

/// Reject scaled sizes too large to allocate.
///
/// Extreme aspect ratios can scale a logo to billions of pixels even though
/// only a sliver of it would land on the canvas.
pub fn check_draw_size(width: u32, height: u32) -> Result<(), EngineError> {
    if u64::from(width) * u64::from(height) > MAX_DRAW_PIXELS {
        return Err(EngineError::OversizedLogo {
            width,
            height,
            limit: MAX_DRAW_PIXELS,
        });
    }
    Ok(())
}

/// Resample an image to exactly `width` x `height` RGBA pixels.
///
/// Returns an unfiltered copy if the image already has that size.
pub fn resize_exact(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let (orig_w, orig_h) = (img.width(), img.height());
    let rgba = img.to_rgba8();

    if (orig_w, orig_h) == (width, height) {
        debug!(width, height, "Logo already at target size, skipping resize");
        return rgba;
    }

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height = height,
        "Resizing logo"
    );

    let premultiplied = premultiply(DynamicImage::ImageRgba8(rgba).to_rgba32f());
    let scaled = imageops::resize(&premultiplied, width, height, FilterType::Triangle);
    unpremultiply(&scaled)
}

fn premultiply(mut img: Rgba32FImage) -> Rgba32FImage {
    for p in img.pixels_mut() {
        let a = p[3];
        p[0] *= a;
        p[1] *= a;
        p[2] *= a;
    }
    img
}

fn unpremultiply(img: &Rgba32FImage) -> RgbaImage {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RgbaImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let a = p[3];
        if a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(p[0] / a), to_u8(p[1] / a), to_u8(p[2] / a), to_u8(a)])
    })
}
