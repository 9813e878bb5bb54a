//! Pixel compositing primitives: positioned overlays and transformed
//! repeating pattern fills, both blended source-over with an extra opacity.

use glam::{DAffine2, DVec2};
use image::{Rgba, RgbaImage};

/// Overlay `top` onto `base` with its top-left corner at `(x, y)`.
///
/// The position may be negative or past the edges; the overlay is clipped to
/// the base. `opacity` multiplies the overlay's own alpha.
pub fn overlay(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64, opacity: f32) {
    let base_w = i64::from(base.width());
    let base_h = i64::from(base.height());

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + i64::from(top.width())).min(base_w);
    let y_end = (y + i64::from(top.height())).min(base_h);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let fg = top.get_pixel((tx - x) as u32, (ty - y) as u32);
            let target = base.get_pixel_mut(tx as u32, ty as u32);
            *target = blend_over(*target, to_f32(fg), opacity);
        }
    }
}

/// Fill all of `base` with `tile` repeated over an infinite plane.
///
/// `pattern_to_canvas` maps pattern-space coordinates (where the tile grid
/// is anchored at the origin) to canvas coordinates. Each canvas pixel
/// center is mapped back into pattern space and sampled with wrap-around
/// bilinear filtering.
pub fn fill_pattern(
    base: &mut RgbaImage,
    tile: &RgbaImage,
    pattern_to_canvas: DAffine2,
    opacity: f32,
) {
    if tile.width() == 0 || tile.height() == 0 {
        return;
    }
    let canvas_to_pattern = pattern_to_canvas.inverse();
    if !canvas_to_pattern.is_finite() {
        return;
    }

    for (px, py, pixel) in base.enumerate_pixels_mut() {
        let center = DVec2::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
        let p = canvas_to_pattern.transform_point2(center);
        let sample = sample_wrapped(tile, p.x - 0.5, p.y - 0.5);
        *pixel = blend_over(*pixel, sample, opacity);
    }
}

/// Porter-Duff source-over in straight alpha.
///
/// `fg` channels are in `0.0..=255.0`. Zero effective alpha returns `bg`
/// untouched; full effective alpha returns `fg` opaque.
pub fn blend_over(bg: Rgba<u8>, fg: [f32; 4], opacity: f32) -> Rgba<u8> {
    let src_a = (fg[3] / 255.0) * opacity.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return bg;
    }
    if src_a >= 1.0 {
        return Rgba([to_u8(fg[0]), to_u8(fg[1]), to_u8(fg[2]), 255]);
    }

    let dst_a = f32::from(bg[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let channel =
        |f: f32, b: u8| to_u8((f * src_a + f32::from(b) * dst_a * (1.0 - src_a)) / out_a);

    Rgba([
        channel(fg[0], bg[0]),
        channel(fg[1], bg[1]),
        channel(fg[2], bg[2]),
        to_u8(out_a * 255.0),
    ])
}

/// Bilinear sample at texel coordinates `(x, y)` with wrap-around.
///
/// Interpolates premultiplied color so transparent margins do not darken
/// logo edges. Integer coordinates return the texel exactly.
fn sample_wrapped(tile: &RgbaImage, x: f64, y: f64) -> [f32; 4] {
    let (w, h) = (i64::from(tile.width()), i64::from(tile.height()));
    let x0 = x.floor();
    let y0 = y.floor();
    let (xi, yi) = (x0 as i64, y0 as i64);
    let texel = |dx: i64, dy: i64| {
        let tx = (xi + dx).rem_euclid(w) as u32;
        let ty = (yi + dy).rem_euclid(h) as u32;
        tile.get_pixel(tx, ty)
    };

    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    if fx == 0.0 && fy == 0.0 {
        return to_f32(texel(0, 0));
    }

    let mut acc = [0.0f32; 4];
    for (dx, dy, weight) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        if weight == 0.0 {
            continue;
        }
        let p = texel(dx, dy);
        let a = f32::from(p[3]) / 255.0;
        acc[0] += f32::from(p[0]) * a * weight;
        acc[1] += f32::from(p[1]) * a * weight;
        acc[2] += f32::from(p[2]) * a * weight;
        acc[3] += a * weight;
    }

    if acc[3] <= 0.0 {
        return [0.0; 4];
    }
    [
        acc[0] / acc[3],
        acc[1] / acc[3],
        acc[2] / acc[3],
        acc[3] * 255.0,
    ]
}

fn to_f32(p: &Rgba<u8>) -> [f32; 4] {
    [
        f32::from(p[0]),
        f32::from(p[1]),
        f32::from(p[2]),
        f32::from(p[3]),
    ]
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
