//! Pattern-space to canvas-space transform for tiled fills.

use glam::{DAffine2, DVec2};
use tracing::debug;

/// Build the transform applied to the infinite tiled plane.
///
/// Composed as `translate(offset + center) * rotate(degrees) * translate(-center)`:
/// the plane is rotated about the canvas center and then shifted by the
/// pixel offset. Positive angles turn clockwise on screen (y points down).
pub fn pattern_transform(
    canvas_w: u32,
    canvas_h: u32,
    offset_x: f64,
    offset_y: f64,
    rotation_degrees: f64,
) -> DAffine2 {
    let center = DVec2::new(f64::from(canvas_w) / 2.0, f64::from(canvas_h) / 2.0);
    let offset = DVec2::new(offset_x, offset_y);

    debug!(
        canvas_w,
        canvas_h, offset_x, offset_y, rotation_degrees, "Building pattern transform"
    );

    DAffine2::from_translation(offset + center)
        * DAffine2::from_angle(rotation_degrees.to_radians())
        * DAffine2::from_translation(-center)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DVec2, b: DVec2) {
        assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn zero_rotation_and_offset_is_identity() {
        let t = pattern_transform(640, 480, 0.0, 0.0, 0.0);
        assert_eq!(t, DAffine2::IDENTITY);
    }

    #[test]
    fn offset_without_rotation_is_pure_translation() {
        let t = pattern_transform(100, 50, 7.0, -3.0, 0.0);
        assert_eq!(t.transform_point2(DVec2::ZERO), DVec2::new(7.0, -3.0));
    }

    #[test]
    fn rotation_keeps_canvas_center_fixed() {
        let t = pattern_transform(200, 100, 0.0, 0.0, 37.0);
        assert_close(t.transform_point2(DVec2::new(100.0, 50.0)), DVec2::new(100.0, 50.0));
    }

    #[test]
    fn quarter_turn_is_clockwise_about_center() {
        let t = pattern_transform(200, 200, 0.0, 0.0, 90.0);
        // A point right of center moves below it.
        assert_close(
            t.transform_point2(DVec2::new(150.0, 100.0)),
            DVec2::new(100.0, 150.0),
        );
    }

    #[test]
    fn offset_applies_after_rotation() {
        let t = pattern_transform(200, 200, 10.0, 20.0, 90.0);
        assert_close(
            t.transform_point2(DVec2::new(100.0, 100.0)),
            DVec2::new(110.0, 120.0),
        );
    }
}
