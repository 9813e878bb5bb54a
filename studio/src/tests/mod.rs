use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::media::encode_image;
use crate::state::WorkspaceState;

const BASE: Rgba<u8> = Rgba([30, 60, 90, 255]);
const LOGO: Rgba<u8> = Rgba([250, 20, 20, 255]);

fn encoded(img: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    encode_image(&img, format).expect("Failed to encode test image")
}

fn solid_png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
    encoded(RgbaImage::from_pixel(w, h, color), ImageFormat::Png)
}

/// A PNG whose header is intact but whose pixel data is cut off.
fn truncated_png() -> Vec<u8> {
    let noisy = RgbaImage::from_fn(64, 64, |x, y| {
        Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255])
    });
    let bytes = encoded(noisy, ImageFormat::Png);
    bytes[..bytes.len() / 2].to_vec()
}

/// Two base images and one logo with default settings.
fn test_workspace() -> (WorkspaceState, String) {
    let mut state = WorkspaceState::default();
    let report = state.add_images(vec![
        ("a.png", solid_png(64, 48, BASE)),
        ("b.png", solid_png(40, 40, BASE)),
    ]);
    assert!(report.rejected.is_empty());
    let logo = state
        .add_logo("logo.png", solid_png(20, 10, LOGO))
        .expect("Failed to add test logo");
    (state, logo)
}

mod preview;
