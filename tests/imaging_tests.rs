mod common;

use common::solid_image;
use image::{Rgba, RgbaImage};
use std::borrow::Cow;
use xray_cam::imaging::{
    blend, exponential_remap, generate_color_map, rasterize, render_overlay,
    resize_preserving_aspect_ratio,
};
use xray_cam::{ActivationGrid, XRayError};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
    })
}

// --- RESIZE ---

#[test]
fn test_resize_to_same_size_borrows_input() {
    let img = gradient(8, 8);
    let out = resize_preserving_aspect_ratio(&img, 8, 8).unwrap();
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(*out, img);
}

#[test]
fn test_resize_scales_square_image() {
    let img = gradient(16, 16);
    let out = resize_preserving_aspect_ratio(&img, 4, 4).unwrap();
    assert_eq!(out.dimensions(), (4, 4));

    let again = resize_preserving_aspect_ratio(&img, 4, 4).unwrap();
    assert_eq!(out, again);
}

#[test]
fn test_resize_rejects_aspect_ratio_change() {
    let img = gradient(8, 4);
    let err = resize_preserving_aspect_ratio(&img, 4, 4).unwrap_err();
    assert!(matches!(
        err,
        XRayError::AspectRatioMismatch {
            width: 8,
            height: 4,
            ..
        }
    ));
}

#[test]
fn test_resize_keeps_matching_non_square_ratio() {
    let img = gradient(8, 4);
    let out = resize_preserving_aspect_ratio(&img, 4, 2).unwrap();
    assert_eq!(out.dimensions(), (4, 2));
}

// --- COLOUR MAP ---

#[test]
fn test_exponential_remap_applies_base() {
    let grid = ActivationGrid::from_rows(&[[0.0, 1.0, 2.0]]).unwrap();
    let remapped = exponential_remap(&grid, 2.0);
    // Scaled so the hottest cell maps to 1.
    assert_eq!(remapped.values(), &[0.25, 0.5, 1.0]);
}

#[test]
fn test_color_map_survives_large_activations() {
    let cam = ActivationGrid::from_rows(&[[0.0, 1000.0]]).unwrap();
    let remapped = exponential_remap(&cam, 1.1);
    assert!(remapped.values().iter().all(|v| v.is_finite()));

    let map = generate_color_map(&cam, WHITE, 2, 1, 1.1).unwrap();
    assert_eq!(map.get_pixel(1, 0).0, [255, 255, 255, 255]);
    assert_eq!(map.get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn test_rasterize_scales_every_channel() {
    let grid = ActivationGrid::from_rows(&[[0.0, 0.5, 1.0]]).unwrap();
    let raster = rasterize(&grid, Rgba([200, 100, 50, 255]));

    assert_eq!(raster.dimensions(), (3, 1));
    assert_eq!(raster.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(raster.get_pixel(1, 0).0, [100, 50, 25, 127]);
    assert_eq!(raster.get_pixel(2, 0).0, [200, 100, 50, 255]);
}

#[test]
fn test_color_map_hot_and_cold_cells() {
    let cam = ActivationGrid::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
    let map = generate_color_map(&cam, WHITE, 2, 2, 1.1).unwrap();

    // x = column, y = row
    assert_eq!(map.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(map.get_pixel(1, 1).0, [255, 255, 255, 255]);

    let mid = map.get_pixel(1, 0).0;
    assert!(mid[3] > 0 && mid[3] < 255);
    assert_eq!(mid[0], mid[3]);
}

#[test]
fn test_color_map_upscales_to_target() {
    let cam = ActivationGrid::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
    let map = generate_color_map(&cam, WHITE, 14, 14, 1.1).unwrap();
    assert_eq!(map.dimensions(), (14, 14));
}

#[test]
fn test_color_map_of_flat_cam_is_transparent() {
    let cam = ActivationGrid::new(2, 2, vec![3.0; 4]).unwrap();
    let map = generate_color_map(&cam, WHITE, 2, 2, 1.1).unwrap();
    assert!(map.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

// --- BLEND ---

#[test]
fn test_blend_rejects_size_mismatch() {
    let bg = solid_image(4, 4, [10, 10, 10, 255]);
    let ov = solid_image(4, 3, [10, 10, 10, 255]);
    let err = blend(&bg, &ov).unwrap_err();
    assert!(matches!(err, XRayError::DimensionMismatch { .. }));
}

#[test]
fn test_blend_transparent_overlay_is_identity() {
    let bg = gradient(5, 5);
    let ov = solid_image(5, 5, [0, 0, 0, 0]);
    assert_eq!(blend(&bg, &ov).unwrap(), bg);
}

#[test]
fn test_blend_gray_overlay_keeps_background_luminosity() {
    // lum(200, 100, 50) = 124.5 on a 0-255 scale
    let bg = solid_image(2, 2, [200, 100, 50, 255]);
    let ov = solid_image(2, 2, [10, 10, 10, 255]);
    let out = blend(&bg, &ov).unwrap();

    for p in out.pixels() {
        let [r, g, b, a] = p.0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert!((124..=125).contains(&r), "got {}", r);
        assert_eq!(a, 255);
    }
}

#[test]
fn test_blend_takes_hue_from_overlay() {
    let bg = solid_image(3, 3, [128, 128, 128, 255]);
    let ov = solid_image(3, 3, [255, 0, 0, 255]);
    let bg_before = bg.clone();
    let ov_before = ov.clone();

    let out = blend(&bg, &ov).unwrap();
    let [r, g, b, a] = out.get_pixel(1, 1).0;
    assert!(r > g);
    assert_eq!(g, b);
    assert_eq!(a, 255);

    let lum = 0.3 * r as f32 + 0.59 * g as f32 + 0.11 * b as f32;
    assert!((lum - 128.0).abs() <= 2.0, "lum {}", lum);

    assert_eq!(bg, bg_before);
    assert_eq!(ov, ov_before);
}

#[test]
fn test_render_overlay_matches_background_size() {
    let bg = gradient(12, 12);
    let cam = ActivationGrid::from_rows(&[[0.0, 1.0], [2.0, 3.0]]).unwrap();
    let out = render_overlay(&bg, &cam, Rgba([232, 23, 93, 255]), 1.1).unwrap();
    assert_eq!(out.dimensions(), (12, 12));
    assert_ne!(out, bg);
}
