#![allow(dead_code)]
//! Synthetic dot-pattern images shared by the integration tests.

use std::path::PathBuf;

use dot_signature::{Dot, Signature};
use image::{DynamicImage, Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const INK: Rgb<u8> = Rgb([20, 20, 20]);

/// Five dots on the corners and center of a square, scaled by 4.
pub const SQUARE_CENTERS: [(u32, u32); 5] = [(8, 8), (8, 32), (32, 8), (32, 32), (20, 20)];

/// An irregular layout whose pairwise distances are all distinct.
pub const SCATTER: [(i32, i32); 6] = [(0, 0), (3, 1), (10, 4), (2, 14), (-7, 9), (15, -6)];

/// Scatter points placed in a 180x180 image.
pub fn scatter_centers(scale: i32, offset: i32) -> Vec<(u32, u32)> {
    SCATTER
        .iter()
        .map(|&(x, y)| ((x * scale + offset) as u32, (y * scale + offset) as u32))
        .collect()
}

/// White image with a filled ink square of side `2 * half + 1` around each center.
pub fn dot_image(width: u32, height: u32, centers: &[(u32, u32)], half: u32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, WHITE);
    for &(cx, cy) in centers {
        for y in cy - half..=cy + half {
            for x in cx - half..=cx + half {
                img.put_pixel(x, y, INK);
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

pub fn dots(points: &[(i32, i32)]) -> Vec<Dot> {
    points.iter().map(|&(x, y)| Dot::new(x, y)).collect()
}

/// Fresh scratch directory unique to this test process.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dotsig-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Asserts both signatures have the same length and every field agrees within one unit.
pub fn assert_signatures_close(a: &Signature, b: &Signature) {
    assert_eq!(a.len(), b.len(), "cardinality differs: {a:?} vs {b:?}");
    for (fa, fb) in a.iter().zip(b.iter()) {
        assert!(
            (fa.angle - fb.angle).abs() <= 1 && (fa.length - fb.length).abs() <= 1,
            "features differ: {fa:?} vs {fb:?}\n{a:?}\n{b:?}"
        );
    }
}
