//! Draws detected dots and the reference pair over an image for inspection.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::shape::Dot;
use crate::signature::ReferencePair;

const COLOR_DOT: Rgba<u8> = Rgba([60, 110, 220, 255]);
const COLOR_START: Rgba<u8> = Rgba([110, 170, 90, 255]);
const COLOR_END: Rgba<u8> = Rgba([230, 130, 30, 255]);
const MIN_RING_RADIUS: i32 = 3;

fn ring_radius(width: u32, height: u32) -> i32 {
    ((width.min(height) / 100) as i32).max(MIN_RING_RADIUS)
}

/// Returns a copy of `image` with a ring around every dot, the reference
/// segment drawn from `start` to `end`, and both reference dots filled.
///
/// `image` must be the resized image the dots were detected on.
pub fn annotate(image: &DynamicImage, dots: &[Dot], reference: ReferencePair) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let radius = ring_radius(canvas.width(), canvas.height());

    for dot in dots {
        draw_hollow_circle_mut(&mut canvas, (dot.x, dot.y), radius, COLOR_DOT);
    }

    if let (Some(start), Some(end)) = (dots.get(reference.start), dots.get(reference.end)) {
        draw_line_segment_mut(
            &mut canvas,
            (start.x as f32, start.y as f32),
            (end.x as f32, end.y as f32),
            COLOR_START,
        );
        draw_filled_circle_mut(&mut canvas, (start.x, start.y), radius, COLOR_START);
        draw_filled_circle_mut(&mut canvas, (end.x, end.y), radius, COLOR_END);
    }

    canvas
}
