//! Aspect-preserving downscale into a bounding square.

use std::borrow::Cow;

use image::DynamicImage;
use image::imageops::FilterType;

const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Computes the dimensions an image of `width × height` is scaled to so that its
/// larger side equals `size`. Returns `None` when the image already fits.
pub fn fitted_dimensions(width: u32, height: u32, size: u32) -> Option<(u32, u32)> {
    if width <= size && height <= size {
        return None;
    }
    let size64 = size as u64;
    let (w, h) = if width >= height {
        (size64, size64 * height as u64 / width as u64)
    } else {
        (size64 * width as u64 / height as u64, size64)
    };
    // A sliver thinner than one output pixel still keeps one row/column.
    Some(((w as u32).max(1), (h as u32).max(1)))
}

/// Scales `image` down so neither side exceeds `size`.
///
/// An image that already fits is handed back borrowed, untouched.
pub fn resize_to_fit(image: &DynamicImage, size: u32) -> Cow<'_, DynamicImage> {
    match fitted_dimensions(image.width(), image.height(), size) {
        None => Cow::Borrowed(image),
        Some((w, h)) => {
            tracing::debug!(
                from_w = image.width(),
                from_h = image.height(),
                to_w = w,
                to_h = h,
                "resizing image"
            );
            Cow::Owned(image.resize_exact(w, h, RESIZE_FILTER))
        }
    }
}
