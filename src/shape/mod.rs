pub mod resize;
pub use resize::resize_to_fit;
pub mod binarize;
pub use binarize::{Cell, PixelGrid, binarize};
pub mod denoise;
pub use denoise::damp;
pub mod blobs;
pub use blobs::{Blob, Dot, detect_blobs, detect_dots};
