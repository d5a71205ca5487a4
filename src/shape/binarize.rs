//! Luma-threshold binarization into a [`PixelGrid`].

use std::fmt;

use image::{DynamicImage, Rgba};

/// State of one grid coordinate.
///
/// `Unset` is kept apart from `White`: only coordinates that were actually
/// evaluated count as white neighbors when denoising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Unset,
    White,
    Black,
}

/// Dense black/white grid sized to the (resized) image bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl PixelGrid {
    /// Creates a grid with every coordinate unset.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Unset; width as usize * height as usize],
        }
    }

    /// Builds a fully evaluated grid from rows of `true` (black) / `false` (white).
    ///
    /// Rows shorter than the widest one leave their tail unset.
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &black) in row.iter().enumerate() {
                grid.set(x as u32, y as u32, black);
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Returns the cell at `(x, y)`; anything outside the bounds reads as `Unset`.
    pub fn cell(&self, x: i64, y: i64) -> Cell {
        self.index(x, y).map_or(Cell::Unset, |i| self.cells[i])
    }

    pub fn is_black(&self, x: i64, y: i64) -> bool {
        self.cell(x, y) == Cell::Black
    }

    /// Records `(x, y)` as evaluated. Coordinates outside the bounds are ignored.
    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        if let Some(i) = self.index(x as i64, y as i64) {
            self.cells[i] = if black { Cell::Black } else { Cell::White };
        }
    }

    /// Resets `(x, y)` to the unset state.
    pub fn clear(&mut self, x: u32, y: u32) {
        if let Some(i) = self.index(x as i64, y as i64) {
            self.cells[i] = Cell::Unset;
        }
    }

    pub fn black_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Black).count()
    }
}

/// Renders the grid one text row per pixel row, `*` for black and a space otherwise.
impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height as i64 {
            let line: String = (0..self.width as i64)
                .map(|x| if self.is_black(x, y) { '*' } else { ' ' })
                .collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Average intensity of a pixel on the 16-bit premultiplied color scale,
/// brought back to 8 bits.
fn luma(px: Rgba<u8>) -> u8 {
    let [r, g, b, a] = px.0;
    let a = a as u32;
    let widen = |c: u8| (c as u32 * 0x101) * a / 0xff;
    (((widen(r) + widen(g) + widen(b)) >> 8) / 3) as u8
}

/// Splits the midpoint between the darkest and brightest luma.
///
/// Each bound is halved on its own before summing.
pub fn threshold(min: u8, max: u8) -> u8 {
    (min >> 1) + (max >> 1)
}

/// Converts `image` into a grid where a pixel is black iff its luma is strictly
/// below the adaptive threshold. Every in-bounds coordinate is written.
pub fn binarize(image: &DynamicImage) -> PixelGrid {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let lumas: Vec<u8> = rgba.pixels().map(|&px| luma(px)).collect();

    let mut grid = PixelGrid::new(width, height);
    let (Some(&min), Some(&max)) = (lumas.iter().min(), lumas.iter().max()) else {
        return grid;
    };
    let t = threshold(min, max);
    tracing::debug!(min, max, threshold = t, "binarizing");

    let w = width as usize;
    for (i, &l) in lumas.iter().enumerate() {
        grid.set((i % w) as u32, (i / w) as u32, l < t);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, RgbaImage};

    #[test]
    fn luma_extremes() {
        assert_eq!(luma(Rgba([255, 255, 255, 255])), 255);
        assert_eq!(luma(Rgba([0, 0, 0, 255])), 0);
        // 3 * 0x101 * 100 = 77100; >> 8 = 301; / 3 = 100
        assert_eq!(luma(Rgba([100, 100, 100, 255])), 100);
    }

    #[test]
    fn transparent_pixels_are_dark() {
        assert_eq!(luma(Rgba([255, 255, 255, 0])), 0);
    }

    #[test]
    fn threshold_halves_each_bound() {
        assert_eq!(threshold(3, 5), 3);
        assert_eq!(threshold(0, 255), 127);
        assert_eq!(threshold(9, 9), 8);
    }

    #[test]
    fn uniform_image_is_all_white() {
        for value in [0u8, 1, 77, 128, 255] {
            let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([value; 3])));
            let grid = binarize(&img);
            assert_eq!(grid.black_count(), 0, "value {value}");
            for y in 0..4 {
                for x in 0..6 {
                    assert_eq!(grid.cell(x, y), Cell::White);
                }
            }
        }
    }

    #[test]
    fn dark_pixels_become_black() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([250, 250, 250, 255]));
        img.put_pixel(1, 1, Rgba([10, 10, 10, 255]));
        let grid = binarize(&DynamicImage::ImageRgba8(img));
        assert_eq!(grid.black_count(), 1);
        assert!(grid.is_black(1, 1));
        assert_eq!(grid.cell(3, 0), Cell::Unset);
    }

    #[test]
    fn display_draws_black_as_stars() {
        let grid = PixelGrid::from_rows(&[vec![true, false, true], vec![false, true, false]]);
        assert_eq!(grid.to_string(), "* *\n *\n");
    }
}
