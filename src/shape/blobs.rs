//! 8-connected component labeling of black pixels.

use serde::{Deserialize, Serialize};

use super::binarize::PixelGrid;

/// Representative point of one blob: the midpoint of its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dot {
    pub x: i32,
    pub y: i32,
}

impl Dot {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One connected component, with its bounding box tracked while labeling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub id: usize,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
    pub pixels: usize,
}

impl Blob {
    fn seed(id: usize, x: u32, y: u32) -> Self {
        Self {
            id,
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
            pixels: 0,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.pixels += 1;
    }

    /// Bounding-box midpoint, integer division.
    pub fn center(&self) -> Dot {
        Dot {
            x: ((self.min_x + self.max_x) / 2) as i32,
            y: ((self.min_y + self.max_y) / 2) as i32,
        }
    }
}

/// Labels every 8-connected group of black pixels.
///
/// Coordinates are scanned column by column (x outer, y inner) and blobs are
/// returned in the order their first pixel is met. Flooding uses an explicit
/// stack so large blobs cannot exhaust the call stack.
pub fn detect_blobs(grid: &PixelGrid) -> Vec<Blob> {
    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let mut labeled = vec![false; width * height];
    let mut blobs: Vec<Blob> = Vec::new();
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for x in 0..grid.width() {
        for y in 0..grid.height() {
            let idx = y as usize * width + x as usize;
            if labeled[idx] || !grid.is_black(x as i64, y as i64) {
                continue;
            }

            let mut blob = Blob::seed(blobs.len(), x, y);
            labeled[idx] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                blob.include(cx, cy);
                for dx in -1i64..=1 {
                    for dy in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = cx as i64 + dx;
                        let ny = cy as i64 + dy;
                        if !grid.is_black(nx, ny) {
                            continue;
                        }
                        // is_black already rejected out-of-bounds coordinates.
                        let nidx = ny as usize * width + nx as usize;
                        if labeled[nidx] {
                            continue;
                        }
                        labeled[nidx] = true;
                        stack.push((nx as u32, ny as u32));
                    }
                }
            }

            blobs.push(blob);
        }
    }

    tracing::debug!(blobs = blobs.len(), "labeled components");
    blobs
}

/// Convenience over [`detect_blobs`] returning only the representative dots.
pub fn detect_dots(grid: &PixelGrid) -> Vec<Dot> {
    detect_blobs(grid).iter().map(Blob::center).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> PixelGrid {
        let rows: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c == '#').collect())
            .collect();
        PixelGrid::from_rows(&rows)
    }

    #[test]
    fn diagonal_pixels_join_one_blob() {
        let g = grid(&["#..", ".#.", "..#"]);
        let blobs = detect_blobs(&g);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].pixels, 3);
        assert_eq!(blobs[0].center(), Dot::new(1, 1));
    }

    #[test]
    fn blobs_are_ordered_by_column_major_discovery() {
        let g = grid(&[
            "....#", //
            ".....",
            "#....",
            ".....",
            "..#..",
        ]);
        let dots = detect_dots(&g);
        assert_eq!(dots, vec![Dot::new(0, 2), Dot::new(2, 4), Dot::new(4, 0)]);
    }

    #[test]
    fn center_is_bounding_box_midpoint() {
        // Mass centroid would lean right; the box midpoint does not.
        let g = grid(&["#####", "....#", "....#", "....#"]);
        let blobs = detect_blobs(&g);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].center(), Dot::new(2, 1));
        assert_eq!(
            (blobs[0].min_x, blobs[0].max_x, blobs[0].min_y, blobs[0].max_y),
            (0, 4, 0, 3)
        );
    }

    #[test]
    fn empty_grid_has_no_blobs() {
        let g = grid(&["...", "..."]);
        assert!(detect_blobs(&g).is_empty());
    }

    #[test]
    fn large_blob_does_not_overflow_stack() {
        let g = PixelGrid::from_rows(&vec![vec![true; 1000]; 1000]);
        let blobs = detect_blobs(&g);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].pixels, 1_000_000);
        assert_eq!(blobs[0].center(), Dot::new(499, 499));
    }
}
