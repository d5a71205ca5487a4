//! Single-pass removal of black pixels that touch a confirmed white pixel.

use super::binarize::{Cell, PixelGrid};

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn touches_white(grid: &PixelGrid, x: i64, y: i64) -> bool {
    NEIGHBOURS
        .iter()
        .any(|&(dx, dy)| grid.cell(x + dx, y + dy) == Cell::White)
}

/// Flips to white every black pixel with at least one white 8-neighbour.
///
/// Unset and out-of-bounds neighbours do not count. All pixels are marked
/// against the input state before any of them is flipped, so removals never
/// cascade within one call. Returns the number of pixels removed.
pub fn damp(grid: &mut PixelGrid) -> usize {
    let mut marked: Vec<(u32, u32)> = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.is_black(x as i64, y as i64) && touches_white(grid, x as i64, y as i64) {
                marked.push((x, y));
            }
        }
    }
    for &(x, y) in &marked {
        grid.set(x, y, false);
    }
    tracing::debug!(removed = marked.len(), "damped grid");
    marked.len()
}
