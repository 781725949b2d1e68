//! Placement validation: the single authority for "can this shape go here".

use crate::grid::Grid;
use crate::shape::Shape;

/// Grid origin a shape's (0, 0) offset is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub row: i32,
    pub col: i32,
}

/// True iff every cell of `shape` at the origin lies inside the grid and is empty.
pub fn is_valid_placement(shape: &Shape, origin_row: i32, origin_col: i32, grid: &Grid) -> bool {
    shape.cells().iter().all(|&(r, c)| {
        let (row, col) = (origin_row + r, origin_col + c);
        grid.in_bounds(row, col) && grid.is_empty_at(row as usize, col as usize)
    })
}

/// Every origin in the grid where `shape` fits, row-major.
pub fn find_all_valid_placements(shape: &Shape, grid: &Grid) -> Vec<Placement> {
    let mut out = Vec::new();
    for row in 0..grid.rows() as i32 {
        for col in 0..grid.cols() as i32 {
            if is_valid_placement(shape, row, col, grid) {
                out.push(Placement { row, col });
            }
        }
    }
    out
}

/// Early-exit variant of `find_all_valid_placements(..).is_empty()`.
pub fn fits_anywhere(shape: &Shape, grid: &Grid) -> bool {
    (0..grid.rows() as i32)
        .any(|row| (0..grid.cols() as i32).any(|col| is_valid_placement(shape, row, col, grid)))
}
