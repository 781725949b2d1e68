//! Occupancy grid: 0 = empty, 1..=7 = colour index.

use crate::shape::Shape;
use rand::Rng;

pub const GRID_ROWS: usize = 10;
pub const GRID_COLS: usize = 10;

/// Highest colour index a cell can hold.
pub const MAX_COLOR: u8 = 7;

/// Fraction of cells pre-filled at the start of a classic game.
pub const CLASSIC_FILL_RATIO: f64 = 0.2;

/// Fixed-size matrix, row-major. Dimensions never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_ROWS, GRID_COLS)
    }
}

impl Grid {
    /// Empty grid of the given size.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        debug_assert!(value <= MAX_COLOR, "cell value {value} is not a colour index");
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = value;
        }
    }

    #[inline]
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(0)
    }

    /// Write `color` into every cell of `shape` anchored at (origin_row, origin_col).
    /// Performs no collision checking; callers validate with `placement::is_valid_placement` first.
    /// Cells outside the grid are dropped rather than wrapped.
    pub fn place_shape(&mut self, shape: &Shape, origin_row: i32, origin_col: i32, color: u8) {
        debug_assert!((1..=MAX_COLOR).contains(&color), "piece colour {color} out of range");
        for &(r, c) in shape.cells() {
            let (row, col) = (origin_row + r, origin_col + c);
            if self.in_bounds(row, col) {
                self.set(row as usize, col as usize, color);
            }
        }
    }

    /// Zero a row. Returns false (grid unchanged) when out of range.
    pub fn clear_row(&mut self, row: usize) -> bool {
        if row >= self.rows {
            return false;
        }
        let start = row * self.cols;
        self.cells[start..start + self.cols].fill(0);
        true
    }

    /// Zero a column. Returns false (grid unchanged) when out of range.
    pub fn clear_column(&mut self, col: usize) -> bool {
        if col >= self.cols {
            return false;
        }
        for row in 0..self.rows {
            self.cells[row * self.cols + col] = 0;
        }
        true
    }

    /// Rotate one column's values by one position with wrap-around.
    /// `direction >= 0` moves values up (top value wraps to the bottom); negative is the mirror.
    pub fn shift_column(&mut self, col: usize, direction: i32) -> bool {
        if col >= self.cols {
            return false;
        }
        let mut values: Vec<u8> = (0..self.rows)
            .map(|row| self.cells[row * self.cols + col])
            .collect();
        if direction >= 0 {
            values.rotate_left(1);
        } else {
            values.rotate_right(1);
        }
        for (row, v) in values.into_iter().enumerate() {
            self.cells[row * self.cols + col] = v;
        }
        true
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        row < self.rows && self.row(row).iter().all(|&v| v != 0)
    }

    pub fn is_column_full(&self, col: usize) -> bool {
        col < self.cols && (0..self.rows).all(|row| self.cells[row * self.cols + col] != 0)
    }

    pub fn row_has_blocks(&self, row: usize) -> bool {
        row < self.rows && self.row(row).iter().any(|&v| v != 0)
    }

    pub fn column_has_blocks(&self, col: usize) -> bool {
        col < self.cols && (0..self.rows).any(|row| self.cells[row * self.cols + col] != 0)
    }

    fn row(&self, row: usize) -> &[u8] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Reset every cell to empty.
    pub fn clear_all(&mut self) {
        self.cells.fill(0);
    }

    /// Fill `floor(rows * cols * ratio)` empty cells with random colours 1..=7.
    pub fn fill_random(&mut self, ratio: f64, rng: &mut impl Rng) {
        let total = self.rows * self.cols;
        let empty = total - self.occupied_count();
        let target = ((total as f64 * ratio.clamp(0.0, 1.0)).floor() as usize).min(empty);
        let mut filled = 0;
        while filled < target {
            let row = rng.random_range(0..self.rows);
            let col = rng.random_range(0..self.cols);
            if self.is_empty_at(row, col) {
                self.set(row, col, rng.random_range(1..=MAX_COLOR));
                filled += 1;
            }
        }
    }
}
