//! Piece shapes: normalized (row, col) offsets and the rotate/flip transforms.

use thiserror::Error;

/// A single occupied offset inside a shape's bounding box.
pub type Offset = (i32, i32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("shape has no cells")]
    Empty,
    #[error("shape repeats cell ({0}, {1})")]
    DuplicateCell(i32, i32),
}

/// Normalized set of offsets: minimum row and column are 0, cells sorted row-major.
/// Sorting makes `==` a set comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    cells: Vec<Offset>,
}

impl Shape {
    /// Build a shape from arbitrary offsets; they are shifted so the bounding box starts at (0, 0).
    pub fn new(cells: &[Offset]) -> Result<Self, ShapeError> {
        if cells.is_empty() {
            return Err(ShapeError::Empty);
        }
        let mut sorted = normalize(cells);
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(ShapeError::DuplicateCell(w[0].0, w[0].1));
        }
        Ok(Self { cells: sorted })
    }

    /// Internal constructor for offsets already known to be non-empty and unique.
    fn from_unique(cells: &[Offset]) -> Self {
        let mut sorted = normalize(cells);
        sorted.sort_unstable();
        Self { cells: sorted }
    }

    #[inline]
    pub fn cells(&self) -> &[Offset] {
        &self.cells
    }

    /// Cell count.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Bounding box as (height, width) in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        let (max_r, max_c) = self
            .cells
            .iter()
            .fold((0, 0), |(ar, ac), &(r, c)| (ar.max(r), ac.max(c)));
        (max_r as usize + 1, max_c as usize + 1)
    }

    /// 90° clockwise: (r, c) -> (c, h - r) where h is the bounding-box height span.
    pub fn rotate_clockwise(&self) -> Self {
        let h = self.cells.iter().map(|&(r, _)| r).max().unwrap_or(0);
        let rotated: Vec<Offset> = self.cells.iter().map(|&(r, c)| (c, h - r)).collect();
        Self::from_unique(&rotated)
    }

    /// Mirror left-right: (r, c) -> (r, w - c). Its own inverse.
    pub fn flip_horizontal(&self) -> Self {
        let w = self.cells.iter().map(|&(_, c)| c).max().unwrap_or(0);
        let flipped: Vec<Offset> = self.cells.iter().map(|&(r, c)| (r, w - c)).collect();
        Self::from_unique(&flipped)
    }

    /// `n` successive clockwise rotations (n is taken modulo 4).
    pub fn rotated(&self, n: u8) -> Self {
        (0..n % 4).fold(self.clone(), |s, _| s.rotate_clockwise())
    }
}

/// Shift offsets so the minimum row and column become 0.
fn normalize(cells: &[Offset]) -> Vec<Offset> {
    let min_r = cells.iter().map(|&(r, _)| r).min().unwrap_or(0);
    let min_c = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);
    cells.iter().map(|&(r, c)| (r - min_r, c - min_c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_normalizes() {
        let s = Shape::new(&[(2, 3), (3, 3)]).unwrap();
        assert_eq!(s.cells(), &[(0, 0), (1, 0)]);
    }

    #[test]
    fn test_new_rejects_empty_and_duplicates() {
        assert_eq!(Shape::new(&[]), Err(ShapeError::Empty));
        assert_eq!(
            Shape::new(&[(0, 0), (0, 0)]),
            Err(ShapeError::DuplicateCell(0, 0))
        );
    }

    #[test]
    fn test_rotate_vertical_domino() {
        let s = Shape::new(&[(0, 0), (1, 0)]).unwrap();
        assert_eq!(s.rotate_clockwise().cells(), &[(0, 0), (0, 1)]);
    }

    #[test]
    fn test_rotate_l_shape() {
        // X.
        // X.
        // XX
        let s = Shape::new(&[(0, 0), (1, 0), (2, 0), (2, 1)]).unwrap();
        // XXX
        // X..
        let r = s.rotate_clockwise();
        assert_eq!(r.cells(), &[(0, 0), (0, 1), (0, 2), (1, 0)]);
        assert_eq!(r.dimensions(), (2, 3));
    }

    #[test]
    fn test_flip_t_shape_is_symmetric() {
        let t = Shape::new(&[(0, 1), (1, 0), (1, 1), (1, 2)]).unwrap();
        assert_eq!(t.flip_horizontal(), t);
    }

    #[test]
    fn test_flip_s_becomes_z() {
        let s = Shape::new(&[(0, 1), (0, 2), (1, 0), (1, 1)]).unwrap();
        let z = Shape::new(&[(0, 0), (0, 1), (1, 1), (1, 2)]).unwrap();
        assert_eq!(s.flip_horizontal(), z);
    }

    fn arb_shape() -> impl Strategy<Value = Shape> {
        prop::collection::btree_set((0i32..5, 0i32..5), 1..10).prop_map(|set| {
            let cells: Vec<Offset> = set.into_iter().collect();
            Shape::new(&cells).unwrap()
        })
    }

    proptest! {
        #[test]
        fn rotation_is_a_four_cycle(s in arb_shape()) {
            let back = s.rotate_clockwise().rotate_clockwise().rotate_clockwise().rotate_clockwise();
            prop_assert_eq!(back, s);
        }

        #[test]
        fn flip_is_an_involution(s in arb_shape()) {
            prop_assert_eq!(s.flip_horizontal().flip_horizontal(), s);
        }

        #[test]
        fn transforms_preserve_size_and_normalization(s in arb_shape(), n in 0u8..4) {
            for t in [s.rotated(n), s.flip_horizontal()] {
                prop_assert_eq!(t.size(), s.size());
                prop_assert_eq!(t.cells().iter().map(|c| c.0).min(), Some(0));
                prop_assert_eq!(t.cells().iter().map(|c| c.1).min(), Some(0));
            }
        }
    }
}
