//! Game-over detection.

use crate::pieces::Rack;
use crate::grid::Grid;
use crate::placement::fits_anywhere;

/// True if some rack piece fits somewhere. With `allow_rotations`, a piece that
/// doesn't fit as dealt is also tried in its 3 other clockwise orientations.
/// An empty rack is never a loss.
pub fn has_any_move(rack: &Rack, grid: &Grid, allow_rotations: bool) -> bool {
    if rack.is_empty() {
        return true;
    }
    let turns = if allow_rotations { 4 } else { 1 };
    rack.pieces().any(|(_, piece)| {
        (0..turns).any(|n| fits_anywhere(&piece.current_shape.rotated(n), grid))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceCatalog;
    use crate::pieces::PieceFactory;

    /// Diagonal stripes put a block every 4 cells in each row and column, so
    /// no 4-in-a-row run survives anywhere.
    fn broken_runs() -> Grid {
        let mut g = Grid::default();
        for r in 0..10 {
            for c in 0..10 {
                if (r + c) % 4 == 0 {
                    g.set(r, c, 1);
                }
            }
        }
        g
    }

    fn rack_with(id: &str, turns: u8) -> Rack {
        let cat = PieceCatalog::standard().unwrap();
        let mut f = PieceFactory::new(0);
        let mut rack = Rack::default();
        rack.put(0, f.instantiate(cat.get(id).unwrap(), turns));
        rack
    }

    #[test]
    fn test_line_of_four_blocked_everywhere() {
        let g = broken_runs();
        assert!(!has_any_move(&rack_with("I", 0), &g, false));
        assert!(!has_any_move(&rack_with("I", 0), &g, true));
    }

    #[test]
    fn test_empty_rack_is_not_game_over() {
        let mut g = Grid::default();
        for r in 0..10 {
            for c in 0..10 {
                g.set(r, c, 1);
            }
        }
        assert!(has_any_move(&Rack::default(), &g, false));
    }

    #[test]
    fn test_rotation_rescues_vertical_bar() {
        // only row 0 has room: the vertical bar needs a turn to fit
        let mut g = Grid::default();
        for r in 1..10 {
            for c in 0..10 {
                g.set(r, c, 1);
            }
        }
        let vertical = rack_with("I", 1);
        assert!(!has_any_move(&vertical, &g, false));
        assert!(has_any_move(&vertical, &g, true));
    }
}
