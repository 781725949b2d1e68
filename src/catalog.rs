//! Static piece table: 30 shapes in 5 unlock tiers.

use crate::grid::MAX_COLOR;
use crate::shape::{Offset, Shape, ShapeError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Unlock grouping. Starter pieces are always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Starter,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub const ALL: [Self; 5] = [
        Self::Starter,
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Platinum,
    ];

    /// Score needed to unlock this tier's pieces; `None` for starter.
    pub fn required_score(self) -> Option<u32> {
        match self {
            Self::Starter => None,
            Self::Bronze => Some(1_000),
            Self::Silver => Some(3_000),
            Self::Gold => Some(7_000),
            Self::Platinum => Some(15_000),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable template a piece instance is cloned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub shape: Shape,
    pub color: u8,
    pub tier: Tier,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("piece {id}: {source}")]
    Shape {
        id: &'static str,
        #[source]
        source: ShapeError,
    },
    #[error("piece {id}: colour {color} outside 1..=7")]
    Color { id: &'static str, color: u8 },
    #[error("duplicate piece id {0}")]
    DuplicateId(&'static str),
}

type RawPiece = (&'static str, &'static str, &'static [Offset], u8, Tier);

#[rustfmt::skip]
const STANDARD_PIECES: &[RawPiece] = &[
    ("I", "I-Line", &[(0, 0), (0, 1), (0, 2), (0, 3)], 1, Tier::Starter),
    ("O", "O-Square", &[(0, 0), (0, 1), (1, 0), (1, 1)], 2, Tier::Starter),
    ("T", "T-Shape", &[(0, 1), (1, 0), (1, 1), (1, 2)], 3, Tier::Starter),
    ("S", "S-Shape", &[(0, 1), (0, 2), (1, 0), (1, 1)], 4, Tier::Starter),
    ("Z", "Z-Shape", &[(0, 0), (0, 1), (1, 1), (1, 2)], 5, Tier::Starter),
    ("J", "J-Shape", &[(0, 0), (1, 0), (1, 1), (1, 2)], 6, Tier::Starter),
    ("L", "L-Shape", &[(0, 2), (1, 0), (1, 1), (1, 2)], 7, Tier::Starter),

    ("bronze1", "P-Shape", &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)], 1, Tier::Bronze),
    ("bronze2", "U-Shape", &[(0, 0), (0, 2), (1, 0), (1, 1), (1, 2)], 2, Tier::Bronze),
    ("bronze3", "Y-Shape", &[(0, 1), (1, 0), (1, 1), (2, 1), (3, 1)], 3, Tier::Bronze),
    ("bronze4", "F-Shape", &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)], 4, Tier::Bronze),
    ("bronze5", "N-Shape", &[(0, 1), (1, 0), (1, 1), (2, 0), (3, 0)], 5, Tier::Bronze),

    ("silver1", "V-Shape", &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)], 6, Tier::Silver),
    ("silver2", "W-Shape", &[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)], 7, Tier::Silver),
    ("silver3", "Cross", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)], 1, Tier::Silver),
    ("silver4", "Plus", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)], 2, Tier::Silver),
    ("silver5", "Corner", &[(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)], 3, Tier::Silver),
    ("silver6", "Step", &[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)], 4, Tier::Silver),

    ("gold1", "Spiral", &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 0), (2, 2)], 5, Tier::Gold),
    ("gold2", "Diamond", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)], 6, Tier::Gold),
    ("gold3", "Arrow", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1), (3, 1)], 7, Tier::Gold),
    ("gold4", "Bridge", &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 2)], 1, Tier::Gold),
    ("gold5", "Claw", &[(0, 0), (0, 2), (1, 0), (1, 1), (1, 2)], 2, Tier::Gold),
    ("gold6", "Wave", &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2), (2, 3)], 3, Tier::Gold),

    ("platinum1", "Master-1", &[(0, 0), (0, 1), (0, 2), (1, 1), (2, 0), (2, 2)], 4, Tier::Platinum),
    ("platinum2", "Master-2", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 0), (2, 2)], 5, Tier::Platinum),
    ("platinum3", "Master-3", &[(0, 0), (0, 2), (1, 0), (1, 1), (1, 2), (2, 1)], 6, Tier::Platinum),
    ("platinum4", "Master-4", &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 1), (3, 1)], 7, Tier::Platinum),
    ("platinum5", "Master-5", &[(0, 1), (1, 0), (1, 1), (2, 1), (2, 2), (3, 1)], 1, Tier::Platinum),
    ("platinum6", "Master-6", &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 1)], 2, Tier::Platinum),
];

/// Validated piece table.
#[derive(Debug, Clone)]
pub struct PieceCatalog {
    pieces: Vec<PieceDefinition>,
}

impl PieceCatalog {
    /// The 30-piece table (7 starter, 5 bronze, 6 silver, 6 gold, 6 platinum).
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_raw(STANDARD_PIECES)
    }

    fn from_raw(raw: &[RawPiece]) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut pieces = Vec::with_capacity(raw.len());
        for &(id, name, cells, color, tier) in raw {
            if !seen.insert(id) {
                return Err(CatalogError::DuplicateId(id));
            }
            if !(1..=MAX_COLOR).contains(&color) {
                return Err(CatalogError::Color { id, color });
            }
            let shape = Shape::new(cells).map_err(|source| CatalogError::Shape { id, source })?;
            pieces.push(PieceDefinition {
                id,
                name,
                shape,
                color,
                tier,
            });
        }
        Ok(Self { pieces })
    }

    pub fn all(&self) -> &[PieceDefinition] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&PieceDefinition> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// Starter pieces plus every piece whose id is in `unlocked`.
    pub fn available<'a>(
        &'a self,
        unlocked: &'a impl UnlockLookup,
    ) -> impl Iterator<Item = &'a PieceDefinition> {
        self.pieces
            .iter()
            .filter(move |p| p.tier == Tier::Starter || unlocked.is_unlocked(p.id))
    }
}

/// Read access to an unlock set, so the catalog doesn't depend on how it is stored.
pub trait UnlockLookup {
    fn is_unlocked(&self, id: &str) -> bool;
}

impl UnlockLookup for std::collections::BTreeSet<String> {
    fn is_unlocked(&self, id: &str) -> bool {
        self.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_standard_catalog_shape() {
        let cat = PieceCatalog::standard().unwrap();
        assert_eq!(cat.len(), 30);
        let counts: Vec<usize> = Tier::ALL
            .iter()
            .map(|&t| cat.all().iter().filter(|p| p.tier == t).count())
            .collect();
        assert_eq!(counts, vec![7, 5, 6, 6, 6]);
        let gold6 = cat.all().iter().find(|p| p.id == "gold6");
        assert_eq!(gold6.map(|p| p.shape.size()), Some(6));
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(Tier::Starter.required_score(), None);
        assert_eq!(Tier::Bronze.required_score(), Some(1000));
        assert_eq!(Tier::Platinum.required_score(), Some(15000));
    }

    #[test]
    fn test_available_starts_with_starter_only() {
        let cat = PieceCatalog::standard().unwrap();
        let mut unlocked = BTreeSet::new();
        assert_eq!(cat.available(&unlocked).count(), 7);
        unlocked.insert("bronze2".to_string());
        let ids: Vec<&str> = cat.available(&unlocked).map(|p| p.id).collect();
        assert_eq!(ids.len(), 8);
        assert!(ids.contains(&"bronze2"));
    }

    #[test]
    fn test_validation_rejects_bad_rows() {
        let dup: &[RawPiece] = &[
            ("a", "A", &[(0, 0)], 1, Tier::Starter),
            ("a", "A2", &[(0, 0)], 1, Tier::Starter),
        ];
        assert_eq!(
            PieceCatalog::from_raw(dup).unwrap_err(),
            CatalogError::DuplicateId("a")
        );
        let bad_color: &[RawPiece] = &[("b", "B", &[(0, 0)], 8, Tier::Starter)];
        assert!(matches!(
            PieceCatalog::from_raw(bad_color),
            Err(CatalogError::Color { color: 8, .. })
        ));
        let empty: &[RawPiece] = &[("c", "C", &[], 1, Tier::Starter)];
        assert!(matches!(
            PieceCatalog::from_raw(empty),
            Err(CatalogError::Shape { source: ShapeError::Empty, .. })
        ));
    }
}
