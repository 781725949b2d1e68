//! Dealt pieces: instances, the 3-slot rack and the random factory.

use crate::catalog::{PieceCatalog, PieceDefinition, Tier, UnlockLookup};
use crate::shape::Shape;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Slots offered to the player at once.
pub const RACK_SIZE: usize = 3;

/// A dealt copy of a definition whose shape may have been rotated or flipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceInstance {
    pub instance_id: u64,
    pub def_id: &'static str,
    pub name: &'static str,
    pub color: u8,
    pub tier: Tier,
    pub current_shape: Shape,
}

impl PieceInstance {
    #[inline]
    pub fn size(&self) -> usize {
        self.current_shape.size()
    }
}

/// Ordered slots; a slot is `None` only between placement and refill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rack {
    slots: [Option<PieceInstance>; RACK_SIZE],
}

impl Rack {
    pub fn get(&self, slot: usize) -> Option<&PieceInstance> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut PieceInstance> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn take(&mut self, slot: usize) -> Option<PieceInstance> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn put(&mut self, slot: usize, piece: PieceInstance) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(piece);
        }
    }

    /// Non-empty slots with their indices.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, &PieceInstance)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (i, p)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Draws random pieces from the unlocked part of the catalog.
#[derive(Debug, Clone)]
pub struct PieceFactory {
    rng: StdRng,
    next_id: u64,
}

impl PieceFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// RNG shared with other random game setup (classic pre-seed) so one seed reproduces a game.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Monotonic instance id.
    pub fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform pick from available pieces with a uniform 0..=3 clockwise rotations.
    /// Falls back to the whole catalog if nothing is available.
    pub fn deal(
        &mut self,
        catalog: &PieceCatalog,
        unlocked: &impl UnlockLookup,
    ) -> Option<PieceInstance> {
        let available: Vec<&PieceDefinition> = catalog.available(unlocked).collect();
        let def = match available.choose(&mut self.rng) {
            Some(def) => *def,
            None => catalog.all().choose(&mut self.rng)?,
        };
        let turns: u8 = self.rng.random_range(0..4);
        Some(self.instantiate(def, turns))
    }

    pub fn instantiate(&mut self, def: &PieceDefinition, turns: u8) -> PieceInstance {
        PieceInstance {
            instance_id: self.fresh_id(),
            def_id: def.id,
            name: def.name,
            color: def.color,
            tier: def.tier,
            current_shape: def.shape.rotated(turns),
        }
    }

    /// Fill every empty rack slot.
    pub fn fill_rack(
        &mut self,
        rack: &mut Rack,
        catalog: &PieceCatalog,
        unlocked: &impl UnlockLookup,
    ) {
        for slot in 0..RACK_SIZE {
            if rack.get(slot).is_none() {
                if let Some(piece) = self.deal(catalog, unlocked) {
                    rack.put(slot, piece);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};

    struct Nothing;

    impl UnlockLookup for Nothing {
        fn is_unlocked(&self, _id: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_deal_only_starter_when_locked() {
        let cat = PieceCatalog::standard().unwrap();
        let mut f = PieceFactory::new(3);
        for _ in 0..200 {
            let p = f.deal(&cat, &Nothing).unwrap();
            assert_eq!(p.tier, Tier::Starter);
        }
    }

    #[test]
    fn test_deal_uses_unlocked_pieces() {
        let cat = PieceCatalog::standard().unwrap();
        let unlocked: BTreeSet<String> = cat.all().iter().map(|p| p.id.to_string()).collect();
        let mut f = PieceFactory::new(11);
        let tiers: HashSet<Tier> = (0..500)
            .filter_map(|_| f.deal(&cat, &unlocked))
            .map(|p| p.tier)
            .collect();
        assert_eq!(tiers.len(), 5);
    }

    #[test]
    fn test_dealt_shape_is_a_rotation_of_definition() {
        let cat = PieceCatalog::standard().unwrap();
        let mut f = PieceFactory::new(99);
        for _ in 0..100 {
            let p = f.deal(&cat, &Nothing).unwrap();
            let def = cat.get(p.def_id).unwrap();
            assert!((0..4).any(|n| def.shape.rotated(n) == p.current_shape));
        }
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let cat = PieceCatalog::standard().unwrap();
        let mut f = PieceFactory::new(5);
        let ids: HashSet<u64> = (0..50)
            .map(|_| f.deal(&cat, &Nothing).unwrap().instance_id)
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_fill_rack_fills_only_empty_slots() {
        let cat = PieceCatalog::standard().unwrap();
        let mut f = PieceFactory::new(1);
        let mut rack = Rack::default();
        f.fill_rack(&mut rack, &cat, &Nothing);
        assert_eq!(rack.pieces().count(), RACK_SIZE);
        let kept = rack.get(0).cloned();
        rack.take(1);
        f.fill_rack(&mut rack, &cat, &Nothing);
        assert_eq!(rack.get(0).cloned(), kept);
        assert!(rack.get(1).is_some());
    }
}
