//! Bounded undo stack.

use crate::grid::Grid;
use crate::pieces::Rack;
use crate::score::Tokens;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 10;

/// Deep copy of the undoable fields of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub grid: Grid,
    pub score: u32,
    pub rack: Rack,
    pub combo: u32,
    pub tokens: Tokens,
}

/// LIFO stack that drops its oldest entry once full.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    stack: VecDeque<HistorySnapshot>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        self.stack.push_back(snapshot);
        while self.stack.len() > self.capacity {
            self.stack.pop_front();
        }
    }

    /// Most recent snapshot, if any.
    pub fn pop(&mut self) -> Option<HistorySnapshot> {
        self.stack.pop_back()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(score: u32) -> HistorySnapshot {
        HistorySnapshot {
            grid: Grid::default(),
            score,
            rack: Rack::default(),
            combo: 0,
            tokens: Tokens::default(),
        }
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut h = HistoryManager::default();
        h.push(snap(1));
        h.push(snap(2));
        assert_eq!(h.pop().map(|s| s.score), Some(2));
        assert_eq!(h.pop().map(|s| s.score), Some(1));
        assert!(h.pop().is_none());
    }

    #[test]
    fn test_eleventh_push_evicts_oldest() {
        let mut h = HistoryManager::default();
        for i in 1..=11 {
            h.push(snap(i));
        }
        assert_eq!(h.len(), 10);
        let mut popped = Vec::new();
        while let Some(s) = h.pop() {
            popped.push(s.score);
        }
        assert_eq!(popped.len(), 10);
        assert_eq!(popped.last(), Some(&2));
    }
}
