//! Score, combo streak and the special-action token purse.

use crate::clear::ClearResult;
use std::fmt;

/// Running totals for one game. `high_score` survives new games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreCombo {
    pub score: u32,
    pub combo: u32,
    pub high_score: u32,
}

impl ScoreCombo {
    pub fn with_high_score(high_score: u32) -> Self {
        Self {
            high_score,
            ..Self::default()
        }
    }

    /// Every placement scores its own cell count.
    pub fn add_piece(&mut self, size: usize) {
        self.score = self.score.saturating_add(size as u32);
    }

    pub fn add_clear(&mut self, clear: &ClearResult) {
        self.score = self.score.saturating_add(clear.points_earned);
    }

    /// Raise the high-water mark. True if it moved.
    pub fn bump_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Rotate,
    Undo,
    ClearLine,
    Flip,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rotate => "rotate",
            Self::Undo => "undo",
            Self::ClearLine => "clear-line",
            Self::Flip => "flip",
        })
    }
}

/// Consumable counters for special actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokens {
    pub rotate: u32,
    pub undo: u32,
    pub clear_line: u32,
    pub flip: u32,
}

impl Default for Tokens {
    /// One of each to start a game.
    fn default() -> Self {
        Self {
            rotate: 1,
            undo: 1,
            clear_line: 1,
            flip: 1,
        }
    }
}

impl Tokens {
    fn slot(&mut self, kind: TokenKind) -> &mut u32 {
        match kind {
            TokenKind::Rotate => &mut self.rotate,
            TokenKind::Undo => &mut self.undo,
            TokenKind::ClearLine => &mut self.clear_line,
            TokenKind::Flip => &mut self.flip,
        }
    }

    pub fn count(&self, kind: TokenKind) -> u32 {
        match kind {
            TokenKind::Rotate => self.rotate,
            TokenKind::Undo => self.undo,
            TokenKind::ClearLine => self.clear_line,
            TokenKind::Flip => self.flip,
        }
    }

    #[inline]
    pub fn has(&self, kind: TokenKind) -> bool {
        self.count(kind) > 0
    }

    /// Spend one. False (unchanged) when none are left.
    pub fn consume(&mut self, kind: TokenKind) -> bool {
        let n = self.slot(kind);
        if *n == 0 {
            return false;
        }
        *n -= 1;
        true
    }

    pub fn grant(&mut self, kind: TokenKind, amount: u32) {
        let n = self.slot(kind);
        *n = n.saturating_add(amount);
    }
}

/// Tokens earned by one placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewards(pub Vec<(TokenKind, u32)>);

impl Rewards {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn apply(&self, tokens: &mut Tokens) {
        for &(kind, n) in &self.0 {
            tokens.grant(kind, n);
        }
    }
}

/// Milestone rewards for a placement that moved the score from `before` to `after`.
/// Each milestone kind pays at most one token per placement, however many
/// multiples the jump crossed.
pub fn rewards_for(before: u32, after: u32, cleared: bool, combo: u32) -> Rewards {
    let crossed = |step: u32| after / step > before / step;
    let mut out = Vec::new();
    if crossed(1_000) {
        out.push((TokenKind::Rotate, 1));
    }
    if crossed(2_000) {
        out.push((TokenKind::Undo, 1));
    }
    if cleared && combo >= 4 {
        out.push((TokenKind::ClearLine, 1));
    }
    Rewards(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_and_grant() {
        let mut t = Tokens::default();
        assert!(t.consume(TokenKind::Flip));
        assert!(!t.consume(TokenKind::Flip));
        assert_eq!(t.flip, 0);
        t.grant(TokenKind::Flip, 2);
        assert_eq!(t.count(TokenKind::Flip), 2);
    }

    #[test]
    fn test_high_score_only_rises() {
        let mut s = ScoreCombo::with_high_score(50);
        s.add_piece(5);
        assert!(!s.bump_high_score());
        s.score = 60;
        assert!(s.bump_high_score());
        assert_eq!(s.high_score, 60);
        s.score = 10;
        assert!(!s.bump_high_score());
        assert_eq!(s.high_score, 60);
    }

    #[test]
    fn test_rewards_cross_milestones() {
        assert!(rewards_for(10, 900, false, 0).is_empty());
        assert_eq!(
            rewards_for(950, 1050, false, 0),
            Rewards(vec![(TokenKind::Rotate, 1)])
        );
        assert_eq!(
            rewards_for(1990, 2100, true, 4),
            Rewards(vec![
                (TokenKind::Rotate, 1),
                (TokenKind::Undo, 1),
                (TokenKind::ClearLine, 1)
            ])
        );
        assert!(rewards_for(100, 200, false, 9).is_empty());
    }

    #[test]
    fn test_big_jump_pays_one_token_per_kind() {
        assert_eq!(
            rewards_for(900, 6_100, false, 0),
            Rewards(vec![(TokenKind::Rotate, 1), (TokenKind::Undo, 1)])
        );
    }

    #[test]
    fn test_rewards_apply() {
        let mut t = Tokens::default();
        rewards_for(0, 2500, true, 5).apply(&mut t);
        assert_eq!(t.rotate, 2);
        assert_eq!(t.undo, 2);
        assert_eq!(t.clear_line, 2);
        assert_eq!(t.flip, 1);
    }
}
