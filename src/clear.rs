//! Line-clear decisions. Detection never mutates the grid; clears are
//! applied later, one line at a time, once the presentation is done with them.

use crate::grid::Grid;

/// What a single placement completed and what it is worth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearResult {
    pub cleared_rows: Vec<usize>,
    pub cleared_cols: Vec<usize>,
    pub total_lines_cleared: usize,
    pub points_earned: u32,
    pub combo_count: u32,
    /// Colour of the piece whose placement caused the clear.
    pub trigger_color: Option<u8>,
}

impl ClearResult {
    /// Rows first, then columns, in scan order.
    pub fn lines(&self) -> Vec<LineRef> {
        self.cleared_rows
            .iter()
            .map(|&r| LineRef::Row(r))
            .chain(self.cleared_cols.iter().map(|&c| LineRef::Column(c)))
            .collect()
    }
}

/// One row or column scheduled for clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRef {
    Row(usize),
    Column(usize),
}

impl LineRef {
    /// Zero the line. False if the index is out of range.
    pub fn apply(self, grid: &mut Grid) -> bool {
        match self {
            Self::Row(r) => grid.clear_row(r),
            Self::Column(c) => grid.clear_column(c),
        }
    }
}

/// 1 -> 100, 2 -> 250, 3 -> 500, 4 -> 800, then 1000 + 200 per extra line.
pub fn base_score_for_line_count(lines: usize) -> u32 {
    match lines {
        0 => 0,
        1 => 100,
        2 => 250,
        3 => 500,
        4 => 800,
        n => 1_000 + (n as u32 - 4) * 200,
    }
}

/// Linear `(combo - 1) * 50` plus a stacked `500 + (combo - 5) * 100` from combo 5.
pub fn combo_bonus(combo: u32) -> u32 {
    let mut bonus = 0;
    if combo > 1 {
        bonus += (combo - 1) * 50;
    }
    if combo >= 5 {
        bonus += 500 + (combo - 5) * 100;
    }
    bonus
}

/// Full rows and columns of `grid` in index order.
pub fn complete_lines(grid: &Grid) -> (Vec<usize>, Vec<usize>) {
    let rows = (0..grid.rows()).filter(|&r| grid.is_row_full(r)).collect();
    let cols = (0..grid.cols()).filter(|&c| grid.is_column_full(c)).collect();
    (rows, cols)
}

/// Pure decision: what would clear given the combo before this placement.
/// `None` means nothing is complete and the streak breaks.
pub fn decide_clears(grid: &Grid, combo_before: u32, trigger_color: Option<u8>) -> Option<ClearResult> {
    let (cleared_rows, cleared_cols) = complete_lines(grid);
    let total = cleared_rows.len() + cleared_cols.len();
    if total == 0 {
        return None;
    }
    let combo_count = combo_before + 1;
    Some(ClearResult {
        points_earned: base_score_for_line_count(total) + combo_bonus(combo_count),
        cleared_rows,
        cleared_cols,
        total_lines_cleared: total,
        combo_count,
        trigger_color,
    })
}

/// [`decide_clears`] plus the combo update: reset to 0 on no clear, else +1.
pub fn detect_and_score_lines(
    grid: &Grid,
    combo: &mut u32,
    trigger_color: Option<u8>,
) -> Option<ClearResult> {
    let result = decide_clears(grid, *combo, trigger_color);
    *combo = result.as_ref().map_or(0, |r| r.combo_count);
    result
}
