//! Layout and drawing: menu, board, rack, sidebar, pause, quit menu, game over.

use crate::GameMode;
use crate::app::{LineClearFx, MenuState, MenuTab, PlayView, QuitOption, Screen, Toast, ToastKind};
use crate::grid::Grid;
use crate::pieces::{PieceInstance, RACK_SIZE};
use crate::session::Session;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each grid cell is two terminal columns wide so it reads as a square.
const CELL_WIDTH: u16 = 2;
const BLOCK: &str = "██";
const GHOST: &str = "▒▒";
const EMPTY: &str = "· ";

const SIDEBAR_WIDTH: u16 = 30;
/// Rack slot: 4x4 mini grid plus padding.
const SLOT_WIDTH: u16 = 10;
const RACK_HEIGHT: u16 = 7;

/// Duration of the line-clear fade in ms.
const LINE_CLEAR_FADE_MS: u32 = 350;

/// Board size in terminal cells including border.
fn board_outer_size(grid: &Grid) -> (u16, u16) {
    (grid.cols() as u16 * CELL_WIDTH + 2, grid.rows() as u16 + 2)
}

/// Left column width: the wider of board and rack.
fn left_width(grid: &Grid) -> u16 {
    board_outer_size(grid).0.max(SLOT_WIDTH * RACK_SIZE as u16 + 2)
}

/// Rects for board (inner), rack and sidebar, centred in `area`. Shared with the clear effect.
fn game_layout(area: Rect, grid: &Grid) -> (Rect, Rect, Rect) {
    let (bw, bh) = board_outer_size(grid);
    let lw = left_width(grid);
    let total_w = lw + SIDEBAR_WIDTH;
    let total_h = (bh + RACK_HEIGHT).max(22);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let active = vert[1];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(lw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(active);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(bh), Constraint::Length(RACK_HEIGHT)])
        .split(cols[0]);

    let board_outer = Rect {
        x: left[0].x + left[0].width.saturating_sub(bw) / 2,
        y: left[0].y,
        width: bw.min(left[0].width),
        height: bh.min(left[0].height),
    };
    let board_inner = Rect {
        x: board_outer.x + 1,
        y: board_outer.y + 1,
        width: board_outer.width.saturating_sub(2),
        height: board_outer.height.saturating_sub(2),
    };
    (board_inner, left[1], cols[1])
}

/// Write one symbol if it lands inside the buffer.
fn put(frame: &mut Frame, x: u16, y: u16, symbol: &str, style: Style) {
    if let Some(cell) = frame.buffer_mut().cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

/// Draw current screen, with overlays. While clears are pending and animation is
/// on, the fade effect in `line_clear` is created or advanced.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    session: &Session,
    theme: &Theme,
    view: &PlayView,
    toasts: &[Toast],
    menu_state: &MenuState,
    quit_selected: Option<QuitOption>,
    line_clear: &mut LineClearFx,
    no_animation: bool,
    now: Instant,
) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg)),
        area,
    );
    match screen {
        Screen::Menu => draw_menu(frame, session, theme, menu_state, area),
        Screen::Playing | Screen::QuitMenu | Screen::GameOver => {
            draw_game(frame, session, theme, view, toasts, area, screen);
            if screen == Screen::Playing
                && session.state.clears_pending()
                && !no_animation
            {
                apply_line_clear_effect(frame, session, theme, area, line_clear, now);
            }
            if session.state.is_paused && screen == Screen::Playing {
                draw_pause_overlay(frame, theme, area);
            }
            if let Some(opt) = quit_selected {
                draw_quit_menu(frame, theme, opt);
            }
            if screen == Screen::GameOver {
                draw_game_over(frame, session, theme, area);
            }
        }
    }
}

/// Buffer positions covered by the pending clear cells.
fn clearing_buffer_positions(board: Rect, cells: &[(usize, usize)]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &(r, c) in cells {
        let x0 = board.x + c as u16 * CELL_WIDTH;
        let y = board.y + r as u16;
        for x in x0..x0 + CELL_WIDTH {
            set.insert((x, y));
        }
    }
    set
}

/// Create or advance the fade of the pending clear cells to the board background.
fn apply_line_clear_effect(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    area: Rect,
    line_clear: &mut LineClearFx,
    now: Instant,
) {
    let (board, _, _) = game_layout(area, &session.state.grid);
    let delta = line_clear
        .process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    line_clear.process_time = Some(now);

    if line_clear.effect.is_none() {
        let clearing = clearing_buffer_positions(board, &session.state.pending_cells());
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            clearing.contains(&(pos.x, pos.y))
        }));
        let bg = theme.bg;
        let effect = fx::fade_to(bg, bg, (LINE_CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        line_clear.effect = Some(effect);
    }

    if let Some(effect) = line_clear.effect.as_mut() {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_menu(frame: &mut Frame, session: &Session, theme: &Theme, menu: &MenuState, area: Rect) {
    let popup = centered(area, 46, 16);
    let highlight = Style::default().fg(Color::Black).bg(theme.block_color(2)).bold();
    let selected = Style::default().fg(theme.block_color(2)).bold();
    let normal = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);

    let mode_span = |mode: GameMode, label: &'static str| {
        let style = if menu.selected_mode == mode {
            if menu.current_tab == MenuTab::Mode {
                highlight
            } else {
                selected
            }
        } else {
            normal
        };
        Span::styled(label, style)
    };
    let start_style = if menu.current_tab == MenuTab::Start {
        highlight
    } else {
        normal
    };
    let progress = session.progress();
    let blurb = match menu.selected_mode {
        GameMode::Classic => "20% of the board starts filled",
        GameMode::Collection => "Score to unlock new pieces",
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Block ", Style::default().fg(theme.block_color(3)).bold()),
            Span::styled(" tui ", Style::default().fg(theme.main_fg).bold()),
        ]),
        Line::from(""),
        Line::from(vec![
            mode_span(GameMode::Classic, " CLASSIC "),
            Span::raw("  "),
            mode_span(GameMode::Collection, " COLLECTION "),
        ]),
        Line::from(Span::styled(blurb, dim)),
        Line::from(""),
        Line::from(Span::styled(" START ", start_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Best: ", Style::default().fg(theme.title)),
            Span::styled(session.state.score.high_score.to_string(), normal),
        ]),
        Line::from(vec![
            Span::styled("Pieces: ", Style::default().fg(theme.title)),
            Span::styled(
                format!("{}/{} ({}%)", progress.unlocked, progress.total, progress.percentage),
                normal,
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("←/→ mode  ↑/↓ select  Enter start  Q quit", dim)),
    ];
    frame.render_widget(Clear, popup);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}

fn draw_game(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    view: &PlayView,
    toasts: &[Toast],
    area: Rect,
    screen: Screen,
) {
    let state = &session.state;
    let (board, rack_area, sidebar) = game_layout(area, &state.grid);
    let border = Style::default().fg(theme.div_line).bg(theme.bg);

    let title = match state.mode {
        GameMode::Classic => " Classic ",
        GameMode::Collection => " Collection ",
    };
    let board_outer = Rect {
        x: board.x.saturating_sub(1),
        y: board.y.saturating_sub(1),
        width: board.width + 2,
        height: board.height + 2,
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title, Style::default().fg(theme.title)))
        .render(board_outer, frame.buffer_mut());

    draw_board(frame, session, theme, view, board, screen == Screen::Playing);
    draw_rack(frame, session, theme, view, rack_area);
    draw_sidebar(frame, session, theme, toasts, sidebar);
}

fn draw_board(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    view: &PlayView,
    board: Rect,
    show_cursor: bool,
) {
    let grid = &session.state.grid;
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            let x = board.x + c as u16 * CELL_WIDTH;
            let y = board.y + r as u16;
            match grid.get(r, c) {
                Some(0) | None => {
                    put(frame, x, y, EMPTY, Style::default().fg(theme.div_line).bg(theme.bg));
                }
                Some(v) => {
                    let color = theme.block_color(v);
                    put(frame, x, y, BLOCK, Style::default().fg(color).bg(theme.bg));
                }
            }
        }
    }
    // Clearing lines take the colour of the piece that completed them.
    if let Some(trigger) = session.state.clear_color {
        let style = Style::default().fg(theme.block_color(trigger)).bg(theme.bg);
        for (r, c) in session.state.pending_cells() {
            put(frame, board.x + c as u16 * CELL_WIDTH, board.y + r as u16, BLOCK, style);
        }
    }
    if !show_cursor || session.state.clears_pending() {
        return;
    }

    let (row, col) = view.cursor;
    if view.clear_line_mode {
        // Row and column that the clear-line token would hit.
        let style = Style::default().fg(theme.ghost_bad).bg(theme.bg);
        for c in 0..grid.cols() {
            if grid.is_empty_at(row as usize, c) {
                put(frame, board.x + c as u16 * CELL_WIDTH, board.y + row as u16, "░░", style);
            }
        }
        for r in 0..grid.rows() {
            if grid.is_empty_at(r, col as usize) {
                put(frame, board.x + col as u16 * CELL_WIDTH, board.y + r as u16, "░░", style);
            }
        }
        return;
    }

    let Some(piece) = session.state.rack.get(view.selected_slot) else {
        return;
    };
    let fits = session.can_place(view.selected_slot, row, col);
    let color = if fits { theme.ghost_ok } else { theme.ghost_bad };
    for &(dr, dc) in piece.current_shape.cells() {
        let (r, c) = (row + dr, col + dc);
        if grid.in_bounds(r, c) {
            let x = board.x + c as u16 * CELL_WIDTH;
            let y = board.y + r as u16;
            put(frame, x, y, GHOST, Style::default().fg(color).bg(theme.bg));
        }
    }
}

fn draw_rack(frame: &mut Frame, session: &Session, theme: &Theme, view: &PlayView, area: Rect) {
    let title = match session.state.rack.get(view.selected_slot) {
        Some(p) => format!(" {} ({}) ", p.name, p.tier),
        None => " Pieces ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    for slot in 0..RACK_SIZE {
        let slot_area = Rect {
            x: inner.x + slot as u16 * SLOT_WIDTH,
            y: inner.y,
            width: SLOT_WIDTH.min(inner.width.saturating_sub(slot as u16 * SLOT_WIDTH)),
            height: inner.height,
        };
        let selected = slot == view.selected_slot && !view.clear_line_mode;
        let stuck = session
            .valid_placements(slot)
            .is_ok_and(|spots| spots.is_empty());
        let label_style = match (selected, stuck) {
            (true, false) => Style::default().fg(Color::Black).bg(theme.title).bold(),
            (true, true) => Style::default().fg(Color::Black).bg(theme.ghost_bad).bold(),
            (false, true) => Style::default().fg(theme.ghost_bad),
            (false, false) => Style::default().fg(theme.inactive_fg),
        };
        let text = if stuck {
            format!(" {} ✗ ", slot + 1)
        } else {
            format!(" {} ", slot + 1)
        };
        let label = Rect { height: 1, ..slot_area };
        Paragraph::new(Line::from(Span::styled(text, label_style)))
            .alignment(Alignment::Center)
            .render(label, frame.buffer_mut());
        let preview = Rect {
            y: slot_area.y + 1,
            height: slot_area.height.saturating_sub(1),
            ..slot_area
        };
        if let Some(piece) = session.state.rack.get(slot) {
            draw_piece_preview(frame, theme, piece, preview);
        }
    }
}

/// Piece shape centred in `area`, two columns per cell.
fn draw_piece_preview(frame: &mut Frame, theme: &Theme, piece: &PieceInstance, area: Rect) {
    let (h, w) = piece.current_shape.dimensions();
    let off_x = area.width.saturating_sub(w as u16 * CELL_WIDTH) / 2;
    let off_y = area.height.saturating_sub(h as u16) / 2;
    let style = Style::default().fg(theme.block_color(piece.color)).bg(theme.bg);
    for &(r, c) in piece.current_shape.cells() {
        let x = area.x + off_x + c as u16 * CELL_WIDTH;
        let y = area.y + off_y + r as u16;
        if x + 1 < area.x + area.width && y < area.y + area.height {
            put(frame, x, y, BLOCK, style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, session: &Session, theme: &Theme, toasts: &[Toast], area: Rect) {
    let state = &session.state;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Score, best, combo
            Constraint::Length(6), // Tokens
            Constraint::Length(5), // Unlock progress
            Constraint::Min(4),    // Toasts
            Constraint::Length(2), // Key help
        ])
        .split(area);

    // --- Stats ---
    let stats = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats.inner(chunks[0]);
    stats.render(chunks[0], frame.buffer_mut());
    let combo_style = if state.score.combo >= 2 {
        Style::default().fg(theme.block_color(2)).bold()
    } else {
        fg_style
    };
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best:  ", title_style),
            Span::styled(state.score.high_score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Combo: ", title_style),
            Span::styled(format!("x{}", state.score.combo), combo_style),
        ]),
    ])
    .render(stats_inner, frame.buffer_mut());

    // --- Tokens ---
    let tokens = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Tokens ", title_style));
    let tokens_inner = tokens.inner(chunks[1]);
    tokens.render(chunks[1], frame.buffer_mut());
    let t = state.tokens;
    let token_line = |key: &'static str, name: &'static str, n: u32| {
        let style = if n > 0 {
            fg_style
        } else {
            Style::default().fg(theme.inactive_fg)
        };
        Line::from(vec![
            Span::styled(format!("[{key}] "), title_style),
            Span::styled(format!("{name:<11}{n:>3}"), style),
        ])
    };
    Paragraph::new(vec![
        token_line("r", "Rotate", t.rotate),
        token_line("f", "Flip", t.flip),
        token_line("u", "Undo", t.undo),
        token_line("c", "Clear line", t.clear_line),
    ])
    .render(tokens_inner, frame.buffer_mut());

    // --- Unlocks ---
    let unlocks = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Pieces ", title_style));
    let unlocks_inner = unlocks.inner(chunks[2]);
    unlocks.render(chunks[2], frame.buffer_mut());
    let progress = session.progress();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(unlocks_inner);
    Gauge::default()
        .ratio((progress.unlocked as f64 / progress.total.max(1) as f64).min(1.0))
        .label(format!("{}/{}", progress.unlocked, progress.total))
        .gauge_style(Style::default().fg(theme.block_color(1)).bg(theme.div_line))
        .render(rows[0], frame.buffer_mut());
    let next_text = match (state.mode, progress.next) {
        (GameMode::Classic, _) => vec!["Unlocks off in classic".to_string()],
        (_, Some(next)) => vec![
            format!("{} at {}", next.tier, next.required),
            format!("{} pts to go", next.remaining),
        ],
        (_, None) => vec!["All tiers reached".to_string()],
    };
    for (text, rect) in next_text.into_iter().zip(rows.iter().skip(1)) {
        Paragraph::new(Line::from(Span::styled(text, fg_style))).render(*rect, frame.buffer_mut());
    }

    // --- Toasts (newest last) ---
    let toast_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let toast_inner = toast_block.inner(chunks[3]);
    toast_block.render(chunks[3], frame.buffer_mut());
    let lines: Vec<Line> = toasts
        .iter()
        .map(|t| {
            let color = match t.kind {
                ToastKind::Info => theme.main_fg,
                ToastKind::Reward => theme.block_color(2),
                ToastKind::Unlock => theme.block_color(5),
                ToastKind::Error => theme.ghost_bad,
            };
            Line::from(Span::styled(t.text.clone(), Style::default().fg(color)))
        })
        .collect();
    Paragraph::new(lines)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .render(toast_inner, frame.buffer_mut());

    // --- Help ---
    let dim = Style::default().fg(theme.inactive_fg);
    Paragraph::new(vec![
        Line::from(Span::styled("1-3/Tab pick  Enter place", dim)),
        Line::from(Span::styled("P pause  N new  Q quit", dim)),
    ])
    .render(chunks[4], frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    frame.render_widget(Clear, popup);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let state = &session.state;
    let popup = centered(area, 34, 9);
    let new_best = state.score.score > 0 && state.score.score == state.score.high_score;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::Black).bg(theme.ghost_bad).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Score: ", Style::default().fg(theme.title)),
            Span::styled(state.score.score.to_string(), Style::default().fg(theme.main_fg)),
        ]),
    ];
    if new_best {
        lines.push(Line::from(Span::styled(
            "New best!",
            Style::default().fg(theme.block_color(2)).bold(),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Best: ", Style::default().fg(theme.title)),
            Span::styled(
                state.score.high_score.to_string(),
                Style::default().fg(theme.main_fg),
            ),
        ]));
    }
    lines.push(Line::from(""));
    let undo_hint = if state.tokens.undo > 0 && !state.history.is_empty() {
        "N new  U undo  Q quit"
    } else {
        "N new  Q quit"
    };
    lines.push(Line::from(Span::styled(
        undo_hint,
        Style::default().fg(theme.inactive_fg),
    )));
    frame.render_widget(Clear, popup);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}

fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    frame.render_widget(Clear, quit_rect);
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), quit_rect);
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_board_and_rack() {
        let grid = Grid::default();
        let area = Rect::new(0, 0, 120, 40);
        let (board, rack, sidebar) = game_layout(area, &grid);
        assert_eq!((board.width, board.height), (20, 10));
        assert!(rack.y >= board.y + board.height);
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert!(sidebar.x >= board.x + board.width);
    }

    #[test]
    fn test_clearing_positions_cover_both_columns_of_a_cell() {
        let board = Rect::new(10, 5, 20, 10);
        let set = clearing_buffer_positions(board, &[(0, 0), (2, 3)]);
        assert!(set.contains(&(10, 5)));
        assert!(set.contains(&(11, 5)));
        assert!(set.contains(&(16, 7)));
        assert!(set.contains(&(17, 7)));
        assert_eq!(set.len(), 4);
    }
}
