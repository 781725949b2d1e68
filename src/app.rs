//! App: terminal init, main loop and key handling.

use crate::input::{Action, key_to_action};
use crate::pieces::RACK_SIZE;
use crate::session::{PlacementOutcome, Session};
use crate::theme::Theme;
use crate::{GameConfig, GameMode};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::debug;

/// How long a toast stays on screen.
const TOAST_LIFETIME_MS: u32 = 2_500;
/// Oldest toasts are dropped beyond this.
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Mode,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub selected_mode: GameMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Reward,
    Unlock,
    Error,
}

/// Short-lived message in the sidebar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub age_ms: u32,
}

/// Player-facing selection state while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayView {
    pub selected_slot: usize,
    /// Grid origin the selected piece would be placed at.
    pub cursor: (i32, i32),
    /// Cursor picks a cell for the clear-line token instead of a placement.
    pub clear_line_mode: bool,
}

impl Default for PlayView {
    fn default() -> Self {
        Self {
            selected_slot: 0,
            cursor: (4, 4),
            clear_line_mode: false,
        }
    }
}

/// TachyonFX fade for pending clears; created lazily by the renderer.
#[derive(Default)]
pub struct LineClearFx {
    pub effect: Option<Effect>,
    /// Last time the effect was processed (for delta).
    pub process_time: Option<Instant>,
}

impl LineClearFx {
    pub fn reset(&mut self) {
        self.effect = None;
        self.process_time = None;
    }

    fn done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: Session,
    screen: Screen,
    view: PlayView,
    toasts: Vec<Toast>,
    line_clear: LineClearFx,
    menu_state: MenuState,
    quit_selected: QuitOption,
    last_frame: Instant,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, session: Session) -> Self {
        let screen = if config.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Self {
            menu_state: MenuState {
                current_tab: MenuTab::Mode,
                selected_mode: config.mode,
            },
            config,
            theme,
            session,
            screen,
            view: PlayView::default(),
            toasts: Vec::new(),
            line_clear: LineClearFx::default(),
            quit_selected: QuitOption::Resume,
            last_frame: Instant::now(),
        }
    }

    fn reset_game(&mut self, mode: GameMode) {
        self.config.mode = mode;
        self.session.new_game(mode);
        self.view = PlayView::default();
        self.toasts.clear();
        self.line_clear.reset();
        self.screen = if self.session.state.is_game_over {
            Screen::GameOver
        } else {
            Screen::Playing
        };
    }

    fn toast(&mut self, kind: ToastKind, text: impl Into<String>) {
        self.toasts.push(Toast {
            text: text.into(),
            kind,
            age_ms: 0,
        });
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    fn tick_toasts(&mut self, delta_ms: u32) {
        self.toasts.retain_mut(|t| {
            t.age_ms += delta_ms;
            t.age_ms < TOAST_LIFETIME_MS
        });
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            let delta_ms = now.duration_since(self.last_frame).as_millis().min(u32::MAX as u128) as u32;
            self.last_frame = now;
            self.tick_toasts(delta_ms);

            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    &self.view,
                    &self.toasts,
                    &self.menu_state,
                    (self.screen == Screen::QuitMenu).then_some(self.quit_selected),
                    &mut self.line_clear,
                    self.config.no_animation,
                    now,
                );
            })?;

            if self.session.state.clears_pending() && self.line_clear.done() {
                self.finish_clears();
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Only the first Press counts; ignore repeats and releases.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Menu => return self.handle_menu(action),
            Screen::Playing => self.handle_playing(action),
            Screen::QuitMenu => return self.handle_quit_menu(action),
            Screen::GameOver => match action {
                Action::Quit => return true,
                Action::Restart | Action::Confirm => self.reset_game(self.config.mode),
                Action::Undo => match self.session.undo() {
                    Ok(()) => {
                        self.line_clear.reset();
                        self.screen = Screen::Playing;
                        self.toast(ToastKind::Info, "Undone");
                    }
                    Err(e) => self.toast(ToastKind::Error, e.to_string()),
                },
                _ => {}
            },
        }
        false
    }

    fn handle_menu(&mut self, action: Action) -> bool {
        let menu = &mut self.menu_state;
        match action {
            Action::Quit => return true,
            Action::MoveUp | Action::MoveDown | Action::NextSlot => {
                menu.current_tab = match menu.current_tab {
                    MenuTab::Mode => MenuTab::Start,
                    MenuTab::Start => MenuTab::Mode,
                };
            }
            Action::MoveLeft | Action::MoveRight if menu.current_tab == MenuTab::Mode => {
                menu.selected_mode = match menu.selected_mode {
                    GameMode::Classic => GameMode::Collection,
                    GameMode::Collection => GameMode::Classic,
                };
            }
            Action::Confirm => {
                if menu.current_tab == MenuTab::Start {
                    let mode = menu.selected_mode;
                    self.reset_game(mode);
                } else {
                    menu.current_tab = MenuTab::Start;
                }
            }
            _ => {}
        }
        false
    }

    fn handle_quit_menu(&mut self, action: Action) -> bool {
        match action {
            Action::MoveDown | Action::MoveRight | Action::NextSlot => {
                self.quit_selected = match self.quit_selected {
                    QuitOption::Resume => QuitOption::MainMenu,
                    QuitOption::MainMenu => QuitOption::Exit,
                    QuitOption::Exit => QuitOption::Resume,
                };
            }
            Action::MoveUp | Action::MoveLeft => {
                self.quit_selected = match self.quit_selected {
                    QuitOption::Resume => QuitOption::Exit,
                    QuitOption::MainMenu => QuitOption::Resume,
                    QuitOption::Exit => QuitOption::MainMenu,
                };
            }
            Action::Confirm => match self.quit_selected {
                QuitOption::Resume => self.screen = Screen::Playing,
                QuitOption::MainMenu => self.screen = Screen::Menu,
                QuitOption::Exit => return true,
            },
            Action::Pause | Action::Quit => self.screen = Screen::Playing,
            _ => {}
        }
        false
    }

    fn handle_playing(&mut self, action: Action) {
        if self.session.state.is_paused {
            match action {
                Action::Pause => {
                    self.session.toggle_pause();
                }
                Action::Quit => self.open_quit_menu(),
                _ => {}
            }
            return;
        }
        match action {
            Action::Quit => self.open_quit_menu(),
            Action::Pause => {
                self.session.toggle_pause();
            }
            Action::MoveLeft => self.move_cursor(0, -1),
            Action::MoveRight => self.move_cursor(0, 1),
            Action::MoveUp => self.move_cursor(-1, 0),
            Action::MoveDown => self.move_cursor(1, 0),
            Action::SelectSlot(slot) => {
                if self.session.state.rack.get(slot).is_some() {
                    self.view.selected_slot = slot;
                    self.snap_cursor();
                }
            }
            Action::NextSlot => {
                self.next_slot();
                self.snap_cursor();
            }
            Action::Confirm => {
                if self.view.clear_line_mode {
                    self.confirm_clear_line();
                } else {
                    self.confirm_placement();
                }
            }
            Action::Rotate => {
                let r = self.session.rotate_piece(self.view.selected_slot);
                self.report(r);
            }
            Action::Flip => {
                let r = self.session.flip_piece(self.view.selected_slot);
                self.report(r);
            }
            Action::Undo => match self.session.undo() {
                Ok(()) => {
                    self.line_clear.reset();
                    self.toast(ToastKind::Info, "Undone");
                }
                Err(e) => self.toast(ToastKind::Error, e.to_string()),
            },
            Action::ClearLine => {
                if self.view.clear_line_mode {
                    self.view.clear_line_mode = false;
                } else if self.session.state.tokens.clear_line == 0 {
                    self.toast(ToastKind::Error, "no clear-line tokens left");
                } else {
                    self.view.clear_line_mode = true;
                    self.toast(ToastKind::Info, "Pick a cell to clear its row and column");
                }
            }
            Action::FullClear if self.config.special_effects => {
                match self.session.full_clear() {
                    Ok(()) => self.toast(ToastKind::Info, "Grid wiped"),
                    Err(e) => self.toast(ToastKind::Error, e.to_string()),
                }
            }
            Action::ShiftColumnUp if self.config.special_effects => self.shift_cursor_column(1),
            Action::ShiftColumnDown if self.config.special_effects => self.shift_cursor_column(-1),
            Action::Restart => self.reset_game(self.config.mode),
            Action::FullClear | Action::ShiftColumnUp | Action::ShiftColumnDown | Action::None => {}
        }
        self.check_game_over();
    }

    fn shift_cursor_column(&mut self, direction: i32) {
        let col = self.view.cursor.1 as usize;
        let r = self.session.shift_column(col, direction);
        self.report(r);
    }

    /// If the selected piece doesn't fit at the cursor, jump to the nearest origin where it does.
    fn snap_cursor(&mut self) {
        let (row, col) = self.view.cursor;
        if self.session.can_place(self.view.selected_slot, row, col) {
            return;
        }
        let Ok(spots) = self.session.valid_placements(self.view.selected_slot) else {
            return;
        };
        if let Some(p) = spots
            .iter()
            .min_by_key(|p| (p.row - row).abs() + (p.col - col).abs())
        {
            self.view.cursor = (p.row, p.col);
        }
    }

    fn open_quit_menu(&mut self) {
        self.screen = Screen::QuitMenu;
        self.quit_selected = QuitOption::Resume;
    }

    fn report(&mut self, result: Result<(), crate::session::ActionError>) {
        if let Err(e) = result {
            self.toast(ToastKind::Error, e.to_string());
        }
    }

    fn move_cursor(&mut self, dr: i32, dc: i32) {
        let grid = &self.session.state.grid;
        let (r, c) = self.view.cursor;
        self.view.cursor = (
            (r + dr).clamp(0, grid.rows() as i32 - 1),
            (c + dc).clamp(0, grid.cols() as i32 - 1),
        );
    }

    fn next_slot(&mut self) {
        let start = self.view.selected_slot;
        for step in 1..=RACK_SIZE {
            let slot = (start + step) % RACK_SIZE;
            if self.session.state.rack.get(slot).is_some() {
                self.view.selected_slot = slot;
                return;
            }
        }
    }

    fn confirm_placement(&mut self) {
        let (row, col) = self.view.cursor;
        match self.session.place_piece(self.view.selected_slot, row, col) {
            Ok(outcome) => {
                debug!(slot = self.view.selected_slot, points = outcome.points, "placement confirmed");
                self.announce(&outcome);
                self.after_clear_queued();
            }
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    fn confirm_clear_line(&mut self) {
        let (row, col) = self.view.cursor;
        match self.session.clear_line_at(row as usize, col as usize) {
            Ok(lines) => {
                self.view.clear_line_mode = false;
                self.toast(ToastKind::Info, format!("Cleared {} line(s)", lines.len()));
                self.after_clear_queued();
            }
            Err(e) => self.toast(ToastKind::Error, e.to_string()),
        }
    }

    fn announce(&mut self, outcome: &PlacementOutcome) {
        if let Some(clear) = &outcome.clear {
            let text = if clear.combo_count > 1 {
                format!("+{} ({} lines, combo x{})", clear.points_earned, clear.total_lines_cleared, clear.combo_count)
            } else {
                format!("+{} ({} lines)", clear.points_earned, clear.total_lines_cleared)
            };
            self.toast(ToastKind::Info, text);
        }
        for &(kind, n) in &outcome.granted.0 {
            self.toast(ToastKind::Reward, format!("+{n} {kind} token"));
        }
        for event in &outcome.unlocks {
            let names: Vec<&str> = event.pieces.iter().map(|&(_, name)| name).collect();
            self.toast(
                ToastKind::Unlock,
                format!("{} unlocked: {}", event.tier, names.join(", ")),
            );
        }
    }

    /// Without animation, pending clears are applied on the spot.
    fn after_clear_queued(&mut self) {
        self.line_clear.reset();
        if self.config.no_animation && self.session.state.clears_pending() {
            self.finish_clears();
        }
    }

    fn finish_clears(&mut self) {
        self.session.finish_clears();
        self.line_clear.reset();
        debug!("clear animation finished");
        self.check_game_over();
    }

    fn check_game_over(&mut self) {
        if self.screen == Screen::Playing && self.session.state.is_game_over {
            self.screen = Screen::GameOver;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Palette;
    use crate::storage::MemoryStore;

    fn app(no_animation: bool) -> App {
        let config = GameConfig {
            mode: GameMode::Collection,
            no_animation,
            no_menu: true,
            special_effects: true,
            frame_rate: 30.0,
        };
        let session = Session::new(config.mode, 3, Box::new(MemoryStore::default())).unwrap();
        let theme = Theme::load(None, Palette::Normal).unwrap();
        App::new(config, theme, session)
    }

    #[test]
    fn test_cursor_clamps_to_grid() {
        let mut a = app(true);
        for _ in 0..20 {
            a.handle_action(Action::MoveUp);
            a.handle_action(Action::MoveLeft);
        }
        assert_eq!(a.view.cursor, (0, 0));
        for _ in 0..20 {
            a.handle_action(Action::MoveDown);
        }
        assert_eq!(a.view.cursor, (9, 0));
    }

    #[test]
    fn test_clear_line_without_animation_applies_at_once() {
        let mut a = app(true);
        a.session.state.grid.set(4, 0, 2);
        a.handle_action(Action::ClearLine);
        assert!(a.view.clear_line_mode);
        a.handle_action(Action::Confirm);
        assert!(!a.view.clear_line_mode);
        assert!(!a.session.state.clears_pending());
        assert_eq!(a.session.state.grid.occupied_count(), 0);
    }

    #[test]
    fn test_animated_clear_waits_for_effect() {
        let mut a = app(false);
        a.session.state.grid.set(4, 0, 2);
        a.handle_action(Action::ClearLine);
        a.handle_action(Action::Confirm);
        assert!(a.session.state.clears_pending());
        assert_eq!(a.session.state.grid.occupied_count(), 1);
    }

    #[test]
    fn test_rejection_becomes_toast() {
        let mut a = app(true);
        a.handle_action(Action::Undo);
        assert_eq!(a.toasts.len(), 1);
        assert_eq!(a.toasts[0].kind, ToastKind::Error);
        a.tick_toasts(TOAST_LIFETIME_MS);
        assert!(a.toasts.is_empty());
    }

    #[test]
    fn test_selecting_a_slot_snaps_to_a_fitting_origin() {
        let mut a = app(true);
        for r in 0..10 {
            for c in 0..10 {
                if (r, c) != (9, 9) {
                    a.session.state.grid.set(r, c, 1);
                }
            }
        }
        let dot = crate::pieces::PieceInstance {
            instance_id: 99,
            def_id: "dot",
            name: "Dot",
            color: 2,
            tier: crate::catalog::Tier::Starter,
            current_shape: crate::shape::Shape::new(&[(0, 0)]).unwrap(),
        };
        a.session.state.rack.put(1, dot);
        a.handle_action(Action::SelectSlot(1));
        assert_eq!(a.view.selected_slot, 1);
        assert_eq!(a.view.cursor, (9, 9));
    }

    #[test]
    fn test_special_effect_keys() {
        let mut a = app(true);
        a.session.state.grid.set(0, 4, 3);
        a.handle_action(Action::ShiftColumnDown);
        assert_eq!(a.session.state.grid.get(1, 4), Some(3));
        a.handle_action(Action::FullClear);
        assert_eq!(a.session.state.grid.occupied_count(), 0);

        a.config.special_effects = false;
        a.session.state.grid.set(0, 0, 3);
        a.handle_action(Action::FullClear);
        assert_eq!(a.session.state.grid.occupied_count(), 1);
    }

    #[test]
    fn test_quit_menu_round_trip() {
        let mut a = app(true);
        assert!(!a.handle_action(Action::Quit));
        assert_eq!(a.screen, Screen::QuitMenu);
        a.handle_action(Action::MoveUp);
        assert_eq!(a.quit_selected, QuitOption::Exit);
        assert!(a.handle_action(Action::Confirm));
    }
}
