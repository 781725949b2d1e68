//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Pick rack slot 0..=2 directly.
    SelectSlot(usize),
    NextSlot,
    /// Place the selected piece, or confirm in menus.
    Confirm,
    Rotate,
    Flip,
    Undo,
    /// Toggle the manual clear-line cursor.
    ClearLine,
    /// Special effects, only honoured with `--special-effects`.
    FullClear,
    ShiftColumnUp,
    ShiftColumnDown,
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, enter) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Char(c @ '1'..='3') => Action::SelectSlot(c as usize - '1' as usize),
        KeyCode::Tab => Action::NextSlot,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('r') => Action::Rotate,
        KeyCode::Char('f') => Action::Flip,
        KeyCode::Char('u') => Action::Undo,
        KeyCode::Char('c') => Action::ClearLine,
        KeyCode::Char('n') => Action::Restart,
        KeyCode::Char('X') => Action::FullClear,
        KeyCode::Char('[') => Action::ShiftColumnUp,
        KeyCode::Char(']') => Action::ShiftColumnDown,
        _ => Action::None,
    }
}
