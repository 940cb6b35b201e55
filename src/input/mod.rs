//! Input module - key to action mapping
//!
//! Single-press semantics: every accepted key press maps to exactly one
//! action; terminal auto-repeat provides held-key repeats.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::GameAction;

/// Top-level actions the app understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Game(GameAction),
    SwitchScreen,
    NextContent,
    Quit,
}

/// Map a key event to an app action.
pub fn map_key(key: KeyEvent) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('a') => Some(AppAction::Game(GameAction::MoveLeft)),
        KeyCode::Right | KeyCode::Char('d') => Some(AppAction::Game(GameAction::MoveRight)),
        KeyCode::Up | KeyCode::Char('w') => Some(AppAction::Game(GameAction::Rotate)),
        KeyCode::Down | KeyCode::Char('s') => Some(AppAction::Game(GameAction::SoftDrop)),
        KeyCode::Char(' ') => Some(AppAction::Game(GameAction::HardDrop)),
        KeyCode::Char('p') => Some(AppAction::Game(GameAction::Pause)),
        KeyCode::Char('r') => Some(AppAction::Game(GameAction::Restart)),
        KeyCode::Tab => Some(AppAction::SwitchScreen),
        KeyCode::Char('n') => Some(AppAction::NextContent),
        KeyCode::Char('q') | KeyCode::Esc => Some(AppAction::Quit),
        _ => None,
    }
}
