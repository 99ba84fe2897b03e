//! Keybinding definitions

use crossterm::event::KeyCode;

/// Keybinding action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// Move up in the layer list
    MoveUp,
    /// Move down in the layer list
    MoveDown,
    /// Toggle visibility of the selected layer
    ToggleVisibility,
    /// Show only the selected layer
    Solo,
    /// Show every layer
    ShowAll,
    /// Press the screenshot button
    Screenshot,
    /// Show the next pyramid level
    NextLevel,
    /// Show the previous pyramid level
    PrevLevel,
    /// Toggle help
    ToggleHelp,
    /// Close overlays
    Cancel,
}

/// Get the action for a key
pub fn normal_mode_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveUp),
        KeyCode::Char(' ') | KeyCode::Char('v') | KeyCode::Enter => {
            Some(Action::ToggleVisibility)
        }
        KeyCode::Char('o') => Some(Action::Solo),
        KeyCode::Char('a') => Some(Action::ShowAll),
        KeyCode::Char('s') => Some(Action::Screenshot),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::NextLevel),
        KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevLevel),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}
