//! Keybinding definitions

use crossterm::event::{KeyCode, KeyModifiers};

/// What a key does outside of text entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Move focus to the next element
    FocusNext,
    /// Move focus to the previous element
    FocusPrev,
    /// Press the focused button or radio, or start typing in a field
    Activate,
    /// Start typing in the focused field
    StartEditing,
    /// Close the open dialog
    Cancel,
    /// Previous location in history
    HistoryBack,
    /// Toggle help
    ToggleHelp,
}

/// Get the action for a key in normal mode
pub fn normal_mode_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }
    match code {
        KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Char('?') => Some(KeyAction::ToggleHelp),
        KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => Some(KeyAction::FocusNext),
        KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => Some(KeyAction::FocusPrev),
        KeyCode::Enter | KeyCode::Char(' ') => Some(KeyAction::Activate),
        KeyCode::Char('i') => Some(KeyAction::StartEditing),
        KeyCode::Esc => Some(KeyAction::Cancel),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => Some(KeyAction::HistoryBack),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_quits_anywhere() {
        assert_eq!(
            normal_mode_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(KeyAction::Quit)
        );
        assert_eq!(normal_mode_action(KeyCode::Char('c'), KeyModifiers::NONE), None);
    }

    #[test]
    fn tab_and_arrows_move_focus() {
        assert_eq!(normal_mode_action(KeyCode::Tab, KeyModifiers::NONE), Some(KeyAction::FocusNext));
        assert_eq!(normal_mode_action(KeyCode::Up, KeyModifiers::NONE), Some(KeyAction::FocusPrev));
        assert_eq!(
            normal_mode_action(KeyCode::BackTab, KeyModifiers::SHIFT),
            Some(KeyAction::FocusPrev)
        );
    }
}
