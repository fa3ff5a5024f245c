//! TUI interaction modes

/// The current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Moving focus and pressing buttons (default)
    #[default]
    Normal,
    /// Typing into the focused text field (Enter or i on a field)
    Insert,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Normal => write!(f, "NORMAL"),
            Mode::Insert => write!(f, "INSERT"),
        }
    }
}

impl Mode {
    /// Returns a short code for compact display.
    pub fn short_code(&self) -> &'static str {
        match self {
            Mode::Normal => "NOR",
            Mode::Insert => "INS",
        }
    }
}
