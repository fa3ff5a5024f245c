//! Mode indicator for the status line.

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

use crate::mode::Mode;

/// Color-coded badge for the current mode:
/// - Normal: Blue
/// - Insert: Green
pub struct ModeIndicator {
    mode: Mode,
}

impl ModeIndicator {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode_color(mode: Mode) -> Color {
        match mode {
            Mode::Normal => Color::Blue,
            Mode::Insert => Color::Green,
        }
    }

    /// Render as a styled span (for embedding in other widgets).
    pub fn as_span(&self) -> Span<'static> {
        Span::styled(
            format!("[{}]", self.mode.short_code()),
            Style::default()
                .fg(Color::White)
                .bg(Self::mode_color(self.mode))
                .add_modifier(Modifier::BOLD),
        )
    }
}
