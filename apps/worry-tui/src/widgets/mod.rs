//! Widgets for the journal TUI

mod mode_indicator;
mod node_view;

pub use mode_indicator::ModeIndicator;
pub use node_view::NodePainter;
