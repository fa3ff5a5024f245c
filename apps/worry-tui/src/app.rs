//! Application state and main render loop

use std::time::Duration;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use worry_core::{Key, Node, Shell};

use crate::keybindings::{normal_mode_action, KeyAction};
use crate::mode::Mode;
use crate::widgets::{ModeIndicator, NodePainter};

/// Longest the loop sleeps when nothing is scheduled, so ages stay fresh.
const IDLE_TICK: Duration = Duration::from_secs(1);

/// Main application state
pub struct App {
    /// The journal itself
    pub shell: Shell,
    /// Current mode (NORMAL, INSERT)
    pub mode: Mode,
    /// Whether to show the help overlay
    pub show_help: bool,
}

impl App {
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            mode: Mode::Normal,
            show_help: false,
        }
    }

    /// How long the event loop may wait for input before pumping again.
    pub fn poll_timeout(&self) -> Duration {
        match self.shell.next_deadline() {
            Some(deadline) => (deadline - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(IDLE_TICK),
            None => IDLE_TICK,
        }
    }

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let size = frame.area();
        let banner_height = if self.shell.banner().is_some() { 1 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height), // Storage warning
                Constraint::Min(0),                // Mounted view
                Constraint::Length(1),             // Status line
            ])
            .split(size);

        if let Some(banner) = self.shell.banner() {
            let warning = Paragraph::new(banner.to_string())
                .style(Style::default().fg(Color::Black).bg(Color::Yellow));
            frame.render_widget(warning, chunks[0]);
        }

        self.render_main_view(frame, chunks[1]);
        self.render_status_line(frame, chunks[2]);

        if let Some(overlay) = self.shell.surface().overlay() {
            self.render_overlay(frame, overlay, size);
        }

        if self.show_help {
            self.render_help_overlay(frame, size);
        }
    }

    fn render_main_view(&self, frame: &mut Frame, area: Rect) {
        let surface = self.shell.surface();
        let block = Block::default()
            .title(format!(" Worry Journal  {} ", self.shell.current_path()))
            .borders(Borders::ALL);

        let Some(root) = surface.root() else {
            frame.render_widget(block, area);
            return;
        };

        let editing = self.mode == Mode::Insert;
        let (lines, focus_line) = NodePainter::new(surface.focused(), editing).paint(root);
        let visible = area.height.saturating_sub(2) as usize;
        let scroll = match focus_line {
            Some(line) if line >= visible => line + 1 - visible,
            _ => 0,
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_overlay(&self, frame: &mut Frame, overlay: &Node, area: Rect) {
        let (lines, _) =
            NodePainter::new(self.shell.surface().focused(), false).paint(overlay);
        let block = Block::default()
            .title("Confirm")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        let dialog_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, dialog_area);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, dialog_area);
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![ModeIndicator::new(self.mode).as_span(), Span::raw(" ")];

        match self.shell.toast() {
            Some(toast) => spans.push(Span::styled(
                toast.message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            None => spans.push(Span::styled(
                match self.mode {
                    Mode::Insert => "Type to edit | Esc/Enter to stop",
                    Mode::Normal => "Tab to move | Enter to press | ? for help | q to quit",
                },
                Style::default().fg(Color::DarkGray),
            )),
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_text = r#"
Worry Journal - Help

Moving around:
  Tab / j / Down     - Next field or button
  BackTab / k / Up   - Previous field or button
  Enter / Space      - Press button, choose option, or start typing
  i                  - Start typing in the focused field
  Backspace / h      - Go back to the previous screen
  Esc                - Close the dialog / stop typing

Typing:
  Any key            - Edit the focused field (saved automatically)
  Tab                - Stop typing and move on

Other:
  ?                  - Toggle this help
  q / Ctrl-C         - Quit (pending changes are saved)
"#;

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        let help_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, help_area);
        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, help_area);
    }

    /// Handle a key press, returns true if app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.show_help {
            self.show_help = false;
            return false;
        }
        match self.mode {
            Mode::Normal => self.handle_normal_key(code, modifiers),
            Mode::Insert => self.handle_insert_key(code, modifiers),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let Some(action) = normal_mode_action(code, modifiers) else {
            return false;
        };

        match action {
            KeyAction::Quit => return true,
            KeyAction::ToggleHelp => self.show_help = true,
            KeyAction::FocusNext => self.shell.handle_key(Key::Tab),
            KeyAction::FocusPrev => self.shell.handle_key(Key::BackTab),
            KeyAction::Cancel => self.shell.handle_key(Key::Escape),
            KeyAction::HistoryBack => {
                if self.shell.surface().overlay().is_none() {
                    self.shell.history_back();
                }
            }
            KeyAction::StartEditing => self.start_editing(),
            KeyAction::Activate => {
                if self.focused_text_field().is_some() {
                    self.start_editing();
                } else {
                    self.shell.activate_focused();
                }
            }
        }
        false
    }

    fn handle_insert_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return true;
        }
        match code {
            KeyCode::Esc | KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Tab => {
                self.mode = Mode::Normal;
                self.shell.handle_key(Key::Tab);
            }
            KeyCode::BackTab => {
                self.mode = Mode::Normal;
                self.shell.handle_key(Key::BackTab);
            }
            KeyCode::Backspace => self.edit_focused(|value| {
                value.pop();
            }),
            KeyCode::Char(c) => self.edit_focused(|value| value.push(c)),
            _ => {}
        }
        false
    }

    fn start_editing(&mut self) {
        if self.focused_text_field().is_some() {
            self.mode = Mode::Insert;
        }
    }

    /// Id and current value of the focused text field, if focus is on one.
    fn focused_text_field(&self) -> Option<(String, String)> {
        let node = self.shell.surface().focused_node()?;
        let is_text = node.tag == "input" && node.get_attr("type") != Some("radio");
        if !is_text {
            return None;
        }
        let id = node.id_attr()?.to_string();
        let value = node.get_attr("value").unwrap_or_default().to_string();
        Some((id, value))
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let Some((id, mut value)) = self.focused_text_field() else {
            self.mode = Mode::Normal;
            return;
        };
        edit(&mut value);
        self.shell.input(&id, &value);
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
