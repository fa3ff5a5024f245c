//! Paints a mounted node tree as terminal lines.
//!
//! Headings, paragraphs and lists become lines of text. Inputs and buttons
//! become bracketed spans, highlighted when focused. Rows that hold several
//! controls (a reason and its remove button, a worry's actions) stay on one
//! line.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use worry_core::render::Child;
use worry_core::Node;

const INLINE_CLASSES: [&str; 3] = ["reason-item", "worry-actions", "modal-actions"];

/// Paints nodes relative to the current focus.
pub struct NodePainter<'a> {
    focused: Option<&'a str>,
    editing: bool,
}

impl<'a> NodePainter<'a> {
    pub fn new(focused: Option<&'a str>, editing: bool) -> Self {
        Self { focused, editing }
    }

    /// All lines for `node`, plus the index of the line holding focus.
    pub fn paint(&self, node: &Node) -> (Vec<Line<'static>>, Option<usize>) {
        let mut lines = Vec::new();
        let mut focus_line = None;
        self.block(node, &mut lines, &mut focus_line);
        (lines, focus_line)
    }

    fn block(&self, node: &Node, lines: &mut Vec<Line<'static>>, focus_line: &mut Option<usize>) {
        if self.contains_focus(node) && !has_element_children(node) {
            *focus_line = Some(lines.len());
        }

        match node.tag.as_str() {
            "h1" | "h2" => {
                lines.push(Line::default());
                lines.push(Line::styled(
                    node.text_content(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ));
            }
            "h3" | "h4" => lines.push(Line::styled(
                node.text_content(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            "p" | "legend" => lines.push(Line::raw(node.text_content())),
            "span" => lines.push(Line::styled(
                node.text_content(),
                Style::default().fg(Color::DarkGray),
            )),
            "li" if !has_element_children(node) => {
                lines.push(Line::raw(format!("  • {}", node.text_content())));
            }
            "input" | "button" => lines.push(Line::from(self.spans(node))),
            "label" if !has_element_children(node) => lines.push(Line::styled(
                node.text_content(),
                Style::default().fg(Color::Gray),
            )),
            _ if is_inline_row(node) || node.tag == "label" => {
                if self.contains_focus(node) {
                    *focus_line = Some(lines.len());
                }
                lines.push(Line::from(self.spans(node)));
            }
            _ => {
                for child in &node.children {
                    match child {
                        Child::Element(el) => self.block(el, lines, focus_line),
                        Child::Text(text) => lines.push(Line::raw(text.clone())),
                    }
                }
                if node.tag == "li" {
                    lines.push(Line::default());
                }
            }
        }
    }

    fn spans(&self, node: &Node) -> Vec<Span<'static>> {
        let focused = self.is_focused(node);
        let style = if focused {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default()
        };

        match node.tag.as_str() {
            "input" if node.get_attr("type") == Some("radio") => {
                let mark = if node.has_attr("checked") { "(•)" } else { "( )" };
                vec![Span::styled(mark.to_string(), style)]
            }
            "input" => {
                let value = node.get_attr("value").unwrap_or_default();
                let mut spans = vec![Span::styled("[", style)];
                if value.is_empty() && !(focused && self.editing) {
                    let hint = node.get_attr("placeholder").unwrap_or_default();
                    spans.push(Span::styled(
                        hint.to_string(),
                        style.add_modifier(Modifier::DIM),
                    ));
                } else {
                    spans.push(Span::styled(value.to_string(), style));
                }
                if focused && self.editing {
                    spans.push(Span::styled("▏", style.add_modifier(Modifier::SLOW_BLINK)));
                }
                spans.push(Span::styled("]", style));
                spans
            }
            "button" => vec![Span::styled(
                format!("[ {} ]", node.text_content()),
                style.add_modifier(Modifier::BOLD),
            )],
            _ => {
                let mut spans = Vec::new();
                for child in &node.children {
                    match child {
                        Child::Element(el) => spans.extend(self.spans(el)),
                        Child::Text(text) => spans.push(Span::raw(text.clone())),
                    }
                    if is_inline_row(node) {
                        spans.push(Span::raw(" "));
                    }
                }
                spans
            }
        }
    }

    fn is_focused(&self, node: &Node) -> bool {
        self.focused.is_some() && node.id_attr() == self.focused
    }

    fn contains_focus(&self, node: &Node) -> bool {
        node.descendants().into_iter().any(|n| self.is_focused(n))
    }
}

fn has_element_children(node: &Node) -> bool {
    node.elements().next().is_some()
}

fn is_inline_row(node: &Node) -> bool {
    node.get_attr("class")
        .is_some_and(|class| class.split_whitespace().any(|c| INLINE_CLASSES.contains(&c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use worry_core::render::el;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn reason_row_stays_on_one_line() {
        let row = Node::new("div")
            .class("reason-item")
            .child(Node::new("input").id("reasons-for-0").attr("value", "late"))
            .child(Node::new("button").id("remove-reasons-for-0").child("x"));
        let (lines, focus) = NodePainter::new(Some("remove-reasons-for-0"), false).paint(&row);

        assert_eq!(lines.len(), 1);
        assert_eq!(text(&lines[0]), "[late] [ x ] ");
        assert_eq!(focus, Some(0));
    }

    #[test]
    fn radios_show_checked_state() {
        let label = Node::new("label")
            .child(Node::new("input").id("feeling-resolved").attr("type", "radio").attr("checked", "checked"))
            .child(" I think the worry is not real");
        let (lines, _) = NodePainter::new(None, false).paint(&label);
        assert_eq!(text(&lines[0]), "(•) I think the worry is not real");
    }

    #[test]
    fn empty_field_shows_placeholder_until_editing() {
        let input = Node::new("input").id("t").attr("value", "").attr("placeholder", "Enter a reason...");
        let (idle, _) = NodePainter::new(Some("t"), false).paint(&input);
        assert_eq!(text(&idle[0]), "[Enter a reason...]");

        let (editing, _) = NodePainter::new(Some("t"), true).paint(&input);
        assert_eq!(text(&editing[0]), "[▏]");
    }

    #[test]
    fn focus_line_points_at_focused_control() {
        let form = Node::new("form")
            .child(el("h3", &[], ["Summary"]))
            .child(el("p", &[], ["text"]))
            .child(Node::new("button").id("done").child("I'm done"));
        let (lines, focus) = NodePainter::new(Some("done"), false).paint(&form);
        assert_eq!(focus, Some(2));
        assert_eq!(text(&lines[2]), "[ I'm done ]");
    }
}
