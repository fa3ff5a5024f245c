//! Delete confirmation interstitial.

use crate::format::UNTITLED;
use crate::record::{Worry, WorryId};
use crate::render::{el, Node, Surface, Trigger};
use crate::views::Action;

pub const CANCEL_ID: &str = "dialog-cancel";
pub const REMOVE_ID: &str = "dialog-remove";
pub const BACKDROP_ID: &str = "dialog-backdrop";

/// An open confirmation for deleting one worry.
///
/// While open it is mounted as the surface overlay, which keeps keyboard
/// focus cycling between its two buttons. Closing hands focus back to
/// whatever held it before.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog {
    worry_id: WorryId,
    title: String,
    return_focus: Option<String>,
}

impl ConfirmDialog {
    pub fn open(worry: &Worry, surface: &mut Surface) -> Self {
        let dialog = Self {
            worry_id: worry.id.clone(),
            title: worry.title.clone(),
            return_focus: surface.focused().map(str::to_string),
        };
        surface.set_overlay(dialog.render(), REMOVE_ID);
        dialog
    }

    pub fn worry_id(&self) -> &str {
        &self.worry_id
    }

    pub fn close(self, surface: &mut Surface) {
        surface.clear_overlay(self.return_focus);
    }

    fn render(&self) -> Node {
        let title = if self.title.is_empty() {
            UNTITLED
        } else {
            self.title.as_str()
        };

        let modal = Node::new("div")
            .class("modal")
            .attr("role", "dialog")
            .attr("aria-modal", "true")
            .attr("aria-labelledby", "modal-title")
            .child(el("h2", &[("id", "modal-title"), ("class", "modal-title")], ["Say goodbye to this worry?"]))
            .child(el("p", &[("class", "modal-worry-title")], [title]))
            .child(el(
                "p",
                &[("class", "modal-message")],
                ["Confirm the worry is gone and you want it off your list."],
            ))
            .child(
                Node::new("div")
                    .class("modal-actions")
                    .child(
                        Node::new("button")
                            .id(CANCEL_ID)
                            .class("btn btn-secondary")
                            .on(Trigger::Click, Action::CancelDelete)
                            .child("Cancel"),
                    )
                    .child(
                        Node::new("button")
                            .id(REMOVE_ID)
                            .class("btn btn-danger")
                            .on(Trigger::Click, Action::ConfirmDelete)
                            .child("Remove"),
                    ),
            );

        Node::new("div")
            .id(BACKDROP_ID)
            .class("modal-backdrop")
            .on(Trigger::Click, Action::CancelDelete)
            .child(modal)
    }
}
