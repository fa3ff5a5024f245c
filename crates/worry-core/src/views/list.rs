//! The worry index.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::format::{relative_age, title_label};
use crate::id::IdGenerator;
use crate::record::Worry;
use crate::render::{el, Node, Surface, Trigger};
use crate::router::worry_path;
use crate::store::RecordStore;
use crate::views::{Action, ConfirmDialog, Outcome};

pub const NEW_WORRY_ID: &str = "new-worry";

/// Lists worries with content, newest activity first, and guards deletion
/// behind a [`ConfirmDialog`].
#[derive(Debug)]
pub struct ListView {
    title_limit: usize,
    rows: Vec<Worry>,
    dialog: Option<ConfirmDialog>,
}

impl ListView {
    pub fn new(title_limit: usize) -> Self {
        Self {
            title_limit,
            rows: Vec::new(),
            dialog: None,
        }
    }

    /// Worries currently shown, in display order.
    pub fn rows(&self) -> &[Worry] {
        &self.rows
    }

    pub fn dialog(&self) -> Option<&ConfirmDialog> {
        self.dialog.as_ref()
    }

    /// Reload from the store and mount the index.
    pub fn render(&mut self, store: &RecordStore, now: DateTime<Utc>, surface: &mut Surface) {
        let mut rows: Vec<Worry> = store
            .load_all()
            .into_iter()
            .filter(Worry::has_content)
            .collect();
        // Stable, so ties keep document order; undated worries sink.
        rows.sort_by_key(|w| Reverse(w.updated_at));
        self.rows = rows;

        surface.mount(self.build(now), None);
        if surface.focused().is_none() {
            surface.focus(NEW_WORRY_ID);
        }
    }

    /// Persist a seeded blank worry and open it.
    pub fn create_worry(store: &RecordStore, ids: &dyn IdGenerator) -> Outcome {
        let mut worry = Worry::blank(ids.generate());
        if !store.upsert(&mut worry) {
            tracing::warn!(id = %worry.id, "New worry was not saved");
        }
        Outcome::Navigate(worry_path(&worry.id))
    }

    /// Ask before deleting. Unknown ids are ignored.
    pub fn request_delete(&mut self, id: &str, surface: &mut Surface) {
        if let Some(previous) = self.dialog.take() {
            previous.close(surface);
        }
        if let Some(worry) = self.rows.iter().find(|w| w.id == id) {
            self.dialog = Some(ConfirmDialog::open(worry, surface));
        }
    }

    /// Delete the worry the open dialog is about, then re-render.
    pub fn confirm_delete(&mut self, store: &RecordStore, now: DateTime<Utc>, surface: &mut Surface) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        if store.remove(dialog.worry_id()) {
            tracing::info!(id = dialog.worry_id(), "Removed worry");
        }
        dialog.close(surface);
        self.render(store, now, surface);
    }

    pub fn cancel_delete(&mut self, surface: &mut Surface) {
        if let Some(dialog) = self.dialog.take() {
            dialog.close(surface);
        }
    }

    /// Drop view state when another view takes over.
    pub fn release(&mut self, surface: &mut Surface) {
        self.cancel_delete(surface);
        self.rows.clear();
    }

    fn build(&self, now: DateTime<Utc>) -> Node {
        let header = el(
            "header",
            &[("class", "landing-header")],
            [el("h1", &[("class", "app-title")], ["Worry Journal"])],
        );
        let create = Node::new("button")
            .id(NEW_WORRY_ID)
            .class("btn btn-primary btn-large")
            .on(Trigger::Click, Action::CreateWorry)
            .child("I have a new worry");

        let body = if self.rows.is_empty() {
            el("p", &[("class", "empty-state")], ["You don't have any worries saved yet."])
        } else {
            Node::new("ul")
                .class("worry-list")
                .children(self.rows.iter().map(|w| self.row(w, now)))
        };

        Node::new("main")
            .class("landing")
            .child(header)
            .child(create)
            .child(
                Node::new("section")
                    .class("worries-section")
                    .child(el("h2", &[], ["My Worries"]))
                    .child(body),
            )
    }

    fn row(&self, worry: &Worry, now: DateTime<Utc>) -> Node {
        let age = worry
            .updated_at
            .map(|at| relative_age(at, now))
            .unwrap_or_default();

        Node::new("li")
            .class("worry-item")
            .attr("data-id", worry.id.as_str())
            .child(el("h3", &[("class", "worry-title")], [title_label(&worry.title, self.title_limit)]))
            .child(el("span", &[("class", "worry-date")], [age]))
            .child(
                Node::new("div")
                    .class("worry-actions")
                    .child(
                        Node::new("button")
                            .id(format!("open-{}", worry.id))
                            .class("btn btn-secondary")
                            .on(Trigger::Click, Action::OpenWorry(worry.id.clone()))
                            .child("Go to this worry"),
                    )
                    .child(
                        Node::new("button")
                            .id(format!("delete-{}", worry.id))
                            .class("btn btn-tertiary")
                            .on(Trigger::Click, Action::RequestDelete(worry.id.clone()))
                            .child("Say goodbye to this worry"),
                    ),
            )
    }
}
