//! The per-worry editor.
//!
//! The in-memory [`Worry`] is the only source of truth while the editor
//! owns it. Text edits and feeling changes are persisted through a
//! [`Debouncer`]; structural edits and exits persist at once. Leaving the
//! editor by any path goes through [`EditView::release`], which writes any
//! pending change before the record is dropped.

use chrono::{DateTime, TimeDelta, Utc};

use crate::record::{Feeling, ReasonSide, Worry};
use crate::render::{el, Node, Region, Surface, Trigger};
use crate::schedule::Debouncer;
use crate::store::RecordStore;
use crate::views::{Action, Outcome};

pub const TITLE_ID: &str = "worry-title";
pub const BACK_ID: &str = "back";
pub const DONE_ID: &str = "done";

const STILL_REAL_HELP: &str = "That's hard. Try adding more reasons the worry might not be real and read them through. \
If you have done this a few times, can't find more evidence and still feel worried, talk to someone you trust.";

const RESOLVED_HELP: &str = "Well done! You thought it through and made the worry smaller. \
Read what you wrote again, add more if you like, and come back here whenever this worry returns.";

pub fn reason_input_id(side: ReasonSide, index: usize) -> String {
    format!("{}-{}", side.slug(), index)
}

pub fn remove_reason_id(side: ReasonSide, index: usize) -> String {
    format!("remove-{}-{}", side.slug(), index)
}

pub fn add_reason_id(side: ReasonSide) -> String {
    format!("add-{}", side.slug())
}

pub fn feeling_input_id(feeling: Feeling) -> String {
    format!("feeling-{}", feeling.as_str())
}

/// Editor state for at most one worry at a time.
#[derive(Debug)]
pub struct EditView {
    worry: Option<Worry>,
    autosave: Debouncer,
}

impl EditView {
    pub fn new(autosave_delay: TimeDelta) -> Self {
        Self {
            worry: None,
            autosave: Debouncer::new(autosave_delay),
        }
    }

    pub fn worry(&self) -> Option<&Worry> {
        self.worry.as_ref()
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.autosave.deadline()
    }

    /// Load a worry and mount its form, focusing the title.
    ///
    /// A worry that no longer exists sends the user back to the index.
    pub fn enter(&mut self, id: &str, store: &RecordStore, surface: &mut Surface) -> Outcome {
        self.release(store);

        let Some(worry) = store.find(id) else {
            tracing::info!(id, "Worry not found, returning to the index");
            return Outcome::Navigate("/".to_string());
        };
        self.worry = Some(worry);
        self.mount(surface, Some(TITLE_ID));
        Outcome::Stay
    }

    pub fn edit_title(&mut self, value: &str, now: DateTime<Utc>, surface: &mut Surface) {
        let Some(worry) = self.worry.as_mut() else {
            return;
        };
        worry.set_title(value);
        self.after_text_edit(now, surface);
    }

    pub fn edit_reason(
        &mut self,
        side: ReasonSide,
        index: usize,
        value: &str,
        now: DateTime<Utc>,
        surface: &mut Surface,
    ) {
        let Some(worry) = self.worry.as_mut() else {
            return;
        };
        if worry.set_reason(side, index, value) {
            self.after_text_edit(now, surface);
        }
    }

    pub fn add_reason(&mut self, side: ReasonSide, store: &RecordStore, surface: &mut Surface) {
        let Some(worry) = self.worry.as_mut() else {
            return;
        };
        worry.add_reason(side);
        self.after_structural_edit(store, surface);
    }

    pub fn remove_reason(
        &mut self,
        side: ReasonSide,
        index: usize,
        store: &RecordStore,
        surface: &mut Surface,
    ) {
        let Some(worry) = self.worry.as_mut() else {
            return;
        };
        if worry.remove_reason(side, index) {
            self.after_structural_edit(store, surface);
        }
    }

    pub fn select_feeling(&mut self, feeling: Feeling, now: DateTime<Utc>, surface: &mut Surface) {
        let Some(worry) = self.worry.as_mut() else {
            return;
        };
        worry.feeling = Some(feeling);
        self.autosave.schedule(now);
        self.patch(surface, &[Region::Helper, Region::FeelingChoice]);
    }

    /// Back and Done: persist now, then go to the index.
    pub fn exit(&mut self, store: &RecordStore) -> Outcome {
        self.autosave.cancel();
        self.save(store);
        Outcome::Navigate("/".to_string())
    }

    /// Run the debounced save if its quiet interval has passed.
    pub fn poll_autosave(&mut self, store: &RecordStore, now: DateTime<Utc>) -> bool {
        if self.autosave.poll(now) {
            self.save(store);
            return true;
        }
        false
    }

    /// Write any pending change and let go of the worry.
    pub fn release(&mut self, store: &RecordStore) {
        if self.autosave.flush() {
            tracing::debug!("Flushing pending autosave");
            self.save(store);
        }
        self.worry = None;
    }

    fn after_text_edit(&mut self, now: DateTime<Utc>, surface: &mut Surface) {
        self.autosave.schedule(now);
        self.patch(surface, &[Region::Summary, Region::Helper, Region::FeelingChoice]);
    }

    fn after_structural_edit(&mut self, store: &RecordStore, surface: &mut Surface) {
        self.autosave.cancel();
        self.save(store);
        self.mount(surface, None);
    }

    fn save(&mut self, store: &RecordStore) -> bool {
        match self.worry.as_mut() {
            Some(worry) => store.upsert(worry),
            None => false,
        }
    }

    fn mount(&self, surface: &mut Surface, focus: Option<&str>) {
        if let Some(worry) = &self.worry {
            surface.mount(render_form(worry), focus);
        }
    }

    fn patch(&self, surface: &mut Surface, regions: &[Region]) {
        let Some(worry) = &self.worry else {
            return;
        };
        for region in regions {
            let node = match region {
                Region::Summary => render_summary(worry),
                Region::Helper => render_helper(worry),
                Region::FeelingChoice => render_feeling(worry),
            };
            surface.patch_region(*region, node);
        }
    }
}

/// The full editable form for one worry.
pub fn render_form(worry: &Worry) -> Node {
    Node::new("form")
        .class("worry-form")
        .attr("data-id", worry.id.as_str())
        .child(
            Node::new("button")
                .id(BACK_ID)
                .class("btn btn-back")
                .on(Trigger::Click, Action::Back)
                .child("Back"),
        )
        .child(render_title(worry))
        .child(render_reasons(worry, ReasonSide::For))
        .child(render_reasons(worry, ReasonSide::Against))
        .child(render_summary(worry))
        .child(render_feeling(worry))
        .child(render_helper(worry))
        .child(
            Node::new("button")
                .id(DONE_ID)
                .class("btn btn-primary btn-done")
                .on(Trigger::Click, Action::Done)
                .child("I'm done"),
        )
}

fn render_title(worry: &Worry) -> Node {
    Node::new("div")
        .class("form-group")
        .child(
            el("label", &[("for", TITLE_ID), ("class", "form-label")], ["What are you worried about?"]),
        )
        .child(
            Node::new("input")
                .id(TITLE_ID)
                .class("form-input")
                .attr("type", "text")
                .attr("value", worry.title.as_str())
                .on(Trigger::Input, Action::EditTitle),
        )
}

fn side_label(side: ReasonSide) -> &'static str {
    match side {
        ReasonSide::For => "Why might this worry be real?",
        ReasonSide::Against => "What tells you it might not be real?",
    }
}

fn render_reasons(worry: &Worry, side: ReasonSide) -> Node {
    let reasons = worry.reasons(side);
    let removable = reasons.len() > 1;

    let rows = reasons.iter().enumerate().map(|(index, text)| {
        let input = Node::new("input")
            .id(reason_input_id(side, index))
            .class("form-input reason-input")
            .attr("type", "text")
            .attr("placeholder", "Enter a reason...")
            .attr("value", text.as_str())
            .on(Trigger::Input, Action::EditReason(side, index));
        let mut row = Node::new("div").class("reason-item").child(input);
        if removable {
            row = row.child(
                Node::new("button")
                    .id(remove_reason_id(side, index))
                    .class("btn btn-remove")
                    .attr("aria-label", "Remove this reason")
                    .on(Trigger::Click, Action::RemoveReason(side, index))
                    .child("x"),
            );
        }
        row
    });

    Node::new("div")
        .class("form-group")
        .attr("data-side", side.slug())
        .child(el("label", &[("class", "form-label")], [side_label(side)]))
        .child(Node::new("div").class("reason-list").children(rows))
        .child(
            Node::new("button")
                .id(add_reason_id(side))
                .class("btn btn-add")
                .on(Trigger::Click, Action::AddReason(side))
                .child("+ Add another reason"),
        )
}

/// Read-only recap of the filled-in fields.
pub fn render_summary(worry: &Worry) -> Node {
    let mut summary = Node::new("div")
        .class("form-group summary-section")
        .region(Region::Summary)
        .child(el("h3", &[("class", "summary-title")], ["Summary"]));

    if !worry.title.is_empty() {
        summary = summary.child(el("p", &[("class", "summary-worry-title")], [worry.title.as_str()]));
    }

    for (side, heading) in [
        (ReasonSide::For, "Reasons it might be real:"),
        (ReasonSide::Against, "Evidence it's not real:"),
    ] {
        let filled: Vec<&str> = worry.filled_reasons(side).collect();
        if filled.is_empty() {
            continue;
        }
        summary = summary.child(el("h4", &[], [heading])).child(
            Node::new("ul")
                .class("summary-list")
                .children(filled.into_iter().map(|r| el("li", &[], [r]))),
        );
    }
    summary
}

/// The two mutually exclusive feeling radios.
pub fn render_feeling(worry: &Worry) -> Node {
    let options = Feeling::ALL.into_iter().map(|feeling| {
        Node::new("label")
            .class("radio-label")
            .child(
                Node::new("input")
                    .id(feeling_input_id(feeling))
                    .attr("type", "radio")
                    .attr("name", "feeling")
                    .attr("value", feeling.as_str())
                    .flag("checked", worry.feeling == Some(feeling))
                    .on(Trigger::Change, Action::SelectFeeling(feeling)),
            )
            .child(format!(" {}", feeling.label()))
    });

    Node::new("div").class("form-group").region(Region::FeelingChoice).child(
        Node::new("fieldset")
            .class("feeling-fieldset")
            .child(el(
                "legend",
                &[("class", "form-label")],
                ["Looking at the evidence, which do you think is true?"],
            ))
            .children(options),
    )
}

/// Guidance that depends only on the chosen feeling.
pub fn render_helper(worry: &Worry) -> Node {
    let helper = Node::new("div").class("helper-text").region(Region::Helper);
    match worry.feeling {
        Some(Feeling::StillReal) => {
            helper.child(el("p", &[("class", "helper-message")], [STILL_REAL_HELP]))
        }
        Some(Feeling::Resolved) => helper.child(el(
            "p",
            &[("class", "helper-message helper-success")],
            [RESOLVED_HELP],
        )),
        None => helper,
    }
}
