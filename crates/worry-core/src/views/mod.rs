//! View controllers: the worry index and the per-worry editor.
//!
//! Views own their in-memory state, render it into [`Node`](crate::render::Node)
//! trees mounted on a [`Surface`](crate::render::Surface), and report
//! navigation back to the shell as an [`Outcome`] instead of touching the
//! router themselves.

pub mod confirm;
pub mod edit;
pub mod list;

pub use confirm::ConfirmDialog;
pub use edit::EditView;
pub use list::ListView;

use crate::record::{Feeling, ReasonSide, WorryId};

/// What a bound element asks for when its event fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateWorry,
    OpenWorry(WorryId),
    RequestDelete(WorryId),
    ConfirmDelete,
    CancelDelete,
    EditTitle,
    EditReason(ReasonSide, usize),
    AddReason(ReasonSide),
    RemoveReason(ReasonSide, usize),
    SelectFeeling(Feeling),
    Back,
    Done,
}

/// A fired binding, with the element's new value for input events.
#[derive(Debug, Clone, PartialEq)]
pub struct UiEvent {
    pub action: Action,
    pub value: Option<String>,
}

impl UiEvent {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            value: None,
        }
    }

    pub fn with_value(action: Action, value: impl Into<String>) -> Self {
        Self {
            action,
            value: Some(value.into()),
        }
    }
}

/// Where a view wants to go after handling something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Navigate(String),
}
