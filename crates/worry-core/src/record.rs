//! The worry record and its editing rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record identifier. Opaque; assigned once by an [`IdGenerator`](crate::IdGenerator).
pub type WorryId = String;

/// How the writer feels about the worry after weighing the evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feeling {
    /// The worry still feels real
    #[serde(alias = "still")]
    StillReal,
    /// Reflection made the worry smaller
    #[serde(alias = "less")]
    Resolved,
}

impl Feeling {
    pub const ALL: [Feeling; 2] = [Feeling::StillReal, Feeling::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::StillReal => "still-real",
            Feeling::Resolved => "resolved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feeling::StillReal => "I think the worry is real",
            Feeling::Resolved => "I think the worry is not real",
        }
    }
}

impl std::fmt::Display for Feeling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two evidence lists a reason belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonSide {
    For,
    Against,
}

impl ReasonSide {
    /// Stable slug used in element ids.
    pub fn slug(&self) -> &'static str {
        match self {
            ReasonSide::For => "reasons-for",
            ReasonSide::Against => "reasons-against",
        }
    }
}

/// A journaled worry: a title, evidence for and against, and the outcome.
///
/// Both reason lists always hold at least one entry; a fresh worry is seeded
/// with one blank reason on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worry {
    pub id: WorryId,
    #[serde(default)]
    pub title: String,
    #[serde(default = "seeded_reasons")]
    pub reasons_for: Vec<String>,
    #[serde(default = "seeded_reasons")]
    pub reasons_against: Vec<String>,
    #[serde(default)]
    pub feeling: Option<Feeling>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn seeded_reasons() -> Vec<String> {
    vec![String::new()]
}

impl Worry {
    /// A blank worry that has never been persisted.
    pub fn blank(id: impl Into<WorryId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            reasons_for: seeded_reasons(),
            reasons_against: seeded_reasons(),
            feeling: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// True when the title or any reason holds non-whitespace text.
    pub fn has_content(&self) -> bool {
        let filled = |text: &String| !text.trim().is_empty();
        filled(&self.title)
            || self.reasons_for.iter().any(filled)
            || self.reasons_against.iter().any(filled)
    }

    pub fn reasons(&self, side: ReasonSide) -> &[String] {
        match side {
            ReasonSide::For => &self.reasons_for,
            ReasonSide::Against => &self.reasons_against,
        }
    }

    fn reasons_mut(&mut self, side: ReasonSide) -> &mut Vec<String> {
        match side {
            ReasonSide::For => &mut self.reasons_for,
            ReasonSide::Against => &mut self.reasons_against,
        }
    }

    /// Replace the title. Changed evidence makes the feeling stale.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.feeling = None;
    }

    /// Replace one reason's text. Returns false for an index out of range.
    pub fn set_reason(&mut self, side: ReasonSide, index: usize, text: impl Into<String>) -> bool {
        let Some(slot) = self.reasons_mut(side).get_mut(index) else {
            return false;
        };
        *slot = text.into();
        self.feeling = None;
        true
    }

    /// Append a blank reason row.
    pub fn add_reason(&mut self, side: ReasonSide) {
        self.reasons_mut(side).push(String::new());
    }

    /// Remove a reason row, unless it is the last one on its side.
    pub fn remove_reason(&mut self, side: ReasonSide, index: usize) -> bool {
        let reasons = self.reasons_mut(side);
        if reasons.len() <= 1 || index >= reasons.len() {
            return false;
        }
        reasons.remove(index);
        true
    }

    /// Non-blank reasons on one side, in order.
    pub fn filled_reasons(&self, side: ReasonSide) -> impl Iterator<Item = &str> {
        self.reasons(side)
            .iter()
            .map(String::as_str)
            .filter(|r| !r.trim().is_empty())
    }

    /// Restore the never-empty invariant on data that came from outside.
    pub fn normalize(&mut self) {
        if self.reasons_for.is_empty() {
            self.reasons_for = seeded_reasons();
        }
        if self.reasons_against.is_empty() {
            self.reasons_against = seeded_reasons();
        }
    }
}
