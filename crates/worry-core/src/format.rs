//! Display helpers for the index: relative ages and title truncation.

use chrono::{DateTime, Utc};

/// Suffix appended to cut titles.
pub const ELLIPSIS: &str = "...";

/// Shown for worries without a title.
pub const UNTITLED: &str = "Untitled worry";

/// Human label for how long ago `then` was.
///
/// Under a minute is "just now"; then whole minutes, hours, and days up to
/// seven days; anything older is shown as a calendar date.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if days > 7 {
        then.format("%b %-d, %Y").to_string()
    } else if days > 0 {
        counted(days, "day")
    } else if hours > 0 {
        counted(hours, "hour")
    } else if minutes > 0 {
        counted(minutes, "minute")
    } else {
        "just now".to_string()
    }
}

fn counted(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Cut `text` to at most `limit` characters, marking the cut.
pub fn truncate_title(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}

/// The index label for a title: truncated, or the untitled placeholder.
pub fn title_label(title: &str, limit: usize) -> String {
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        truncate_title(title, limit)
    }
}
