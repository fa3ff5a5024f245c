//! Editing rules of a single worry.

use proptest::prelude::*;
use worry_core::{Feeling, ReasonSide, Worry};

#[derive(Debug, Clone)]
enum Edit {
    Add(ReasonSide),
    Remove(ReasonSide, usize),
}

fn side() -> impl Strategy<Value = ReasonSide> {
    prop_oneof![Just(ReasonSide::For), Just(ReasonSide::Against)]
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        side().prop_map(Edit::Add),
        (side(), 0usize..6).prop_map(|(side, index)| Edit::Remove(side, index)),
    ]
}

fn feeling() -> impl Strategy<Value = Feeling> {
    prop_oneof![Just(Feeling::StillReal), Just(Feeling::Resolved)]
}

proptest! {
    #[test]
    fn test_reason_lists_never_empty(edits in prop::collection::vec(edit(), 0..40)) {
        let mut worry = Worry::blank("w1");
        for edit in edits {
            match edit {
                Edit::Add(side) => worry.add_reason(side),
                Edit::Remove(side, index) => {
                    let before = worry.reasons(side).len();
                    let removed = worry.remove_reason(side, index);
                    if before == 1 {
                        prop_assert!(!removed, "removing the last reason must be a no-op");
                    }
                }
            }
            prop_assert!(!worry.reasons_for.is_empty());
            prop_assert!(!worry.reasons_against.is_empty());
        }
    }

    #[test]
    fn test_title_edit_clears_feeling(feeling in feeling(), title in ".{0,30}") {
        let mut worry = Worry::blank("w1");
        worry.feeling = Some(feeling);
        worry.set_title(title);
        prop_assert_eq!(worry.feeling, None);
    }

    #[test]
    fn test_reason_edit_clears_feeling(
        feeling in feeling(),
        side in side(),
        extra in 0usize..3,
        text in ".{0,30}",
    ) {
        let mut worry = Worry::blank("w1");
        for _ in 0..extra {
            worry.add_reason(side);
        }
        worry.feeling = Some(feeling);
        prop_assert!(worry.set_reason(side, extra, text));
        prop_assert_eq!(worry.feeling, None);
    }
}

#[test]
fn test_structural_edits_keep_feeling() {
    let mut worry = Worry::blank("w1");
    worry.feeling = Some(Feeling::Resolved);
    worry.add_reason(ReasonSide::For);
    worry.remove_reason(ReasonSide::For, 1);
    assert_eq!(worry.feeling, Some(Feeling::Resolved));
}
