use std::time::Duration;

use super::*;
use crate::scenario::{
    model::{LayoutData, ProgressBehavior},
    normalize::{Action, Entry, LayoutAction},
};

fn script(costumes: &[&[&str]]) -> NormalizedScenario {
    let entries = costumes
        .iter()
        .map(|cs| Entry {
            snippet: None,
            progress: ProgressBehavior::WaitUntilFinished,
            delay: Duration::ZERO,
            actions: cs
                .iter()
                .map(|c| {
                    Action::Layout(LayoutAction {
                        data: LayoutData::default(),
                        costume: (*c).into(),
                    })
                })
                .collect(),
        })
        .collect();
    NormalizedScenario {
        scenario_id: "r".into(),
        entries,
    }
}

#[test]
fn least_recently_referenced_is_evicted() {
    let s = script(&[&["a", "b"], &["c"], &["b"], &["a"], &[]]);
    let q = residency_queue(&s, 2);
    assert_eq!(q[0], vec!["a", "b"]);
    assert_eq!(q[1], vec!["b", "c"]);
    assert_eq!(q[2], vec!["c", "b"]);
    assert_eq!(q[3], vec!["b", "a"]);
    assert_eq!(q[4], vec!["b", "a"]);
}

#[test]
fn bound_holds_and_every_needed_costume_is_resident() {
    let s = script(&[
        &["a"],
        &["b"],
        &["c", "a"],
        &["d"],
        &["d", "b"],
        &["a", "c"],
        &["e"],
    ]);
    let q = residency_queue(&s, 2);
    assert_eq!(q.len(), s.len());
    for (i, snapshot) in q.iter().enumerate() {
        assert!(snapshot.len() <= 2);
        for needed in s.entries[i].costumes() {
            assert!(snapshot.iter().any(|c| c == needed), "entry {i} misses {needed}");
        }
    }
}

#[test]
fn oversubscribed_entry_keeps_latest_references() {
    let s = script(&[&["a", "b", "c"]]);
    let q = residency_queue(&s, 2);
    assert_eq!(q[0], vec!["b", "c"]);
}
