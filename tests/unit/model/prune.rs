use std::time::Duration;

use super::*;
use crate::scenario::{
    model::{LayoutData, ProgressBehavior},
    normalize::{Action, CostumeMotion, Entry, LayoutAction, TalkAction},
};

fn entry(actions: Vec<Action>) -> Entry {
    Entry {
        snippet: Some(0),
        progress: ProgressBehavior::WaitUntilFinished,
        delay: Duration::ZERO,
        actions,
    }
}

fn layout(costume: &str, motion: &str, facial: &str) -> Action {
    Action::Layout(LayoutAction {
        data: LayoutData {
            motion_name: motion.into(),
            facial_name: facial.into(),
            ..LayoutData::default()
        },
        costume: costume.into(),
    })
}

fn script() -> NormalizedScenario {
    NormalizedScenario {
        scenario_id: "p".into(),
        entries: vec![
            entry(vec![layout("a", "idle", "smile")]),
            entry(vec![Action::Talk(TalkAction {
                data: Default::default(),
                motions: vec![CostumeMotion {
                    character2d_id: 1,
                    costume: "a".into(),
                    motion: "nod".into(),
                    expression: String::new(),
                }],
                voices: Vec::new(),
            })]),
            entry(vec![Action::Motion(LayoutAction {
                data: LayoutData {
                    motion_name: "idle".into(),
                    facial_name: "angry".into(),
                    ..LayoutData::default()
                },
                costume: "b".into(),
            })]),
            entry(vec![layout("a", "idle", "smile")]),
        ],
    }
}

#[test]
fn used_names_are_deduplicated_per_costume() {
    let used = used_motions(&script());
    assert_eq!(used.len(), 2);
    assert_eq!(used["a"].motions, vec!["idle", "nod"]);
    assert_eq!(used["a"].expressions, vec!["smile"]);
    assert_eq!(used["b"].motions, vec!["idle"]);
    assert_eq!(used["b"].expressions, vec!["angry"]);
}

#[test]
fn pruned_catalog_is_exactly_the_used_subset() {
    let catalog = MotionCatalog {
        motions: vec!["idle".into(), "walk".into(), "nod".into()],
        expressions: vec!["smile".into(), "cry".into()],
    };
    let used = used_motions(&script());
    let pruned = prune_catalog("a", &catalog, &used["a"]);
    assert_eq!(pruned.motions, vec!["idle", "nod"]);
    assert_eq!(pruned.expressions, vec!["smile"]);

    // "angry" is used by b but absent from the catalog: dropped, never invented.
    let pruned = prune_catalog("b", &catalog, &used["b"]);
    assert_eq!(pruned.motions, vec!["idle"]);
    assert!(pruned.expressions.is_empty());
}

#[test]
fn pruned_catalog_is_sorted_regardless_of_catalog_order() {
    let catalog = MotionCatalog {
        motions: vec!["w-happy01".into(), "w-idle".into(), "w-cute01".into()],
        expressions: vec!["face_smile".into(), "face_angry".into()],
    };
    let used = MotionCatalog {
        motions: vec!["w-cute01".into(), "w-happy01".into()],
        expressions: vec!["face_angry".into(), "face_smile".into()],
    };
    let pruned = prune_catalog("c", &catalog, &used);
    assert_eq!(pruned.motions, vec!["w-cute01", "w-happy01"]);
    assert_eq!(pruned.expressions, vec!["face_angry", "face_smile"]);
}
