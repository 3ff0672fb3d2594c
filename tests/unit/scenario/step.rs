use std::time::Duration;

use super::*;
use crate::scenario::{
    model::{SpecialEffectData, SpecialEffectType, TalkData},
    normalize::{Action, Entry, TalkAction},
};

#[derive(Clone, Copy)]
enum K {
    Talk,
    Fx,
}

fn script(items: &[(K, ProgressBehavior)]) -> NormalizedScenario {
    let mut entries = vec![Entry {
        snippet: None,
        progress: ProgressBehavior::WaitUntilFinished,
        delay: Duration::ZERO,
        actions: Vec::new(),
    }];
    for (i, (kind, progress)) in items.iter().enumerate() {
        let action = match kind {
            K::Talk => Action::Talk(TalkAction {
                data: TalkData::default(),
                motions: Vec::new(),
                voices: Vec::new(),
            }),
            K::Fx => Action::Effect(SpecialEffectData {
                effect_type: SpecialEffectType::ChangeBackground,
                ..SpecialEffectData::default()
            }),
        };
        entries.push(Entry {
            snippet: Some(i),
            progress: *progress,
            delay: Duration::ZERO,
            actions: vec![action],
        });
    }
    NormalizedScenario {
        scenario_id: "t".into(),
        entries,
    }
}

use ProgressBehavior::{Immediate as I, WaitUntilFinished as W};

#[test]
fn opening_step_seeds_setup_and_stops_at_first_line() {
    let s = script(&[(K::Fx, I), (K::Talk, W), (K::Fx, W)]);
    let plan = plan_step(&s, 0, true).unwrap();
    assert_eq!(plan.entries, vec![0, 1, 2]);
    assert_eq!(plan.checkpoint(), 2);
}

#[test]
fn later_steps_do_not_replay_setup() {
    let s = script(&[(K::Talk, W), (K::Talk, W)]);
    assert_eq!(plan_step(&s, 0, true).unwrap().entries, vec![0, 1]);
    assert_eq!(plan_step(&s, 1, false).unwrap().entries, vec![2]);
    assert_eq!(plan_step(&s, 0, false).unwrap().entries, vec![1]);
}

#[test]
fn trailing_immediate_entries_join_the_beat() {
    let s = script(&[(K::Talk, I), (K::Fx, I), (K::Fx, W), (K::Talk, W)]);
    let plan = plan_step(&s, 0, false).unwrap();
    assert_eq!(plan.entries, vec![1, 2, 3]);
    assert_eq!(plan.checkpoint(), 3);
}

#[test]
fn trailing_pull_stops_at_end_of_script() {
    let s = script(&[(K::Talk, I), (K::Fx, I)]);
    let plan = plan_step(&s, 0, false).unwrap();
    assert_eq!(plan.entries, vec![1, 2]);
}

#[test]
fn at_or_past_the_end_plans_nothing() {
    let s = script(&[(K::Talk, W)]);
    assert_eq!(plan_step(&s, 1, false), None);
    assert_eq!(plan_step(&s, 7, false), None);
}

#[test]
fn setup_only_script_opens_with_setup_alone() {
    let s = script(&[]);
    assert_eq!(plan_step(&s, 0, true).unwrap().entries, vec![0]);
    assert_eq!(plan_step(&s, 0, false), None);
}

#[test]
fn checkpoints_never_land_mid_immediate_run() {
    let patterns: [&[(K, ProgressBehavior)]; 4] = [
        &[(K::Fx, I), (K::Talk, I), (K::Fx, I), (K::Talk, W), (K::Fx, I)],
        &[(K::Talk, I), (K::Talk, I), (K::Talk, I)],
        &[(K::Fx, W), (K::Fx, I), (K::Talk, W), (K::Fx, I), (K::Fx, W)],
        &[(K::Talk, W), (K::Fx, I), (K::Fx, I)],
    ];
    for items in patterns {
        let s = script(items);
        let plans = plan_all(&s);
        let mut covered = Vec::new();
        for plan in &plans {
            let cp = plan.checkpoint();
            assert!(
                s.entries[cp].progress != I || cp + 1 == s.len(),
                "checkpoint {cp} is mid-run"
            );
            covered.extend(plan.entries.iter().copied());
        }
        assert_eq!(covered, (0..s.len()).collect::<Vec<_>>());
    }
}
