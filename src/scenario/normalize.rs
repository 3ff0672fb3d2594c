use std::{collections::HashMap, time::Duration};

use crate::foundation::math::positive_seconds;
use crate::scenario::model::{
    LayoutData, LayoutType, MoveSpeed, ProgressBehavior, Scenario, SnippetAction, SoundData,
    SoundPlayMode, SpecialEffectData, SpecialEffectType, TalkData,
};

/// The uniform instruction stream the interpreter walks.
///
/// Entry 0 is always the synthesized setup entry; snippet `k` is entry `k + 1`.
#[derive(Clone, Debug, Default)]
pub struct NormalizedScenario {
    pub scenario_id: String,
    pub entries: Vec<Entry>,
}

/// One script position: everything a single snippet asks for.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// Source snippet, `None` for the setup entry.
    pub snippet: Option<usize>,
    pub progress: ProgressBehavior,
    pub delay: Duration,
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Talk(TalkAction),
    Layout(LayoutAction),
    Motion(LayoutAction),
    Effect(SpecialEffectData),
    Sound(SoundData),
    /// Instruction this engine does not implement or whose reference is dangling.
    Unknown {
        action: SnippetAction,
        reference: usize,
    },
}

/// Motion/expression request on a character slot, with the slot's costume at that point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostumeMotion {
    pub character2d_id: i32,
    pub costume: String,
    pub motion: String,
    pub expression: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceCue {
    pub character2d_id: i32,
    /// Costume of the speaking slot, when the slot has one.
    pub costume: Option<String>,
    pub voice_id: String,
    pub volume: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TalkAction {
    pub data: TalkData,
    pub motions: Vec<CostumeMotion>,
    pub voices: Vec<VoiceCue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutAction {
    pub data: LayoutData,
    /// Costume the slot wears once this layout applies.
    pub costume: String,
}

impl Action {
    /// Costumes whose models must be resident while this action runs.
    pub fn costumes(&self) -> Vec<&str> {
        match self {
            Action::Talk(talk) => {
                let mut out: Vec<&str> = talk.motions.iter().map(|m| m.costume.as_str()).collect();
                out.extend(talk.voices.iter().filter_map(|v| v.costume.as_deref()));
                out
            }
            Action::Layout(layout) | Action::Motion(layout) if !layout.costume.is_empty() => {
                vec![layout.costume.as_str()]
            }
            _ => Vec::new(),
        }
    }

    /// `(costume, motion, expression)` requests this action makes.
    pub fn motion_requests(&self) -> Vec<(&str, &str, &str)> {
        match self {
            Action::Talk(talk) => talk
                .motions
                .iter()
                .map(|m| (m.costume.as_str(), m.motion.as_str(), m.expression.as_str()))
                .collect(),
            Action::Layout(layout) | Action::Motion(layout) if !layout.costume.is_empty() => {
                vec![(
                    layout.costume.as_str(),
                    layout.data.motion_name.as_str(),
                    layout.data.facial_name.as_str(),
                )]
            }
            _ => Vec::new(),
        }
    }

    fn is_blocking(&self) -> bool {
        match self {
            Action::Talk(_) => true,
            Action::Effect(effect) => matches!(
                effect.effect_type,
                SpecialEffectType::Telop | SpecialEffectType::FullScreenText
            ),
            _ => false,
        }
    }
}

impl Entry {
    /// Entries holding dialogue, a caption or full-screen text end a step.
    pub fn is_blocking(&self) -> bool {
        self.actions.iter().any(Action::is_blocking)
    }

    pub fn costumes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for costume in self.actions.iter().flat_map(Action::costumes) {
            if !out.contains(&costume) {
                out.push(costume);
            }
        }
        out
    }
}

impl NormalizedScenario {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Every costume referenced anywhere, in order of first use.
    pub fn costumes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for costume in self.entries.iter().flat_map(Entry::costumes) {
            if !out.iter().any(|c| c == costume) {
                out.push(costume.to_owned());
            }
        }
        out
    }
}

fn seconds(v: f64) -> Duration {
    positive_seconds(v).unwrap_or_default()
}

struct Normalizer<'a> {
    scenario: &'a Scenario,
    costumes: HashMap<i32, String>,
}

impl<'a> Normalizer<'a> {
    fn new(scenario: &'a Scenario) -> Self {
        let costumes = scenario
            .appear_characters
            .iter()
            .map(|c| (c.character2d_id, c.costume_type.clone()))
            .collect();
        Self { scenario, costumes }
    }

    fn costume_of(&self, character2d_id: i32) -> Option<&str> {
        self.costumes
            .get(&character2d_id)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    fn layout(&mut self, data: &LayoutData) -> LayoutAction {
        if !data.costume_type.is_empty() {
            self.costumes
                .insert(data.character2d_id, data.costume_type.clone());
        }
        LayoutAction {
            data: data.clone(),
            costume: self
                .costume_of(data.character2d_id)
                .unwrap_or_default()
                .to_owned(),
        }
    }

    fn talk(&self, data: &TalkData) -> TalkAction {
        let motions = data
            .motions
            .iter()
            .filter_map(|m| {
                let costume = self.costume_of(m.character2d_id)?;
                Some(CostumeMotion {
                    character2d_id: m.character2d_id,
                    costume: costume.to_owned(),
                    motion: m.motion_name.clone(),
                    expression: m.facial_name.clone(),
                })
            })
            .collect();
        let voices = data
            .voices
            .iter()
            .map(|v| VoiceCue {
                character2d_id: v.character2d_id,
                costume: self.costume_of(v.character2d_id).map(str::to_owned),
                voice_id: v.voice_id.clone(),
                volume: v.volume,
            })
            .collect();
        TalkAction {
            data: data.clone(),
            motions,
            voices,
        }
    }

    fn setup(&mut self) -> Entry {
        let s = self.scenario;
        let mut actions = Vec::new();
        if !s.first_bgm.is_empty() {
            actions.push(Action::Sound(SoundData {
                play_mode: SoundPlayMode::CrossFade,
                bgm: s.first_bgm.clone(),
                volume: 1.0,
                ..SoundData::default()
            }));
        }
        if !s.first_background.is_empty() {
            actions.push(Action::Effect(SpecialEffectData {
                effect_type: SpecialEffectType::ChangeBackground,
                string_val: s.first_background.clone(),
                ..SpecialEffectData::default()
            }));
        }
        for first in &s.first_layout {
            let data = LayoutData {
                layout_type: LayoutType::Appear,
                side_from: first.position_side,
                side_from_offset_x: first.offset_x,
                side_to: first.position_side,
                side_to_offset_x: first.offset_x,
                character2d_id: first.character2d_id,
                costume_type: first.costume_type.clone(),
                motion_name: first.motion_name.clone(),
                facial_name: first.facial_name.clone(),
                move_speed_type: MoveSpeed::Fast,
                ..LayoutData::default()
            };
            let action = self.layout(&data);
            actions.push(Action::Layout(action));
        }
        Entry {
            snippet: None,
            progress: ProgressBehavior::WaitUntilFinished,
            delay: Duration::ZERO,
            actions,
        }
    }

    fn snippet_actions(&mut self, action: SnippetAction, reference: usize) -> Vec<Action> {
        let s = self.scenario;
        let unknown = || vec![Action::Unknown { action, reference }];
        match action {
            SnippetAction::Talk => {
                let Some(data) = s.talk_data.get(reference) else {
                    return unknown();
                };
                let mut out = vec![Action::Talk(self.talk(data))];
                if data.require_play_effect {
                    out.push(match s.special_effect_data.get(data.effect_reference_idx) {
                        Some(effect) => Action::Effect(effect.clone()),
                        None => Action::Unknown {
                            action: SnippetAction::SpecialEffect,
                            reference: data.effect_reference_idx,
                        },
                    });
                }
                if data.require_play_sound {
                    out.push(match s.sound_data.get(data.sound_reference_idx) {
                        Some(sound) => Action::Sound(sound.clone()),
                        None => Action::Unknown {
                            action: SnippetAction::Sound,
                            reference: data.sound_reference_idx,
                        },
                    });
                }
                out
            }
            SnippetAction::CharacterLayout => match s.layout_data.get(reference) {
                Some(data) => vec![Action::Layout(self.layout(data))],
                None => unknown(),
            },
            SnippetAction::CharacterMotion => match s.layout_data.get(reference) {
                Some(data) => vec![Action::Motion(self.layout(data))],
                None => unknown(),
            },
            SnippetAction::SpecialEffect => match s.special_effect_data.get(reference) {
                Some(data) => vec![Action::Effect(data.clone())],
                None => unknown(),
            },
            SnippetAction::Sound => match s.sound_data.get(reference) {
                Some(data) => vec![Action::Sound(data.clone())],
                None => unknown(),
            },
            _ => unknown(),
        }
    }
}

/// Turn a raw script into the entry stream, resolving every slot's costume statically.
pub fn normalize(scenario: &Scenario) -> NormalizedScenario {
    let mut n = Normalizer::new(scenario);
    let mut entries = Vec::with_capacity(scenario.snippets.len() + 1);
    entries.push(n.setup());
    for (k, snippet) in scenario.snippets.iter().enumerate() {
        let actions = n.snippet_actions(snippet.action, snippet.reference_index);
        entries.push(Entry {
            snippet: Some(k),
            progress: snippet.progress_behavior,
            delay: seconds(snippet.delay),
            actions,
        });
    }
    NormalizedScenario {
        scenario_id: scenario.scenario_id.clone(),
        entries,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/normalize.rs"]
mod tests;
