//! Scenario script schema, consumed as-is from the game's JSON export.

use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::error::{StageError, StageResult};

/// Declares an integer-coded enum that keeps unknown codes in an `Other` variant, so a newer
/// script never fails to parse because of a kind this engine does not know yet.
macro_rules! coded_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i32", into = "i32")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Code not known to this engine.
            Other(i32),
        }

        impl From<i32> for $name {
            fn from(code: i32) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Other(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> i32 {
                match v {
                    $($name::$variant => $code,)+
                    $name::Other(code) => code,
                }
            }
        }
    };
}

coded_enum!(
    /// Instruction kind of a snippet.
    SnippetAction {
        #[default]
        None = 0,
        Talk = 1,
        CharacterLayout = 2,
        InputName = 3,
        CharacterMotion = 4,
        Selectable = 5,
        SpecialEffect = 6,
        Sound = 7,
    }
);

coded_enum!(
    /// Whether the interpreter proceeds immediately or waits for the instruction to finish.
    ProgressBehavior {
        Immediate = 0,
        #[default]
        WaitUntilFinished = 1,
    }
);

coded_enum!(
    LayoutType {
        #[default]
        None = 0,
        Motion = 1,
        Appear = 2,
        Clear = 3,
    }
);

coded_enum!(
    /// Character layout position. The `*Edge` sides are off-screen entrance/exit points.
    LayoutSide {
        #[default]
        None = 0,
        Left = 1,
        Center = 2,
        Right = 3,
        LeftEdge = 4,
        RightEdge = 5,
        BottomLeftEdge = 6,
        BottomEdge = 7,
        BottomRightEdge = 8,
    }
);

coded_enum!(
    MoveSpeed {
        Fast = 0,
        #[default]
        Normal = 1,
        Slow = 2,
    }
);

coded_enum!(
    SoundPlayMode {
        #[default]
        CrossFade = 0,
        Stack = 1,
        SpecialSePlay = 2,
        Stop = 3,
    }
);

coded_enum!(
    SpecialEffectType {
        #[default]
        None = 0,
        BlackIn = 1,
        BlackOut = 2,
        WhiteIn = 3,
        WhiteOut = 4,
        ShakeScreen = 5,
        ShakeWindow = 6,
        ChangeBackground = 7,
        Telop = 8,
        FlashbackIn = 9,
        FlashbackOut = 10,
        ChangeCardStill = 11,
        AmbientColorNormal = 12,
        AmbientColorEvening = 13,
        AmbientColorNight = 14,
        PlayScenarioEffect = 15,
        StopScenarioEffect = 16,
        ChangeBackgroundStill = 17,
        PlaceInfo = 18,
        Movie = 19,
        SekaiIn = 20,
        SekaiOut = 21,
        AttachCharacterShader = 22,
        SimpleSelectable = 23,
        FullScreenText = 24,
        StopShakeScreen = 25,
        StopShakeWindow = 26,
        BlackWipeInLeft = 27,
        BlackWipeOutLeft = 28,
        BlackWipeInRight = 29,
        BlackWipeOutRight = 30,
        BlackWipeInTop = 31,
        BlackWipeOutTop = 32,
        BlackWipeInBottom = 33,
        BlackWipeOutBottom = 34,
        FullScreenTextShow = 35,
        FullScreenTextHide = 36,
        SekaiInCenter = 37,
        SekaiOutCenter = 38,
    }
);

/// Accept `0/1` as well as `true/false` for boolean-ish script flags.
fn de_flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// One story script.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Scenario {
    pub scenario_id: String,
    pub appear_characters: Vec<AppearCharacter>,
    pub first_layout: Vec<FirstLayout>,
    pub first_bgm: String,
    pub first_background: String,
    pub snippets: Vec<Snippet>,
    pub talk_data: Vec<TalkData>,
    pub layout_data: Vec<LayoutData>,
    pub special_effect_data: Vec<SpecialEffectData>,
    pub sound_data: Vec<SoundData>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppearCharacter {
    pub character2d_id: i32,
    pub costume_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FirstLayout {
    pub character2d_id: i32,
    pub costume_type: String,
    pub motion_name: String,
    pub facial_name: String,
    pub offset_x: f64,
    pub position_side: LayoutSide,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Snippet {
    pub index: usize,
    pub action: SnippetAction,
    pub progress_behavior: ProgressBehavior,
    pub reference_index: usize,
    /// Seconds to wait before the instruction starts.
    pub delay: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TalkCharacter {
    pub character2d_id: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TalkMotion {
    pub character2d_id: i32,
    pub motion_name: String,
    pub facial_name: String,
    pub timing_sync_value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TalkVoice {
    pub character2d_id: i32,
    pub voice_id: String,
    pub volume: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TalkData {
    pub talk_characters: Vec<TalkCharacter>,
    pub window_display_name: String,
    pub body: String,
    pub talk_tention: i32,
    pub lip_sync: i32,
    pub motion_change_from: i32,
    pub motions: Vec<TalkMotion>,
    pub voices: Vec<TalkVoice>,
    pub speed: f64,
    pub font_size: f64,
    #[serde(deserialize_with = "de_flag")]
    pub when_finish_close_window: bool,
    #[serde(deserialize_with = "de_flag")]
    pub require_play_effect: bool,
    pub effect_reference_idx: usize,
    #[serde(deserialize_with = "de_flag")]
    pub require_play_sound: bool,
    pub sound_reference_idx: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LayoutData {
    #[serde(rename = "Type")]
    pub layout_type: LayoutType,
    pub side_from: LayoutSide,
    pub side_from_offset_x: f64,
    pub side_to: LayoutSide,
    pub side_to_offset_x: f64,
    pub depth_type: i32,
    pub character2d_id: i32,
    pub costume_type: String,
    pub motion_name: String,
    pub facial_name: String,
    pub move_speed_type: MoveSpeed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpecialEffectData {
    pub effect_type: SpecialEffectType,
    pub string_val: String,
    pub string_val_sub: String,
    /// Seconds.
    pub duration: f64,
    pub int_val: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SoundData {
    pub play_mode: SoundPlayMode,
    pub bgm: String,
    pub se: String,
    pub volume: f64,
    pub se_bundle_name: String,
    /// Seconds.
    pub duration: f64,
}

impl Scenario {
    pub fn from_json_slice(bytes: &[u8]) -> StageResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| StageError::serde(format!("scenario: {e}")))
    }

    /// Costume a slot starts the scenario with.
    pub fn initial_costume(&self, character2d_id: i32) -> Option<&str> {
        self.appear_characters
            .iter()
            .find(|c| c.character2d_id == character2d_id)
            .map(|c| c.costume_type.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/model.rs"]
mod tests;
