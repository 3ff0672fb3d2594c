use crate::assets::fetch::StoryRef;

const DEFAULT_SE_BUNDLE: &str = "se_pack00001";

pub fn background_path(name: &str) -> String {
    format!("scenario/background/{name}/{name}.png")
}

pub fn bgm_path(name: &str) -> String {
    format!("sound/scenario/bgm/{name}/{name}.mp3")
}

pub fn se_path(bundle: &str, name: &str) -> String {
    let bundle = if bundle.is_empty() {
        DEFAULT_SE_BUNDLE
    } else {
        bundle
    };
    format!("sound/scenario/se/{bundle}/{name}.mp3")
}

/// Voice path before disambiguation by the voice locator.
pub fn voice_path(story: &StoryRef, scenario_id: &str, voice_id: &str) -> String {
    let prefix = if story.is_card_story { "card_" } else { "" };
    let kind = if story.is_action_set {
        "actionset"
    } else {
        "scenario"
    };
    format!("sound/{prefix}{kind}/voice/{scenario_id}/{voice_id}.mp3")
}

pub fn model_dir(costume: &str) -> String {
    format!("live2d/model/{costume}")
}

pub fn model_build_path(costume: &str) -> String {
    format!("{}/buildmodeldata.json", model_dir(costume))
}

pub fn model_file_path(costume: &str, file: &str) -> String {
    format!("{}/{file}", model_dir(costume))
}

/// Directory that holds a costume's motions.
///
/// Sub-character costumes own their motions; every other costume shares the base of its character.
pub fn motion_base_name(costume: &str) -> String {
    if costume.starts_with("sub_") {
        return costume.to_owned();
    }
    let stripped = costume.strip_prefix("v2_").unwrap_or(costume);
    let head = stripped.split('_').next().unwrap_or(stripped);
    format!("{head}_motion_base")
}

pub fn motion_catalog_path(base: &str) -> String {
    format!("live2d/motion/{base}/BuildMotionData.json")
}

pub fn motion_clip_path(base: &str, name: &str) -> String {
    format!("live2d/motion/{base}/{name}.motion3.json")
}

pub fn expression_path(base: &str, name: &str) -> String {
    format!("live2d/motion/{base}/{name}.exp3.json")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
