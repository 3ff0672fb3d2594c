//! Model bundle formats: build metadata, motion catalogs and clip timing.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{assets::store::PreparedImage, foundation::math::positive_seconds};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModelBuildData {
    pub moc3_file_name: String,
    pub texture_names: Vec<String>,
    pub physics_file_name: String,
}

/// Names available in a motion base directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MotionCatalog {
    pub motions: Vec<String>,
    pub expressions: Vec<String>,
}

impl MotionCatalog {
    pub fn has_motion(&self, name: &str) -> bool {
        self.motions.iter().any(|m| m == name)
    }

    pub fn has_expression(&self, name: &str) -> bool {
        self.expressions.iter().any(|e| e == name)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Motion3Json {
    #[serde(default)]
    meta: Motion3Meta,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct Motion3Meta {
    duration: f64,
    #[serde(rename = "Loop")]
    looped: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct Exp3Json {
    fade_in_time: Option<f64>,
}

/// Timing of one motion clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionClip {
    pub duration: Duration,
    pub looped: bool,
}

/// Timing of one expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpressionClip {
    pub fade_in: Duration,
}

const DEFAULT_EXPRESSION_FADE: Duration = Duration::from_secs(1);

fn secs(v: f64) -> Duration {
    positive_seconds(v).unwrap_or_default()
}

impl MotionClip {
    /// Read `Meta.Duration` / `Meta.Loop` from a `.motion3.json` body.
    pub fn from_motion3(bytes: &[u8]) -> serde_json::Result<Self> {
        let json: Motion3Json = serde_json::from_slice(bytes)?;
        Ok(Self {
            duration: secs(json.meta.duration),
            looped: json.meta.looped,
        })
    }
}

impl ExpressionClip {
    /// Read `FadeInTime` from a `.exp3.json` body.
    pub fn from_exp3(bytes: &[u8]) -> serde_json::Result<Self> {
        let json: Exp3Json = serde_json::from_slice(bytes)?;
        Ok(Self {
            fade_in: json.fade_in_time.map_or(DEFAULT_EXPRESSION_FADE, secs),
        })
    }
}

/// Everything loaded for one costume.
#[derive(Clone, Debug, Default)]
pub struct ModelBundle {
    pub costume: String,
    pub build: ModelBuildData,
    pub motion_base: String,
    /// Catalog pruned to the names this scenario uses.
    pub catalog: MotionCatalog,
    pub moc: Arc<Vec<u8>>,
    pub textures: Vec<PreparedImage>,
    pub motions: HashMap<String, MotionClip>,
    pub expressions: HashMap<String, ExpressionClip>,
}

/// Loaded model bundles keyed by costume.
#[derive(Clone, Debug, Default)]
pub struct ModelLibrary {
    bundles: HashMap<String, Arc<ModelBundle>>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bundle: ModelBundle) {
        self.bundles
            .insert(bundle.costume.clone(), Arc::new(bundle));
    }

    pub fn get(&self, costume: &str) -> Option<Arc<ModelBundle>> {
        self.bundles.get(costume).cloned()
    }

    pub fn costumes(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/data.rs"]
mod tests;
