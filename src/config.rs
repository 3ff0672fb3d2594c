//! Player settings, loaded from JSON with every field defaulted.

use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{StageError, StageResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub bgm_volume: f64,
    pub se_volume: f64,
    pub voice_volume: f64,
    /// Reveal dialogue character by character.
    pub typewriter: bool,
    pub text_char_delay_ms: u64,
    pub fps: u32,
    pub model_queue_max: usize,
    pub preload_concurrency: usize,
    pub preload_timeout_secs: u64,
    /// Minimum time a character stays visible before a Clear may hide it.
    pub min_dwell_ms: u64,
    /// Steps whose summed delay exceeds this hide the dialog first.
    pub long_delay_hide_dialog_ms: u64,
    pub autoplay: bool,
    pub autoplay_delay_ms: u64,
    pub log_level: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            bgm_volume: 1.0,
            se_volume: 1.0,
            voice_volume: 1.0,
            typewriter: true,
            text_char_delay_ms: 50,
            fps: 60,
            model_queue_max: 2,
            preload_concurrency: 6,
            preload_timeout_secs: 30,
            min_dwell_ms: 2000,
            long_delay_hide_dialog_ms: 1000,
            autoplay: false,
            autoplay_delay_ms: 1500,
            log_level: "info".to_string(),
        }
    }
}

impl PlayerSettings {
    pub fn from_json_file(path: impl AsRef<Path>) -> StageResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .map_err(|e| StageError::serde(format!("settings '{}': {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> StageResult<()> {
        for (name, v) in [
            ("bgm_volume", self.bgm_volume),
            ("se_volume", self.se_volume),
            ("voice_volume", self.voice_volume),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(StageError::validation(format!("{name} must be in 0..=1")));
            }
        }
        if self.fps == 0 {
            return Err(StageError::validation("fps must be > 0"));
        }
        if self.model_queue_max == 0 {
            return Err(StageError::validation("model_queue_max must be > 0"));
        }
        if self.preload_concurrency == 0 {
            return Err(StageError::validation("preload_concurrency must be > 0"));
        }
        Ok(())
    }

    pub fn text_char_delay(&self) -> Duration {
        Duration::from_millis(self.text_char_delay_ms)
    }

    pub fn preload_timeout(&self) -> Duration {
        Duration::from_secs(self.preload_timeout_secs)
    }

    pub fn min_dwell(&self) -> Duration {
        Duration::from_millis(self.min_dwell_ms)
    }

    pub fn long_delay_hide_dialog(&self) -> Duration {
        Duration::from_millis(self.long_delay_hide_dialog_ms)
    }

    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
