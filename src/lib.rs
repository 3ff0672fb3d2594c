//! sekai-stage plays visual-novel story scripts on a retained 2D stage.
//!
//! A story goes through three phases:
//!
//! - Resolve and preload: [`Preloader`] fetches the scenario JSON and every image, sound, and
//!   character model it references into a [`ControllerData`] bundle
//! - Normalize: the raw [`Scenario`] becomes a flat list of timed entries ([`NormalizedScenario`])
//! - Play: [`PlaybackHost`] owns a [`ScenarioController`] and advances it one checkpoint at a time
//!
//! Everything visible lives in a [`DisplayNode`] tree that [`CpuStageRenderer`] can rasterize.
//! Sound goes through the [`SoundMixer`] capability; [`NullMixer`] and [`RecordingMixer`] ship with
//! the crate. See [`guide`] for the full walkthrough.
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod audio;
pub mod config;
pub mod foundation;
pub mod guide;
pub mod model;
pub mod player;
pub mod render;
pub mod scenario;
pub mod stage;

pub use crate::animation::controller::AnimationController;
pub use crate::animation::curve::Curve;
pub use crate::animation::ease::Ease;
pub use crate::animation::signal::{AbortHandle, AbortSignal};
pub use crate::assets::fetch::{
    AssetUrlResolver, Fetcher, FsFetcher, IdentityVoiceLocator, MemoryFetcher, PrefixResolver,
    ScenarioResolver, StoryKey, StoryRef, VoiceLocator,
};
pub use crate::assets::preload::PreloadQueue;
pub use crate::assets::preloader::{ControllerData, MediaRefs, Preloader};
pub use crate::assets::store::{AssetKind, AssetStore, PreparedAsset, PreparedImage, PreparedSound};
pub use crate::audio::mixer::{
    MixerEvent, NullMixer, PlayOptions, PlaybackId, RecordingMixer, SoundChannel, SoundMixer,
};
pub use crate::config::PlayerSettings;
pub use crate::foundation::core::{Affine, Point, Rect, Rgba8, Size, StageSize, Vec2, fit_stage};
pub use crate::foundation::error::{StageError, StageResult};
pub use crate::model::data::{ModelBundle, ModelLibrary};
pub use crate::model::registry::ModelRegistry;
pub use crate::player::controller::ScenarioController;
pub use crate::player::host::{PlaybackHost, PlayerState};
pub use crate::render::{CpuStageRenderer, FrameRGBA};
pub use crate::scenario::model::Scenario;
pub use crate::scenario::normalize::{Action, Entry, NormalizedScenario, normalize};
pub use crate::scenario::step::{StepPlan, plan_all, plan_step};
pub use crate::stage::node::{ColorMatrix, DisplayNode, NodeContent};
