//! # sekai-stage guide
//!
//! A walkthrough of how a story script becomes timed stage changes, sounds, and model motion.
//! If you want copy/paste commands, start with the `sekai-stage` binary (`--help`). If you are
//! extending the engine, start here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Scenario`](crate::Scenario): the raw story JSON (snippets plus typed payload tables)
//! - [`NormalizedScenario`](crate::NormalizedScenario): the flat entry list playback walks
//! - [`StepPlan`](crate::StepPlan): the entries between two checkpoints
//! - [`ControllerData`](crate::ControllerData): a scenario with every referenced asset preloaded
//! - [`ScenarioController`](crate::ScenarioController): runs steps against the stage
//! - [`PlaybackHost`](crate::PlaybackHost): the lifecycle owner (load, advance, resize, unload)
//! - [`DisplayNode`](crate::DisplayNode): the retained tree everything visible lives in
//!
//! ---
//!
//! ## Entries and checkpoints
//!
//! [`normalize`](crate::normalize) turns a scenario into entries. Entry 0 is synthesized from the
//! scenario's first background, first layout, and initial BGM; snippet `k` becomes entry `k + 1`.
//! Each entry keeps its snippet's delay and progress behavior.
//!
//! A checkpoint is an entry that waits for the reader: a talk line, a telop, or full-screen text.
//! [`plan_step`](crate::plan_step) returns the entries from the current position up to and
//! including the next checkpoint. The first call plays the setup entry as well.
//!
//! ---
//!
//! ## Timing within a step
//!
//! Entries run in order. Before entry `i` starts, the controller waits out its delay minus whatever
//! time the previous model load already consumed. An entry marked to wait until finished blocks
//! the next one; the others keep running while later entries start. A step ends when every entry
//! has finished, every bare voice has stopped, and no model is speaking.
//!
//! When the delays in a step add up past `long_delay_hide_dialog`, the dialog box fades out first.
//!
//! ---
//!
//! ## Aborting
//!
//! [`PlaybackHost::abort`](crate::PlaybackHost::abort) fires the current
//! [`AbortSignal`](crate::AbortSignal). Every fade, move, shake, and text reveal listens for it
//! and jumps to its final state, so an aborted step ends in the same place a completed one would.
//! The next step starts with a fresh signal.
//!
//! ---
//!
//! ## Assets and IO
//!
//! Playback never touches the network. [`Preloader`](crate::Preloader) fetches everything up front
//! through three host capabilities:
//!
//! - [`Fetcher`](crate::Fetcher): raw GET of a URL ([`FsFetcher`](crate::FsFetcher),
//!   [`MemoryFetcher`](crate::MemoryFetcher))
//! - [`AssetUrlResolver`](crate::AssetUrlResolver): relative path to URL
//! - [`VoiceLocator`](crate::VoiceLocator): picks the voice file that actually exists
//!
//! Missing media is logged and skipped. Only a missing or malformed scenario fails the load.
//!
//! Character models are fetched as build data, moc, textures, motions, and expressions. Motion
//! catalogs are pruned to what the script plays before the clips are fetched.
//!
//! ---
//!
//! ## Pixels
//!
//! [`CpuStageRenderer`](crate::CpuStageRenderer) walks the display tree with `vello_cpu` and returns
//! a [`FrameRGBA`](crate::FrameRGBA) in premultiplied RGBA8. Text renders as placeholder blocks
//! and models as silhouettes; it exists to make stage state visible in tests and from the CLI.
//!
//! ---
//!
//! ## Driving a story
//!
//! The host is single-threaded (`Rc` state) and runs on a current-thread runtime.
//!
//! ```rust,no_run
//! use std::{rc::Rc, sync::Arc};
//!
//! use sekai_stage::{
//!     CpuStageRenderer, FsFetcher, IdentityVoiceLocator, NullMixer, PlaybackHost, PlayerSettings,
//!     PrefixResolver, Preloader, StageSize, StoryRef,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> sekai_stage::StageResult<()> {
//! let settings = PlayerSettings::default();
//! let preloader = Preloader::new(
//!     Arc::new(FsFetcher::new("assets")),
//!     Arc::new(PrefixResolver::default()),
//!     Arc::new(IdentityVoiceLocator),
//!     &settings,
//! );
//! let host = PlaybackHost::new(
//!     preloader,
//!     Rc::new(NullMixer::default()),
//!     settings,
//!     StageSize::new(1280.0, 720.0)?,
//! );
//!
//! host.load(&StoryRef {
//!     scenario_url: "scenario/event_01_01.json".to_string(),
//!     ..StoryRef::default()
//! })
//! .await?;
//!
//! let mut renderer = CpuStageRenderer::new();
//! while !host.is_finished() {
//!     let step = host.advance().await?;
//!     if let Some(controller) = host.controller() {
//!         let frame = renderer.render(controller.root(), host.stage_size())?;
//!         println!("checkpoint {step}: {}x{}", frame.width, frame.height);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Logging
//!
//! The engine logs through `tracing`. Skipped assets, unsupported effects, and models that are not
//! resident are `warn!`; load failures are `error!`. The binary installs a `tracing-subscriber`
//! formatter driven by `RUST_LOG` or the configured `log_level`.
