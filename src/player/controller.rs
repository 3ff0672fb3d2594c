//! Scenario interpreter: walks the normalized entry stream one checkpoint at a time.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
    time::Duration,
};

use futures::{
    FutureExt, StreamExt,
    future::{LocalBoxFuture, join_all},
    stream::FuturesUnordered,
};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::{
    animation::{controller::AnimationController, signal::AbortSignal},
    assets::preloader::ControllerData,
    audio::mixer::{PlaybackId, SoundMixer},
    config::PlayerSettings,
    foundation::core::StageSize,
    model::{registry::ModelRegistry, residency::residency_queue},
    player::characters::CharacterRegistry,
    scenario::{
        model::{ProgressBehavior, Scenario},
        normalize::{Entry, NormalizedScenario},
        step::plan_step,
    },
    stage::{
        layer::{Layer, LayerContext},
        node::DisplayNode,
        stack::LayerStack,
    },
};

pub(super) const DIALOG_FADE: Duration = Duration::from_millis(200);

/// Plays one preloaded scenario against its own layer stack, model stage and sound channels.
///
/// Calls into one controller must be serialized; the host never runs two steps at once.
#[derive(Debug)]
pub struct ScenarioController {
    pub(super) ctx: Rc<LayerContext>,
    pub(super) scenario: Scenario,
    pub(super) script: NormalizedScenario,
    pub(super) stack: LayerStack,
    pub(super) models: ModelRegistry,
    pub(super) characters: CharacterRegistry,
    pub(super) mixer: Rc<dyn SoundMixer>,
    /// Voices played without a resident model, awaited at the end of the step.
    pub(super) voices: RefCell<Vec<PlaybackId>>,
    residency: Vec<Vec<String>>,
    opened: Cell<bool>,
}

impl ScenarioController {
    pub fn new(
        stage: StageSize,
        data: ControllerData,
        mixer: Rc<dyn SoundMixer>,
        settings: PlayerSettings,
    ) -> Self {
        let residency = residency_queue(&data.script, settings.model_queue_max);
        let animation = Rc::new(AnimationController::new(settings.fps));
        let ctx = Rc::new(LayerContext::new(
            animation,
            Rc::new(data.resources),
            Rc::new(settings),
            stage,
        ));
        let models = ModelRegistry::new(ctx.clone(), mixer.clone(), data.models);
        let stack = LayerStack::new(ctx.clone(), models.root().clone());
        stack.set_style(stage);
        info!(
            scenario = %data.script.scenario_id,
            entries = data.script.len(),
            "scenario controller ready"
        );
        Self {
            ctx,
            scenario: data.scenario,
            script: data.script,
            stack,
            models,
            characters: CharacterRegistry::new(),
            mixer,
            voices: RefCell::new(Vec::new()),
            residency,
            opened: Cell::new(false),
        }
    }

    /// Root of the display tree to render.
    pub fn root(&self) -> &DisplayNode {
        self.stack.root()
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn characters(&self) -> &CharacterRegistry {
        &self.characters
    }

    pub fn script(&self) -> &NormalizedScenario {
        &self.script
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.ctx.settings
    }

    pub fn stage_size(&self) -> StageSize {
        self.ctx.stage_size()
    }

    /// Whether stepping from `current` has nothing left to run.
    pub fn is_finished(&self, current: usize) -> bool {
        self.opened.get() && current + 1 >= self.script.len()
    }

    /// Run the next step and return the entry index it stops at.
    ///
    /// At or past the last entry this returns `current` without side effects.
    #[instrument(skip(self), fields(scenario = %self.script.scenario_id))]
    pub async fn step_until_checkpoint(&self, current: usize) -> usize {
        let opening = current == 0 && !self.opened.get();
        let Some(plan) = plan_step(&self.script, current, opening) else {
            debug!(current, "no entries left");
            return current;
        };
        let signal = self.ctx.animation.reset_abort();
        self.opened.set(true);
        debug!(entries = ?plan.entries, "step planned");

        let total_delay: Duration = plan
            .entries
            .iter()
            .filter_map(|&i| self.script.entry(i))
            .fold(Duration::ZERO, |acc, e| acc.saturating_add(e.delay));
        if total_delay > self.ctx.settings.long_delay_hide_dialog() {
            self.stack.dialog.core().hide(&signal, DIALOG_FADE, false).await;
        }

        let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, ()>> = FuturesUnordered::new();
        let mut drift = Duration::ZERO;
        for &index in &plan.entries {
            let Some(entry) = self.script.entry(index) else {
                continue;
            };
            let started = Instant::now();
            self.live2d_load_model(index);
            drift += started.elapsed();

            let wait = entry.delay.saturating_sub(drift);
            drift = drift.saturating_sub(entry.delay);
            drive(&mut in_flight, self.ctx.animation.delay(&signal, wait)).await;

            in_flight.push(self.run_entry(&signal, index, entry).boxed_local());
            if entry.progress == ProgressBehavior::WaitUntilFinished {
                while in_flight.next().await.is_some() {}
            }
        }
        while in_flight.next().await.is_some() {}

        self.wait_voices(&signal).await;
        self.models.wait_speech(&signal).await;

        let checkpoint = plan.checkpoint();
        info!(step = checkpoint, "checkpoint reached");
        checkpoint
    }

    async fn run_entry(&self, signal: &AbortSignal, index: usize, entry: &Entry) {
        debug!(step = index, actions = entry.actions.len(), "entry start");
        join_all(entry.actions.iter().map(|a| self.apply_action(signal, a))).await;
    }

    async fn wait_voices(&self, signal: &AbortSignal) {
        let voices = self.voices.borrow().clone();
        if voices.is_empty() {
            return;
        }
        let mixer = &self.mixer;
        self.ctx
            .animation
            .wrapper(signal, |_| {}, || voices.iter().all(|id| !mixer.is_playing(*id)))
            .await;
        self.voices.borrow_mut().clear();
    }

    /// Bring the resident model set in line with the precomputed queue for `step`: drop models
    /// no longer wanted, then load newly wanted ones one at a time.
    pub fn live2d_load_model(&self, step: usize) {
        let Some(wanted) = self.residency.get(step) else {
            return;
        };
        for costume in self.models.get_model_list() {
            if !wanted.contains(&costume) {
                self.models.destroy(&costume);
            }
        }
        for costume in wanted {
            if self.models.find(costume).is_some() {
                continue;
            }
            if let Err(err) = self.models.load(costume) {
                warn!(costume = %costume, error = %err, "model load failed");
            }
        }
    }

    /// Restyle every layer and model for a new stage size. Callable at any time.
    pub fn set_stage_size(&self, size: StageSize) {
        self.stack.set_style(size);
        self.models.set_style(size);
    }

    /// Cancel the in-flight step; every wait resolves at its terminal state.
    pub fn abort(&self) {
        self.ctx.animation.abort();
    }

    /// Stop all sound and release every layer and model.
    pub fn unload(&self) {
        self.ctx.animation.abort();
        self.mixer.stop_all();
        self.voices.borrow_mut().clear();
        self.models.destroy_all();
        self.stack.destroy();
        self.characters.clear();
        info!(scenario = %self.script.scenario_id, "scenario unloaded");
    }
}

/// Poll `in_flight` alongside `until`, returning when `until` completes.
async fn drive(
    in_flight: &mut FuturesUnordered<LocalBoxFuture<'_, ()>>,
    until: impl Future<Output = ()>,
) {
    tokio::pin!(until);
    loop {
        tokio::select! {
            _ = &mut until => return,
            Some(_) = in_flight.next(), if !in_flight.is_empty() => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/controller.rs"]
mod tests;
