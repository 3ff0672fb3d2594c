//! Playback host: owns at most one controller and serializes every call into it.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::{error, info, instrument};

use crate::{
    assets::{
        fetch::{ScenarioResolver, StoryKey, StoryRef},
        preloader::Preloader,
    },
    audio::mixer::SoundMixer,
    config::PlayerSettings,
    foundation::{
        core::{Size, StageSize, fit_stage},
        error::{StageError, StageResult},
    },
    player::controller::ScenarioController,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing loaded.
    Ready,
    Loading,
    /// Idle at a checkpoint.
    Loaded,
    Playing,
}

#[derive(Debug)]
pub struct PlaybackHost {
    preloader: Preloader,
    mixer: Rc<dyn SoundMixer>,
    settings: PlayerSettings,
    stage: Cell<StageSize>,
    state: Cell<PlayerState>,
    current: Cell<usize>,
    controller: RefCell<Option<Rc<ScenarioController>>>,
}

impl PlaybackHost {
    pub fn new(
        preloader: Preloader,
        mixer: Rc<dyn SoundMixer>,
        settings: PlayerSettings,
        stage: StageSize,
    ) -> Self {
        Self {
            preloader,
            mixer,
            settings,
            stage: Cell::new(stage),
            state: Cell::new(PlayerState::Ready),
            current: Cell::new(0),
            controller: RefCell::new(None),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state.get()
    }

    /// Entry index of the last checkpoint reached.
    pub fn current_step(&self) -> usize {
        self.current.get()
    }

    pub fn stage_size(&self) -> StageSize {
        self.stage.get()
    }

    pub fn controller(&self) -> Option<Rc<ScenarioController>> {
        self.controller.borrow().clone()
    }

    /// Whether the loaded scenario has nothing left to play.
    pub fn is_finished(&self) -> bool {
        self.controller()
            .is_none_or(|c| c.is_finished(self.current.get()))
    }

    /// Preload `story` and build a controller for it, replacing anything already loaded.
    ///
    /// A failed load leaves the host `Ready` so the caller can retry.
    #[instrument(skip(self), fields(scenario = %story.scenario_url))]
    pub async fn load(&self, story: &StoryRef) -> StageResult<()> {
        if self.state.get() == PlayerState::Playing {
            return Err(StageError::validation("cannot load while a step is playing"));
        }
        self.unload();
        self.state.set(PlayerState::Loading);
        match self.preloader.load(story).await {
            Ok(data) => {
                let controller = ScenarioController::new(
                    self.stage.get(),
                    data,
                    self.mixer.clone(),
                    self.settings.clone(),
                );
                *self.controller.borrow_mut() = Some(Rc::new(controller));
                self.current.set(0);
                self.state.set(PlayerState::Loaded);
                info!("scenario loaded");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "scenario failed to load");
                self.state.set(PlayerState::Ready);
                Err(err)
            }
        }
    }

    /// Resolve `key` to a scenario through `resolver`, then [`PlaybackHost::load`] it.
    pub async fn load_story(
        &self,
        resolver: &impl ScenarioResolver,
        key: &StoryKey,
    ) -> StageResult<()> {
        let story = resolver.resolve(key)?;
        self.load(&story).await
    }

    /// Play up to the next checkpoint and return its entry index.
    pub async fn advance(&self) -> StageResult<usize> {
        match self.state.get() {
            PlayerState::Loaded => {}
            PlayerState::Playing => return Err(StageError::validation("a step is already playing")),
            PlayerState::Ready | PlayerState::Loading => {
                return Err(StageError::validation("no scenario loaded"));
            }
        }
        let Some(controller) = self.controller() else {
            return Err(StageError::validation("no scenario loaded"));
        };
        self.state.set(PlayerState::Playing);
        let next = controller.step_until_checkpoint(self.current.get()).await;
        self.current.set(next);
        self.state.set(PlayerState::Loaded);
        Ok(next)
    }

    /// Advance until the scenario ends, pausing `autoplay_delay` between checkpoints and calling
    /// `on_checkpoint` after each one. Returns the final entry index.
    pub async fn play_to_end(&self, mut on_checkpoint: impl FnMut(usize)) -> StageResult<usize> {
        let pause = self.settings.autoplay_delay();
        let mut first = true;
        while !self.is_finished() {
            if !first {
                tokio::time::sleep(pause).await;
            }
            first = false;
            let step = self.advance().await?;
            on_checkpoint(step);
        }
        Ok(self.current.get())
    }

    /// Skip the rest of the in-flight step.
    pub fn abort(&self) {
        if let Some(controller) = self.controller() {
            controller.abort();
        }
    }

    /// Fit the stage into a new viewport and restyle the loaded scenario.
    pub fn resize(&self, viewport: Size) -> StageResult<StageSize> {
        let stage = fit_stage(viewport)?;
        self.stage.set(stage);
        if let Some(controller) = self.controller() {
            controller.set_stage_size(stage);
        }
        Ok(stage)
    }

    pub fn unload(&self) {
        if let Some(controller) = self.controller.borrow_mut().take() {
            controller.unload();
        }
        self.current.set(0);
        self.state.set(PlayerState::Ready);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/host.rs"]
mod tests;
