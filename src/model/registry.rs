//! Model/Motion registry and character stage: resident character models, their motion and
//! expression tracks, positions, visibility, attached effects and speech.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    animation::{ease::Ease, signal::AbortSignal},
    assets::store::PreparedSound,
    audio::mixer::{PlayOptions, PlaybackId, SoundChannel, SoundMixer},
    foundation::{
        core::{Point, Size, StageSize, Vec2},
        error::{StageError, StageResult},
        math::{lerp, lerp_point},
    },
    model::data::{ModelBundle, ModelLibrary},
    stage::{
        layer::LayerContext,
        node::{DisplayNode, NodeContent},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionKind {
    Motion,
    Expression,
}

const DEFAULT_POSITION: Point = Point::new(0.5, 0.5);

fn model_size(stage: StageSize) -> Size {
    Size::new(stage.height * 0.45, stage.height * 0.9)
}

/// One resident character model.
#[derive(Debug)]
pub struct LiveModel {
    costume: String,
    bundle: Arc<ModelBundle>,
    node: DisplayNode,
    position: Cell<Point>,
    speech: Cell<Option<PlaybackId>>,
    effects: RefCell<Vec<DisplayNode>>,
}

impl LiveModel {
    pub fn costume(&self) -> &str {
        &self.costume
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn node(&self) -> &DisplayNode {
        &self.node
    }

    /// Normalized stage position.
    pub fn position(&self) -> Point {
        self.position.get()
    }

    pub fn motion(&self) -> Option<String> {
        match self.node.content() {
            NodeContent::Model { motion, .. } => motion,
            _ => None,
        }
    }

    pub fn expression(&self) -> Option<String> {
        match self.node.content() {
            NodeContent::Model { expression, .. } => expression,
            _ => None,
        }
    }

    pub fn effects(&self) -> Vec<String> {
        self.effects.borrow().iter().map(DisplayNode::name).collect()
    }

    pub fn is_visible(&self) -> bool {
        self.node.visible() && self.node.alpha() > 0.0
    }

    fn place(&self, p: Point, stage: StageSize) {
        self.position.set(p);
        let size = model_size(stage);
        let anchor = stage.to_pixels(p);
        self.node
            .set_position(anchor - Vec2::new(size.width / 2.0, size.height / 2.0));
    }

    fn set_track(&self, kind: MotionKind, name: &str) {
        self.node.update_content(|c| {
            if let NodeContent::Model {
                motion, expression, ..
            } = c
            {
                let slot = match kind {
                    MotionKind::Motion => motion,
                    MotionKind::Expression => expression,
                };
                *slot = Some(name.to_owned());
            }
        });
    }

    fn set_speaking(&self, on: bool) {
        self.node.update_content(|c| {
            if let NodeContent::Model { speaking, .. } = c {
                *speaking = on;
            }
        });
    }
}

/// Resident models, keyed by costume, drawn under one character-stage node.
#[derive(Debug)]
pub struct ModelRegistry {
    ctx: Rc<LayerContext>,
    mixer: Rc<dyn SoundMixer>,
    library: ModelLibrary,
    root: DisplayNode,
    models: RefCell<Vec<Rc<LiveModel>>>,
    /// Effects requested per costume, reattached when the model is (re)loaded.
    effects: RefCell<HashMap<String, Vec<String>>>,
}

impl ModelRegistry {
    pub fn new(ctx: Rc<LayerContext>, mixer: Rc<dyn SoundMixer>, library: ModelLibrary) -> Self {
        Self {
            ctx,
            mixer,
            library,
            root: DisplayNode::new("live2d"),
            models: RefCell::new(Vec::new()),
            effects: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &DisplayNode {
        &self.root
    }

    pub fn library(&self) -> &ModelLibrary {
        &self.library
    }

    /// Make `costume` resident (hidden, centered). Loading a resident costume returns it as is.
    pub fn load(&self, costume: &str) -> StageResult<Rc<LiveModel>> {
        if let Some(model) = self.find(costume) {
            return Ok(model);
        }
        let bundle = self
            .library
            .get(costume)
            .ok_or_else(|| StageError::asset(format!("model '{costume}' not preloaded")))?;
        let stage = self.ctx.stage_size();
        let node = DisplayNode::with_content(
            format!("model:{costume}"),
            NodeContent::Model {
                costume: costume.to_owned(),
                motion: None,
                expression: None,
                speaking: false,
                size: model_size(stage),
            },
        );
        node.set_alpha(0.0);
        node.set_visible(false);
        let model = Rc::new(LiveModel {
            costume: costume.to_owned(),
            bundle,
            node,
            position: Cell::new(DEFAULT_POSITION),
            speech: Cell::new(None),
            effects: RefCell::new(Vec::new()),
        });
        model.place(DEFAULT_POSITION, stage);

        let pending = self.effects.borrow().get(costume).cloned().unwrap_or_default();
        for name in pending {
            attach_effect(&model, &name);
        }
        self.root.add_child(model.node.clone());
        self.models.borrow_mut().push(model.clone());
        info!(costume, "model loaded");
        Ok(model)
    }

    pub fn find(&self, costume: &str) -> Option<Rc<LiveModel>> {
        self.models
            .borrow()
            .iter()
            .find(|m| m.costume == costume)
            .cloned()
    }

    /// Resident costumes in load order.
    pub fn get_model_list(&self) -> Vec<String> {
        self.models
            .borrow()
            .iter()
            .map(|m| m.costume.clone())
            .collect()
    }

    pub fn destroy(&self, costume: &str) -> bool {
        let removed = {
            let mut models = self.models.borrow_mut();
            let idx = models.iter().position(|m| m.costume == costume);
            idx.map(|i| models.remove(i))
        };
        let Some(model) = removed else {
            return false;
        };
        if let Some(id) = model.speech.take() {
            self.mixer.stop(id);
        }
        self.root.remove_child(&model.node);
        info!(costume, "model destroyed");
        true
    }

    pub fn destroy_all(&self) {
        for costume in self.get_model_list() {
            self.destroy(&costume);
        }
    }

    /// Jump straight to the end pose of a motion and expression, without timed playback.
    pub fn apply_pose(&self, costume: &str, motion: &str, expression: &str) {
        let Some(model) = self.find(costume) else {
            return;
        };
        if !motion.is_empty() {
            model.set_track(MotionKind::Motion, motion);
        }
        if !expression.is_empty() {
            model.set_track(MotionKind::Expression, expression);
        }
    }

    /// Start a motion or expression and resolve once it has played (immediately for loops,
    /// unknown names or models that are not resident).
    pub async fn update_motion(
        &self,
        signal: &AbortSignal,
        kind: MotionKind,
        costume: &str,
        name: &str,
    ) {
        if name.is_empty() {
            return;
        }
        let Some(model) = self.find(costume) else {
            debug!(costume, name, "update_motion on missing model");
            return;
        };
        let wait = match kind {
            MotionKind::Motion => match model.bundle.motions.get(name) {
                Some(clip) if clip.looped => Duration::ZERO,
                Some(clip) => clip.duration,
                None => {
                    warn!(costume, motion = name, "motion not loaded");
                    return;
                }
            },
            MotionKind::Expression => match model.bundle.expressions.get(name) {
                Some(clip) => clip.fade_in,
                None => {
                    warn!(costume, expression = name, "expression not loaded");
                    return;
                }
            },
        };
        model.set_track(kind, name);
        self.ctx.animation.delay(signal, wait).await;
    }

    /// Animate `costume` to `to` (normalized). Starts from `from`, or from where the model is.
    /// Equal endpoints resolve at once without touching the model.
    pub async fn move_model(
        &self,
        signal: &AbortSignal,
        costume: &str,
        from: Option<Point>,
        to: Point,
        time: Duration,
    ) {
        let Some(model) = self.find(costume) else {
            return;
        };
        let start = from.unwrap_or_else(|| model.position());
        if start == to {
            return;
        }
        let ctx = &self.ctx;
        ctx.animation
            .progress_wrapper(
                signal,
                |p| model.place(lerp_point(start, to, Ease::OutQuad.apply(p)), ctx.stage_size()),
                time,
            )
            .await;
    }

    /// Put `costume` at `p` without animating.
    pub fn set_position(&self, costume: &str, p: Point) {
        if let Some(model) = self.find(costume) {
            model.place(p, self.ctx.stage_size());
        }
    }

    pub async fn show_model(&self, signal: &AbortSignal, costume: &str, time: Duration) {
        self.fade_model(signal, costume, 1.0, time).await;
    }

    pub async fn hide_model(&self, signal: &AbortSignal, costume: &str, time: Duration) {
        self.fade_model(signal, costume, 0.0, time).await;
    }

    /// Attached effects are children of the model node, so they fade with it.
    async fn fade_model(&self, signal: &AbortSignal, costume: &str, target: f64, time: Duration) {
        let Some(model) = self.find(costume) else {
            return;
        };
        let node = model.node.clone();
        let from = if node.visible() { node.alpha() } else { 0.0 };
        node.set_visible(true);
        self.ctx
            .animation
            .progress_wrapper(signal, |p| node.set_alpha(lerp(from, target, p)), time)
            .await;
        if target <= 0.0 {
            node.set_visible(false);
        }
    }

    /// Attach a persistent effect to a resident model. No model, or already attached: no-op.
    pub fn add_effect(&self, costume: &str, name: &str) -> bool {
        let Some(model) = self.find(costume) else {
            return false;
        };
        if model.effects().iter().any(|e| e == name) {
            return false;
        }
        attach_effect(&model, name);
        self.effects
            .borrow_mut()
            .entry(costume.to_owned())
            .or_default()
            .push(name.to_owned());
        true
    }

    pub fn remove_effect(&self, costume: &str, name: &str) -> bool {
        let recorded = {
            let mut effects = self.effects.borrow_mut();
            match effects.get_mut(costume) {
                Some(names) => {
                    let before = names.len();
                    names.retain(|n| n != name);
                    before != names.len()
                }
                None => false,
            }
        };
        if let Some(model) = self.find(costume) {
            let mut attached = model.effects.borrow_mut();
            if let Some(i) = attached.iter().position(|n| n.name() == name) {
                let node = attached.remove(i);
                model.node.remove_child(&node);
            }
        }
        recorded
    }

    /// Play a voice line through the model so it can lip-sync. `None` if the model is absent.
    pub fn speak(
        &self,
        costume: &str,
        key: &str,
        sound: &PreparedSound,
        volume: f64,
    ) -> Option<PlaybackId> {
        let model = self.find(costume)?;
        if let Some(prev) = model.speech.take() {
            self.mixer.stop(prev);
        }
        let id = self.mixer.play(
            SoundChannel::Voice,
            key,
            sound,
            PlayOptions {
                volume,
                looped: false,
            },
        );
        model.speech.set(Some(id));
        model.set_speaking(true);
        Some(id)
    }

    /// Resolve once no resident model is speaking.
    pub async fn wait_speech(&self, signal: &AbortSignal) {
        let mixer = &self.mixer;
        let settle = || {
            let mut any = false;
            for model in self.models.borrow().iter() {
                match model.speech.get() {
                    Some(id) if mixer.is_playing(id) => any = true,
                    Some(_) => {
                        model.speech.set(None);
                        model.set_speaking(false);
                    }
                    None => {}
                }
            }
            !any
        };
        self.ctx.animation.wrapper(signal, |_| {}, settle).await;
    }

    pub fn set_style(&self, size: StageSize) {
        for model in self.models.borrow().iter() {
            model.node.update_content(|c| {
                if let NodeContent::Model { size: s, .. } = c {
                    *s = model_size(size);
                }
            });
            for effect in model.effects.borrow().iter() {
                effect.update_content(|c| {
                    if let NodeContent::Effect { size: s, .. } = c {
                        *s = model_size(size);
                    }
                });
            }
            model.place(model.position(), size);
        }
    }
}

fn attach_effect(model: &LiveModel, name: &str) {
    let size = match model.node.content() {
        NodeContent::Model { size, .. } => size,
        _ => Size::ZERO,
    };
    let node = DisplayNode::with_content(
        name,
        NodeContent::Effect {
            name: name.to_owned(),
            started_at: Instant::now(),
            progress: None,
            size,
        },
    );
    model.node.add_child(node.clone());
    model.effects.borrow_mut().push(node);
}

#[cfg(test)]
#[path = "../../tests/unit/model/registry.rs"]
mod tests;
