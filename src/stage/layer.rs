//! Shared layer machinery: the capability context every layer is built from, and the
//! fade/shake contract common to all of them.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use crate::{
    animation::{
        controller::AnimationController,
        curve::Curve,
        signal::{AbortHandle, AbortSignal},
    },
    assets::store::AssetStore,
    config::PlayerSettings,
    foundation::{
        core::{Point, StageSize, Vec2},
        math::lerp,
    },
    stage::node::{DisplayNode, NodeContent},
};

/// Capabilities injected into every layer and the model registry.
#[derive(Debug)]
pub struct LayerContext {
    pub animation: Rc<AnimationController>,
    pub store: Rc<AssetStore>,
    pub settings: Rc<PlayerSettings>,
    stage: Cell<StageSize>,
}

impl LayerContext {
    pub fn new(
        animation: Rc<AnimationController>,
        store: Rc<AssetStore>,
        settings: Rc<PlayerSettings>,
        stage: StageSize,
    ) -> Self {
        Self {
            animation,
            store,
            settings,
            stage: Cell::new(stage),
        }
    }

    pub fn stage_size(&self) -> StageSize {
        self.stage.get()
    }

    pub fn set_stage_size(&self, size: StageSize) {
        self.stage.set(size);
    }
}

const ALPHA_EPS: f64 = 1e-6;

/// Root node plus the animation state every layer shares.
#[derive(Debug)]
pub struct LayerCore {
    pub ctx: Rc<LayerContext>,
    root: DisplayNode,
    init: Cell<bool>,
    origin: Cell<Point>,
    shake: RefCell<Option<AbortHandle>>,
}

impl LayerCore {
    /// New layer root, hidden until shown.
    pub fn new(ctx: Rc<LayerContext>, name: &str) -> Self {
        let root = DisplayNode::new(name);
        root.set_alpha(0.0);
        root.set_visible(false);
        Self {
            ctx,
            root,
            init: Cell::new(false),
            origin: Cell::new(Point::ZERO),
            shake: RefCell::new(None),
        }
    }

    pub fn root(&self) -> &DisplayNode {
        &self.root
    }

    pub fn is_init(&self) -> bool {
        self.init.get()
    }

    pub fn set_init(&self, init: bool) {
        self.init.set(init);
    }

    pub fn is_shown(&self) -> bool {
        self.root.visible() && self.root.alpha() > ALPHA_EPS
    }

    /// Resting position of the root; shakes return here.
    pub fn set_origin(&self, p: Point) {
        self.origin.set(p);
        if self.shake.borrow().is_none() {
            self.root.set_position(p);
        }
    }

    pub async fn show(&self, signal: &AbortSignal, time: Duration, force: bool) {
        self.fade_to(signal, 1.0, time, force).await;
    }

    pub async fn hide(&self, signal: &AbortSignal, time: Duration, force: bool) {
        self.fade_to(signal, 0.0, time, force).await;
    }

    /// Animate the root alpha to `target`. Already there is a no-op unless `force`, which
    /// starts from the opposite extreme.
    pub async fn fade_to(&self, signal: &AbortSignal, target: f64, time: Duration, force: bool) {
        let current = if self.root.visible() {
            self.root.alpha()
        } else {
            0.0
        };
        if !force && (current - target).abs() < ALPHA_EPS {
            return;
        }
        let from = if force { 1.0 - target } else { current };
        let root = self.root.clone();
        root.set_visible(true);
        self.ctx
            .animation
            .progress_wrapper(signal, |p| root.set_alpha(lerp(from, target, p)), time)
            .await;
        if target <= ALPHA_EPS {
            root.set_visible(false);
        }
    }

    /// Perturb the root position by two independent curves over `time`, then restore it.
    ///
    /// The shake also stops when [`LayerCore::stop_shake`] or [`LayerCore::destroy`] is called.
    pub async fn shake(&self, signal: &AbortSignal, x: Curve, y: Curve, time: Duration) {
        let (handle, child) = signal.child();
        if let Some(prev) = self.shake.replace(Some(handle.clone())) {
            prev.abort();
        }
        let origin = self.origin.get();
        let root = self.root.clone();
        self.ctx
            .animation
            .progress_wrapper(
                &child,
                |p| root.set_position(origin + Vec2::new(x.apply(p), y.apply(p))),
                time,
            )
            .await;
        let mut slot = self.shake.borrow_mut();
        if !slot.as_ref().is_some_and(|h| !h.same(&handle)) {
            *slot = None;
            root.set_position(self.origin.get());
        }
    }

    pub fn stop_shake(&self) {
        if let Some(handle) = self.shake.borrow_mut().take() {
            handle.abort();
        }
        self.root.set_position(self.origin.get());
    }

    pub fn destroy(&self) {
        self.stop_shake();
        self.root.remove_children();
        self.init.set(false);
    }
}

/// Common face of every layer in the stack.
pub trait Layer {
    fn core(&self) -> &LayerCore;

    /// Re-layout existing content for `size`. Idempotent; valid before or after drawing.
    fn set_style(&self, size: StageSize);

    fn root(&self) -> DisplayNode {
        self.core().root().clone()
    }

    fn destroy(&self) {
        self.core().destroy();
    }
}

/// Reveal `node`'s text one character per `text_char_delay`; on abort, or with the
/// typewriter disabled, the full text shows at once.
pub async fn typewrite(ctx: &LayerContext, signal: &AbortSignal, node: &DisplayNode) {
    let total = node.update_content(|c| match c {
        NodeContent::Text {
            text,
            visible_chars,
            ..
        } => {
            *visible_chars = 0;
            text.chars().count()
        }
        _ => 0,
    });
    let per_char = ctx.settings.text_char_delay();
    if ctx.settings.typewriter && !per_char.is_zero() && total > 0 {
        let elapsed = Cell::new(Duration::ZERO);
        let shown = Cell::new(0usize);
        ctx.animation
            .wrapper(
                signal,
                |dt| {
                    elapsed.set(elapsed.get() + dt);
                    let n = ((elapsed.get().as_secs_f64() / per_char.as_secs_f64()) as usize + 1)
                        .min(total);
                    shown.set(n);
                    set_visible_chars(node, n);
                },
                || shown.get() >= total,
            )
            .await;
    }
    set_visible_chars(node, total);
}

fn set_visible_chars(node: &DisplayNode, n: usize) {
    node.update_content(|c| {
        if let NodeContent::Text { visible_chars, .. } = c {
            *visible_chars = n;
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/stage/layer.rs"]
mod tests;
