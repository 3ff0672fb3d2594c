use std::rc::Rc;

use tokio::time::Instant;
use tracing::debug;

use crate::{
    foundation::core::StageSize,
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

/// Decorative looping animations (particles, light rays, rain) keyed by effect name.
#[derive(Debug)]
pub struct SceneEffectLayer {
    core: LayerCore,
}

impl SceneEffectLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        let core = LayerCore::new(ctx, "scene_effect");
        core.root().set_alpha(1.0);
        core.root().set_visible(true);
        core.set_init(true);
        Self { core }
    }

    /// Start `name`; a name already playing keeps its current phase.
    pub fn play(&self, name: &str) {
        if self.find(name).is_some() {
            return;
        }
        debug!(effect = name, "scene effect start");
        let node = DisplayNode::with_content(
            format!("effect:{name}"),
            NodeContent::Effect {
                name: name.to_owned(),
                started_at: Instant::now(),
                progress: None,
                size: self.core.ctx.stage_size().as_size(),
            },
        );
        self.core.root().add_child(node);
    }

    pub fn stop(&self, name: &str) -> bool {
        match self.find(name) {
            Some(node) => {
                self.core.root().remove_child(&node);
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> Vec<String> {
        self.core
            .root()
            .children()
            .iter()
            .filter_map(|n| match n.content() {
                NodeContent::Effect { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn find(&self, name: &str) -> Option<DisplayNode> {
        self.core
            .root()
            .children()
            .into_iter()
            .find(|node| {
                matches!(node.content(), NodeContent::Effect { name: ref effect, .. } if effect == name)
            })
    }
}

impl Layer for SceneEffectLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        for node in self.core.root().children() {
            node.update_content(|c| {
                if let NodeContent::Effect { size: s, .. } = c {
                    *s = size.as_size();
                }
            });
        }
    }

    fn destroy(&self) {
        self.core.stop_shake();
        self.core.root().remove_children();
    }
}
