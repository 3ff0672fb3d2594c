use std::rc::Rc;

use crate::{
    foundation::core::{Rgba8, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

const TINT: Rgba8 = Rgba8::opaque(112, 88, 56).with_alpha(96);

/// Translucent sepia tint over the world while a flashback plays.
#[derive(Debug)]
pub struct FlashbackLayer {
    core: LayerCore,
    tint: DisplayNode,
}

impl FlashbackLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "flashback"),
            tint: DisplayNode::with_content(
                "flashback_tint",
                NodeContent::Rect {
                    size: Size::ZERO,
                    color: TINT,
                },
            ),
        }
    }

    pub fn draw(&self) {
        if !self.core.is_init() {
            self.core.root().add_child(self.tint.clone());
            self.core.set_init(true);
        }
        self.set_style(self.core.ctx.stage_size());
    }
}

impl Layer for FlashbackLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        self.tint.update_content(|c| {
            if let NodeContent::Rect { size: s, .. } = c {
                *s = size.as_size();
            }
        });
    }
}
