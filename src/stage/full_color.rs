use std::rc::Rc;

use crate::{
    foundation::core::{Rgba8, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

/// Solid full-stage wash used for black/white fades.
#[derive(Debug)]
pub struct FullColorLayer {
    core: LayerCore,
    fill: DisplayNode,
}

impl FullColorLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "full_color"),
            fill: DisplayNode::with_content(
                "full_color_fill",
                NodeContent::Rect {
                    size: Size::ZERO,
                    color: Rgba8::BLACK,
                },
            ),
        }
    }

    pub fn draw(&self, color: Rgba8) {
        self.fill.update_content(|c| {
            if let NodeContent::Rect { color: current, .. } = c {
                *current = color;
            }
        });
        if !self.core.is_init() {
            self.core.root().add_child(self.fill.clone());
            self.core.set_init(true);
        }
        self.set_style(self.core.ctx.stage_size());
    }

    pub fn color(&self) -> Option<Rgba8> {
        match self.fill.content() {
            NodeContent::Rect { color, .. } if self.core.is_init() => Some(color),
            _ => None,
        }
    }
}

impl Layer for FullColorLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        self.fill.update_content(|c| {
            if let NodeContent::Rect { size: s, .. } = c {
                *s = size.as_size();
            }
        });
    }
}
