use std::rc::Rc;

use crate::{
    foundation::core::{Point, Rgba8, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

/// Caption banner across the middle of the stage.
#[derive(Debug)]
pub struct TelopLayer {
    core: LayerCore,
    band: DisplayNode,
    caption: DisplayNode,
}

impl TelopLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "telop"),
            band: DisplayNode::with_content(
                "telop_band",
                NodeContent::Rect {
                    size: Size::ZERO,
                    color: Rgba8::BLACK.with_alpha(160),
                },
            ),
            caption: DisplayNode::new("telop_text"),
        }
    }

    pub fn draw(&self, text: &str) {
        self.caption.set_content(NodeContent::Text {
            text: text.to_owned(),
            visible_chars: text.chars().count(),
            font_size: 0.0,
            color: Rgba8::WHITE,
            size: Size::ZERO,
        });
        if !self.core.is_init() {
            let root = self.core.root();
            root.remove_children();
            root.add_child(self.band.clone());
            self.band.remove_children();
            self.band.add_child(self.caption.clone());
            self.core.set_init(true);
        }
        self.set_style(self.core.ctx.stage_size());
    }

    pub fn text(&self) -> String {
        match self.caption.content() {
            NodeContent::Text { text, .. } => text,
            _ => String::new(),
        }
    }
}

impl Layer for TelopLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        let (w, h) = (size.width, size.height);
        self.band.set_position(Point::new(0.0, h * 0.42));
        self.band.update_content(|c| {
            if let NodeContent::Rect { size, .. } = c {
                *size = Size::new(w, h * 0.16);
            }
        });
        self.caption.set_position(Point::new(w * 0.1, h * 0.05));
        self.caption.update_content(|c| {
            if let NodeContent::Text {
                font_size, size, ..
            } = c
            {
                *font_size = h * 0.05;
                *size = Size::new(w * 0.8, h * 0.06);
            }
        });
    }
}
