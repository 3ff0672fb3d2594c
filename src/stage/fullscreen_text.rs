use std::rc::Rc;

use crate::{
    animation::signal::AbortSignal,
    foundation::core::{Point, Rgba8, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore, typewrite},
        node::{DisplayNode, NodeContent},
    },
};

/// Centered full-stage text over a dimmed backdrop, revealed like dialogue.
#[derive(Debug)]
pub struct FullScreenTextLayer {
    core: LayerCore,
    backdrop: DisplayNode,
    body: DisplayNode,
}

impl FullScreenTextLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "fullscreen_text"),
            backdrop: DisplayNode::with_content(
                "fullscreen_text_backdrop",
                NodeContent::Rect {
                    size: Size::ZERO,
                    color: Rgba8::BLACK.with_alpha(170),
                },
            ),
            body: DisplayNode::new("fullscreen_text_body"),
        }
    }

    pub fn draw(&self, text: &str) {
        self.body.set_content(NodeContent::Text {
            text: text.to_owned(),
            visible_chars: text.chars().count(),
            font_size: 0.0,
            color: Rgba8::WHITE,
            size: Size::ZERO,
        });
        if !self.core.is_init() {
            let root = self.core.root();
            root.remove_children();
            root.add_child(self.backdrop.clone());
            root.add_child(self.body.clone());
            self.core.set_init(true);
        }
        self.set_style(self.core.ctx.stage_size());
    }

    pub async fn animate_text(&self, signal: &AbortSignal) {
        typewrite(&self.core.ctx, signal, &self.body).await;
    }

    pub fn visible_text(&self) -> String {
        match self.body.content() {
            NodeContent::Text {
                text,
                visible_chars,
                ..
            } => text.chars().take(visible_chars).collect(),
            _ => String::new(),
        }
    }
}

impl Layer for FullScreenTextLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        let (w, h) = (size.width, size.height);
        self.backdrop.update_content(|c| {
            if let NodeContent::Rect { size, .. } = c {
                *size = Size::new(w, h);
            }
        });
        self.body.set_position(Point::new(w * 0.15, h * 0.35));
        self.body.update_content(|c| {
            if let NodeContent::Text {
                font_size, size, ..
            } = c
            {
                *font_size = h * 0.045;
                *size = Size::new(w * 0.7, h * 0.3);
            }
        });
    }
}
