use std::rc::Rc;

use crate::{
    animation::signal::AbortSignal,
    foundation::core::{Point, Rgba8, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore, typewrite},
        node::{DisplayNode, NodeContent},
    },
};

const PANEL_COLOR: Rgba8 = Rgba8::opaque(24, 24, 40).with_alpha(200);
const NAME_COLOR: Rgba8 = Rgba8::opaque(255, 230, 160);

/// Dialogue box: speaker name plus a typewriter-revealed body.
#[derive(Debug)]
pub struct DialogLayer {
    core: LayerCore,
    panel: DisplayNode,
    name: DisplayNode,
    body: DisplayNode,
}

fn text(s: &str, color: Rgba8) -> NodeContent {
    NodeContent::Text {
        text: s.to_owned(),
        visible_chars: s.chars().count(),
        font_size: 0.0,
        color,
        size: Size::ZERO,
    }
}

impl DialogLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "dialog"),
            panel: DisplayNode::with_content(
                "dialog_panel",
                NodeContent::Rect {
                    size: Size::ZERO,
                    color: PANEL_COLOR,
                },
            ),
            name: DisplayNode::with_content("dialog_name", text("", NAME_COLOR)),
            body: DisplayNode::with_content("dialog_body", text("", Rgba8::WHITE)),
        }
    }

    /// Set speaker and body. The body starts fully visible until [`DialogLayer::animate_text`].
    pub fn draw(&self, speaker: &str, body: &str) {
        self.name.set_content(text(speaker, NAME_COLOR));
        self.body.set_content(text(body, Rgba8::WHITE));
        let root = self.core.root();
        if !self.core.is_init() {
            root.remove_children();
            root.add_child(self.panel.clone());
            self.panel.remove_children();
            self.panel.add_child(self.name.clone());
            self.panel.add_child(self.body.clone());
            self.core.set_init(true);
        }
        self.set_style(self.core.ctx.stage_size());
    }

    pub async fn animate_text(&self, signal: &AbortSignal) {
        typewrite(&self.core.ctx, signal, &self.body).await;
    }

    pub fn speaker(&self) -> String {
        match self.name.content() {
            NodeContent::Text { text, .. } => text,
            _ => String::new(),
        }
    }

    /// Currently revealed part of the body.
    pub fn visible_body(&self) -> String {
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

impl Layer for DialogLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        let (w, h) = (size.width, size.height);
        self.panel.set_position(Point::new(w * 0.05, h * 0.70));
        self.panel.update_content(|c| {
            if let NodeContent::Rect { size, .. } = c {
                *size = Size::new(w * 0.9, h * 0.27);
            }
        });
        for (node, y, font, height) in [
            (&self.name, 0.02, 0.035, 0.05),
            (&self.body, 0.08, 0.04, 0.17),
        ] {
            node.set_position(Point::new(w * 0.03, h * y));
            node.update_content(|c| {
                if let NodeContent::Text {
                    font_size, size, ..
                } = c
                {
                    *font_size = h * font;
                    *size = Size::new(w * 0.84, h * height);
                }
            });
        }
    }
}
