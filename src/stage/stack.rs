use std::rc::Rc;

use crate::{
    foundation::core::StageSize,
    stage::{
        background::BackgroundLayer,
        dialog::DialogLayer,
        flashback::FlashbackLayer,
        full_color::FullColorLayer,
        fullscreen_text::FullScreenTextLayer,
        layer::{Layer, LayerContext, LayerCore},
        node::{ColorMatrix, DisplayNode},
        scene_effect::SceneEffectLayer,
        sekai::SekaiLayer,
        telop::TelopLayer,
        wipe::WipeLayer,
    },
};

/// Color grade applied to the world (background, characters, scene effects).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmbientColor {
    Normal,
    Evening,
    Night,
}

impl AmbientColor {
    pub fn matrix(self) -> Option<ColorMatrix> {
        match self {
            AmbientColor::Normal => None,
            AmbientColor::Evening => Some(ColorMatrix::diag(1.0, 0.85, 0.75, 1.0)),
            AmbientColor::Night => Some(ColorMatrix::diag(0.6, 0.65, 0.9, 1.0)),
        }
    }
}

/// The fixed set of layers, bottom to top.
///
/// Background, characters, scene effects and the flashback tint live under one `world` node,
/// which carries the ambient color grade and is the target of screen shakes.
#[derive(Debug)]
pub struct LayerStack {
    ctx: Rc<LayerContext>,
    root: DisplayNode,
    pub world: LayerCore,
    pub background: BackgroundLayer,
    pub scene_effect: SceneEffectLayer,
    pub flashback: FlashbackLayer,
    pub telop: TelopLayer,
    pub dialog: DialogLayer,
    pub full_color: FullColorLayer,
    pub wipe: WipeLayer,
    pub fullscreen_text: FullScreenTextLayer,
    pub sekai: SekaiLayer,
}

impl LayerStack {
    /// Assemble the stack around `characters`, the character stage's root node.
    pub fn new(ctx: Rc<LayerContext>, characters: DisplayNode) -> Self {
        let root = DisplayNode::new("stage");
        let world = LayerCore::new(ctx.clone(), "world");
        world.root().set_alpha(1.0);
        world.root().set_visible(true);
        world.set_init(true);

        let stack = Self {
            background: BackgroundLayer::new(ctx.clone()),
            scene_effect: SceneEffectLayer::new(ctx.clone()),
            flashback: FlashbackLayer::new(ctx.clone()),
            telop: TelopLayer::new(ctx.clone()),
            dialog: DialogLayer::new(ctx.clone()),
            full_color: FullColorLayer::new(ctx.clone()),
            wipe: WipeLayer::new(ctx.clone()),
            fullscreen_text: FullScreenTextLayer::new(ctx.clone()),
            sekai: SekaiLayer::new(ctx.clone()),
            ctx,
            root,
            world,
        };

        let w = stack.world.root();
        w.add_child(stack.background.root());
        w.add_child(characters);
        w.add_child(stack.scene_effect.root());
        w.add_child(stack.flashback.root());
        stack.root.add_child(w.clone());
        for layer in [
            stack.telop.root(),
            stack.dialog.root(),
            stack.full_color.root(),
            stack.wipe.root(),
            stack.fullscreen_text.root(),
            stack.sekai.root(),
        ] {
            stack.root.add_child(layer);
        }
        stack
    }

    pub fn root(&self) -> &DisplayNode {
        &self.root
    }

    pub fn layers(&self) -> [&dyn Layer; 9] {
        [
            &self.background,
            &self.scene_effect,
            &self.flashback,
            &self.telop,
            &self.dialog,
            &self.full_color,
            &self.wipe,
            &self.fullscreen_text,
            &self.sekai,
        ]
    }

    pub fn set_ambient(&self, ambient: AmbientColor) {
        self.world.root().set_filter(ambient.matrix());
    }

    /// Restyle every layer for a new viewport. Safe to call at any time.
    pub fn set_style(&self, size: StageSize) {
        self.ctx.set_stage_size(size);
        for layer in self.layers() {
            layer.set_style(size);
        }
    }

    pub fn destroy(&self) {
        self.world.stop_shake();
        for layer in self.layers() {
            layer.destroy();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/stack.rs"]
mod tests;
