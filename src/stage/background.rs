use std::{cell::Cell, rc::Rc};

use tracing::warn;

use crate::{
    assets::store::AssetKind,
    foundation::core::{Point, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

/// Full-stage background image, aspect preserved and letterboxed.
#[derive(Debug)]
pub struct BackgroundLayer {
    core: LayerCore,
    image: DisplayNode,
    source: Cell<Option<Size>>,
}

impl BackgroundLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "background"),
            image: DisplayNode::new("background_image"),
            source: Cell::new(None),
        }
    }

    /// Replace the background with the preloaded image `name`. Shown immediately.
    pub fn draw(&self, name: &str) -> bool {
        let ctx = &self.core.ctx;
        let Some(image) = ctx.store.image(AssetKind::Background, name) else {
            warn!(background = name, "background not preloaded");
            return false;
        };
        let source = Size::new(f64::from(image.width), f64::from(image.height));
        self.image.set_content(NodeContent::Image {
            image: image.clone(),
            size: source,
        });
        self.source.set(Some(source));

        let root = self.core.root();
        root.remove_children();
        root.add_child(self.image.clone());
        root.set_alpha(1.0);
        root.set_visible(true);
        self.core.set_init(true);
        self.set_style(ctx.stage_size());
        true
    }

    pub fn current_size(&self) -> Option<Size> {
        match self.image.content() {
            NodeContent::Image { size, .. } => Some(size),
            _ => None,
        }
    }
}

impl Layer for BackgroundLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        let Some(source) = self.source.get() else {
            return;
        };
        if source.width <= 0.0 || source.height <= 0.0 {
            return;
        }
        let scale = (size.width / source.width).min(size.height / source.height);
        let fitted = Size::new(source.width * scale, source.height * scale);
        self.image.update_content(|c| {
            if let NodeContent::Image { size, .. } = c {
                *size = fitted;
            }
        });
        self.image.set_position(Point::new(
            (size.width - fitted.width) / 2.0,
            (size.height - fitted.height) / 2.0,
        ));
    }
}
