use std::{rc::Rc, time::Duration};

use crate::{
    animation::signal::AbortSignal,
    foundation::core::{Point, Rgba8, Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

/// Side the wipe edge starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WipeDirection {
    Left,
    Right,
    Top,
    Bottom,
}

/// Directional black wipe.
#[derive(Debug)]
pub struct WipeLayer {
    core: LayerCore,
    panel: DisplayNode,
}

/// Normalized `(x, y, w, h)` of the black panel at progress `p`.
fn panel_rect(direction: WipeDirection, cover: bool, p: f64) -> (f64, f64, f64, f64) {
    // Covering grows from the starting side; revealing retreats away from it.
    let (start, len) = if cover { (0.0, p) } else { (p, 1.0 - p) };
    match direction {
        WipeDirection::Left => (start, 0.0, len, 1.0),
        WipeDirection::Right => (1.0 - start - len, 0.0, len, 1.0),
        WipeDirection::Top => (0.0, start, 1.0, len),
        WipeDirection::Bottom => (0.0, 1.0 - start - len, 1.0, len),
    }
}

impl WipeLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "wipe"),
            panel: DisplayNode::with_content(
                "wipe_panel",
                NodeContent::Rect {
                    size: Size::ZERO,
                    color: Rgba8::BLACK,
                },
            ),
        }
    }

    /// Cover the stage (`cover`) or reveal it, the edge travelling away from `direction`.
    pub async fn wipe(
        &self,
        signal: &AbortSignal,
        direction: WipeDirection,
        cover: bool,
        time: Duration,
    ) {
        let root = self.core.root();
        if !self.core.is_init() {
            root.add_child(self.panel.clone());
            self.core.set_init(true);
        }
        root.set_alpha(1.0);
        root.set_visible(true);
        let ctx = &self.core.ctx;
        let panel = &self.panel;
        ctx.animation
            .progress_wrapper(
                signal,
                |p| place(panel, ctx.stage_size(), panel_rect(direction, cover, p)),
                time,
            )
            .await;
        if !cover {
            root.set_alpha(0.0);
            root.set_visible(false);
        }
    }

    pub fn is_covering(&self) -> bool {
        self.core.is_shown()
    }
}

fn place(panel: &DisplayNode, stage: StageSize, (x, y, w, h): (f64, f64, f64, f64)) {
    panel.set_position(Point::new(x * stage.width, y * stage.height));
    panel.update_content(|c| {
        if let NodeContent::Rect { size, .. } = c {
            *size = Size::new(w * stage.width, h * stage.height);
        }
    });
}

impl Layer for WipeLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        if self.core.is_shown() {
            place(&self.panel, size, (0.0, 0.0, 1.0, 1.0));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/wipe.rs"]
mod tests;
