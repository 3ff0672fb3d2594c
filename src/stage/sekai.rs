use std::{rc::Rc, time::Duration};

use tokio::time::Instant;

use crate::{
    animation::signal::AbortSignal,
    foundation::core::{Size, StageSize},
    stage::{
        layer::{Layer, LayerContext, LayerCore},
        node::{DisplayNode, NodeContent},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SekaiDirection {
    In,
    Out,
}

/// One-shot "world transition" particle burst.
#[derive(Debug)]
pub struct SekaiLayer {
    core: LayerCore,
}

impl SekaiLayer {
    pub fn new(ctx: Rc<LayerContext>) -> Self {
        Self {
            core: LayerCore::new(ctx, "sekai"),
        }
    }

    pub fn effect_name(direction: SekaiDirection, centered: bool) -> &'static str {
        match (direction, centered) {
            (SekaiDirection::In, false) => "sekai_in",
            (SekaiDirection::Out, false) => "sekai_out",
            (SekaiDirection::In, true) => "sekai_in_center",
            (SekaiDirection::Out, true) => "sekai_out_center",
        }
    }

    /// Play the burst over `time`; the layer is empty and hidden again afterwards.
    pub async fn play(
        &self,
        signal: &AbortSignal,
        direction: SekaiDirection,
        centered: bool,
        time: Duration,
    ) {
        let ctx = &self.core.ctx;
        let name = Self::effect_name(direction, centered);
        let node = DisplayNode::with_content(
            name,
            NodeContent::Effect {
                name: name.to_owned(),
                started_at: Instant::now(),
                progress: Some(0.0),
                size: ctx.stage_size().as_size(),
            },
        );
        let root = self.core.root();
        root.remove_children();
        root.add_child(node.clone());
        root.set_alpha(1.0);
        root.set_visible(true);
        self.core.set_init(true);

        ctx.animation
            .progress_wrapper(
                signal,
                |p| {
                    node.update_content(|c| {
                        if let NodeContent::Effect { progress, .. } = c {
                            *progress = Some(p);
                        }
                    })
                },
                time,
            )
            .await;

        root.remove_children();
        root.set_alpha(0.0);
        root.set_visible(false);
        self.core.set_init(false);
    }
}

impl Layer for SekaiLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn set_style(&self, size: StageSize) {
        let full: Size = size.as_size();
        for node in self.core.root().children() {
            node.update_content(|c| {
                if let NodeContent::Effect { size, .. } = c {
                    *size = full;
                }
            });
        }
    }
}
