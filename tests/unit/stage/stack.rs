use std::time::Duration;

use super::*;
use crate::{
    animation::{controller::AnimationController, signal::AbortSignal},
    assets::{
        decode::solid_image,
        store::{AssetKind, AssetStore, PreparedAsset},
    },
    config::PlayerSettings,
    foundation::core::{Point, Rgba8, Size},
    stage::node::NodeContent,
};

fn stack() -> LayerStack {
    let mut store = AssetStore::new();
    store.insert(
        AssetKind::Background.key("wide"),
        PreparedAsset::Image(solid_image(200, 50, [1, 2, 3, 255])),
    );
    let ctx = Rc::new(LayerContext::new(
        Rc::new(AnimationController::new(60)),
        Rc::new(store),
        Rc::new(PlayerSettings::default()),
        StageSize::default(),
    ));
    LayerStack::new(ctx, DisplayNode::new("live2d"))
}

#[test]
fn world_holds_background_characters_and_effects() {
    let s = stack();
    let names: Vec<String> = s.world.root().children().iter().map(|n| n.name()).collect();
    assert_eq!(names, ["background", "live2d", "scene_effect", "flashback"]);
    let top: Vec<String> = s.root().children().iter().map(|n| n.name()).collect();
    assert_eq!(top.first().map(String::as_str), Some("world"));
    assert_eq!(top.last().map(String::as_str), Some("sekai"));
}

#[test]
fn ambient_presets_set_world_filter() {
    let s = stack();
    s.set_ambient(AmbientColor::Night);
    assert_eq!(
        s.world.root().filter(),
        Some(ColorMatrix::diag(0.6, 0.65, 0.9, 1.0))
    );
    s.set_ambient(AmbientColor::Evening);
    assert_eq!(
        s.world.root().filter().map(|m| m.apply(Rgba8::WHITE)),
        Some(Rgba8::opaque(255, 217, 191))
    );
    s.set_ambient(AmbientColor::Normal);
    assert_eq!(s.world.root().filter(), None);
}

#[test]
fn background_letterboxes_and_restyles() {
    let s = stack();
    assert!(!s.background.draw("missing"));
    assert!(s.background.draw("wide"));
    // 200x50 into 1280x720: width-bound, 1280x320 centered vertically.
    assert_eq!(s.background.current_size(), Some(Size::new(1280.0, 320.0)));
    let image = s.background.root().children()[0].clone();
    assert_eq!(image.position(), Point::new(0.0, 200.0));

    let small = StageSize::new(640.0, 360.0).unwrap();
    s.set_style(small);
    s.set_style(small);
    assert_eq!(s.background.current_size(), Some(Size::new(640.0, 160.0)));
    assert_eq!(image.position(), Point::new(0.0, 100.0));
}

#[tokio::test(start_paused = true)]
async fn dialog_draw_and_typewrite() {
    let s = stack();
    s.dialog.draw("Ichika", "Hello!");
    assert_eq!(s.dialog.speaker(), "Ichika");
    assert_eq!(s.dialog.visible_body(), "Hello!");
    s.dialog.animate_text(&AbortSignal::never()).await;
    assert_eq!(s.dialog.visible_body(), "Hello!");

    s.dialog.draw("Saki", "Hi");
    assert_eq!(s.dialog.core().root().children().len(), 1);
    assert_eq!(s.dialog.speaker(), "Saki");
}

#[tokio::test(start_paused = true)]
async fn scene_effects_play_once_per_name() {
    let s = stack();
    s.scene_effect.play("rain");
    s.scene_effect.play("rain");
    s.scene_effect.play("light");
    assert_eq!(s.scene_effect.active(), vec!["rain", "light"]);
    assert!(s.scene_effect.stop("rain"));
    assert!(!s.scene_effect.stop("rain"));
    assert_eq!(s.scene_effect.active(), vec!["light"]);
}

#[tokio::test(start_paused = true)]
async fn sekai_burst_cleans_up() {
    let s = stack();
    s.sekai
        .play(
            &AbortSignal::never(),
            crate::stage::sekai::SekaiDirection::In,
            true,
            Duration::from_millis(500),
        )
        .await;
    assert!(s.sekai.core().root().children().is_empty());
    assert!(!s.sekai.core().is_shown());
}

#[tokio::test(start_paused = true)]
async fn destroy_clears_layers() {
    let s = stack();
    s.telop.draw("Somewhere");
    s.full_color.draw(Rgba8::WHITE);
    assert_eq!(s.full_color.color(), Some(Rgba8::WHITE));
    s.destroy();
    assert!(s.telop.core().root().children().is_empty());
    assert_eq!(s.full_color.color(), None);
    s.telop.draw("Again");
    assert_eq!(s.telop.text(), "Again");
    if let NodeContent::Rect { .. } = s.full_color.core().root().content() {
        panic!("layer root carries no content");
    }
}
