use super::*;
use crate::{
    animation::controller::AnimationController, assets::store::AssetStore,
    config::PlayerSettings,
};

#[test]
fn cover_grows_from_start_side_and_reveal_retreats() {
    assert_eq!(panel_rect(WipeDirection::Left, true, 0.25), (0.0, 0.0, 0.25, 1.0));
    assert_eq!(panel_rect(WipeDirection::Left, false, 0.25), (0.25, 0.0, 0.75, 1.0));
    assert_eq!(panel_rect(WipeDirection::Right, true, 0.25), (0.75, 0.0, 0.25, 1.0));
    assert_eq!(panel_rect(WipeDirection::Top, true, 1.0), (0.0, 0.0, 1.0, 1.0));
    assert_eq!(panel_rect(WipeDirection::Bottom, false, 1.0), (0.0, 0.0, 1.0, 0.0));
    assert_eq!(panel_rect(WipeDirection::Bottom, true, 0.25), (0.0, 0.75, 1.0, 0.25));
}

#[tokio::test(start_paused = true)]
async fn cover_then_reveal_leaves_layer_hidden() {
    let ctx = Rc::new(LayerContext::new(
        Rc::new(AnimationController::new(30)),
        Rc::new(AssetStore::new()),
        Rc::new(PlayerSettings::default()),
        StageSize::default(),
    ));
    let wipe = WipeLayer::new(ctx);
    let signal = AbortSignal::never();
    wipe.wipe(&signal, WipeDirection::Left, true, Duration::from_millis(300))
        .await;
    assert!(wipe.is_covering());
    let NodeContent::Rect { size, .. } = wipe.panel.content() else {
        panic!("panel is a rect");
    };
    assert_eq!(size, StageSize::default().as_size());

    wipe.wipe(&signal, WipeDirection::Left, false, Duration::from_millis(300))
        .await;
    assert!(!wipe.is_covering());
}
