use std::cell::Cell as StdCell;

use super::*;
use crate::{
    animation::controller::AnimationController,
    assets::store::AssetStore,
    audio::mixer::RecordingMixer,
    config::PlayerSettings,
    model::data::{ExpressionClip, MotionClip},
};

fn bundle(costume: &str) -> ModelBundle {
    let mut b = ModelBundle {
        costume: costume.into(),
        ..ModelBundle::default()
    };
    b.motions.insert(
        "wave".into(),
        MotionClip {
            duration: Duration::from_secs(2),
            looped: false,
        },
    );
    b.motions.insert(
        "idle".into(),
        MotionClip {
            duration: Duration::from_secs(5),
            looped: true,
        },
    );
    b.expressions.insert(
        "smile".into(),
        ExpressionClip {
            fade_in: Duration::from_millis(500),
        },
    );
    b
}

fn registry() -> (ModelRegistry, Rc<RecordingMixer>) {
    let ctx = Rc::new(LayerContext::new(
        Rc::new(AnimationController::new(60)),
        Rc::new(AssetStore::new()),
        Rc::new(PlayerSettings::default()),
        StageSize::default(),
    ));
    let mut lib = ModelLibrary::new();
    lib.insert(bundle("a"));
    lib.insert(bundle("b"));
    let mixer = Rc::new(RecordingMixer::new());
    (ModelRegistry::new(ctx, mixer.clone(), lib), mixer)
}

fn clip() -> PreparedSound {
    PreparedSound {
        url: "v.mp3".into(),
        bytes: Arc::new(Vec::new()),
    }
}

#[test]
fn load_find_list_destroy() {
    let (r, _) = registry();
    assert!(r.load("missing").is_err());
    let a = r.load("a").unwrap();
    assert!(Rc::ptr_eq(&a, &r.load("a").unwrap()));
    r.load("b").unwrap();
    assert_eq!(r.get_model_list(), vec!["a", "b"]);
    assert!(!a.is_visible());
    assert_eq!(a.position(), Point::new(0.5, 0.5));

    assert!(r.destroy("a"));
    assert!(!r.destroy("a"));
    assert!(r.find("a").is_none());
    assert_eq!(r.root().children().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn motion_waits_for_clip_and_expression_for_fade() {
    let (r, _) = registry();
    r.load("a").unwrap();
    let signal = AbortSignal::never();

    let start = Instant::now();
    r.update_motion(&signal, MotionKind::Motion, "a", "wave").await;
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(r.find("a").unwrap().motion().as_deref(), Some("wave"));

    let start = Instant::now();
    r.update_motion(&signal, MotionKind::Motion, "a", "idle").await;
    r.update_motion(&signal, MotionKind::Motion, "a", "unknown").await;
    r.update_motion(&signal, MotionKind::Motion, "ghost", "wave").await;
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(r.find("a").unwrap().motion().as_deref(), Some("idle"));

    // Both tracks run side by side.
    let start = Instant::now();
    futures::join!(
        r.update_motion(&signal, MotionKind::Motion, "a", "wave"),
        r.update_motion(&signal, MotionKind::Expression, "a", "smile"),
    );
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    let a = r.find("a").unwrap();
    assert_eq!(a.expression().as_deref(), Some("smile"));
}

#[tokio::test(start_paused = true)]
async fn move_with_equal_endpoints_is_a_noop() {
    let (r, _) = registry();
    let a = r.load("a").unwrap();
    r.set_position("a", Point::new(0.3, 0.5));
    let before = a.node().position();

    let start = Instant::now();
    r.move_model(
        &AbortSignal::never(),
        "a",
        Some(Point::new(0.7, 0.5)),
        Point::new(0.7, 0.5),
        Duration::from_millis(300),
    )
    .await;
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(a.position(), Point::new(0.3, 0.5));
    assert_eq!(a.node().position(), before);
}

#[tokio::test(start_paused = true)]
async fn move_interpolates_to_target() {
    let (r, _) = registry();
    let a = r.load("a").unwrap();
    let seen = StdCell::new(0usize);
    let signal = AbortSignal::never();
    let mover = r.move_model(
        &signal,
        "a",
        Some(Point::new(-0.2, 0.5)),
        Point::new(0.3, 0.5),
        Duration::from_millis(300),
    );
    let probe = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let x = a.position().x;
        assert!(x > -0.2 && x < 0.3);
        seen.set(1);
    };
    futures::join!(mover, probe);
    assert_eq!(seen.get(), 1);
    assert!((a.position().x - 0.3).abs() < 1e-12);
}

#[tokio::test(start_paused = true)]
async fn show_hide_fade_model_and_effects_together() {
    let (r, _) = registry();
    let a = r.load("a").unwrap();
    assert!(r.add_effect("a", "hologram"));
    let signal = AbortSignal::never();
    r.show_model(&signal, "a", Duration::from_millis(200)).await;
    assert!(a.is_visible());
    assert_eq!(a.node().alpha(), 1.0);
    assert_eq!(a.node().children().len(), 1);
    r.hide_model(&signal, "a", Duration::from_millis(200)).await;
    assert!(!a.is_visible());
}

#[test]
fn effects_noop_without_model_and_reattach_on_reload() {
    let (r, _) = registry();
    assert!(!r.add_effect("a", "hologram"));
    assert!(!r.remove_effect("a", "hologram"));

    r.load("a").unwrap();
    assert!(r.add_effect("a", "hologram"));
    assert!(!r.add_effect("a", "hologram"));
    r.destroy("a");
    let a = r.load("a").unwrap();
    assert_eq!(a.effects(), vec!["hologram"]);

    assert!(r.remove_effect("a", "hologram"));
    assert!(a.effects().is_empty());
    assert!(a.node().children().is_empty());
    r.destroy("a");
    assert!(r.load("a").unwrap().effects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn speech_is_awaited() {
    let (r, mixer) = registry();
    r.load("a").unwrap();
    mixer.set_length("voice:v1", Duration::from_secs(3));
    assert!(r.speak("ghost", "voice:v1", &clip(), 1.0).is_none());
    let id = r.speak("a", "voice:v1", &clip(), 0.8).unwrap();
    assert!(mixer.is_playing(id));

    let start = Instant::now();
    r.wait_speech(&AbortSignal::never()).await;
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_millis(3100));
    assert!(matches!(
        r.find("a").unwrap().node().content(),
        NodeContent::Model { speaking: false, .. }
    ));
}

#[test]
fn set_style_rescales_and_repositions() {
    let (r, _) = registry();
    let a = r.load("a").unwrap();
    r.set_position("a", Point::new(0.5, 0.5));
    let small = StageSize::new(640.0, 360.0).unwrap();
    r.set_style(small);
    let NodeContent::Model { size, .. } = a.node().content() else {
        panic!("model content");
    };
    assert!((size.width - 162.0).abs() < 1e-9 && (size.height - 324.0).abs() < 1e-9);
    let p = a.node().position();
    assert!((p.x - 239.0).abs() < 1e-9 && (p.y - 18.0).abs() < 1e-9);
}
