use super::*;

#[tokio::test(start_paused = true)]
async fn dwell_counts_down_from_appearance() {
    let r = CharacterRegistry::new();
    let min = Duration::from_secs(2);
    assert_eq!(r.remaining_dwell(1, min), Duration::ZERO);

    r.mark_appeared(1);
    assert_eq!(r.remaining_dwell(1, min), min);
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(r.remaining_dwell(1, min), Duration::from_millis(1500));
    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(r.remaining_dwell(1, min), Duration::ZERO);
}

#[test]
fn slots_are_created_on_first_use() {
    let r = CharacterRegistry::new();
    assert!(r.get(3).is_none());
    assert_eq!(r.costume(3), None);
    r.set_costume(3, "c");
    assert_eq!(r.costume(3).as_deref(), Some("c"));
    r.add_animation(3, "hologram");
    r.add_animation(3, "hologram");
    assert_eq!(r.get(3).unwrap().animations, vec!["hologram"]);
    assert_eq!(r.take_animations(3), vec!["hologram"]);
    assert!(r.get(3).unwrap().animations.is_empty());
    r.clear();
    assert!(r.get(3).is_none());
}
