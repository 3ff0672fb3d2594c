use super::*;

#[test]
fn sides_map_to_normalized_stage() {
    assert_eq!(side_position(LayoutSide::Center, 0.0), Some(Point::new(0.5, 0.5)));
    assert_eq!(side_position(LayoutSide::Left, 0.0), Some(Point::new(0.3, 0.5)));
    assert_eq!(side_position(LayoutSide::Right, 0.0), Some(Point::new(0.7, 0.5)));
    assert!(side_position(LayoutSide::LeftEdge, 0.0).unwrap().x < 0.0);
    assert!(side_position(LayoutSide::RightEdge, 0.0).unwrap().x > 1.0);
    assert!(side_position(LayoutSide::BottomEdge, 0.0).unwrap().y > 1.0);
    assert_eq!(side_position(LayoutSide::None, 0.0), None);
    assert_eq!(side_position(LayoutSide::Other(77), 0.0), None);
}

#[test]
fn offsets_are_authored_in_reference_pixels() {
    let p = side_position(LayoutSide::Center, REFERENCE_WIDTH / 10.0).unwrap();
    assert!((p.x - 0.6).abs() < 1e-12);
    let p = side_position(LayoutSide::Center, f64::NAN).unwrap();
    assert_eq!(p.x, 0.5);
}

#[test]
fn speeds() {
    assert_eq!(move_duration(MoveSpeed::Fast), Duration::from_millis(150));
    assert_eq!(move_duration(MoveSpeed::Normal), Duration::from_millis(300));
    assert_eq!(move_duration(MoveSpeed::Slow), Duration::from_millis(600));
    assert_eq!(move_duration(MoveSpeed::Other(9)), Duration::from_millis(300));
}
