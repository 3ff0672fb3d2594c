use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn map_range_scales_output() {
    let c = Curve::linear().map_range(10.0, 20.0);
    assert!(close(c.apply(0.0), 10.0));
    assert!(close(c.apply(0.5), 15.0));
    assert!(close(c.apply(1.0), 20.0));
}

#[test]
fn repeat_restarts_each_period() {
    let c = Curve::linear().repeat(4);
    assert!(close(c.apply(0.125), 0.5));
    assert!(close(c.apply(0.25), 0.0));
    assert!(close(c.apply(1.0), 1.0));
}

#[test]
fn bounce_reverses_every_other_half_cycle() {
    let c = Curve::linear().bounce(2);
    assert!(close(c.apply(0.25), 0.5));
    assert!(close(c.apply(0.5), 1.0));
    assert!(close(c.apply(0.75), 0.5));
    assert!(close(c.apply(1.0), 0.0));
}

#[test]
fn offset_wraps_phase() {
    let c = Curve::linear().offset(0.75);
    assert!(close(c.apply(0.0), 0.75));
    assert!(close(c.apply(0.5), 0.25));
}

#[test]
fn ease_remaps_input() {
    let c = Curve::linear().ease(Ease::InQuad);
    assert!(close(c.apply(0.5), 0.25));
}

#[test]
fn shake_stays_within_amplitude_and_settles() {
    let c = Curve::shake(8.0, 6, 0.25);
    for i in 0..=100 {
        let v = c.apply(f64::from(i) / 100.0);
        assert!(v.abs() <= 8.0 + 1e-9);
    }
    assert!(close(c.apply(1.0), 0.0));
}
