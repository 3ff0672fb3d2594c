use std::time::Duration;

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Map `v` from `[from_lo, from_hi]` onto `[to_lo, to_hi]` without clamping.
pub(crate) fn remap(v: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let span = from_hi - from_lo;
    if span == 0.0 {
        return to_lo;
    }
    lerp(to_lo, to_hi, (v - from_lo) / span)
}

/// Positive finite script seconds as a `Duration`, saturating at `Duration::MAX`.
pub(crate) fn positive_seconds(v: f64) -> Option<Duration> {
    if v.is_finite() && v > 0.0 {
        Some(Duration::try_from_secs_f64(v).unwrap_or(Duration::MAX))
    } else {
        None
    }
}

pub(crate) fn lerp_point(a: kurbo::Point, b: kurbo::Point, t: f64) -> kurbo::Point {
    kurbo::Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}
