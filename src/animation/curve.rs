use std::{fmt, rc::Rc};

use crate::{animation::ease::Ease, foundation::math::remap};

/// Time-parameterized numeric function over `t ∈ [0, 1]`.
///
/// Curves are cheap to clone and compose by wrapping: every combinator returns a new curve that
/// remaps either its input (`ease`, `repeat`, `bounce`, `offset`) or its output (`map_range`,
/// `damp`).
#[derive(Clone)]
pub struct Curve(Rc<dyn Fn(f64) -> f64>);

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Curve").field(&Rc::as_ptr(&self.0)).finish()
    }
}

impl Curve {
    pub fn new(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn linear() -> Self {
        Self::new(|t| t)
    }

    pub fn constant(v: f64) -> Self {
        Self::new(move |_| v)
    }

    pub fn from_ease(ease: Ease) -> Self {
        Self::new(move |t| ease.apply(t))
    }

    /// One full sine period: `sin(2πt)`, zero at both ends.
    pub fn sin() -> Self {
        Self::new(|t| (std::f64::consts::TAU * t).sin())
    }

    pub fn apply(&self, t: f64) -> f64 {
        (self.0)(t)
    }

    pub fn ease(self, ease: Ease) -> Self {
        Self::new(move |t| self.apply(ease.apply(t)))
    }

    /// Play the curve `times` times back to back.
    pub fn repeat(self, times: u32) -> Self {
        let n = f64::from(times.max(1));
        Self::new(move |t| {
            if t >= 1.0 {
                return self.apply(1.0);
            }
            self.apply((t.max(0.0) * n).fract())
        })
    }

    /// Play the curve forward then backward, `times` half-cycles in total.
    pub fn bounce(self, times: u32) -> Self {
        let n = times.max(1);
        Self::new(move |t| {
            let u = t.clamp(0.0, 1.0) * f64::from(n);
            let k = (u.floor() as u32).min(n - 1);
            let frac = u - f64::from(k);
            if k % 2 == 0 {
                self.apply(frac)
            } else {
                self.apply(1.0 - frac)
            }
        })
    }

    /// Shift the phase by `dt`, wrapping around `[0, 1)`.
    pub fn offset(self, dt: f64) -> Self {
        Self::new(move |t| self.apply((t + dt).rem_euclid(1.0)))
    }

    /// Remap the output from `[0, 1]` onto `[lo, hi]`.
    pub fn map_range(self, lo: f64, hi: f64) -> Self {
        Self::new(move |t| remap(self.apply(t), 0.0, 1.0, lo, hi))
    }

    /// Scale the output by `1 - t` so the curve settles at zero.
    pub fn damp(self) -> Self {
        Self::new(move |t| self.apply(t) * (1.0 - t.clamp(0.0, 1.0)))
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(move |t| self.apply(t) * k)
    }

    /// Oscillation used for screen and window shakes: `cycles` sine periods of `amplitude`,
    /// decaying to rest.
    pub fn shake(amplitude: f64, cycles: u32, phase: f64) -> Self {
        Self::sin()
            .offset(phase)
            .repeat(cycles)
            .scale(amplitude)
            .damp()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
