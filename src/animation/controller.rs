use std::{cell::RefCell, time::Duration};

use tokio::time::{Instant, MissedTickBehavior};

use crate::animation::signal::{AbortHandle, AbortSignal};

/// Cooperative per-frame animation scheduler.
///
/// The controller owns the current step's [`AbortHandle`]; every wait it offers takes the signal
/// explicitly so a caller can never accidentally observe a signal from a different step.
#[derive(Debug)]
pub struct AnimationController {
    frame: Duration,
    abort: RefCell<AbortHandle>,
}

impl AnimationController {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        let (handle, _) = AbortHandle::new();
        Self {
            frame: Duration::from_secs(1) / fps,
            abort: RefCell::new(handle),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Signal of the current step.
    pub fn signal(&self) -> AbortSignal {
        self.abort.borrow().signal()
    }

    /// Replace the current (possibly tripped) signal with a fresh one and return it.
    pub fn reset_abort(&self) -> AbortSignal {
        let (handle, signal) = AbortHandle::new();
        *self.abort.borrow_mut() = handle;
        signal
    }

    /// Trip the current step's signal; every in-flight wait resolves at its terminal state.
    pub fn abort(&self) {
        self.abort.borrow().abort();
    }

    /// Drive `step` once per frame until `is_finished` returns true or `signal` trips.
    ///
    /// `step` receives the time elapsed since the previous frame.
    pub async fn wrapper(
        &self,
        signal: &AbortSignal,
        mut step: impl FnMut(Duration),
        mut is_finished: impl FnMut() -> bool,
    ) {
        let mut ticker = tokio::time::interval(self.frame);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let aborted = signal.aborted();
        tokio::pin!(aborted);

        let mut last = Instant::now();
        loop {
            if is_finished() || signal.is_aborted() {
                return;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    step(now - last);
                    last = now;
                }
                _ = &mut aborted => return,
            }
        }
    }

    /// Resolve after `duration`, or immediately once `signal` trips.
    pub async fn delay(&self, signal: &AbortSignal, duration: Duration) {
        if duration.is_zero() || signal.is_aborted() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = signal.aborted() => {}
        }
    }

    /// Call `apply(p)` once per frame with `p` advancing linearly from 0 to 1 over `duration`.
    ///
    /// `apply(1.0)` is always the last call, including on early abort, so targets never stay at a
    /// fractional state.
    pub async fn progress_wrapper(
        &self,
        signal: &AbortSignal,
        mut apply: impl FnMut(f64),
        duration: Duration,
    ) {
        if duration.is_zero() || signal.is_aborted() {
            apply(1.0);
            return;
        }

        let mut ticker = tokio::time::interval(self.frame);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let aborted = signal.aborted();
        tokio::pin!(aborted);

        let start = Instant::now();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let p = (start.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0);
                    if p >= 1.0 {
                        break;
                    }
                    apply(p);
                }
                _ = &mut aborted => break,
            }
        }
        apply(1.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/controller.rs"]
mod tests;
