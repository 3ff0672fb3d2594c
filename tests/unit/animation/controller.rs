use std::cell::{Cell, RefCell};

use super::*;

#[tokio::test(start_paused = true)]
async fn progress_wrapper_ends_with_exactly_one() {
    let ctl = AnimationController::new(60);
    let signal = ctl.reset_abort();
    let seen = RefCell::new(Vec::new());
    ctl.progress_wrapper(&signal, |p| seen.borrow_mut().push(p), Duration::from_millis(200))
        .await;

    let seen = seen.into_inner();
    assert!(seen.len() > 2);
    assert_eq!(*seen.last().unwrap(), 1.0);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn progress_wrapper_applies_one_on_abort() {
    let ctl = AnimationController::new(60);
    let signal = ctl.reset_abort();
    let last = Cell::new(0.0);
    let anim = ctl.progress_wrapper(&signal, |p| last.set(p), Duration::from_secs(10));
    let abort = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctl.abort();
    };
    let start = Instant::now();
    tokio::join!(anim, abort);
    assert_eq!(last.get(), 1.0);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn progress_wrapper_with_tripped_signal_applies_once() {
    let ctl = AnimationController::new(60);
    let signal = ctl.reset_abort();
    ctl.abort();
    let calls = RefCell::new(Vec::new());
    ctl.progress_wrapper(&signal, |p| calls.borrow_mut().push(p), Duration::from_secs(1))
        .await;
    assert_eq!(calls.into_inner(), vec![1.0]);
}

#[tokio::test(start_paused = true)]
async fn delay_waits_or_resolves_on_abort() {
    let ctl = AnimationController::new(60);
    let signal = ctl.reset_abort();
    let start = Instant::now();
    ctl.delay(&signal, Duration::from_millis(300)).await;
    assert_eq!(start.elapsed(), Duration::from_millis(300));

    let start = Instant::now();
    let wait = ctl.delay(&signal, Duration::from_secs(30));
    let abort = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctl.abort();
    };
    tokio::join!(wait, abort);
    assert_eq!(start.elapsed(), Duration::from_millis(20));
}

#[tokio::test(start_paused = true)]
async fn wrapper_runs_until_finished() {
    let ctl = AnimationController::new(30);
    let signal = ctl.reset_abort();
    let ticks = Cell::new(0u32);
    ctl.wrapper(&signal, |_| ticks.set(ticks.get() + 1), || ticks.get() >= 5)
        .await;
    assert_eq!(ticks.get(), 5);
}

#[tokio::test(start_paused = true)]
async fn reset_abort_gives_a_fresh_signal() {
    let ctl = AnimationController::new(60);
    let first = ctl.reset_abort();
    ctl.abort();
    assert!(first.is_aborted());

    let second = ctl.reset_abort();
    assert!(!second.is_aborted());
    assert!(!ctl.signal().is_aborted());
    assert!(first.is_aborted());
}
