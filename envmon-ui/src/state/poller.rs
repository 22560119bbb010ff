//! Recurring tasks tied to a view's lifetime

use gloo_timers::callback::Interval;
use leptos::*;
use std::rc::Rc;

/// Readings refresh period unless `envmon_poll_ms` says otherwise
pub const READINGS_POLL_MS: u32 = 60_000;

/// Bounds for an overridden readings period
pub const MIN_POLL_MS: u32 = 1_000;
pub const MAX_POLL_MS: u32 = 3_600_000;

/// Clock refresh period
pub const CLOCK_TICK_MS: u32 = 1_000;

/// Readings period from the stored override, clamped to `MIN_POLL_MS..=MAX_POLL_MS`
pub fn poll_interval(raw: Option<String>) -> u32 {
    raw.and_then(|raw| raw.trim().parse::<u32>().ok())
        .map(|ms| ms.clamp(MIN_POLL_MS, MAX_POLL_MS))
        .unwrap_or(READINGS_POLL_MS)
}

/// Owns at most one running interval.
///
/// `start` replaces any running task; the task also stops when the owning
/// view is cleaned up.
#[derive(Clone, Copy)]
pub struct Poller {
    handle: StoredValue<Option<Interval>>,
    period_ms: u32,
}

impl Poller {
    pub fn new(period_ms: u32) -> Self {
        let handle = store_value(None::<Interval>);

        on_cleanup(move || {
            // Dropping the interval cancels it
            handle.try_update_value(|h| h.take());
        });

        Self { handle, period_ms }
    }

    /// Run `tick` now and then every period
    pub fn start(&self, tick: impl Fn() + 'static) {
        self.stop();

        let tick = Rc::new(tick);
        tick();

        let interval = Interval::new(self.period_ms, move || tick());
        self.handle.set_value(Some(interval));
    }

    pub fn stop(&self) {
        self.handle.try_update_value(|h| h.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period() {
        assert_eq!(poll_interval(None), READINGS_POLL_MS);
        assert_eq!(poll_interval(Some("often".to_string())), READINGS_POLL_MS);
        assert_eq!(poll_interval(Some("-5".to_string())), READINGS_POLL_MS);
    }

    #[test]
    fn test_override_period() {
        assert_eq!(poll_interval(Some("1000".to_string())), 1_000);
        assert_eq!(poll_interval(Some(" 15000 ".to_string())), 15_000);
    }

    #[test]
    fn test_override_is_clamped() {
        assert_eq!(poll_interval(Some("10".to_string())), MIN_POLL_MS);
        assert_eq!(poll_interval(Some("0".to_string())), MIN_POLL_MS);
        assert_eq!(poll_interval(Some("999999999".to_string())), MAX_POLL_MS);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod lifecycle_tests {
    use super::*;
    use gloo_timers::future::TimeoutFuture;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const PERIOD_MS: u32 = 20;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move || handle.set(handle.get() + 1))
    }

    #[wasm_bindgen_test]
    async fn test_start_ticks_now_and_on_period() {
        let runtime = create_runtime();
        let poller = Poller::new(PERIOD_MS);
        let (count, tick) = counter();

        poller.start(tick);
        assert_eq!(count.get(), 1);

        TimeoutFuture::new(PERIOD_MS * 4).await;
        assert!(count.get() >= 3, "ticked {} times", count.get());

        poller.stop();
        runtime.dispose();
    }

    #[wasm_bindgen_test]
    async fn test_stop_halts_ticks() {
        let runtime = create_runtime();
        let poller = Poller::new(PERIOD_MS);
        let (count, tick) = counter();

        poller.start(tick);
        poller.stop();
        let seen = count.get();

        TimeoutFuture::new(PERIOD_MS * 4).await;
        assert_eq!(count.get(), seen);

        runtime.dispose();
    }

    #[wasm_bindgen_test]
    async fn test_restart_replaces_running_task() {
        let runtime = create_runtime();
        let poller = Poller::new(PERIOD_MS);
        let (first, first_tick) = counter();
        let (second, second_tick) = counter();

        poller.start(first_tick);
        poller.start(second_tick);
        let first_seen = first.get();

        TimeoutFuture::new(PERIOD_MS * 4).await;
        assert_eq!(first.get(), first_seen);
        assert!(second.get() >= 2);

        poller.stop();
        runtime.dispose();
    }

    #[wasm_bindgen_test]
    async fn test_cleanup_cancels_task() {
        let runtime = create_runtime();
        let (count, tick) = counter();
        let tick = Rc::new(tick);

        let mount = as_child_of_current_owner(move |_: ()| {
            let tick = tick.clone();
            Poller::new(PERIOD_MS).start(move || tick());
        });
        let ((), disposer) = mount(());
        assert_eq!(count.get(), 1);

        drop(disposer);
        TimeoutFuture::new(PERIOD_MS * 4).await;
        assert_eq!(count.get(), 1);

        runtime.dispose();
    }
}
