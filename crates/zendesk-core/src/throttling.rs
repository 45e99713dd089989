use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tracing::debug;

use crate::config::ThrottleConfig;
use crate::events::{ClientEvent, EventHandler};

/// Client-side rate limiter that defers requests until budget is available.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<DirectRateLimiter>,
    waiting: Arc<AtomicUsize>,
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

impl Throttle {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let quota = quota_from_window(quota_window, quota_limit);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.window(), config.limit)
    }

    /// Takes one unit of budget without waiting. Returns `false` when the
    /// caller would have to wait.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Waits until one unit of budget is available and takes it.
    pub async fn ready(&self, handler: &dyn EventHandler) {
        if self.try_acquire() {
            return;
        }

        let guard = WaitingGuard::enter(&self.waiting);
        debug!(waiting = guard.position, "throttle budget exhausted, deferring request");
        handler.on_event(&ClientEvent::Throttled {
            waiting: guard.position,
        });

        self.limiter.until_ready().await;
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

/// Holds one slot in the waiter count; released on drop so cancelled waits
/// do not leak.
struct WaitingGuard<'a> {
    counter: &'a AtomicUsize,
    position: usize,
}

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        let position = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Self { counter, position }
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("waiting", &self.waiting_len())
            .finish_non_exhaustive()
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
