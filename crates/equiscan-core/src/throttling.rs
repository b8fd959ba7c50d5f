//! Rate limiting for external data sources.
//!
//! Two distinct mechanisms, matching the two ways providers push back:
//!
//! - [`RequestBudget`] bounds request *count* over a quota window and
//!   recommends a delay when the budget is exhausted.
//! - [`PacingGate`] enforces a minimum *spacing* between successive
//!   calls, serializing request timing regardless of how many tasks are
//!   in flight. The fundamentals scraper throttles on spacing, so the
//!   orchestrator routes every fundamentals call through one gate.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Governor-backed quota budget for a provider endpoint.
#[derive(Clone)]
pub struct RequestBudget {
    limiter: Arc<DirectRateLimiter>,
    recommended_delay: Duration,
}

impl RequestBudget {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let quota = quota_from_window(quota_window, quota_limit);
        let recommended_delay = Duration::from_secs_f64(
            (quota_window.as_secs_f64() / f64::from(quota_limit.max(1))).max(0.001),
        );
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            recommended_delay,
        }
    }

    /// Tries to take one unit of budget. On exhaustion returns the
    /// recommended delay before retrying.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            Ok(())
        } else {
            Err(self.recommended_delay)
        }
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}

#[derive(Debug)]
struct PacingInner {
    last_call: Option<Instant>,
}

/// Serializing minimum-spacing gate.
///
/// `pace()` holds an async mutex over the last-call instant and sleeps
/// out the remainder of the spacing window before releasing it, so
/// concurrent callers are strictly serialized in time. Independent of
/// the scan's concurrency semaphore by design: the semaphore bounds how
/// much work is in flight, this gate bounds how often one upstream is
/// hit.
#[derive(Debug, Clone)]
pub struct PacingGate {
    inner: Arc<tokio::sync::Mutex<PacingInner>>,
    min_spacing: Duration,
}

impl PacingGate {
    pub fn new(min_spacing: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(PacingInner { last_call: None })),
            min_spacing,
        }
    }

    /// Gate with the 1-second default spacing of the fundamentals scraper.
    pub fn fundamentals_default() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Gate that never waits, for tests and offline fixtures.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits until at least `min_spacing` has elapsed since the previous
    /// caller was released, then records this call.
    pub async fn pace(&self) {
        if self.min_spacing.is_zero() {
            return;
        }

        let mut inner = self.inner.lock().await;
        if let Some(last) = inner.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_spacing {
                tokio::time::sleep(self.min_spacing - elapsed).await;
            }
        }
        inner.last_call = Some(Instant::now());
    }

    pub const fn min_spacing(&self) -> Duration {
        self.min_spacing
    }
}
