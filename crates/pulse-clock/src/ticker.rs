//! Periodic tick sources.
//!
//! `IntervalTicker` is the production timer. `ManualTicker` only fires when
//! its handle says so, which is what tests use instead of sleeping.

use crate::clock::ManualClock;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A recurring timer. `tick` resolves once per period and returns the
/// 1-based tick number.
#[allow(async_fn_in_trait)]
pub trait Ticker {
    async fn tick(&mut self) -> u64;

    fn period(&self) -> Duration;
}

/// Fixed-period ticker on top of `tokio::time::interval`.
///
/// The first tick fires one period after creation, and ticks missed while
/// the task was busy are skipped rather than bunched up.
pub struct IntervalTicker {
    interval: Interval,
    period: Duration,
    count: u64,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("Interval ticker every {:?}", period);
        Self {
            interval,
            period,
            count: 0,
        }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> u64 {
        self.interval.tick().await;
        self.count += 1;
        self.count
    }

    fn period(&self) -> Duration {
        self.period
    }
}

/// Ticker released by hand through a [`ManualTickerHandle`].
///
/// Each released tick also advances the attached [`ManualClock`] by one
/// period, so timestamps line up with virtual time.
pub struct ManualTicker {
    permits: Arc<Semaphore>,
    period: Duration,
    clock: Option<ManualClock>,
    count: u64,
}

/// Test-side control for a [`ManualTicker`].
#[derive(Clone)]
pub struct ManualTickerHandle {
    permits: Arc<Semaphore>,
}

impl ManualTicker {
    pub fn new(period: Duration) -> (Self, ManualTickerHandle) {
        let permits = Arc::new(Semaphore::new(0));
        let ticker = Self {
            permits: permits.clone(),
            period,
            clock: None,
            count: 0,
        };
        (ticker, ManualTickerHandle { permits })
    }

    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Non-blocking tick; `None` when nothing has been released.
    pub fn try_tick(&mut self) -> Option<u64> {
        let permit = self.permits.try_acquire().ok()?;
        permit.forget();
        Some(self.fire())
    }

    fn fire(&mut self) -> u64 {
        if let Some(clock) = &self.clock {
            clock.advance(self.period);
        }
        self.count += 1;
        self.count
    }
}

impl Ticker for ManualTicker {
    async fn tick(&mut self) -> u64 {
        match self.permits.acquire().await {
            Ok(permit) => permit.forget(),
            // The semaphore is never closed; park like an idle timer would.
            Err(_) => std::future::pending::<()>().await,
        }
        self.fire()
    }

    fn period(&self) -> Duration {
        self.period
    }
}

impl ManualTickerHandle {
    /// Release `n` ticks.
    pub fn advance(&self, n: usize) {
        self.permits.add_permits(n);
    }

    /// Ticks released but not yet consumed.
    pub fn pending(&self) -> usize {
        self.permits.available_permits()
    }
}
