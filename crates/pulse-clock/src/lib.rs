//! pulse-clock: injectable time sources
//!
//! Feed timers go through these traits instead of the wall clock so tests
//! can advance virtual time deterministically.

pub mod clock;
pub mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ticker::{IntervalTicker, ManualTicker, ManualTickerHandle, Ticker};

use std::time::Duration;

/// Default generator cadence.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(4);
