//! Spacing between consecutive refresh calls.
//!
//! The scraped site tolerates roughly two requests per second from us, so
//! every call start is held at least one interval after the previous start.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Interval, MissedTickBehavior};

/// Default spacing between refresh calls.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Gate awaited before every refresh call in a pass.
#[async_trait]
pub trait Pacer: Send {
    /// Resolve once the next call may start. The first call of a pass is
    /// never delayed.
    async fn ready(&mut self);
}

/// Fixed-interval ticker.
///
/// The underlying [`Interval`] is created on first use so the pacer can be
/// built outside a runtime. A slow call does not cause a burst afterwards:
/// missed ticks are delayed, not replayed.
#[derive(Debug)]
pub struct IntervalPacer {
    spacing: Duration,
    ticker: Option<Interval>,
}

impl IntervalPacer {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            ticker: None,
        }
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn ready(&mut self) {
        // tokio::time::interval panics on a zero period.
        if self.spacing.is_zero() {
            return;
        }
        let spacing = self.spacing;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(spacing);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        ticker.tick().await;
    }
}
