//! Guard against overlapping refresh passes.
//!
//! The cron trigger and the in-process scheduler share one [`RunLock`]. A
//! holder that has been running longer than the stale timeout is assumed to
//! be wedged and may be taken over; its guard then releases nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Holder {
    run_id: u64,
    since: Instant,
}

#[derive(Debug)]
pub struct RunLock {
    holder: Mutex<Option<Holder>>,
    next_run_id: AtomicU64,
    stale_after: Duration,
}

impl RunLock {
    pub fn new(stale_after: Duration) -> Arc<Self> {
        Arc::new(Self {
            holder: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
            stale_after,
        })
    }

    /// Take the lock unless a live pass already holds it.
    pub fn try_acquire(self: &Arc<Self>) -> Option<RunGuard> {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = *holder {
            let held_for = current.since.elapsed();
            if held_for < self.stale_after {
                return None;
            }
            tracing::warn!(
                run_id = current.run_id,
                held_secs = held_for.as_secs(),
                "Taking over stale refresh lock"
            );
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        *holder = Some(Holder {
            run_id,
            since: Instant::now(),
        });

        Some(RunGuard {
            lock: Arc::clone(self),
            run_id,
        })
    }

    /// Whether a pass currently holds the lock (stale holders included).
    pub fn is_held(&self) -> bool {
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Releases the [`RunLock`] on drop.
#[derive(Debug)]
pub struct RunGuard {
    lock: Arc<RunLock>,
    run_id: u64,
}

impl RunGuard {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut holder = self.lock.holder.lock().unwrap_or_else(PoisonError::into_inner);
        // A takeover replaced us; leave the new holder alone.
        if holder.is_some_and(|h| h.run_id == self.run_id) {
            *holder = None;
        }
    }
}
