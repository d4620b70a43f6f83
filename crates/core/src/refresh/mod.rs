//! Bulk character refresh.
//!
//! A pass walks every tracked character once, in order, pacing calls to the
//! scraped site and isolating per-character failures. See
//! [`orchestrator::run_pass`] for the loop and [`service::AutoRefresh`] for
//! the lock, listing and activity log around it.

pub mod lock;
pub mod orchestrator;
pub mod pacing;
pub mod service;
pub mod summary;

pub use lock::{RunGuard, RunLock};
pub use orchestrator::{run_pass, PassLimits};
pub use pacing::{IntervalPacer, Pacer};
pub use service::{AutoRefresh, PassError, RefreshSettings};
pub use summary::{success_rate, RefreshOutcome, RunSummary, StopReason};
