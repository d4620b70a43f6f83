//! The refresh loop.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::character::{CharacterRefresher, TrackedCharacter};
use crate::refresh::pacing::Pacer;
use crate::refresh::summary::{RefreshOutcome, RunSummary, StopReason};

/// Message recorded when the refresher reports no update.
pub const NO_UPDATE_MESSAGE: &str = "Refresh returned no update";

/// Bounds on a single pass.
#[derive(Debug, Clone, Default)]
pub struct PassLimits {
    /// Wall-clock point after which no further work is started.
    pub deadline: Option<Instant>,
    /// Cancelled on shutdown.
    pub cancel: CancellationToken,
}

impl PassLimits {
    pub fn with_deadline(deadline: Instant, cancel: CancellationToken) -> Self {
        Self {
            deadline: Some(deadline),
            cancel,
        }
    }

    /// Run `fut` unless the pass is stopped first.
    ///
    /// Stop conditions win ties, so an already expired deadline never lets
    /// new work through.
    async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, StopReason> {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StopReason::Cancelled),
            _ = deadline => Err(StopReason::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

/// Refresh every character once, in order.
///
/// One character's failure (an `Ok(false)`, an error or a panic inside the
/// refresher) is recorded and the loop moves on. When the deadline passes or
/// the pass is cancelled, the in-flight call is recorded as failed and every
/// remaining character is recorded as skipped.
pub async fn run_pass<P>(
    characters: &[TrackedCharacter],
    refresher: &dyn CharacterRefresher,
    pacer: &mut P,
    limits: &PassLimits,
) -> RunSummary
where
    P: Pacer + ?Sized,
{
    if characters.is_empty() {
        return RunSummary::empty();
    }

    let started = Instant::now();
    let mut details = Vec::with_capacity(characters.len());
    let mut stopped: Option<StopReason> = None;

    for character in characters {
        if let Some(reason) = stopped {
            details.push(RefreshOutcome::skipped(character, reason));
            continue;
        }

        if let Err(reason) = limits.guard(pacer.ready()).await {
            tracing::warn!(character_id = character.id, %reason, "Refresh pass stopped");
            stopped = Some(reason);
            details.push(RefreshOutcome::skipped(character, reason));
            continue;
        }

        let call = AssertUnwindSafe(refresher.refresh(character.id, &character.url)).catch_unwind();
        let outcome = match limits.guard(call).await {
            Ok(Ok(Ok(true))) => {
                tracing::debug!(character_id = character.id, "Character refreshed");
                RefreshOutcome::succeeded(character)
            }
            Ok(Ok(Ok(false))) => {
                tracing::warn!(character_id = character.id, "Character refresh returned no update");
                RefreshOutcome::failed(character, NO_UPDATE_MESSAGE)
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!(character_id = character.id, error = %e, "Character refresh failed");
                RefreshOutcome::failed(character, e.to_string())
            }
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(character_id = character.id, panic = %message, "Character refresh panicked");
                RefreshOutcome::failed(character, format!("Refresh panicked: {message}"))
            }
            Err(reason) => {
                tracing::warn!(character_id = character.id, %reason, "Refresh pass stopped mid-call");
                stopped = Some(reason);
                RefreshOutcome::failed(character, reason.to_string())
            }
        };
        details.push(outcome);
    }

    let summary = RunSummary::from_outcomes(
        details,
        started.elapsed(),
        stopped == Some(StopReason::DeadlineExceeded),
    );

    tracing::info!(
        total = summary.total,
        updated = summary.updated,
        errors = summary.errors,
        skipped = summary.skipped,
        elapsed_secs = summary.elapsed_seconds,
        "Refresh pass finished"
    );

    summary
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
