//! Cooperative cancellation.

use crate::error::{Error, Result, Stage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag checked between pipeline stages and between blocks.
///
/// Cancellation is never observed inside a single block's run extraction,
/// so a cancelled conversion cannot leave a half-built model behind.
/// A token may also carry a deadline; past it, checks fail with
/// [`Error::Timeout`] instead of [`Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that expires `limit` from now.
    pub fn with_deadline(limit: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some((Instant::now() + limit, limit)),
        }
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Check if the deadline, if any, has passed.
    pub fn is_expired(&self) -> bool {
        matches!(self.deadline, Some((at, _)) if Instant::now() >= at)
    }

    /// Fail if cancellation was requested or the deadline has passed.
    pub fn check(&self, stage: Stage) -> Result<()> {
        if self.is_cancelled() {
            log::debug!("Cancellation observed before {} stage", stage);
            return Err(Error::Cancelled(stage));
        }
        if let Some((at, limit)) = self.deadline {
            if Instant::now() >= at {
                log::debug!("Deadline passed before {} stage", stage);
                return Err(Error::Timeout(limit.as_millis()));
            }
        }
        Ok(())
    }
}
