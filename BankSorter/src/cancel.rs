//! Cooperative cancellation
//!
//! The pipeline checks a [`CancellationToken`] between units of work (per
//! bank, per file). An external tool that is already running is never
//! interrupted; cancellation takes effect once it returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag
///
/// Cloning yields a handle to the same flag, so a front end can keep one
/// clone and hand another to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
