//! Per-process run context passed into every pipeline stage
//!
//! The context owns the tracing dispatcher instead of installing a global
//! subscriber. Code running on worker threads enters it with
//! [`RunContext::in_scope`] so their events reach the same sinks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Dispatch;

#[derive(Clone)]
pub struct RunContext {
    dispatch: Dispatch,
    cancelled: Arc<AtomicBool>,
    workers: usize,
}

impl RunContext {
    pub fn new(dispatch: Dispatch) -> Self {
        RunContext {
            dispatch,
            cancelled: Arc::new(AtomicBool::new(false)),
            workers: default_workers(),
        }
    }

    /// Context whose events go nowhere.
    pub fn silent() -> Self {
        RunContext::new(Dispatch::none())
    }

    /// Bound the extraction worker pool. Zero falls back to the default.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { default_workers() } else { workers };
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `f` with this context's dispatcher as the thread's default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Stop handing out new per-file tasks. Running tasks finish normally.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("workers", &self.workers)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Number of CPU cores, at least 2.
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().max(2))
        .unwrap_or(2)
}
