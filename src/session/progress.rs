use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::core::Progress;

/// Phase of a long-running operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Sampling and rasterizing a collection.
    Generating,
    /// Encoding artifacts and metadata for export.
    Serializing,
    /// Finalizing the archive.
    Assembling,
}

/// One progress notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Phase that produced the event.
    pub stage: Stage,
    /// Raw counters for the phase.
    pub progress: Progress,
    /// Overall operation percentage in `[0, 100]`.
    pub percent: f64,
}

/// Receives progress from generation and export runs.
///
/// Events are delivered on the calling thread, never from worker threads.
pub trait ProgressSink {
    /// Called after each completed unit of reporting (usually a batch).
    fn on_progress(&mut self, event: ProgressEvent);

    /// Called when an operation fails or is cancelled; the indicator should return to idle.
    fn on_reset(&mut self, _stage: Stage) {}
}

/// Sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

/// Adapts a closure into a [`ProgressSink`].
pub struct FnProgress<F>(pub F);

impl<F: FnMut(ProgressEvent)> ProgressSink for FnProgress<F> {
    fn on_progress(&mut self, event: ProgressEvent) {
        (self.0)(event)
    }
}

/// Records every event; useful in tests and for polling UIs.
#[derive(Clone, Debug, Default)]
pub struct VecProgress {
    /// Events in delivery order.
    pub events: Vec<ProgressEvent>,
    /// Number of resets received.
    pub resets: usize,
}

impl VecProgress {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported percentages in delivery order.
    pub fn percents(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.percent).collect()
    }

    /// Latest percentage, or 0 when idle or reset.
    pub fn current(&self) -> f64 {
        self.events.last().map(|e| e.percent).unwrap_or(0.0)
    }
}

impl ProgressSink for VecProgress {
    fn on_progress(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }

    fn on_reset(&mut self, _stage: Stage) {
        self.resets += 1;
        self.events.clear();
    }
}

/// Cooperative cancellation flag checked at batch boundaries.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Runs stop at their next batch boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
