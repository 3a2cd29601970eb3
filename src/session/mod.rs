//! Batched generation runs, progress reporting and the studio facade.

/// Collection generation in bounded batches.
pub mod batch;
/// Progress sinks and cancellation.
pub mod progress;
/// Catalog owner with preview history.
pub mod studio;
