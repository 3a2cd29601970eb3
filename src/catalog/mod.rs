//! Trait catalog: categories of weighted assets and their compositing order.

/// Assets, identifiers and owned image handles.
pub mod asset;
/// Category storage and ingestion.
pub mod catalog;
/// Compositing order of categories.
pub mod layers;
/// Input file model for uploads and directory trees.
pub mod source;
