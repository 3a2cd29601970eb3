//! Collection packaging: per-artifact metadata and the zip archive.

/// Zip assembly with batched PNG encoding.
pub mod archive;
/// Metadata records and UI view projections.
pub mod metadata;
