//! Tessera is a generative trait-layer compositor.
//!
//! Given categorized trait images with rarity weights and a user-defined draw order, Tessera
//! samples weighted-random trait combinations, avoids duplicates within a bounded retry budget,
//! composites each combination into one image and packages whole collections as zip archives of
//! PNG images plus JSON metadata.
//!
//! # Pipeline overview
//!
//! 1. **Catalog**: [`AssetCatalog`] holds categories of [`Asset`]s and the [`LayerOrderModel`]
//! 2. **Sample**: [`CombinationGenerator`] draws one asset per enabled layer via
//!    [`WeightedSampler`]
//! 3. **Rasterize**: [`Rasterizer`] stacks the picked images bottom to top on a fixed canvas
//! 4. **Batch**: [`BatchCoordinator`] drives the above over `N` items in bounded batches
//! 5. **Export**: [`ArchiveExporter`] writes `images/<id>.png` and `metadata/<id>.json`
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Seedable**: every sampling entry point takes an explicit [`Rng`].
//! - **Premultiplied RGBA8** inside the compositor; PNG output is straight alpha.
//! - **Soft per-item failures**: a broken layer image is logged and skipped, never fatal.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod catalog;
mod export;
mod foundation;
mod generate;
mod render;
mod session;

/// JSON project configuration.
pub mod config;

pub use catalog::asset::{
    Asset, AssetId, DEFAULT_RARITY, HandleTracker, ImageHandle, name_from_file,
};
pub use catalog::catalog::{
    AssetCatalog, IngestReport, RARITY_TIERS, TraitCategory, UNKNOWN_TIER_RARITY, tier_rarity,
};
pub use catalog::layers::{LayerOrderEntry, LayerOrderModel};
pub use catalog::source::SourceFile;
pub use export::archive::{Archive, ArchiveExporter, ExportOpts, next_archive_name};
pub use export::metadata::{
    ArtifactView, Attribute, DEFAULT_DESCRIPTION, IMAGE_EXT, NftMetadata, ViewMetadata,
};
pub use foundation::core::{CanvasSize, Progress};
pub use foundation::error::{TesseraError, TesseraResult};
pub use foundation::rng::{Rng, UniformSource};
pub use generate::combination::{
    CombinationGenerator, CombinationKey, DEFAULT_MAX_RETRIES, TraitCombination, TraitPick,
    generate_one,
};
pub use generate::sampler::WeightedSampler;
pub use render::composite::{PremulRgba8, over, over_in_place};
pub use render::decode::{decode_rgba8, fit_to_canvas_premul};
pub use render::raster::{LayerFailure, PngCompression, RasterImage, RasterReport, Rasterizer};
pub use session::batch::{
    ArtifactId, BatchCoordinator, DEFAULT_BATCH_SIZE, GenerateOpts, GeneratedArtifact,
    GenerationStats,
};
pub use session::progress::{
    CancelToken, FnProgress, NoProgress, ProgressEvent, ProgressSink, Stage, VecProgress,
};
pub use session::studio::Studio;
