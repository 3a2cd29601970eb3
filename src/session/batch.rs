use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::catalog::AssetCatalog;
use crate::catalog::layers::LayerOrderModel;
use crate::foundation::core::{CanvasSize, Progress};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::rng::UniformSource;
use crate::generate::combination::{
    CombinationGenerator, DEFAULT_MAX_RETRIES, TraitCombination, generate_one,
};
use crate::render::raster::{RasterImage, RasterReport, Rasterizer};
use crate::session::progress::{CancelToken, ProgressEvent, ProgressSink, Stage};

/// Default number of artifacts per generation batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Identifier of a generated artifact.
///
/// Sequence numbers and preview tokens live in disjoint spaces and render differently, so a
/// preview can never overwrite a numbered artifact in an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactId {
    /// 1-based position within a collection run.
    Sequence(u32),
    /// Token minted for an ad-hoc single preview.
    Preview(uuid::Uuid),
}

impl ArtifactId {
    /// Fresh preview token.
    pub fn new_preview() -> Self {
        Self::Preview(uuid::Uuid::new_v4())
    }

    /// Whether this is a preview token rather than a sequence number.
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(n) => write!(f, "{n}"),
            Self::Preview(token) => write!(f, "preview-{token}"),
        }
    }
}

/// A sampled combination plus its raster.
#[derive(Clone, Debug)]
pub struct GeneratedArtifact {
    /// Sequence number or preview token.
    pub id: ArtifactId,
    /// Picked assets in draw order.
    pub traits: TraitCombination,
    /// `None` when rasterization was disabled for the run.
    pub raster: Option<RasterImage>,
    /// Layers drawn and layers skipped while compositing.
    pub report: RasterReport,
}

impl GeneratedArtifact {
    /// Display name used in metadata, e.g. `NFT #7`.
    pub fn name(&self) -> String {
        format!("NFT #{}", self.id)
    }
}

/// Options for collection generation.
#[derive(Clone, Debug)]
pub struct GenerateOpts {
    /// Output canvas, constant across a run.
    pub canvas: CanvasSize,
    /// Artifacts per batch. Zero is treated as one.
    pub batch_size: usize,
    /// Retry budget per uniqueness-seeking draw.
    pub max_retries: usize,
    /// Rasterize each batch on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count for the pool; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Yield the calling thread between batches.
    pub yield_between_batches: bool,
    /// Produce rasters. When false only trait combinations are sampled.
    pub render: bool,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            parallel: true,
            threads: None,
            yield_between_batches: true,
            render: true,
        }
    }
}

/// Summary of a collection run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Items asked for.
    pub requested: usize,
    /// Items produced; equals `requested` on success.
    pub generated: usize,
    /// Draws that exhausted the retry budget and were emitted as duplicates.
    pub duplicates: usize,
    /// Layers skipped because their image failed to load or draw.
    pub failed_layers: usize,
    /// Batches completed.
    pub batches: usize,
}

/// Drives sampling and rasterization over a whole collection in bounded batches.
#[derive(Debug)]
pub struct BatchCoordinator<'a> {
    catalog: &'a AssetCatalog,
    layers: &'a LayerOrderModel,
    opts: GenerateOpts,
}

impl<'a> BatchCoordinator<'a> {
    /// Coordinator reading `catalog` with the draw order in `layers`.
    pub fn new(
        catalog: &'a AssetCatalog,
        layers: &'a LayerOrderModel,
        opts: GenerateOpts,
    ) -> TesseraResult<Self> {
        if let Some(0) = opts.threads {
            return Err(TesseraError::validation(
                "generation 'threads' must be >= 1 when set",
            ));
        }
        Ok(Self {
            catalog,
            layers,
            opts,
        })
    }

    /// Options this coordinator runs with.
    pub fn opts(&self) -> &GenerateOpts {
        &self.opts
    }

    /// Generate `count` artifacts numbered `1..=count`.
    ///
    /// Uniqueness is tracked across the whole run. Progress is reported after every batch as
    /// the share of completed artifacts, and the final report is always exactly 100. The cancel
    /// token is checked before each batch; on cancellation the sink is reset and
    /// [`TesseraError::Cancelled`] is returned.
    #[tracing::instrument(skip(self, rng, sink, cancel), fields(batch_size = self.opts.batch_size))]
    pub fn generate_collection<R: UniformSource + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> TesseraResult<(Vec<GeneratedArtifact>, GenerationStats)> {
        if u32::try_from(count).is_err() {
            return Err(TesseraError::validation(format!(
                "collection size {count} exceeds the sequence id range"
            )));
        }

        let batch_size = normalized_batch_size(self.opts.batch_size);
        let pool = if self.opts.parallel && self.opts.render {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        let rasterizer = Rasterizer::new(self.opts.canvas);
        let mut generator = CombinationGenerator::new(self.catalog, self.layers)
            .with_max_retries(self.opts.max_retries);

        let mut out = Vec::with_capacity(count);
        let mut stats = GenerationStats {
            requested: count,
            ..GenerationStats::default()
        };

        let mut batch_start = 0usize;
        while batch_start < count {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                info!(completed = batch_start, total = count, "generation cancelled");
                sink.on_reset(Stage::Generating);
                return Err(TesseraError::Cancelled);
            }

            let batch_end = (batch_start + batch_size).min(count);
            let combos = generator.generate_unique_batch(rng, batch_end - batch_start);
            let first_id = batch_start + 1;
            let artifacts = match pool.as_ref() {
                Some(pool) => pool.install(|| {
                    combos
                        .into_par_iter()
                        .enumerate()
                        .map(|(i, combo)| self.assemble(&rasterizer, first_id + i, combo))
                        .collect::<Vec<_>>()
                }),
                None => combos
                    .into_iter()
                    .enumerate()
                    .map(|(i, combo)| self.assemble(&rasterizer, first_id + i, combo))
                    .collect(),
            };

            stats.failed_layers += artifacts.iter().map(|a| a.report.failures.len()).sum::<usize>();
            stats.batches += 1;
            out.extend(artifacts);
            batch_start = batch_end;

            let progress = Progress::new(batch_start, count);
            sink.on_progress(ProgressEvent {
                stage: Stage::Generating,
                progress,
                percent: progress.percent(),
            });
            debug!(completed = batch_start, total = count, "generation batch done");

            if self.opts.yield_between_batches && batch_start < count {
                std::thread::yield_now();
            }
        }

        if count == 0 {
            let progress = Progress::new(0, 0);
            sink.on_progress(ProgressEvent {
                stage: Stage::Generating,
                progress,
                percent: progress.percent(),
            });
        }

        stats.generated = out.len();
        stats.duplicates = generator.duplicates();
        info!(
            generated = stats.generated,
            duplicates = stats.duplicates,
            failed_layers = stats.failed_layers,
            "collection generated"
        );
        Ok((out, stats))
    }

    /// Sample and rasterize one combination outside of any uniqueness run.
    pub fn generate_single_preview<R: UniformSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> GeneratedArtifact {
        let combo = generate_one(self.catalog, self.layers, rng);
        let mut artifact = self.render(&Rasterizer::new(self.opts.canvas), combo);
        artifact.id = ArtifactId::new_preview();
        artifact
    }

    fn assemble(
        &self,
        rasterizer: &Rasterizer,
        seq: usize,
        combo: TraitCombination,
    ) -> GeneratedArtifact {
        let mut artifact = self.render(rasterizer, combo);
        // Bounded by the u32 check in generate_collection.
        artifact.id = ArtifactId::Sequence(seq as u32);
        artifact
    }

    fn render(&self, rasterizer: &Rasterizer, combo: TraitCombination) -> GeneratedArtifact {
        let (raster, report) = if self.opts.render {
            let (image, report) = rasterizer.composite_one(&combo, self.layers);
            (Some(image), report)
        } else {
            (None, RasterReport::default())
        };
        GeneratedArtifact {
            id: ArtifactId::Sequence(0),
            traits: combo,
            raster,
            report,
        }
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> TesseraResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TesseraError::validation(
            "worker 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TesseraError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

pub(crate) fn normalized_batch_size(batch_size: usize) -> usize {
    if batch_size == 0 { 1 } else { batch_size }
}

#[cfg(test)]
#[path = "../../tests/unit/session/batch.rs"]
mod tests;
