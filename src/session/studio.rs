use tracing::debug;

use crate::catalog::catalog::AssetCatalog;
use crate::export::archive::{Archive, ArchiveExporter, ExportOpts};
use crate::export::metadata::ArtifactView;
use crate::foundation::error::TesseraResult;
use crate::foundation::rng::Rng;
use crate::render::raster::PngCompression;
use crate::session::batch::{
    ArtifactId, BatchCoordinator, GenerateOpts, GeneratedArtifact, GenerationStats,
};
use crate::session::progress::{CancelToken, ProgressSink};

/// Session state for one user: the catalog, the last generated collection and preview history.
///
/// Catalog edits need `&mut Studio`, so they cannot overlap a running generation or export.
#[derive(Debug)]
pub struct Studio {
    catalog: AssetCatalog,
    opts: GenerateOpts,
    rng: Rng,
    collection: Vec<GeneratedArtifact>,
    previews: Vec<GeneratedArtifact>,
    selected: Option<ArtifactId>,
    last_stats: Option<GenerationStats>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(GenerateOpts::default())
    }
}

impl Studio {
    /// Studio seeded from entropy.
    pub fn new(opts: GenerateOpts) -> Self {
        Self::with_rng(opts, Rng::from_entropy())
    }

    /// Studio with a caller-supplied generator, for reproducible runs.
    pub fn with_rng(opts: GenerateOpts, rng: Rng) -> Self {
        Self {
            catalog: AssetCatalog::new(),
            opts,
            rng,
            collection: Vec::new(),
            previews: Vec::new(),
            selected: None,
            last_stats: None,
        }
    }

    /// Trait catalog and its layer order.
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Mutable catalog. Unavailable while a run borrows the studio.
    pub fn catalog_mut(&mut self) -> &mut AssetCatalog {
        &mut self.catalog
    }

    /// Options used for the next run.
    pub fn opts(&self) -> &GenerateOpts {
        &self.opts
    }

    /// Replace the options used for subsequent runs.
    pub fn set_opts(&mut self, opts: GenerateOpts) {
        self.opts = opts;
    }

    /// Replace the current collection with `count` fresh artifacts and select the first one.
    ///
    /// The previous collection is dropped before the run starts. On error the studio is left
    /// with an empty collection.
    pub fn generate_collection(
        &mut self,
        count: usize,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> TesseraResult<&[GeneratedArtifact]> {
        self.clear_collection();
        let coordinator =
            BatchCoordinator::new(&self.catalog, self.catalog.layers(), self.opts.clone())?;
        let (artifacts, stats) =
            coordinator.generate_collection(count, &mut self.rng, sink, cancel)?;
        self.selected = artifacts.first().map(|a| a.id);
        self.collection = artifacts;
        self.last_stats = Some(stats);
        Ok(&self.collection)
    }

    /// Generate one preview, append it to the history and select it.
    pub fn generate_preview(&mut self) -> TesseraResult<&GeneratedArtifact> {
        let coordinator =
            BatchCoordinator::new(&self.catalog, self.catalog.layers(), self.opts.clone())?;
        let preview = coordinator.generate_single_preview(&mut self.rng);
        debug!(id = %preview.id, history = self.previews.len() + 1, "preview generated");
        self.selected = Some(preview.id);
        self.previews.push(preview);
        Ok(&self.previews[self.previews.len() - 1])
    }

    /// Artifacts of the last collection run, in sequence order.
    pub fn collection(&self) -> &[GeneratedArtifact] {
        &self.collection
    }

    /// Previews, oldest first.
    pub fn previews(&self) -> &[GeneratedArtifact] {
        &self.previews
    }

    /// Stats of the last successful collection run.
    pub fn last_stats(&self) -> Option<GenerationStats> {
        self.last_stats
    }

    /// Drop the collection and release the image handles it kept alive.
    pub fn clear_collection(&mut self) {
        self.collection.clear();
        self.collection.shrink_to_fit();
        self.last_stats = None;
        self.fix_selection();
    }

    /// Drop the preview history.
    pub fn clear_previews(&mut self) {
        self.previews.clear();
        self.previews.shrink_to_fit();
        self.fix_selection();
    }

    /// Currently selected artifact, if any.
    pub fn selected(&self) -> Option<&GeneratedArtifact> {
        self.selected.and_then(|id| self.artifact(id))
    }

    /// Select `id` if it names a held artifact.
    pub fn select(&mut self, id: ArtifactId) -> bool {
        let found = self.artifact(id).is_some();
        if found {
            self.selected = Some(id);
        }
        found
    }

    /// Find a held artifact (collection or preview) by id.
    pub fn artifact(&self, id: ArtifactId) -> Option<&GeneratedArtifact> {
        self.collection
            .iter()
            .chain(&self.previews)
            .find(|a| a.id == id)
    }

    /// View projections of the collection followed by the previews.
    pub fn views(&self, compression: PngCompression) -> TesseraResult<Vec<ArtifactView>> {
        self.collection
            .iter()
            .chain(&self.previews)
            .map(|a| ArtifactView::from_artifact(a, compression))
            .collect()
    }

    /// Export the collection, optionally with the preview history, as one archive.
    pub fn export(
        &self,
        opts: ExportOpts,
        include_previews: bool,
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> TesseraResult<Archive> {
        let exporter = ArchiveExporter::new(opts);
        if include_previews && !self.previews.is_empty() {
            let all: Vec<GeneratedArtifact> =
                self.collection.iter().chain(&self.previews).cloned().collect();
            exporter.export_collection(&all, sink, cancel)
        } else {
            exporter.export_collection(&self.collection, sink, cancel)
        }
    }

    fn fix_selection(&mut self) {
        if self.selected.is_some_and(|id| self.artifact(id).is_none()) {
            self.selected = self.collection.first().map(|a| a.id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
