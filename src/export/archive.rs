use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicI64, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::metadata::{DEFAULT_DESCRIPTION, IMAGE_EXT, NftMetadata};
use crate::foundation::core::Progress;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::raster::PngCompression;
use crate::session::batch::{
    ArtifactId, DEFAULT_BATCH_SIZE, GeneratedArtifact, build_thread_pool, normalized_batch_size,
};
use crate::session::progress::{CancelToken, ProgressEvent, ProgressSink, Stage};

/// Share of the progress range spent encoding entries; the rest covers finalizing the archive.
const ENCODE_SHARE: f64 = 90.0;

/// Options for [`ArchiveExporter`].
#[derive(Clone, Debug)]
pub struct ExportOpts {
    /// Artifacts encoded per batch. Zero is treated as one.
    pub batch_size: usize,
    /// PNG preset for `images/` entries.
    pub png_compression: PngCompression,
    /// Description written into every metadata record.
    pub description: String,
    /// Encode each batch on a rayon pool.
    pub parallel: bool,
    /// Worker count for the pool; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            png_compression: PngCompression::default(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            parallel: true,
            threads: None,
        }
    }
}

/// A finished in-memory archive.
#[derive(Clone, Debug)]
pub struct Archive {
    /// Suggested download name, unique within the process.
    pub file_name: String,
    /// Complete zip file contents.
    pub bytes: Vec<u8>,
    /// Artifacts written (one image and one metadata entry each).
    pub artifacts: usize,
    /// Artifacts left out because they had no raster.
    pub skipped: usize,
}

impl Archive {
    /// Write the archive to `dir/<file_name>` and return the full path.
    pub fn write_to_dir(&self, dir: &std::path::Path) -> TesseraResult<std::path::PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|e| {
            TesseraError::archive(format!("failed to write '{}': {e}", path.display()))
        })?;
        Ok(path)
    }
}

/// Serializes generated artifacts into a zip with `images/` and `metadata/` folders.
#[derive(Clone, Debug, Default)]
pub struct ArchiveExporter {
    opts: ExportOpts,
}

struct EncodedEntry {
    id: ArtifactId,
    png: Vec<u8>,
    json: String,
}

impl ArchiveExporter {
    /// Exporter using `opts` for every call.
    pub fn new(opts: ExportOpts) -> Self {
        Self { opts }
    }

    /// Options this exporter was built with.
    pub fn opts(&self) -> &ExportOpts {
        &self.opts
    }

    /// Package `artifacts` into a zip archive.
    ///
    /// Entries are `images/<id>.png` and `metadata/<id>.json`. Encoding runs in batches and
    /// reports progress across `[0, 90]`; finishing the archive reports 100. Artifact ids must be
    /// unique. Any failure or cancellation resets the sink and aborts the whole export.
    #[tracing::instrument(skip_all, fields(artifacts = artifacts.len()))]
    pub fn export_collection(
        &self,
        artifacts: &[GeneratedArtifact],
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
    ) -> TesseraResult<Archive> {
        let mut stage = Stage::Serializing;
        let out = self.export_inner(artifacts, sink, cancel, &mut stage);
        if let Err(err) = &out {
            warn!(error = %err, "export failed");
            sink.on_reset(stage);
        }
        out
    }

    fn export_inner(
        &self,
        artifacts: &[GeneratedArtifact],
        sink: &mut dyn ProgressSink,
        cancel: Option<&CancelToken>,
        stage: &mut Stage,
    ) -> TesseraResult<Archive> {
        ensure_unique_ids(artifacts)?;

        let batch_size = normalized_batch_size(self.opts.batch_size);
        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory("images/", options).map_err(archive_err)?;
        zip.add_directory("metadata/", options).map_err(archive_err)?;

        let total = artifacts.len();
        let mut written = 0usize;
        let mut skipped = 0usize;
        let mut done = 0usize;
        for batch in artifacts.chunks(batch_size) {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                info!(completed = done, total, "export cancelled");
                return Err(TesseraError::Cancelled);
            }

            let encoded: Vec<TesseraResult<Option<EncodedEntry>>> = match pool.as_ref() {
                Some(pool) => {
                    pool.install(|| batch.par_iter().map(|a| self.encode_entry(a)).collect())
                }
                None => batch.iter().map(|a| self.encode_entry(a)).collect(),
            };

            for entry in encoded {
                let Some(entry) = entry? else {
                    skipped += 1;
                    continue;
                };
                write_entry(
                    &mut zip,
                    &format!("images/{}.{IMAGE_EXT}", entry.id),
                    &entry.png,
                    options,
                )?;
                write_entry(
                    &mut zip,
                    &format!("metadata/{}.json", entry.id),
                    entry.json.as_bytes(),
                    options,
                )?;
                written += 1;
            }

            done += batch.len();
            let progress = Progress::new(done, total);
            sink.on_progress(ProgressEvent {
                stage: Stage::Serializing,
                progress,
                percent: progress.percent_in(0.0, ENCODE_SHARE),
            });
            debug!(completed = done, total, "export batch encoded");
        }

        *stage = Stage::Assembling;
        let bytes = zip.finish().map_err(archive_err)?.into_inner();
        sink.on_progress(ProgressEvent {
            stage: Stage::Assembling,
            progress: Progress::new(total, total),
            percent: 100.0,
        });

        let file_name = next_archive_name();
        info!(file = %file_name, written, skipped, bytes = bytes.len(), "archive assembled");
        Ok(Archive {
            file_name,
            bytes,
            artifacts: written,
            skipped,
        })
    }

    fn encode_entry(&self, artifact: &GeneratedArtifact) -> TesseraResult<Option<EncodedEntry>> {
        let Some(raster) = artifact.raster.as_ref() else {
            warn!(id = %artifact.id, "artifact has no raster; leaving it out of the archive");
            return Ok(None);
        };
        let png = raster.encode_png(self.opts.png_compression)?;
        let json = NftMetadata::for_artifact(artifact, &self.opts.description).to_pretty_json()?;
        Ok(Some(EncodedEntry {
            id: artifact.id,
            png,
            json,
        }))
    }
}

/// Next archive name, `nft-collection-<unix millis>.zip`.
///
/// The timestamp is bumped when needed so names are strictly increasing within the process.
pub fn next_archive_name() -> String {
    static LAST: AtomicI64 = AtomicI64::new(i64::MIN);
    let now = chrono::Utc::now().timestamp_millis();
    let prev = LAST
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    let stamp = now.max(prev.saturating_add(1));
    format!("nft-collection-{stamp}.zip")
}

fn ensure_unique_ids(artifacts: &[GeneratedArtifact]) -> TesseraResult<()> {
    let mut seen = HashSet::with_capacity(artifacts.len());
    for artifact in artifacts {
        if !seen.insert(artifact.id) {
            return Err(TesseraError::validation(format!(
                "duplicate artifact id '{}' in export",
                artifact.id
            )));
        }
    }
    Ok(())
}

fn write_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> TesseraResult<()> {
    zip.start_file(name, options).map_err(archive_err)?;
    zip.write_all(bytes)
        .map_err(|e| TesseraError::archive(format!("failed to write '{name}': {e}")))
}

fn archive_err(err: zip::result::ZipError) -> TesseraError {
    TesseraError::archive(err.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/export/archive.rs"]
mod tests;
