use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::layers::LayerOrderModel;
use crate::export::archive::ExportOpts;
use crate::export::metadata::DEFAULT_DESCRIPTION;
use crate::foundation::core::CanvasSize;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::raster::PngCompression;
use crate::session::batch::{DEFAULT_BATCH_SIZE, GenerateOpts};

/// Default collection size for project files that omit `count`.
pub const DEFAULT_COUNT: usize = 100;

/// One entry of the explicit draw order in a project file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPlanEntry {
    /// Category name, matched case-insensitively.
    pub name: String,
    /// Whether the layer is drawn. Defaults to `true`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// JSON project file. Every field is optional.
///
/// ```json
/// {
///   "canvas": { "width": 1024, "height": 1024 },
///   "count": 500,
///   "seed": 42,
///   "layers": [{ "name": "background" }, { "name": "hat", "enabled": false }]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Output canvas for every artifact.
    #[serde(default)]
    pub canvas: CanvasSize,
    /// Items per generation and export batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Collection size used when the CLI gives no `--count`.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Seed for reproducible runs; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Description written into every metadata record.
    #[serde(default = "default_description")]
    pub description: String,
    /// PNG preset for archive images and previews.
    #[serde(default)]
    pub png_compression: PngCompression,
    /// Draw order, bottom first. Unlisted categories keep their relative order after these.
    #[serde(default)]
    pub layers: Vec<LayerPlanEntry>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            count: DEFAULT_COUNT,
            seed: None,
            description: DEFAULT_DESCRIPTION.to_owned(),
            png_compression: PngCompression::default(),
            layers: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Parse and validate a project file.
    pub fn from_json(json: &str) -> TesseraResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| TesseraError::serde(format!("invalid project config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a project file from disk.
    pub fn from_path(path: &Path) -> TesseraResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read project config '{}'", path.display()))?;
        Self::from_json(&json)
    }

    /// Reject zero canvas dimensions, a zero batch size and blank layer names.
    pub fn validate(&self) -> TesseraResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(TesseraError::validation("canvas width/height must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(TesseraError::validation("batch_size must be > 0"));
        }
        if let Some(entry) = self.layers.iter().find(|l| l.name.trim().is_empty()) {
            return Err(TesseraError::validation(format!(
                "layer entry with empty name (enabled = {})",
                entry.enabled
            )));
        }
        Ok(())
    }

    /// Generation options carrying this file's canvas and batch size.
    pub fn generate_opts(&self) -> GenerateOpts {
        GenerateOpts {
            canvas: self.canvas,
            batch_size: self.batch_size,
            ..GenerateOpts::default()
        }
    }

    /// Export options carrying this file's batch size, compression and description.
    pub fn export_opts(&self) -> ExportOpts {
        ExportOpts {
            batch_size: self.batch_size,
            png_compression: self.png_compression,
            description: self.description.clone(),
            ..ExportOpts::default()
        }
    }

    /// Apply the configured draw order to `layers`.
    pub fn apply_layers(&self, layers: &mut LayerOrderModel) {
        if self.layers.is_empty() {
            return;
        }
        layers.apply_plan(self.layers.iter().map(|l| (l.name.trim(), l.enabled)));
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
