use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use image::RgbaImage;

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::core::CanvasSize;
use crate::render::decode::{decode_rgba8, fit_to_canvas_premul};

/// Rarity assigned to assets added without a tier.
pub const DEFAULT_RARITY: i32 = 50;

/// Opaque asset identifier, minted at ingestion time (never derived from content).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct AssetId(uuid::Uuid);

impl AssetId {
    /// Mint a fresh random identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Counts live [`ImageHandle`]s created against one catalog.
#[derive(Clone, Debug, Default)]
pub struct HandleTracker(Arc<AtomicUsize>);

impl HandleTracker {
    /// Create a tracker with no live handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles acquired and not yet released.
    pub fn live(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    fn acquire(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Owned reference to one trait image.
///
/// The encoded bytes are kept as uploaded; decoding happens on first [`load`](Self::load) and the
/// result (bitmap or failure) is cached for the lifetime of the handle. The first canvas-fitted
/// premultiplied buffer is cached too. Dropping the handle releases it from its [`HandleTracker`].
pub struct ImageHandle {
    label: String,
    bytes: Vec<u8>,
    decoded: OnceLock<Result<Arc<RgbaImage>, String>>,
    fitted: OnceLock<(CanvasSize, Arc<Vec<u8>>)>,
    tracker: Option<HandleTracker>,
}

impl ImageHandle {
    /// Wrap encoded image bytes. Nothing is decoded yet.
    pub fn from_encoded(
        label: impl Into<String>,
        bytes: Vec<u8>,
        tracker: Option<&HandleTracker>,
    ) -> Self {
        if let Some(t) = tracker {
            t.acquire();
        }
        Self {
            label: label.into(),
            bytes,
            decoded: OnceLock::new(),
            fitted: OnceLock::new(),
            tracker: tracker.cloned(),
        }
    }

    /// Wrap an already decoded bitmap.
    pub fn from_rgba(
        label: impl Into<String>,
        image: RgbaImage,
        tracker: Option<&HandleTracker>,
    ) -> Self {
        let handle = Self::from_encoded(label, Vec::new(), tracker);
        let _ = handle.decoded.set(Ok(Arc::new(image)));
        handle
    }

    /// Source label (usually the uploaded file path).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Size of the encoded payload in bytes.
    pub fn encoded_len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether a decode has been attempted.
    pub fn is_loaded(&self) -> bool {
        self.decoded.get().is_some()
    }

    /// Decode (once) and return the straight-alpha RGBA8 bitmap.
    pub fn load(&self) -> TesseraResult<Arc<RgbaImage>> {
        let cached = self.decoded.get_or_init(|| {
            decode_rgba8(&self.bytes)
                .map(Arc::new)
                .map_err(|e| e.to_string())
        });
        cached
            .clone()
            .map_err(|msg| TesseraError::decode(format!("{}: {msg}", self.label)))
    }

    /// Premultiplied RGBA8 buffer scaled to `canvas`, ready to composite.
    ///
    /// Only one canvas size is cached; asking for another one recomputes without caching.
    pub fn fitted(&self, canvas: CanvasSize) -> TesseraResult<Arc<Vec<u8>>> {
        if let Some((size, buf)) = self.fitted.get() {
            if *size == canvas {
                return Ok(Arc::clone(buf));
            }
        }
        let buf = Arc::new(fit_to_canvas_premul(&*self.load()?, canvas));
        let _ = self.fitted.set((canvas, Arc::clone(&buf)));
        Ok(buf)
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        if let Some(t) = self.tracker.take() {
            t.release();
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("label", &self.label)
            .field("encoded_len", &self.bytes.len())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// One trait image option inside a category.
///
/// Clones share the same [`ImageHandle`]; the handle is released when the last clone drops.
#[derive(Clone, Debug)]
pub struct Asset {
    /// Unique identifier.
    pub id: AssetId,
    /// Display name (file name without extension).
    pub name: String,
    /// Relative selection weight. Non-positive values are never sampled.
    pub rarity: i32,
    image: Arc<ImageHandle>,
}

impl Asset {
    /// Create an asset with a freshly minted id.
    pub fn new(name: impl Into<String>, image: ImageHandle, rarity: i32) -> Self {
        Self {
            id: AssetId::new(),
            name: name.into(),
            rarity,
            image: Arc::new(image),
        }
    }

    /// The asset's image handle.
    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// Sampling weight: the rarity clamped at zero.
    pub fn weight(&self) -> u64 {
        u64::try_from(self.rarity).unwrap_or(0)
    }
}

/// Derive a display name from a file path: last path segment, cut at its first `.`.
pub fn name_from_file(path: &str) -> String {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/asset.rs"]
mod tests;
