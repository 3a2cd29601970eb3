use base64::Engine as _;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::warn;

use crate::catalog::layers::LayerOrderModel;
use crate::foundation::core::CanvasSize;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::generate::combination::TraitCombination;
use crate::render::composite::over_in_place;

/// PNG compression preset for encoded rasters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PngCompression {
    /// Fastest encode, larger files. Suited to large batches.
    #[default]
    Fast,
    /// Encoder default balance.
    Balanced,
    /// Smallest files, slowest encode.
    Best,
}

impl PngCompression {
    fn codec(self) -> CompressionType {
        match self {
            Self::Fast => CompressionType::Fast,
            Self::Balanced => CompressionType::Default,
            Self::Best => CompressionType::Best,
        }
    }
}

/// A composited canvas in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub rgba8_premul: Vec<u8>,
}

impl RasterImage {
    /// A fully transparent canvas.
    pub fn transparent(canvas: CanvasSize) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            rgba8_premul: vec![0u8; canvas.rgba8_len()],
        }
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8_premul[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy suitable for encoding.
    pub fn to_rgba_image(&self) -> TesseraResult<RgbaImage> {
        let mut straight = self.rgba8_premul.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| TesseraError::encode("raster buffer does not match its dimensions"))
    }

    /// Encode as PNG.
    pub fn encode_png(&self, compression: PngCompression) -> TesseraResult<Vec<u8>> {
        let straight = self.to_rgba_image()?;
        let mut buf = Vec::new();
        PngEncoder::new_with_quality(&mut buf, compression.codec(), PngFilter::Adaptive)
            .write_image(
                straight.as_raw(),
                self.width,
                self.height,
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| TesseraError::encode(format!("png encode failed: {e}")))?;
        Ok(buf)
    }

    /// Encode as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self, compression: PngCompression) -> TesseraResult<String> {
        let png = self.encode_png(compression)?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

/// A layer that could not be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerFailure {
    /// Category of the failed layer.
    pub category: String,
    /// Asset that failed to load.
    pub asset_name: String,
    /// Failure description.
    pub message: String,
}

/// Outcome of one composite: how many layers were painted and which ones failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RasterReport {
    /// Layers painted onto the canvas.
    pub layers_drawn: usize,
    /// Layers skipped because their image could not be loaded.
    pub failures: Vec<LayerFailure>,
}

impl RasterReport {
    /// Whether every attempted layer was drawn.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Paints trait combinations onto fixed-size canvases.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rasterizer {
    canvas: CanvasSize,
}

impl Rasterizer {
    /// Create a rasterizer for `canvas`.
    pub fn new(canvas: CanvasSize) -> Self {
        Self { canvas }
    }

    /// Output canvas size.
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Composite `combo` following `layers`.
    ///
    /// Only enabled layers present in the combination are drawn, bottom (`order` 0) to top.
    /// Each image is stretched over the full canvas. A layer whose image fails to load is logged,
    /// recorded in the report and skipped; the remaining layers are still drawn.
    pub fn composite_one(
        &self,
        combo: &TraitCombination,
        layers: &LayerOrderModel,
    ) -> (RasterImage, RasterReport) {
        let mut canvas = RasterImage::transparent(self.canvas);
        let mut report = RasterReport::default();

        for entry in layers.enabled_in_order() {
            let Some(asset) = combo.get(entry.category_name()) else {
                continue;
            };
            let drawn = asset
                .image()
                .fitted(self.canvas)
                .and_then(|layer| over_in_place(&mut canvas.rgba8_premul, &layer, 1.0));
            match drawn {
                Ok(()) => report.layers_drawn += 1,
                Err(err) => {
                    warn!(
                        category = entry.category_name(),
                        asset = %asset.name,
                        error = %err,
                        "layer failed to load; skipping"
                    );
                    report.failures.push(LayerFailure {
                        category: entry.category_name().to_string(),
                        asset_name: asset.name.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        (canvas, report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
