use anyhow::Context;
use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::core::CanvasSize;
use crate::foundation::error::TesseraResult;
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_rgba8(bytes: &[u8]) -> TesseraResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Stretch `image` to cover the whole canvas (aspect ratio is not preserved) and return
/// premultiplied RGBA8 bytes sized to the canvas.
pub fn fit_to_canvas_premul(image: &RgbaImage, canvas: CanvasSize) -> Vec<u8> {
    let mut premul = image.clone();
    premultiply_rgba8_in_place(&mut premul);
    if premul.dimensions() == (canvas.width, canvas.height) {
        return premul.into_raw();
    }
    // Resampling premultiplied data keeps transparent edges from bleeding color.
    image::imageops::resize(&premul, canvas.width, canvas.height, FilterType::Triangle).into_raw()
}

#[cfg(test)]
#[path = "../../tests/unit/render/decode.rs"]
mod tests;
