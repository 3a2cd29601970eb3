//! Rasterization: decode trait images and paint them onto a fixed-size canvas in layer order.

/// Premultiplied source-over blending.
pub mod composite;
/// Image decoding and canvas fitting.
pub mod decode;
/// Canvas type and the layer rasterizer.
pub mod raster;
