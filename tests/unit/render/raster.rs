use super::*;
use crate::catalog::asset::{Asset, ImageHandle};

fn solid(name: &str, rgba: [u8; 4]) -> Asset {
    Asset::new(
        name,
        ImageHandle::from_rgba(name, RgbaImage::from_pixel(3, 3, image::Rgba(rgba)), None),
        50,
    )
}

fn layers(names: &[&str]) -> LayerOrderModel {
    let mut m = LayerOrderModel::new();
    for n in names {
        m.push(n);
    }
    m
}

fn canvas() -> CanvasSize {
    CanvasSize::new(8, 8).unwrap()
}

#[test]
fn empty_combination_is_transparent() {
    let (img, report) =
        Rasterizer::new(canvas()).composite_one(&TraitCombination::new(), &layers(&[]));
    assert_eq!((img.width, img.height), (8, 8));
    assert!(img.rgba8_premul.iter().all(|b| *b == 0));
    assert_eq!(report.layers_drawn, 0);
    assert!(report.is_complete());
}

#[test]
fn later_layers_paint_over_earlier_ones() {
    let combo = TraitCombination::new()
        .with("bg", solid("A", [255, 0, 0, 255]))
        .with("body", solid("B", [0, 0, 255, 255]));
    let order = layers(&["body", "bg"]);

    let (img, report) = Rasterizer::new(canvas()).composite_one(&combo, &order);
    assert_eq!(report.layers_drawn, 2);
    assert_eq!(img.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(img.pixel(7, 7), Some([255, 0, 0, 255]));
}

#[test]
fn disabled_and_unpicked_layers_are_skipped() {
    let combo = TraitCombination::new()
        .with("bg", solid("A", [255, 0, 0, 255]))
        .with("hat", solid("H", [0, 255, 0, 255]));
    let mut order = layers(&["bg", "hat", "body"]);
    order.toggle_enabled("hat");

    let (img, report) = Rasterizer::new(canvas()).composite_one(&combo, &order);
    assert_eq!(report.layers_drawn, 1);
    assert_eq!(img.pixel(4, 4), Some([255, 0, 0, 255]));
}

#[test]
fn broken_layer_does_not_abort_composite() {
    let broken = Asset::new(
        "Broken",
        ImageHandle::from_encoded("broken.png", b"nope".to_vec(), None),
        50,
    );
    let combo = TraitCombination::new()
        .with("bg", solid("A", [0, 255, 0, 255]))
        .with("hat", broken)
        .with("eyes", solid("E", [0, 0, 0, 0]));
    let order = layers(&["bg", "hat", "eyes"]);

    let (img, report) = Rasterizer::new(canvas()).composite_one(&combo, &order);
    assert_eq!(report.layers_drawn, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].category, "hat");
    assert_eq!(report.failures[0].asset_name, "Broken");
    assert_eq!(img.pixel(1, 1), Some([0, 255, 0, 255]));
}

#[test]
fn png_encoding_round_trips_pixels() {
    let combo = TraitCombination::new().with("bg", solid("A", [10, 20, 30, 255]));
    let (img, _) = Rasterizer::new(canvas()).composite_one(&combo, &layers(&["bg"]));
    for compression in [PngCompression::Fast, PngCompression::Balanced, PngCompression::Best] {
        let png = img.encode_png(compression).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(3, 3).0, [10, 20, 30, 255]);
    }
}

#[test]
fn data_url_has_png_prefix() {
    let img = RasterImage::transparent(CanvasSize::new(2, 2).unwrap());
    let url = img.to_data_url(PngCompression::Fast).unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
    assert!(url.len() > "data:image/png;base64,".len());
}

#[test]
fn pixel_out_of_bounds_is_none() {
    let img = RasterImage::transparent(CanvasSize::new(2, 2).unwrap());
    assert_eq!(img.pixel(2, 0), None);
    assert_eq!(img.pixel(0, 2), None);
}
