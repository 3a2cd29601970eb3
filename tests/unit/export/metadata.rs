use super::*;
use crate::catalog::asset::{Asset, ImageHandle};
use crate::foundation::core::CanvasSize;
use crate::generate::combination::TraitCombination;
use crate::render::raster::{RasterImage, RasterReport};
use crate::session::batch::ArtifactId;

fn asset(name: &str) -> Asset {
    Asset::new(
        name,
        ImageHandle::from_rgba(name, image::RgbaImage::new(1, 1), None),
        50,
    )
}

fn artifact(id: ArtifactId, rendered: bool) -> GeneratedArtifact {
    GeneratedArtifact {
        id,
        traits: TraitCombination::new()
            .with("head", asset("Crown"))
            .with("body", asset("Red")),
        raster: rendered.then(|| RasterImage::transparent(CanvasSize::new(2, 2).unwrap())),
        report: RasterReport::default(),
    }
}

#[test]
fn record_follows_trait_draw_order() {
    let meta =
        NftMetadata::for_artifact(&artifact(ArtifactId::Sequence(7), true), DEFAULT_DESCRIPTION);
    assert_eq!(meta.name, "NFT #7");
    assert_eq!(meta.image, "7.png");
    assert_eq!(meta.description, DEFAULT_DESCRIPTION);
    assert_eq!(
        meta.attributes,
        vec![
            Attribute {
                trait_type: "head".to_owned(),
                value: "Crown".to_owned()
            },
            Attribute {
                trait_type: "body".to_owned(),
                value: "Red".to_owned()
            },
        ]
    );
}

#[test]
fn pretty_json_has_expected_shape() {
    let json = NftMetadata::for_artifact(&artifact(ArtifactId::Sequence(3), true), "desc")
        .to_pretty_json()
        .unwrap();
    assert!(json.contains('\n'));
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["name"], "NFT #3");
    assert_eq!(v["attributes"][1]["trait_type"], "body");
    assert_eq!(v["attributes"][1]["value"], "Red");
}

#[test]
fn view_carries_data_url_and_camel_case_keys() {
    let art = artifact(ArtifactId::Sequence(1), true);
    let view = ArtifactView::from_artifact(&art, PngCompression::Fast).unwrap();
    assert_eq!(view.id, "1");
    assert!(view.image_url.as_deref().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(view.metadata.traits.len(), 2);

    let v = serde_json::to_value(&view).unwrap();
    assert!(v.get("imageUrl").is_some());
}

#[test]
fn view_of_unrendered_preview() {
    let a = artifact(ArtifactId::new_preview(), false);
    let view = ArtifactView::from_artifact(&a, PngCompression::Fast).unwrap();
    assert!(view.id.starts_with("preview-"));
    assert!(view.name.starts_with("NFT #preview-"));
    assert_eq!(view.image_url, None);
}
