use super::*;

#[test]
fn empty_object_uses_defaults() {
    let cfg = ProjectConfig::from_json("{}").unwrap();
    assert_eq!(cfg, ProjectConfig::default());
    assert_eq!(cfg.canvas, CanvasSize::new(512, 512).unwrap());
    assert_eq!(cfg.batch_size, 50);
    assert_eq!(cfg.description, "Generated NFT with unique traits");
}

#[test]
fn parses_full_project() {
    let cfg = ProjectConfig::from_json(
        r#"{
            "canvas": { "width": 64, "height": 32 },
            "batch_size": 10,
            "count": 7,
            "seed": 42,
            "description": "custom",
            "png_compression": "best",
            "layers": [{ "name": "bg" }, { "name": "hat", "enabled": false }]
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas, CanvasSize::new(64, 32).unwrap());
    assert_eq!(cfg.seed, Some(42));
    assert_eq!(cfg.png_compression, PngCompression::Best);
    assert!(cfg.layers[0].enabled);
    assert!(!cfg.layers[1].enabled);

    let gen_opts = cfg.generate_opts();
    assert_eq!(gen_opts.batch_size, 10);
    assert_eq!(gen_opts.canvas.width, 64);
    let export = cfg.export_opts();
    assert_eq!(export.description, "custom");
    assert_eq!(export.png_compression, PngCompression::Best);
}

#[test]
fn rejects_invalid_values() {
    assert!(ProjectConfig::from_json(r#"{"canvas":{"width":0,"height":4}}"#).is_err());
    assert!(ProjectConfig::from_json(r#"{"batch_size":0}"#).is_err());
    assert!(ProjectConfig::from_json(r#"{"layers":[{"name":"  "}]}"#).is_err());
    assert!(matches!(
        ProjectConfig::from_json("{not json"),
        Err(TesseraError::Serde(_))
    ));
}

#[test]
fn layer_plan_reorders_and_toggles() {
    let mut layers = LayerOrderModel::new();
    for name in ["body", "bg", "hat", "eyes"] {
        layers.push(name);
    }
    let cfg = ProjectConfig::from_json(
        r#"{"layers":[{"name":"BG"},{"name":"hat","enabled":false},{"name":"ghost"}]}"#,
    )
    .unwrap();
    cfg.apply_layers(&mut layers);

    let names: Vec<&str> = layers.entries().iter().map(|e| e.category_name()).collect();
    assert_eq!(names, vec!["bg", "hat", "body", "eyes"]);
    assert!(!layers.entries()[1].is_enabled());
    assert!(layers.entries().iter().enumerate().all(|(i, e)| e.order() == i));
}

#[test]
fn missing_file_is_reported() {
    let err = ProjectConfig::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("here.json"));
}
