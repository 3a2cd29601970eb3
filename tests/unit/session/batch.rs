use super::*;
use crate::catalog::asset::Asset;
use crate::foundation::rng::Rng;
use crate::session::progress::{NoProgress, VecProgress};

fn catalog(layout: &[(&str, &[(&str, [u8; 4])])]) -> AssetCatalog {
    let mut cat = AssetCatalog::new();
    for &(category, assets) in layout {
        cat.add_category(category);
        for &(name, rgba) in assets {
            let image = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
            let handle = cat.new_handle_from_rgba(name, image);
            cat.insert_asset(category, Asset::new(name, handle, 50));
        }
    }
    cat
}

fn three_by_three() -> AssetCatalog {
    catalog(&[
        (
            "bg",
            &[("Red", [255, 0, 0, 255]), ("Green", [0, 255, 0, 255]), ("Blue", [0, 0, 255, 255])],
        ),
        (
            "head",
            &[("Cap", [9, 9, 9, 255]), ("Crown", [200, 200, 0, 255]), ("Bald", [0, 0, 0, 0])],
        ),
    ])
}

fn opts(batch_size: usize, parallel: bool) -> GenerateOpts {
    GenerateOpts {
        canvas: CanvasSize::new(4, 4).unwrap(),
        batch_size,
        parallel,
        threads: Some(2),
        ..GenerateOpts::default()
    }
}

#[test]
fn sequence_ids_are_one_based_and_ordered() {
    let cat = three_by_three();
    let coord = BatchCoordinator::new(&cat, cat.layers(), opts(7, true)).unwrap();
    let (artifacts, stats) = coord
        .generate_collection(20, &mut Rng::seeded(1), &mut NoProgress, None)
        .unwrap();

    let ids: Vec<ArtifactId> = artifacts.iter().map(|a| a.id).collect();
    let expected: Vec<ArtifactId> = (1..=20).map(ArtifactId::Sequence).collect();
    assert_eq!(ids, expected);
    assert_eq!(stats.requested, 20);
    assert_eq!(stats.generated, 20);
    assert_eq!(stats.batches, 3);
    assert!(artifacts.iter().all(|a| a.raster.is_some()));
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    let cat = three_by_three();
    let coord = BatchCoordinator::new(&cat, cat.layers(), opts(50, false)).unwrap();
    let mut sink = VecProgress::new();
    coord
        .generate_collection(120, &mut Rng::seeded(2), &mut sink, None)
        .unwrap();

    let percents = sink.percents();
    assert_eq!(percents.len(), 3);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last().copied(), Some(100.0));
    assert_eq!(sink.events[0].progress, Progress::new(50, 120));
}

#[test]
fn empty_collection_still_reports_completion() {
    let cat = three_by_three();
    let coord = BatchCoordinator::new(&cat, cat.layers(), opts(50, false)).unwrap();
    let mut sink = VecProgress::new();
    let (artifacts, stats) = coord
        .generate_collection(0, &mut Rng::seeded(3), &mut sink, None)
        .unwrap();
    assert!(artifacts.is_empty());
    assert_eq!(stats.batches, 0);
    assert_eq!(sink.percents(), vec![100.0]);
}

#[test]
fn uniqueness_spans_batch_boundaries() {
    let cat = three_by_three();
    let mut o = opts(2, true);
    o.max_retries = 10_000;
    let coord = BatchCoordinator::new(&cat, cat.layers(), o).unwrap();
    let (artifacts, stats) = coord
        .generate_collection(9, &mut Rng::seeded(4), &mut NoProgress, None)
        .unwrap();

    let keys: std::collections::HashSet<_> = artifacts.iter().map(|a| a.traits.key()).collect();
    assert_eq!(keys.len(), 9);
    assert_eq!(stats.duplicates, 0);
}

#[test]
fn exhausted_space_emits_counted_duplicates() {
    let cat = catalog(&[("bg", &[("Red", [255, 0, 0, 255]), ("Blue", [0, 0, 255, 255])])]);
    let coord = BatchCoordinator::new(&cat, cat.layers(), opts(50, false)).unwrap();
    let (artifacts, stats) = coord
        .generate_collection(5, &mut Rng::seeded(5), &mut NoProgress, None)
        .unwrap();
    assert_eq!(artifacts.len(), 5);
    assert_eq!(stats.duplicates, 3);
}

#[test]
fn parallel_and_sequential_runs_agree_for_a_seed() {
    let cat = three_by_three();
    let run = |parallel| {
        let coord = BatchCoordinator::new(&cat, cat.layers(), opts(3, parallel)).unwrap();
        let (artifacts, _) = coord
            .generate_collection(8, &mut Rng::seeded(6), &mut NoProgress, None)
            .unwrap();
        artifacts
    };
    let a = run(true);
    let b = run(false);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.id, y.id);
        assert_eq!(x.traits.key(), y.traits.key());
        assert_eq!(x.raster, y.raster);
    }
}

#[test]
fn cancelled_run_resets_progress() {
    let cat = three_by_three();
    let coord = BatchCoordinator::new(&cat, cat.layers(), opts(5, false)).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut sink = VecProgress::new();
    let err = coord
        .generate_collection(20, &mut Rng::seeded(7), &mut sink, Some(&cancel))
        .unwrap_err();
    assert!(matches!(err, TesseraError::Cancelled));
    assert_eq!(sink.resets, 1);
    assert!(sink.events.is_empty());
}

#[test]
fn render_disabled_samples_traits_only() {
    let cat = three_by_three();
    let mut o = opts(10, true);
    o.render = false;
    let coord = BatchCoordinator::new(&cat, cat.layers(), o).unwrap();
    let (artifacts, _) = coord
        .generate_collection(4, &mut Rng::seeded(8), &mut NoProgress, None)
        .unwrap();
    assert!(artifacts.iter().all(|a| a.raster.is_none() && a.traits.len() == 2));
}

#[test]
fn preview_ids_never_look_like_sequence_ids() {
    let cat = three_by_three();
    let coord = BatchCoordinator::new(&cat, cat.layers(), opts(10, false)).unwrap();
    let preview = coord.generate_single_preview(&mut Rng::seeded(9));
    assert!(preview.id.is_preview());
    assert!(preview.id.to_string().starts_with("preview-"));
    assert!(preview.id.to_string().parse::<u32>().is_err());
    assert_eq!(preview.traits.len(), 2);
    assert_eq!(ArtifactId::Sequence(7).to_string(), "7");
    assert_eq!(GeneratedArtifact { id: ArtifactId::Sequence(7), ..preview }.name(), "NFT #7");
}

#[test]
fn zero_threads_is_rejected() {
    let cat = three_by_three();
    let mut o = opts(10, true);
    o.threads = Some(0);
    assert!(BatchCoordinator::new(&cat, cat.layers(), o).is_err());
}

#[test]
fn zero_batch_size_is_normalized() {
    assert_eq!(normalized_batch_size(0), 1);
    assert_eq!(normalized_batch_size(50), 50);
}
