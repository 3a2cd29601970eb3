use super::*;
use crate::catalog::asset::ImageHandle;
use crate::foundation::rng::Rng;

fn catalog(layout: &[(&str, &[&str])]) -> AssetCatalog {
    let mut c = AssetCatalog::new();
    for (cat, names) in layout {
        c.add_category(cat);
        for n in *names {
            let handle = c.new_handle_from_rgba(*n, image::RgbaImage::new(1, 1));
            c.insert_asset(cat, Asset::new(*n, handle, 50));
        }
    }
    c
}

fn asset(name: &str) -> Asset {
    Asset::new(name, ImageHandle::from_rgba(name, image::RgbaImage::new(1, 1), None), 1)
}

#[test]
fn key_ignores_category_order() {
    let a = asset("a");
    let b = asset("b");
    let one = TraitCombination::new().with("x", a.clone()).with("y", b.clone());
    let two = TraitCombination::new().with("y", b).with("x", a);
    assert_eq!(one.key(), two.key());
}

#[test]
fn insert_replaces_case_insensitively() {
    let mut combo = TraitCombination::new().with("Head", asset("a"));
    combo.insert("head", asset("b"));
    assert_eq!(combo.len(), 1);
    assert_eq!(combo.get("HEAD").unwrap().name, "b");
}

#[test]
fn generate_one_skips_disabled_and_empty_layers() {
    let mut c = catalog(&[("bg", &["sky"]), ("body", &[]), ("hat", &["cap"])]);
    c.layers_mut().toggle_enabled("hat");
    let mut rng = Rng::seeded(1);
    let combo = generate_one(&c, c.layers(), &mut rng);
    assert_eq!(combo.len(), 1);
    assert_eq!(combo.get("bg").unwrap().name, "sky");
    assert!(!combo.contains("body"));
    assert!(!combo.contains("hat"));
}

#[test]
fn picks_follow_layer_order() {
    let mut c = catalog(&[("bg", &["sky"]), ("head", &["crown"])]);
    c.layers_mut().move_layer(1, 0);
    let mut rng = Rng::seeded(1);
    let combo = generate_one(&c, c.layers(), &mut rng);
    let cats: Vec<&str> = combo.picks().iter().map(|p| p.category.as_str()).collect();
    assert_eq!(cats, vec!["head", "bg"]);
}

#[test]
fn small_trait_space_terminates_with_forced_duplicate() {
    let c = catalog(&[("bg", &["red", "blue"])]);
    let mut rng = Rng::seeded(99);
    let mut generator = CombinationGenerator::new(&c, c.layers());
    let batch = generator.generate_unique_batch(&mut rng, 3);
    assert_eq!(batch.len(), 3);

    let distinct: HashSet<_> = batch.iter().map(TraitCombination::key).collect();
    assert!(distinct.len() <= 2);
    assert_eq!(generator.duplicates(), 3 - distinct.len());
    assert_eq!(generator.distinct(), distinct.len());
}

#[test]
fn uniqueness_spans_consecutive_batches() {
    let c = catalog(&[("bg", &["a", "b", "c"]), ("hat", &["x", "y"])]);
    let mut rng = Rng::seeded(7);
    let mut generator = CombinationGenerator::new(&c, c.layers());
    let mut all = generator.generate_unique_batch(&mut rng, 3);
    all.extend(generator.generate_unique_batch(&mut rng, 3));

    let distinct: HashSet<_> = all.iter().map(TraitCombination::key).collect();
    assert_eq!(distinct.len(), 6);
    assert_eq!(generator.duplicates(), 0);
}

#[test]
fn zero_retries_accepts_first_draw() {
    let c = catalog(&[("bg", &["only"])]);
    let mut rng = Rng::seeded(3);
    let mut generator = CombinationGenerator::new(&c, c.layers()).with_max_retries(0);
    let batch = generator.generate_unique_batch(&mut rng, 4);
    assert_eq!(batch.len(), 4);
    assert_eq!(generator.duplicates(), 3);
}
