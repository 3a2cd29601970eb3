use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::catalog::asset::Asset;
use crate::catalog::catalog::AssetCatalog;
use crate::catalog::layers::{LayerOrderModel, names_equal};
use crate::foundation::rng::UniformSource;
use crate::generate::sampler::WeightedSampler;

/// Default number of redraws spent looking for an unseen combination.
pub const DEFAULT_MAX_RETRIES: usize = 100;

/// Canonical identity of a combination: its asset ids, sorted and joined.
///
/// Category assignment and order do not participate, so two combinations holding the same set
/// of assets share a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey(String);

impl CombinationKey {
    /// The joined key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One selected asset for one category.
#[derive(Clone, Debug)]
pub struct TraitPick {
    /// Category the asset was drawn from.
    pub category: String,
    /// The drawn asset.
    pub asset: Asset,
}

/// Category → asset selection for one artifact.
///
/// Picks keep the order they were drawn in (enabled layer order), which is also the attribute
/// order in exported metadata.
#[derive(Clone, Debug, Default)]
pub struct TraitCombination {
    picks: Vec<TraitPick>,
}

impl TraitCombination {
    /// Create an empty combination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the asset for `category`, replacing any previous pick for it.
    pub fn insert(&mut self, category: impl Into<String>, asset: Asset) {
        let category = category.into();
        match self
            .picks
            .iter_mut()
            .find(|p| names_equal(&p.category, &category))
        {
            Some(p) => p.asset = asset,
            None => self.picks.push(TraitPick { category, asset }),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, category: impl Into<String>, asset: Asset) -> Self {
        self.insert(category, asset);
        self
    }

    /// Asset picked for `category` (case-insensitive).
    pub fn get(&self, category: &str) -> Option<&Asset> {
        self.picks
            .iter()
            .find(|p| names_equal(&p.category, category))
            .map(|p| &p.asset)
    }

    /// Whether `category` has a pick.
    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Picks in draw order.
    pub fn picks(&self) -> &[TraitPick] {
        &self.picks
    }

    /// Number of picks.
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Whether nothing was picked.
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Uniqueness key for this combination.
    pub fn key(&self) -> CombinationKey {
        let mut ids: Vec<String> = self.picks.iter().map(|p| p.asset.id.to_string()).collect();
        ids.sort();
        CombinationKey(ids.join("|"))
    }
}

/// Draws full trait combinations from a catalog, seeking uniqueness across a whole run.
///
/// The seen-key set lives as long as the generator, so consecutive
/// [`generate_unique_batch`](Self::generate_unique_batch) calls share one uniqueness scope.
/// Uniqueness is best effort: after `max_retries` redraws the last draw is accepted even if it
/// repeats an earlier key.
pub struct CombinationGenerator<'a> {
    catalog: &'a AssetCatalog,
    layers: &'a LayerOrderModel,
    max_retries: usize,
    seen: HashSet<CombinationKey>,
    duplicates: usize,
}

impl<'a> CombinationGenerator<'a> {
    /// Create a generator with [`DEFAULT_MAX_RETRIES`].
    pub fn new(catalog: &'a AssetCatalog, layers: &'a LayerOrderModel) -> Self {
        Self {
            catalog,
            layers,
            max_retries: DEFAULT_MAX_RETRIES,
            seen: HashSet::new(),
            duplicates: 0,
        }
    }

    /// Override the redraw budget per item.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Draw one asset per enabled, non-empty category. No uniqueness check.
    ///
    /// Layers whose category is missing or empty contribute nothing.
    pub fn generate_one<R: UniformSource + ?Sized>(&self, rng: &mut R) -> TraitCombination {
        generate_one(self.catalog, self.layers, rng)
    }

    /// Draw one combination, redrawing while its key was already seen in this run.
    pub fn next_unique<R: UniformSource + ?Sized>(&mut self, rng: &mut R) -> TraitCombination {
        let mut combo = self.generate_one(rng);
        let mut key = combo.key();
        let mut attempts = 0usize;
        while self.seen.contains(&key) && attempts < self.max_retries {
            combo = self.generate_one(rng);
            key = combo.key();
            attempts += 1;
        }
        if self.seen.contains(&key) {
            self.duplicates += 1;
            debug!(key = %key, attempts, "accepting duplicate combination");
        }
        self.seen.insert(key);
        combo
    }

    /// Draw `count` combinations with [`next_unique`](Self::next_unique).
    pub fn generate_unique_batch<R: UniformSource + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Vec<TraitCombination> {
        (0..count).map(|_| self.next_unique(rng)).collect()
    }

    /// Combinations accepted despite repeating a seen key.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Distinct keys seen so far.
    pub fn distinct(&self) -> usize {
        self.seen.len()
    }
}

/// Draw one asset per enabled, non-empty category of `catalog` following `layers`.
pub fn generate_one<R: UniformSource + ?Sized>(
    catalog: &AssetCatalog,
    layers: &LayerOrderModel,
    rng: &mut R,
) -> TraitCombination {
    let mut combo = TraitCombination::new();
    for entry in layers.enabled_in_order() {
        let Some(category) = catalog.category(entry.category_name()) else {
            continue;
        };
        if let Some(asset) = WeightedSampler::sample(category.assets(), rng) {
            combo.insert(category.name(), asset.clone());
        }
    }
    combo
}

#[cfg(test)]
#[path = "../../tests/unit/generate/combination.rs"]
mod tests;
