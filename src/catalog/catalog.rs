use tracing::debug;

use crate::catalog::asset::{
    Asset, AssetId, DEFAULT_RARITY, HandleTracker, ImageHandle, name_from_file,
};
use crate::catalog::layers::{LayerOrderModel, names_equal};
use crate::catalog::source::SourceFile;

/// Rarity used when a folder upload names a tier that is not in [`RARITY_TIERS`].
pub const UNKNOWN_TIER_RARITY: i32 = 25;

/// Folder-upload tier names (matched case-insensitively) and their default rarity.
pub const RARITY_TIERS: &[(&str, i32)] = &[
    ("COMMON", 50),
    ("UNCOMMON", 40),
    ("RARE", 30),
    ("EPIC", 20),
    ("LEGENDARY", 10),
    ("MYTHIC", 5),
    ("ULTRA_RARE", 3),
    ("SUPER_RARE", 15),
    ("VERY_RARE", 8),
];

/// Look up the default rarity for a tier folder name.
///
/// Spaces and hyphens are treated as underscores, so `Ultra Rare` and `ultra-rare` both match
/// `ULTRA_RARE`.
pub fn tier_rarity(tier: &str) -> i32 {
    let key: String = tier
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    RARITY_TIERS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rarity)| *rarity)
        .unwrap_or(UNKNOWN_TIER_RARITY)
}

/// A named partition of assets. Asset order is insertion order.
#[derive(Clone, Debug)]
pub struct TraitCategory {
    name: String,
    assets: Vec<Asset>,
}

impl TraitCategory {
    /// Category name as first created.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assets in insertion order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Find an asset by id.
    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the category holds no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Summary of one folder-structure ingest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Assets created.
    pub added: usize,
    /// Files dropped (non-images or paths too short to name a trait).
    pub skipped: usize,
    /// Categories created by this ingest, in discovery order.
    pub new_categories: Vec<String>,
}

/// Owns every trait category and the compositing order over them.
///
/// All mutations that name a missing category are no-ops. Removing an asset or category drops
/// the catalog's reference to each image handle; [`live_handles`](Self::live_handles) reports
/// handles still held anywhere (catalog, combinations or artifacts).
#[derive(Debug, Default)]
pub struct AssetCatalog {
    categories: Vec<TraitCategory>,
    layers: LayerOrderModel,
    handles: HandleTracker,
}

impl AssetCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Categories in creation order.
    pub fn categories(&self) -> &[TraitCategory] {
        &self.categories
    }

    /// Look up a category by case-insensitive name.
    pub fn category(&self, name: &str) -> Option<&TraitCategory> {
        self.categories.iter().find(|c| names_equal(&c.name, name))
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut TraitCategory> {
        self.categories.iter_mut().find(|c| names_equal(&c.name, name))
    }

    /// Compositing order over this catalog's categories.
    pub fn layers(&self) -> &LayerOrderModel {
        &self.layers
    }

    /// Mutable compositing order (reorder, toggle).
    pub fn layers_mut(&mut self) -> &mut LayerOrderModel {
        &mut self.layers
    }

    /// Total number of assets across categories.
    pub fn asset_count(&self) -> usize {
        self.categories.iter().map(TraitCategory::len).sum()
    }

    /// Whether the catalog has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of image handles created through this catalog that are still alive.
    pub fn live_handles(&self) -> usize {
        self.handles.live()
    }

    /// Tracker for handles created through this catalog.
    pub fn handle_tracker(&self) -> &HandleTracker {
        &self.handles
    }

    /// Create an empty category with an enabled layer at the end of the order.
    ///
    /// When a category with the same case-insensitive name exists it is kept as is, and its layer
    /// entry is appended again if it was removed from the order. Returns `true` when a category
    /// was created.
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        if let Some(existing) = self.category(name) {
            let existing = existing.name.clone();
            if self.layers.push(&existing) {
                debug!(category = %existing, "layer entry restored");
            }
            return false;
        }
        self.categories.push(TraitCategory {
            name: name.to_string(),
            assets: Vec::new(),
        });
        self.layers.push(name);
        true
    }

    /// Add image files to an existing category with the default rarity.
    ///
    /// Non-image files are dropped silently. Returns the ids of created assets (empty when the
    /// category does not exist).
    pub fn add_assets(&mut self, category: &str, files: Vec<SourceFile>) -> Vec<AssetId> {
        let handles = self.handles.clone();
        let Some(cat) = self.category_mut(category) else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        for file in files.into_iter().filter(SourceFile::is_image) {
            let asset = asset_from_file(file, DEFAULT_RARITY, &handles);
            ids.push(asset.id);
            cat.assets.push(asset);
        }
        ids
    }

    /// Insert a prepared asset into an existing category. Returns its id, or `None` when the
    /// category does not exist.
    pub fn insert_asset(&mut self, category: &str, asset: Asset) -> Option<AssetId> {
        let cat = self.category_mut(category)?;
        let id = asset.id;
        cat.assets.push(asset);
        Some(id)
    }

    /// Create an image handle tracked by this catalog.
    pub fn new_handle_from_rgba(
        &self,
        label: impl Into<String>,
        image: image::RgbaImage,
    ) -> ImageHandle {
        ImageHandle::from_rgba(label, image, Some(&self.handles))
    }

    /// Ingest a flat folder upload whose paths read `<root>/<trait>/<tier>/<file>`.
    ///
    /// Files are grouped by the lower-cased trait segment and merged into existing categories
    /// (append, never replace). Rarity comes from the tier segment via [`tier_rarity`]; paths
    /// without a tier folder (`<root>/<trait>/<file>`) use [`UNKNOWN_TIER_RARITY`]. Non-images and
    /// paths with fewer than three segments are skipped.
    pub fn add_assets_from_folder_structure(&mut self, files: Vec<SourceFile>) -> IngestReport {
        let mut report = IngestReport::default();
        for file in files {
            if !file.is_image() {
                report.skipped += 1;
                continue;
            }
            let (trait_name, rarity) = {
                let segments = file.segments();
                if segments.len() < 3 {
                    report.skipped += 1;
                    continue;
                }
                let rarity = if segments.len() >= 4 {
                    tier_rarity(segments[2])
                } else {
                    UNKNOWN_TIER_RARITY
                };
                (segments[1].to_lowercase(), rarity)
            };

            if self.add_category(&trait_name) {
                report.new_categories.push(trait_name.clone());
            }

            let asset = asset_from_file(file, rarity, &self.handles);
            if let Some(cat) = self.category_mut(&trait_name) {
                cat.assets.push(asset);
                report.added += 1;
            }
        }
        debug!(
            added = report.added,
            skipped = report.skipped,
            new_categories = report.new_categories.len(),
            "folder ingest finished"
        );
        report
    }

    /// Set an asset's rarity. No validation; non-positive values are never sampled.
    ///
    /// Returns `false` when the category or asset is missing.
    pub fn update_rarity(&mut self, category: &str, asset: AssetId, rarity: i32) -> bool {
        let Some(cat) = self.category_mut(category) else {
            return false;
        };
        match cat.assets.iter_mut().find(|a| a.id == asset) {
            Some(a) => {
                a.rarity = rarity;
                true
            }
            None => false,
        }
    }

    /// Remove an asset, releasing the catalog's hold on its image handle.
    pub fn remove_asset(&mut self, category: &str, asset: AssetId) -> bool {
        let Some(cat) = self.category_mut(category) else {
            return false;
        };
        let before = cat.assets.len();
        cat.assets.retain(|a| a.id != asset);
        cat.assets.len() != before
    }

    /// Remove a category, all its assets and its layer entry.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let Some(idx) = self
            .categories
            .iter()
            .position(|c| names_equal(&c.name, name))
        else {
            return false;
        };
        let removed = self.categories.remove(idx);
        self.layers.remove(&removed.name);
        debug!(
            category = %removed.name,
            assets = removed.assets.len(),
            "category removed"
        );
        true
    }
}

fn asset_from_file(file: SourceFile, rarity: i32, handles: &HandleTracker) -> Asset {
    let name = name_from_file(&file.path);
    let handle = ImageHandle::from_encoded(file.path, file.bytes, Some(handles));
    Asset::new(name, handle, rarity)
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/catalog.rs"]
mod tests;
