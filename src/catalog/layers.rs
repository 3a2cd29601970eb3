use tracing::warn;

/// Compositing directive for one category.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LayerOrderEntry {
    category_name: String,
    order: usize,
    enabled: bool,
}

impl LayerOrderEntry {
    /// Name of the category this entry draws.
    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    /// Zero-based draw rank; lower ranks are painted first (bottom).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Disabled layers are skipped by sampling and rasterization.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        names_equal(&self.category_name, name)
    }
}

/// Ordered, toggleable list of category references.
///
/// Invariants: at most one entry per category (compared case-insensitively) and `order` values
/// are exactly `0..len()` after every mutation.
#[derive(Clone, Debug, Default)]
pub struct LayerOrderModel {
    entries: Vec<LayerOrderEntry>,
}

impl LayerOrderModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries sorted by ascending `order`.
    pub fn entries(&self) -> &[LayerOrderEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the model has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enabled entries in draw order. This is the canonical traversal for sampling and
    /// rasterization.
    pub fn enabled_in_order(&self) -> impl Iterator<Item = &LayerOrderEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }

    /// Index of the entry for `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(name))
    }

    /// Whether an entry for `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append an enabled entry for `name` unless one already exists.
    ///
    /// Returns `true` when an entry was added.
    pub(crate) fn push(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(LayerOrderEntry {
            category_name: name.to_string(),
            order: self.entries.len(),
            enabled: true,
        });
        true
    }

    /// Move the entry at `from` to `to` (clamped to the last index) and renumber.
    ///
    /// Out-of-range `from` and `from == to` are no-ops.
    pub fn move_layer(&mut self, from: usize, to: usize) {
        if from >= self.entries.len() {
            return;
        }
        let to = to.min(self.entries.len() - 1);
        if from == to {
            return;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.renumber();
    }

    /// Flip the enabled flag for `name`. Returns the new state, or `None` if not found.
    pub fn toggle_enabled(&mut self, name: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.matches(name))?;
        entry.enabled = !entry.enabled;
        Some(entry.enabled)
    }

    /// Set the enabled flag for `name`. Returns `false` if not found.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.matches(name)) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Delete the entry for `name` and renumber. Returns `false` if not found.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(idx) = self.position(name) else {
            return false;
        };
        self.entries.remove(idx);
        self.renumber();
        true
    }

    /// Move the listed layers to the front, in the listed order, and apply their enabled flags.
    ///
    /// Unlisted layers keep their relative order after the listed ones. Unknown names are
    /// skipped with a warning.
    pub fn apply_plan<'a>(&mut self, plan: impl IntoIterator<Item = (&'a str, bool)>) {
        let mut next = 0usize;
        for (name, enabled) in plan {
            let Some(idx) = self.position(name) else {
                warn!(layer = name, "layer plan names an unknown category");
                continue;
            };
            if idx < next {
                // Listed twice; keep the first placement.
                continue;
            }
            self.entries[idx].enabled = enabled;
            let entry = self.entries.remove(idx);
            self.entries.insert(next, entry);
            next += 1;
        }
        self.renumber();
    }

    fn renumber(&mut self) {
        for (i, e) in self.entries.iter_mut().enumerate() {
            e.order = i;
        }
    }
}

/// Case-insensitive category name comparison.
pub(crate) fn names_equal(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/layers.rs"]
mod tests;
