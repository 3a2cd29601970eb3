use crate::catalog::asset::Asset;
use crate::foundation::rng::UniformSource;

/// Draws one asset with probability proportional to its weight.
///
/// Weights are rarities clamped at zero. Zero-weight assets stay in the list but are never
/// selected while any positive weight exists. When every weight is zero the last asset is
/// returned, so a non-empty list always yields an asset.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedSampler;

impl WeightedSampler {
    /// Sample from `assets`. Returns `None` only for an empty list.
    pub fn sample<'a, R: UniformSource + ?Sized>(
        assets: &'a [Asset],
        rng: &mut R,
    ) -> Option<&'a Asset> {
        let last = assets.last()?;
        let total: u64 = assets.iter().map(Asset::weight).sum();
        if total == 0 {
            return Some(last);
        }

        let mut r = rng.below(total);
        for asset in assets {
            let w = asset.weight();
            if w == 0 {
                continue;
            }
            if r < w {
                return Some(asset);
            }
            r -= w;
        }
        Some(last)
    }

    /// Probability of each asset being drawn, in list order.
    pub fn probabilities(assets: &[Asset]) -> Vec<f64> {
        let total: u64 = assets.iter().map(Asset::weight).sum();
        if total == 0 {
            let mut out = vec![0.0; assets.len()];
            if let Some(last) = out.last_mut() {
                *last = 1.0;
            }
            return out;
        }
        assets
            .iter()
            .map(|a| a.weight() as f64 / total as f64)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
