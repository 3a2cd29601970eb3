use serde::{Deserialize, Serialize};

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::raster::PngCompression;
use crate::session::batch::GeneratedArtifact;

/// Description written into every metadata record unless overridden.
pub const DEFAULT_DESCRIPTION: &str = "Generated NFT with unique traits";

/// Image file extension used inside archives.
pub const IMAGE_EXT: &str = "png";

/// One `{trait_type, value}` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Category name.
    pub trait_type: String,
    /// Asset name picked for the category.
    pub value: String,
}

/// Per-artifact JSON record stored under `metadata/<id>.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    /// Display name, `NFT #<id>`.
    pub name: String,
    /// Collection-wide description.
    pub description: String,
    /// Image file name inside `images/`, e.g. `7.png`.
    pub image: String,
    /// One attribute per drawn trait, bottom layer first.
    pub attributes: Vec<Attribute>,
}

impl NftMetadata {
    /// Derive the record for `artifact`. Attributes follow the order traits were drawn in.
    pub fn for_artifact(artifact: &GeneratedArtifact, description: &str) -> Self {
        Self {
            name: artifact.name(),
            description: description.to_owned(),
            image: format!("{}.{IMAGE_EXT}", artifact.id),
            attributes: attributes_of(artifact),
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_pretty_json(&self) -> TesseraResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TesseraError::serde(format!("metadata for '{}': {e}", self.name)))
    }
}

/// Traits of a view projection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewMetadata {
    /// Drawn traits in layer order.
    pub traits: Vec<Attribute>,
}

/// What a host UI needs to list one artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactView {
    /// Rendered [`ArtifactId`](crate::ArtifactId): a number or `preview-<uuid>`.
    pub id: String,
    /// Display name, `NFT #<id>`.
    pub name: String,
    /// `data:image/png;base64,...`, absent when the artifact was not rasterized.
    pub image_url: Option<String>,
    /// Trait listing.
    pub metadata: ViewMetadata,
}

impl ArtifactView {
    /// Project `artifact`, encoding its raster as a PNG data URL.
    pub fn from_artifact(
        artifact: &GeneratedArtifact,
        compression: PngCompression,
    ) -> TesseraResult<Self> {
        let image_url = match &artifact.raster {
            Some(raster) => Some(raster.to_data_url(compression)?),
            None => None,
        };
        Ok(Self {
            id: artifact.id.to_string(),
            name: artifact.name(),
            image_url,
            metadata: ViewMetadata {
                traits: attributes_of(artifact),
            },
        })
    }
}

fn attributes_of(artifact: &GeneratedArtifact) -> Vec<Attribute> {
    artifact
        .traits
        .picks()
        .iter()
        .map(|pick| Attribute {
            trait_type: pick.category.clone(),
            value: pick.asset.name.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/export/metadata.rs"]
mod tests;
