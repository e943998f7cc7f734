//! STAC search response models and the scene reference handed to readers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel-2 L2A asset key for the red band (10 m).
pub const BAND_RED: &str = "B04";

/// Sentinel-2 L2A asset key for the near-infrared band (10 m).
pub const BAND_NIR: &str = "B08";

/// A STAC `/search` response (GeoJSON FeatureCollection subset).
///
/// Only the fields the selection policy needs are modeled; everything else
/// in the item payload is ignored on deserialization.
#[derive(Debug, Deserialize)]
pub struct ItemCollection {
    #[serde(default)]
    pub features: Vec<StacItem>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A hypermedia link on a search response; `rel: "next"` carries paging.
///
/// For POST searches the catalog may hand back the next request body,
/// either whole or as a patch to merge over the previous one.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub merge: bool,
}

#[derive(Debug, Deserialize)]
pub struct StacItem {
    pub id: String,
    pub properties: ItemProperties,
    #[serde(default)]
    pub assets: HashMap<String, Asset>,
}

#[derive(Debug, Deserialize)]
pub struct ItemProperties {
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Option<f64>,
    pub datetime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Asset {
    pub href: String,
}

/// An immutable reference to a single catalog scene.
///
/// Holds the opaque scene id, the per-band asset hrefs, and the scene's
/// scalar cloud-cover percentage. Created by catalog search and owned by
/// the request that fetched it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneReference {
    pub id: String,
    pub cloud_cover: f64,
    pub assets: HashMap<String, String>,
}

impl SceneReference {
    /// Resolve the asset href for a named band, if the scene carries it.
    pub fn band_href(&self, band: &str) -> Option<&str> {
        self.assets.get(band).map(String::as_str)
    }
}

impl From<StacItem> for SceneReference {
    fn from(item: StacItem) -> Self {
        // Scenes without a cloud-cover property sort last, matching the
        // original selection behavior.
        let cloud_cover = item.properties.cloud_cover.unwrap_or(1000.0);
        let assets = item
            .assets
            .into_iter()
            .map(|(name, asset)| (name, asset.href))
            .collect();
        Self {
            id: item.id,
            cloud_cover,
            assets,
        }
    }
}
