//! STAC catalog search for Sentinel-2 L2A scenes.
//!
//! The catalog is treated as a black-box query service behind the
//! [`SceneCatalog`] trait; the production implementation ([`StacApi`])
//! POSTs to a STAC `/search` endpoint. Scene selection policy (least-cloudy
//! scene, two-tier cloud-cover relaxation) lives in [`search_best_scene`]
//! and is independent of the transport.

pub mod client;
pub mod models;
pub mod search;

pub use client::{SceneCatalog, StacApi};
pub use models::{SceneReference, BAND_NIR, BAND_RED};
pub use search::{search_best_scene, PRIMARY_CLOUD_THRESHOLD, RELAXED_CLOUD_THRESHOLD};
