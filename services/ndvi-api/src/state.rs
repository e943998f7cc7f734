//! Application state for the NDVI API.

use std::sync::Arc;

use anyhow::Result;

use crate::analysis::{AnalysisBackend, HttpAnalysisBackend};
use crate::config::ServiceConfig;
use crate::imagery::{ImageryService, StacImagery};

/// Shared application state.
///
/// Both back ends sit behind trait objects so integration tests can swap
/// in fakes.
pub struct AppState {
    /// STAC/COG NDVI pipeline.
    pub imagery: Arc<dyn ImageryService>,

    /// Managed analysis platform.
    pub analysis: Arc<dyn AnalysisBackend>,

    /// Resolved configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create state from environment configuration.
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig::from_env();

        let imagery = StacImagery::new(&config.stac_root, &config.stac_collection)?;
        let analysis = HttpAnalysisBackend::new(&config.analysis_root)?;

        Ok(Self {
            imagery: Arc::new(imagery),
            analysis: Arc::new(analysis),
            config,
        })
    }

    /// Build state around explicit back ends (used by tests).
    pub fn with_backends(
        imagery: Arc<dyn ImageryService>,
        analysis: Arc<dyn AnalysisBackend>,
    ) -> Self {
        Self {
            imagery,
            analysis,
            config: ServiceConfig::from_env(),
        }
    }
}
