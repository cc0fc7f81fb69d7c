//! Rendering-surface construction seam.
//!
//! The registry constructs handles through a [`SurfaceFactory`], so a GPU
//! backend can be plugged in without touching the lifecycle logic. The
//! asset base URL is an explicit constructor parameter of the factory
//! rather than a process-global write.

use crate::{
    core::config::SurfaceConfig,
    host::HostElement,
    surface::handle::ViewerHandle,
    Result,
};
use std::sync::Arc;

/// Constructs live surfaces. `create` receives the merged, total
/// configuration; failures surface as
/// [`GlobeError::Construction`](crate::GlobeError::Construction).
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, element: Arc<dyn HostElement>, config: SurfaceConfig)
        -> Result<ViewerHandle>;
}

/// Default software-backed factory
pub struct SoftwareSurfaceFactory {
    asset_base_url: String,
}

impl SoftwareSurfaceFactory {
    pub const DEFAULT_ASSET_BASE_URL: &'static str = "/globe-assets/";

    pub fn new(asset_base_url: impl Into<String>) -> Self {
        Self {
            asset_base_url: asset_base_url.into(),
        }
    }

    pub fn asset_base_url(&self) -> &str {
        &self.asset_base_url
    }
}

impl Default for SoftwareSurfaceFactory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ASSET_BASE_URL)
    }
}

impl SurfaceFactory for SoftwareSurfaceFactory {
    fn create(
        &self,
        element: Arc<dyn HostElement>,
        config: SurfaceConfig,
    ) -> Result<ViewerHandle> {
        log::debug!("creating software surface (assets at {})", self.asset_base_url);
        Ok(ViewerHandle::new(element, config))
    }
}
