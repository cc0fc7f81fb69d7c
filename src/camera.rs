//! Camera convenience layer: named-location fly-to and 2D/3D projection
//! morphing, routed through the registry-owned handle.

use crate::{
    core::geo::Cartesian3,
    surface::{handle::SceneMode, registry::ViewerRegistry},
    Result,
};

/// Locations the surrounding UI can fly to by name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NamedLocation {
    NewYork,
    London,
}

impl NamedLocation {
    /// Camera height used for named-location flights
    pub const FLIGHT_HEIGHT: f64 = 1_000_000.0;

    /// (longitude, latitude) in degrees
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            Self::NewYork => (-74.0060, 40.7128),
            Self::London => (-0.1276, 51.5074),
        }
    }

    pub fn destination(&self) -> Cartesian3 {
        let (longitude, latitude) = self.coordinates();
        Cartesian3::from_degrees(longitude, latitude, Self::FLIGHT_HEIGHT)
    }
}

/// Fly-to and projection operations on the live surface
pub struct CameraController {
    registry: ViewerRegistry,
}

impl CameraController {
    /// Duration of the 2D/3D morph transition
    pub const PROJECTION_MORPH_SECONDS: f64 = 2.0;

    pub fn new(registry: ViewerRegistry) -> Self {
        Self { registry }
    }

    /// Animates the camera to a named location over the given duration
    pub fn fly_to(&self, location: NamedLocation, duration_secs: f64) -> Result<()> {
        self.registry
            .fly_to_with_duration(location.destination(), duration_secs)
    }

    /// Morphs the scene to the other projection mode and returns the new
    /// mode. Columbus view is treated as a 3D-family mode and morphs to 2D.
    pub fn toggle_projection(&self) -> Result<SceneMode> {
        self.registry.with_handle(|handle| {
            match handle.scene.mode() {
                SceneMode::Scene2D => {
                    handle.scene.morph_to_3d(Self::PROJECTION_MORPH_SECONDS)
                }
                SceneMode::Scene3D | SceneMode::ColumbusView => {
                    handle.scene.morph_to_2d(Self::PROJECTION_MORPH_SECONDS)
                }
            }
            handle.scene.request_render();
            handle.scene.mode()
        })
    }
}
