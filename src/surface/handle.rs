//! The live rendering-surface handle and its sub-resources.
//!
//! Exactly one non-null handle exists process-wide at any time; the
//! [`ViewerRegistry`](crate::surface::registry::ViewerRegistry) owns it
//! exclusively and is the only place that may create or destroy one.

use crate::{
    core::{config::SurfaceConfig, geo::Cartesian3},
    host::HostElement,
    surface::entity::EntityCollection,
    Result,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique identity of one live handle. Ids are never reused, so a
/// stale id can always be distinguished from the current handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Projection mode of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMode {
    Scene2D,
    Scene3D,
    ColumbusView,
}

/// A basemap imagery source attached to the scene
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryLayer {
    pub name: String,
    pub url: String,
}

impl ImageryLayer {
    pub fn open_street_map() -> Self {
        Self {
            name: "OpenStreetMap".to_string(),
            url: "https://tile.openstreetmap.org/".to_string(),
        }
    }
}

/// Camera sub-resource. Flights resolve immediately in this model; the
/// rendering backend interpolates the actual motion.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Cartesian3,
    last_flight_duration: Option<f64>,
}

impl Camera {
    pub const DEFAULT_FLIGHT_SECONDS: f64 = 3.0;

    fn new() -> Self {
        Self {
            position: Cartesian3::from_degrees(0.0, 0.0, crate::InitialView::DEFAULT_HEIGHT),
            last_flight_duration: None,
        }
    }

    /// Jumps the camera to a destination without animation
    pub fn set_view(&mut self, destination: Cartesian3) {
        self.position = destination;
        self.last_flight_duration = None;
    }

    /// Animates the camera to a destination over the given duration
    pub fn fly_to(&mut self, destination: Cartesian3, duration_secs: f64) {
        self.position = destination;
        self.last_flight_duration = Some(duration_secs);
    }

    pub fn position(&self) -> Cartesian3 {
        self.position
    }

    pub fn last_flight_duration(&self) -> Option<f64> {
        self.last_flight_duration
    }
}

/// Globe styling knobs a caller may set once the viewer is ready
#[derive(Debug, Clone, PartialEq)]
pub struct Globe {
    pub enable_lighting: bool,
    pub show_water_effect: bool,
}

impl Default for Globe {
    fn default() -> Self {
        Self {
            enable_lighting: false,
            show_water_effect: false,
        }
    }
}

/// Scene sub-resource: projection mode, viewport, render pacing, basemap
pub struct Scene {
    mode: SceneMode,
    viewport: (f64, f64),
    imagery_layers: Vec<ImageryLayer>,
    render_requests: u64,
    last_morph_duration: Option<f64>,
    pub request_render_mode: bool,
    pub maximum_render_time_change: f64,
    pub fog_enabled: bool,
    pub sky_atmosphere_show: bool,
    pub globe: Globe,
}

impl Scene {
    fn new(viewport: (f64, f64)) -> Self {
        Self {
            mode: SceneMode::Scene3D,
            viewport,
            imagery_layers: Vec::new(),
            render_requests: 0,
            last_morph_duration: None,
            request_render_mode: false,
            maximum_render_time_change: 0.0,
            fog_enabled: true,
            sky_atmosphere_show: true,
            globe: Globe::default(),
        }
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    /// Re-layouts the framebuffer/viewport to a new size
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// Requests one frame; in request-render mode frames are produced only
    /// on explicit request
    pub fn request_render(&mut self) {
        self.render_requests += 1;
    }

    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    pub fn morph_to_2d(&mut self, duration_secs: f64) {
        self.mode = SceneMode::Scene2D;
        self.last_morph_duration = Some(duration_secs);
    }

    pub fn morph_to_3d(&mut self, duration_secs: f64) {
        self.mode = SceneMode::Scene3D;
        self.last_morph_duration = Some(duration_secs);
    }

    pub fn last_morph_duration(&self) -> Option<f64> {
        self.last_morph_duration
    }

    pub fn imagery_layers(&self) -> &[ImageryLayer] {
        &self.imagery_layers
    }

    pub fn clear_imagery(&mut self) {
        self.imagery_layers.clear();
    }

    pub fn add_imagery_layer(&mut self, layer: ImageryLayer) {
        self.imagery_layers.push(layer);
    }
}

/// The live rendering surface bound to one host container.
///
/// Owns the camera, the scene, and the entity collection; destroying the
/// handle implicitly clears all entities.
pub struct ViewerHandle {
    id: HandleId,
    element: Arc<dyn HostElement>,
    config: SurfaceConfig,
    target_frame_rate: Option<u32>,
    pub camera: Camera,
    pub scene: Scene,
    pub entities: EntityCollection,
}

impl ViewerHandle {
    pub(crate) fn new(element: Arc<dyn HostElement>, config: SurfaceConfig) -> Self {
        let viewport = element.offset_size();
        let mut scene = Scene::new(viewport);
        scene.request_render_mode = config.request_render_mode;
        scene.maximum_render_time_change = config.maximum_render_time_change;

        Self {
            id: HandleId::next(),
            element,
            config,
            target_frame_rate: None,
            camera: Camera::new(),
            scene,
            entities: EntityCollection::new(),
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Re-reads the container's rendered size and re-layouts the scene.
    /// Zero sizes are ignored so a hidden container cannot collapse the
    /// framebuffer.
    pub fn resize(&mut self) {
        let (width, height) = self.element.offset_size();
        if width > 0.0 && height > 0.0 {
            self.scene.set_viewport(width, height);
        }
    }

    pub fn set_target_frame_rate(&mut self, fps: Option<u32>) {
        self.target_frame_rate = fps;
    }

    pub fn target_frame_rate(&self) -> Option<u32> {
        self.target_frame_rate
    }

    /// Releases the underlying surface resources. Entities are owned by
    /// the handle, so they go with it.
    pub(crate) fn release(&mut self) -> Result<()> {
        self.entities.clear();
        Ok(())
    }
}
