//! Singleton service owning the one active viewer handle.
//!
//! The registry is the only place that may create or destroy the handle.
//! Interested components observe the current handle through a plain
//! publish/subscribe interface instead of caching it themselves.

use crate::{
    core::config::{InitialView, SurfaceConfig, SurfaceOverrides},
    core::geo::Cartesian3,
    host::HostElement,
    prelude::HashMap,
    surface::{
        entity::{EntityId, EntitySpec},
        factory::{SoftwareSurfaceFactory, SurfaceFactory},
        handle::{Camera, HandleId, ImageryLayer, ViewerHandle},
    },
    GlobeError, Result,
};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifies one handle-state subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type HandleObserver = Arc<dyn Fn(Option<HandleId>) + Send + Sync>;

struct RegistryInner {
    handle: Option<ViewerHandle>,
    observers: HashMap<SubscriptionId, HandleObserver>,
    next_subscription: u64,
}

/// Owns the process-wide viewer handle and routes all camera, entity, and
/// render operations to it.
///
/// Handle state only ever transitions `None -> Some` (successful
/// initialization) and `Some -> None` (destruction); constructing the
/// handle, applying post-init defaults, and publishing it happen as one
/// atomic step under the registry lock.
#[derive(Clone)]
pub struct ViewerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    factory: Arc<dyn SurfaceFactory>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::with_factory(Arc::new(SoftwareSurfaceFactory::default()))
    }

    pub fn with_factory(factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                handle: None,
                observers: HashMap::default(),
                next_subscription: 1,
            })),
            factory,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Constructs the handle from the merged configuration, attaches the
    /// default basemap, applies performance defaults, and publishes it.
    ///
    /// Idempotent: if a handle already exists it is returned unchanged
    /// with a warning, never replaced.
    pub fn initialize(
        &self,
        element: Arc<dyn HostElement>,
        overrides: &SurfaceOverrides,
    ) -> Result<HandleId> {
        let id = {
            let mut inner = self.lock();
            if let Some(handle) = &inner.handle {
                log::warn!("globe viewer already initialized");
                return Ok(handle.id());
            }

            let config = SurfaceConfig::merge(&SurfaceConfig::default(), overrides);
            let mut handle = self.factory.create(element, config)?;

            handle.scene.clear_imagery();
            handle.scene.add_imagery_layer(ImageryLayer::open_street_map());
            handle.scene.request_render_mode = true;
            handle.scene.maximum_render_time_change = f64::INFINITY;
            handle.scene.fog_enabled = false;
            handle.set_target_frame_rate(Some(60));

            let id = handle.id();
            inner.handle = Some(handle);
            id
        };

        log::info!("globe viewer initialized");
        self.notify(Some(id));
        Ok(id)
    }

    /// Current handle id, if a handle exists
    pub fn handle_id(&self) -> Option<HandleId> {
        self.lock().handle.as_ref().map(|handle| handle.id())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().handle.is_some()
    }

    /// Runs a closure against the live handle; fails with
    /// [`GlobeError::NotInitialized`] when there is none
    pub fn with_handle<R>(&self, f: impl FnOnce(&mut ViewerHandle) -> R) -> Result<R> {
        let mut inner = self.lock();
        match inner.handle.as_mut() {
            Some(handle) => Ok(f(handle)),
            None => Err(GlobeError::NotInitialized),
        }
    }

    /// Flies the camera to a destination with the default flight duration
    pub fn fly_to(&self, destination: Cartesian3) -> Result<()> {
        self.fly_to_with_duration(destination, Camera::DEFAULT_FLIGHT_SECONDS)
    }

    pub fn fly_to_with_duration(
        &self,
        destination: Cartesian3,
        duration_secs: f64,
    ) -> Result<()> {
        self.with_handle(|handle| {
            handle.camera.fly_to(destination, duration_secs);
            handle.scene.request_render();
        })
    }

    /// Flies the camera to an entity; resolves to whether the entity was
    /// found in the collection
    pub fn fly_to_entity(&self, id: EntityId) -> Result<bool> {
        self.with_handle(|handle| match handle.entities.get(id) {
            Some(entity) => {
                let destination = entity.spec.position.to_cartesian();
                handle.camera.fly_to(destination, Camera::DEFAULT_FLIGHT_SECONDS);
                handle.scene.request_render();
                true
            }
            None => false,
        })
    }

    /// Sets the camera view; `height` defaults to 10,000,000 meters
    pub fn set_view(&self, longitude: f64, latitude: f64, height: Option<f64>) -> Result<()> {
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return Err(GlobeError::InvalidCoordinates(format!(
                "({longitude}, {latitude})"
            )));
        }
        let height = height.unwrap_or(InitialView::DEFAULT_HEIGHT);
        self.with_handle(|handle| {
            handle
                .camera
                .set_view(Cartesian3::from_degrees(longitude, latitude, height));
            handle.scene.request_render();
        })
    }

    pub fn set_initial_view(&self, view: &InitialView) -> Result<()> {
        self.set_view(view.longitude, view.latitude, Some(view.height))
    }

    pub fn add_entity(&self, spec: EntitySpec) -> Result<EntityId> {
        self.with_handle(|handle| {
            let id = handle.entities.add(spec);
            handle.scene.request_render();
            id
        })
    }

    /// Removes an entity; resolves to whether it was present
    pub fn remove_entity(&self, id: EntityId) -> Result<bool> {
        self.with_handle(|handle| {
            let removed = handle.entities.remove(id);
            if removed {
                handle.scene.request_render();
            }
            removed
        })
    }

    pub fn clear_entities(&self) -> Result<()> {
        self.with_handle(|handle| {
            handle.entities.clear();
            handle.scene.request_render();
        })
    }

    pub fn entity_count(&self) -> usize {
        self.lock()
            .handle
            .as_ref()
            .map(|handle| handle.entities.len())
            .unwrap_or(0)
    }

    /// Requests one frame. Best-effort: a no-op without a handle.
    pub fn render(&self) {
        let mut inner = self.lock();
        if let Some(handle) = inner.handle.as_mut() {
            handle.scene.request_render();
        }
    }

    /// Re-layouts the scene to the container's current size and requests a
    /// render pass
    pub fn resize(&self) -> Result<()> {
        self.with_handle(|handle| {
            handle.resize();
            handle.scene.request_render();
        })
    }

    /// Resize path for the watcher: acts only while the registry still
    /// owns the same handle the watcher was armed with. Takes the observed
    /// dimensions directly so the element is never re-read from inside a
    /// resize notification.
    pub(crate) fn relayout_if_current(&self, id: HandleId, width: f64, height: f64) -> bool {
        let mut inner = self.lock();
        match inner.handle.as_mut() {
            Some(handle) if handle.id() == id => {
                handle.scene.set_viewport(width, height);
                handle.scene.request_render();
                true
            }
            _ => false,
        }
    }

    /// Releases the handle and publishes the `None` transition. Release
    /// failures are logged, never propagated; safe to call when no handle
    /// exists.
    pub fn destroy(&self) {
        let destroyed = {
            let mut inner = self.lock();
            match inner.handle.take() {
                Some(mut handle) => {
                    if let Err(e) = handle.release() {
                        log::error!("error destroying globe viewer: {e}");
                    }
                    true
                }
                None => false,
            }
        };

        if destroyed {
            log::info!("globe viewer destroyed");
            self.notify(None);
        }
    }

    /// Registers a handle-state observer. The current value is delivered
    /// immediately; subsequent transitions are delivered until
    /// [`ViewerRegistry::unsubscribe`].
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<HandleId>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let observer: HandleObserver = Arc::new(callback);
        let (id, current) = {
            let mut inner = self.lock();
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;
            inner.observers.insert(id, observer.clone());
            (id, inner.handle.as_ref().map(|handle| handle.id()))
        };
        observer(current);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().observers.remove(&id);
    }

    // Observers run outside the lock so they may call back into the
    // registry.
    fn notify(&self, current: Option<HandleId>) {
        let observers: Vec<HandleObserver> = self.lock().observers.values().cloned().collect();
        for observer in observers {
            observer(current);
        }
    }
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<ViewerRegistry> = Lazy::new(ViewerRegistry::new);

/// Process-wide registry instance
pub fn global() -> &'static ViewerRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimElement;
    use crate::surface::handle::SceneMode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sized_element() -> Arc<SimElement> {
        Arc::new(SimElement::with_size(800.0, 600.0))
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let registry = ViewerRegistry::new();
        let element = sized_element();

        let first = registry
            .initialize(element.clone(), &SurfaceOverrides::new())
            .unwrap();
        let second = registry
            .initialize(element, &SurfaceOverrides::new())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.handle_id(), Some(first));
    }

    #[test]
    fn test_initialize_applies_defaults() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        registry
            .with_handle(|handle| {
                assert!(!handle.scene.fog_enabled);
                assert!(handle.scene.request_render_mode);
                assert!(handle.scene.maximum_render_time_change.is_infinite());
                assert_eq!(handle.target_frame_rate(), Some(60));
                assert_eq!(handle.scene.imagery_layers().len(), 1);
                assert_eq!(handle.scene.imagery_layers()[0].name, "OpenStreetMap");
            })
            .unwrap();
    }

    #[test]
    fn test_operations_fail_before_initialize() {
        let registry = ViewerRegistry::new();

        let destination = Cartesian3::from_degrees(0.0, 0.0, 1_000_000.0);
        assert_eq!(
            registry.fly_to(destination),
            Err(GlobeError::NotInitialized)
        );
        assert_eq!(
            registry.set_view(-74.0060, 40.7128, None),
            Err(GlobeError::NotInitialized)
        );
        assert_eq!(
            registry.add_entity(EntitySpec::at_degrees(0.0, 0.0)),
            Err(GlobeError::NotInitialized)
        );
        assert_eq!(
            registry.remove_entity(EntityId(1)),
            Err(GlobeError::NotInitialized)
        );
        assert_eq!(registry.clear_entities(), Err(GlobeError::NotInitialized));

        // render is best-effort, never an error
        registry.render();
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_destroy_is_idempotent_and_clears_entities() {
        let registry = ViewerRegistry::new();
        registry.destroy(); // no handle yet: no-op

        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();
        registry
            .add_entity(EntitySpec::at_degrees(-0.1276, 51.5074))
            .unwrap();
        assert_eq!(registry.entity_count(), 1);

        registry.destroy();
        assert!(!registry.is_initialized());
        assert_eq!(registry.entity_count(), 0);

        registry.destroy(); // still a no-op
    }

    #[test]
    fn test_entity_round_trip() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        let id = registry
            .add_entity(EntitySpec::at_degrees(-74.0060, 40.7128))
            .unwrap();
        assert_eq!(registry.entity_count(), 1);
        assert!(registry.remove_entity(id).unwrap());
        assert_eq!(registry.entity_count(), 0);
        assert!(!registry.remove_entity(id).unwrap());

        registry
            .add_entity(EntitySpec::at_degrees(0.0, 0.0))
            .unwrap();
        registry
            .add_entity(EntitySpec::at_degrees(10.0, 10.0))
            .unwrap();
        registry.clear_entities().unwrap();
        assert_eq!(registry.entity_count(), 0);
    }

    #[test]
    fn test_set_view_default_height() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        registry.set_view(-74.0060, 40.7128, None).unwrap();
        let expected = Cartesian3::from_degrees(-74.0060, 40.7128, 10_000_000.0);
        let position = registry.with_handle(|h| h.camera.position()).unwrap();
        assert_eq!(position, expected);
    }

    #[test]
    fn test_set_view_rejects_invalid_coordinates() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        assert!(matches!(
            registry.set_view(-200.0, 0.0, None),
            Err(GlobeError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_fly_to_entity() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        let id = registry
            .add_entity(EntitySpec::at_degrees(-0.1276, 51.5074))
            .unwrap();
        assert!(registry.fly_to_entity(id).unwrap());

        registry.remove_entity(id).unwrap();
        assert!(!registry.fly_to_entity(id).unwrap());
    }

    #[test]
    fn test_subscription_delivers_current_and_transitions() {
        let registry = ViewerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        let subscription = registry.subscribe(move |current| {
            seen_clone
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(current);
        });

        let id = registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();
        registry.destroy();

        registry.unsubscribe(subscription);
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        let events = seen.lock().unwrap_or_else(PoisonError::into_inner).clone();
        assert_eq!(events, vec![None, Some(id), None]);
    }

    #[test]
    fn test_overrides_reach_the_handle() {
        let registry = ViewerRegistry::new();
        let overrides = SurfaceOverrides::new()
            .with_fullscreen_button(true)
            .with_timeline(true);
        registry.initialize(sized_element(), &overrides).unwrap();

        registry
            .with_handle(|handle| {
                assert!(handle.config().fullscreen_button);
                assert!(handle.config().timeline);
                // untouched keys keep their defaults
                assert!(handle.config().home_button);
            })
            .unwrap();
    }

    #[test]
    fn test_construction_failure_leaves_registry_empty() {
        struct FailingFactory;
        impl SurfaceFactory for FailingFactory {
            fn create(
                &self,
                _element: Arc<dyn HostElement>,
                _config: SurfaceConfig,
            ) -> Result<ViewerHandle> {
                Err(GlobeError::Construction("out of GPU memory".to_string()))
            }
        }

        let registry = ViewerRegistry::with_factory(Arc::new(FailingFactory));
        let err = registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap_err();
        assert!(matches!(err, GlobeError::Construction(_)));
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_render_requests_accumulate() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        let before = registry.with_handle(|h| h.scene.render_requests()).unwrap();
        registry.render();
        registry.render();
        let after = registry.with_handle(|h| h.scene.render_requests()).unwrap();
        assert_eq!(after, before + 2);
    }

    #[test]
    fn test_projection_state_visible_through_handle() {
        let registry = ViewerRegistry::new();
        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();

        registry
            .with_handle(|handle| handle.scene.morph_to_2d(2.0))
            .unwrap();
        let mode = registry.with_handle(|h| h.scene.mode()).unwrap();
        assert_eq!(mode, SceneMode::Scene2D);
    }

    #[test]
    fn test_subscriber_may_reenter_registry() {
        let registry = ViewerRegistry::new();
        let observed = Arc::new(AtomicUsize::new(0));

        let registry_clone = registry.clone();
        let observed_clone = observed.clone();
        registry.subscribe(move |current| {
            // Re-entrant read must not deadlock
            let initialized = registry_clone.is_initialized();
            assert_eq!(initialized, current.is_some());
            observed_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry
            .initialize(sized_element(), &SurfaceOverrides::new())
            .unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }
}
