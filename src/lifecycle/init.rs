//! Deferred, size-polled viewer initialization.
//!
//! A host element often has no pixel dimensions on the scheduling turn it
//! mounts. The initializer polls the element's rendered size, retrying on
//! zero-size reads, and constructs the surface through the registry once
//! both dimensions are positive.
//!
//! The state machine is poll-driven so callers with their own scheduler can
//! step it directly; [`SurfaceMount`](crate::lifecycle::mount::SurfaceMount)
//! drives it on tokio time.

use crate::{
    core::config::{InitialView, RetryPolicy, SurfaceOverrides},
    host::HostElement,
    lifecycle::{container, resize::ResizeWatcher},
    surface::{handle::HandleId, registry::ViewerRegistry},
    GlobeError, Result,
};
use std::sync::Arc;
use std::time::Duration;

/// Initialization lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Idle,
    Polling,
    Ready,
    Failed,
}

/// Outcome of one poll step
#[derive(Debug, Clone, PartialEq)]
pub enum InitProgress {
    /// The element had no size; poll again after the given delay
    Scheduled(Duration),
    Ready(HandleId),
    Failed(GlobeError),
}

type ReadyListener = Box<dyn Fn(HandleId) + Send>;
type ErrorListener = Box<dyn Fn(&GlobeError) + Send>;

/// Drives one element from mount to a live surface
pub struct ViewerInitializer {
    element: Arc<dyn HostElement>,
    overrides: SurfaceOverrides,
    initial_view: Option<InitialView>,
    auto_resize: bool,
    retry: RetryPolicy,
    state: InitState,
    attempts: u32,
    outcome: Option<InitProgress>,
    watcher: ResizeWatcher,
    ready_listeners: Vec<ReadyListener>,
    error_listeners: Vec<ErrorListener>,
}

impl ViewerInitializer {
    pub fn new(element: Arc<dyn HostElement>) -> Self {
        Self {
            element,
            overrides: SurfaceOverrides::default(),
            initial_view: None,
            auto_resize: true,
            retry: RetryPolicy::default(),
            state: InitState::Idle,
            attempts: 0,
            outcome: None,
            watcher: ResizeWatcher::new(),
            ready_listeners: Vec::new(),
            error_listeners: Vec::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: SurfaceOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_initial_view(mut self, view: InitialView) -> Self {
        self.initial_view = Some(view);
        self
    }

    pub fn with_auto_resize(mut self, enabled: bool) -> Self {
        self.auto_resize = enabled;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registers a listener for the ready signal; fired exactly once, with
    /// the new handle's id
    pub fn on_ready(&mut self, listener: impl Fn(HandleId) + Send + 'static) {
        self.ready_listeners.push(Box::new(listener));
    }

    /// Registers a listener for the error signal; fired once with the
    /// failure cause
    pub fn on_error(&mut self, listener: impl Fn(&GlobeError) + Send + 'static) {
        self.error_listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// Zero-size polls seen so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Prepares the container and enters the polling state. The first poll
    /// belongs on the caller's next scheduling turn, after the host layout
    /// has settled.
    pub fn start(&mut self) {
        if self.state != InitState::Idle {
            return;
        }
        container::prepare(&*self.element);
        self.state = InitState::Polling;
    }

    /// Runs one poll step. Terminal outcomes are sticky: once `Ready` or
    /// `Failed` has been returned, further calls return the same outcome
    /// without re-firing listeners.
    pub fn poll_once(&mut self, registry: &ViewerRegistry) -> InitProgress {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        if self.state == InitState::Idle {
            self.start();
        }

        let (width, height) = self.element.offset_size();
        if width <= 0.0 || height <= 0.0 {
            self.attempts += 1;
            if let Some(max) = self.retry.max_attempts {
                if self.attempts >= max {
                    return self.fail(GlobeError::SizePollTimeout {
                        attempts: self.attempts,
                    });
                }
            }
            log::warn!(
                "globe container has no dimensions (attempt {}); retrying",
                self.attempts
            );
            return InitProgress::Scheduled(self.retry.delay_for_attempt(self.attempts));
        }

        match self.construct(registry) {
            Ok(id) => {
                self.state = InitState::Ready;
                self.outcome = Some(InitProgress::Ready(id));
                for listener in &self.ready_listeners {
                    listener(id);
                }
                InitProgress::Ready(id)
            }
            Err(e) => {
                log::error!("failed to initialize globe surface: {e}");
                self.fail(e)
            }
        }
    }

    /// Construct, apply the initial view, arm auto-resize. Any failure
    /// here tears the half-built handle back down so the registry is left
    /// empty.
    fn construct(&mut self, registry: &ViewerRegistry) -> Result<HandleId> {
        let id = registry.initialize(self.element.clone(), &self.overrides)?;

        if let Err(e) = self.finish_setup(registry, id) {
            registry.destroy();
            return Err(e);
        }
        Ok(id)
    }

    fn finish_setup(&mut self, registry: &ViewerRegistry, id: HandleId) -> Result<()> {
        if let Some(view) = &self.initial_view {
            registry.set_initial_view(view)?;
        }
        if self.auto_resize {
            self.watcher
                .arm(self.element.clone(), registry.clone(), id);
        }
        Ok(())
    }

    fn fail(&mut self, error: GlobeError) -> InitProgress {
        self.state = InitState::Failed;
        for listener in &self.error_listeners {
            listener(&error);
        }
        let outcome = InitProgress::Failed(error);
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Cancels resize forwarding; used on unmount
    pub fn disarm_resize(&mut self) {
        self.watcher.disarm();
    }

    pub fn is_resize_armed(&self) -> bool {
        self.watcher.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SurfaceConfig;
    use crate::host::SimElement;
    use crate::surface::factory::SurfaceFactory;
    use crate::surface::handle::ViewerHandle;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_zero_size_retries_then_ready() {
        let element = Arc::new(SimElement::new());
        let registry = ViewerRegistry::new();
        let mut init = ViewerInitializer::new(element.clone());

        let ready_count = Arc::new(AtomicU32::new(0));
        let ready_clone = ready_count.clone();
        init.on_ready(move |_| {
            ready_clone.fetch_add(1, Ordering::SeqCst);
        });

        init.start();
        assert_eq!(init.state(), InitState::Polling);

        // Two zero-size polls, then the layout settles
        assert!(matches!(
            init.poll_once(&registry),
            InitProgress::Scheduled(_)
        ));
        assert!(matches!(
            init.poll_once(&registry),
            InitProgress::Scheduled(_)
        ));
        element.set_size(800.0, 600.0);

        let progress = init.poll_once(&registry);
        assert!(matches!(progress, InitProgress::Ready(_)));
        assert_eq!(init.attempts(), 2);
        assert_eq!(init.state(), InitState::Ready);
        assert_eq!(ready_count.load(Ordering::SeqCst), 1);

        // Terminal outcome is sticky and does not re-fire the signal
        assert_eq!(init.poll_once(&registry), progress);
        assert_eq!(ready_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_delay_follows_policy() {
        let element = Arc::new(SimElement::new());
        let registry = ViewerRegistry::new();
        let mut init = ViewerInitializer::new(element)
            .with_retry_policy(RetryPolicy::default().with_backoff());

        assert_eq!(
            init.poll_once(&registry),
            InitProgress::Scheduled(Duration::from_millis(100))
        );
        assert_eq!(
            init.poll_once(&registry),
            InitProgress::Scheduled(Duration::from_millis(200))
        );
    }

    #[test]
    fn test_bounded_retry_times_out() {
        let element = Arc::new(SimElement::new());
        let registry = ViewerRegistry::new();
        let mut init =
            ViewerInitializer::new(element).with_retry_policy(RetryPolicy::bounded(3));

        let errors = Arc::new(AtomicU32::new(0));
        let errors_clone = errors.clone();
        init.on_error(move |e| {
            assert!(matches!(e, GlobeError::SizePollTimeout { attempts: 3 }));
            errors_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(
            init.poll_once(&registry),
            InitProgress::Scheduled(_)
        ));
        assert!(matches!(
            init.poll_once(&registry),
            InitProgress::Scheduled(_)
        ));
        assert_eq!(
            init.poll_once(&registry),
            InitProgress::Failed(GlobeError::SizePollTimeout { attempts: 3 })
        );
        assert_eq!(init.state(), InitState::Failed);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_ready_applies_view_and_arms_resize() {
        let element = Arc::new(SimElement::with_size(800.0, 600.0));
        let registry = ViewerRegistry::new();
        let mut init = ViewerInitializer::new(element.clone())
            .with_initial_view(InitialView::new(-74.0060, 40.7128));

        assert!(matches!(init.poll_once(&registry), InitProgress::Ready(_)));
        assert!(init.is_resize_armed());
        assert_eq!(element.observer_count(), 1);

        let expected =
            crate::core::geo::Cartesian3::from_degrees(-74.0060, 40.7128, 10_000_000.0);
        let position = registry.with_handle(|h| h.camera.position()).unwrap();
        assert_eq!(position, expected);
    }

    #[test]
    fn test_auto_resize_disabled_leaves_watcher_unarmed() {
        let element = Arc::new(SimElement::with_size(800.0, 600.0));
        let registry = ViewerRegistry::new();
        let mut init = ViewerInitializer::new(element.clone()).with_auto_resize(false);

        assert!(matches!(init.poll_once(&registry), InitProgress::Ready(_)));
        assert!(!init.is_resize_armed());
        assert_eq!(element.observer_count(), 0);
    }

    #[test]
    fn test_construction_failure_is_not_retried() {
        struct FailingFactory;
        impl SurfaceFactory for FailingFactory {
            fn create(
                &self,
                _element: Arc<dyn HostElement>,
                _config: SurfaceConfig,
            ) -> Result<ViewerHandle> {
                Err(GlobeError::Construction("no adapter".to_string()))
            }
        }

        let element = Arc::new(SimElement::with_size(800.0, 600.0));
        let registry = ViewerRegistry::with_factory(Arc::new(FailingFactory));
        let mut init = ViewerInitializer::new(element);

        let errors = Arc::new(AtomicU32::new(0));
        let errors_clone = errors.clone();
        init.on_error(move |_| {
            errors_clone.fetch_add(1, Ordering::SeqCst);
        });

        let progress = init.poll_once(&registry);
        assert!(matches!(progress, InitProgress::Failed(GlobeError::Construction(_))));
        assert_eq!(init.state(), InitState::Failed);
        assert!(!registry.is_initialized());

        // Sticky: no second attempt, no second signal
        assert_eq!(init.poll_once(&registry), progress);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_view_failure_tears_the_handle_down() {
        let element = Arc::new(SimElement::with_size(800.0, 600.0));
        let registry = ViewerRegistry::new();
        // Latitude out of range: construction succeeds, view application
        // fails, the registry must be left empty
        let mut init = ViewerInitializer::new(element)
            .with_initial_view(InitialView::new(0.0, 120.0));

        let progress = init.poll_once(&registry);
        assert!(matches!(
            progress,
            InitProgress::Failed(GlobeError::InvalidCoordinates(_))
        ));
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_start_prepares_container() {
        let element = Arc::new(SimElement::new());
        let mut init = ViewerInitializer::new(element.clone());
        init.start();

        assert_eq!(element.inline_style("width").as_deref(), Some("100%"));
        assert_eq!(element.inline_style("height").as_deref(), Some("400px"));
        assert_eq!(element.inline_style("position").as_deref(), Some("relative"));
    }
}
