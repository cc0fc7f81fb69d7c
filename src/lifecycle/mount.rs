//! One-stop mount for a host element.
//!
//! `SurfaceMount` ties container preparation, size polling, registry
//! initialization, and resize watching together, mirroring how an
//! embedding UI attaches the surface to one container and later detaches
//! it without destroying the shared handle.

use crate::{
    core::config::{InitialView, RetryPolicy, SurfaceOverrides},
    host::HostElement,
    lifecycle::init::{InitProgress, InitState, ViewerInitializer},
    surface::{handle::HandleId, registry::ViewerRegistry},
    GlobeError,
};
use std::sync::Arc;

/// Mount-time options
#[derive(Debug, Clone, PartialEq)]
pub struct MountOptions {
    pub config: SurfaceOverrides,
    pub initial_view: Option<InitialView>,
    pub auto_resize: bool,
    pub retry: RetryPolicy,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            config: SurfaceOverrides::default(),
            initial_view: None,
            auto_resize: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Binds one host element to the registry-owned surface
pub struct SurfaceMount {
    registry: ViewerRegistry,
    initializer: ViewerInitializer,
    handle: Option<HandleId>,
}

impl SurfaceMount {
    pub fn new(
        element: Arc<dyn HostElement>,
        registry: ViewerRegistry,
        options: MountOptions,
    ) -> Self {
        let mut initializer = ViewerInitializer::new(element)
            .with_overrides(options.config)
            .with_auto_resize(options.auto_resize)
            .with_retry_policy(options.retry);
        if let Some(view) = options.initial_view {
            initializer = initializer.with_initial_view(view);
        }

        Self {
            registry,
            initializer,
            handle: None,
        }
    }

    /// Registers a ready listener; must be called before attaching
    pub fn on_ready(&mut self, listener: impl Fn(HandleId) + Send + 'static) {
        self.initializer.on_ready(listener);
    }

    /// Registers an error listener; must be called before attaching
    pub fn on_error(&mut self, listener: impl Fn(&GlobeError) + Send + 'static) {
        self.initializer.on_error(listener);
    }

    /// Handle this mount attached, if initialization has completed
    pub fn handle_id(&self) -> Option<HandleId> {
        self.handle
    }

    pub fn state(&self) -> InitState {
        self.initializer.state()
    }

    /// Prepares the container and enters polling; pair with [`Self::step`]
    /// when driving the poll loop from an external scheduler
    pub fn start(&mut self) {
        self.initializer.start();
    }

    /// Runs one poll step against the registry
    pub fn step(&mut self) -> InitProgress {
        let progress = self.initializer.poll_once(&self.registry);
        if let InitProgress::Ready(id) = progress {
            self.handle = Some(id);
        }
        progress
    }

    /// Drives the poll loop on tokio time until the surface is live or
    /// initialization fails. The first poll is deferred one scheduling
    /// turn so the host layout settles; dropping the future before `Ready`
    /// cancels the retry loop.
    #[cfg(feature = "tokio-runtime")]
    pub async fn attach(&mut self) -> crate::Result<HandleId> {
        self.start();
        tokio::task::yield_now().await;

        loop {
            match self.step() {
                InitProgress::Ready(id) => return Ok(id),
                InitProgress::Failed(e) => return Err(e),
                InitProgress::Scheduled(delay) => tokio::time::sleep(delay).await,
            }
        }
    }

    /// Forces a surface re-layout. Best-effort, like `render`.
    pub fn resize(&self) {
        let _ = self.registry.resize();
    }

    /// Drops this mount's association with the surface: resize forwarding
    /// stops, but the handle itself stays with the registry.
    pub fn detach(&mut self) {
        self.initializer.disarm_resize();
        self.handle = None;
    }
}

impl Drop for SurfaceMount {
    fn drop(&mut self) {
        self.detach();
    }
}
