//! Container-resize wiring.
//!
//! On each notification with a positive content box, the watcher re-layouts
//! the scene and requests one render pass, but only while the registry
//! still owns the handle the watcher was armed with.

use crate::{
    host::{HostElement, ObserverId, ResizeCallback},
    surface::{handle::HandleId, registry::ViewerRegistry},
};
use std::sync::Arc;

/// Forwards an element's resize notifications to the live surface
#[derive(Default)]
pub struct ResizeWatcher {
    armed: Option<(Arc<dyn HostElement>, ObserverId)>,
}

impl ResizeWatcher {
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Registers for resize notifications on the element. Re-arming
    /// replaces the previous registration.
    pub fn arm(
        &mut self,
        element: Arc<dyn HostElement>,
        registry: ViewerRegistry,
        handle_id: HandleId,
    ) {
        self.disarm();

        let callback: ResizeCallback = Box::new(move |width, height| {
            if width <= 0.0 || height <= 0.0 {
                return;
            }
            if !registry.relayout_if_current(handle_id, width, height) {
                log::debug!("resize notification for a stale handle; ignoring");
            }
        });

        let observer = element.observe_resize(callback);
        self.armed = Some((element, observer));
    }

    /// Cancels the registration. Safe to call repeatedly and when never
    /// armed.
    pub fn disarm(&mut self) {
        if let Some((element, observer)) = self.armed.take() {
            element.unobserve_resize(observer);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        self.disarm();
    }
}
