//! Host-environment surface abstraction
//!
//! The lifecycle engine only needs a DOM-like element: inline style
//! mutation, computed-style queries, offset-dimension queries, and a
//! resize-notification subscription. [`SimElement`] is an in-memory
//! implementation for headless runs and tests.

use crate::prelude::HashMap;
use std::sync::{Arc, Mutex};

/// Callback invoked with the observed content-box width and height
pub type ResizeCallback = Box<dyn FnMut(f64, f64) + Send>;

/// Identifies one resize-notification registration on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A DOM-like host element the surface is mounted into
pub trait HostElement: Send + Sync {
    /// Inline style value for a property, if one was set
    fn inline_style(&self, property: &str) -> Option<String>;

    /// Sets an inline style property
    fn set_inline_style(&self, property: &str, value: &str);

    /// Computed style value for a property (inline value or the
    /// environment's resolved default)
    fn computed_style(&self, property: &str) -> String;

    /// Rendered (width, height) in pixels; (0, 0) while not laid out
    fn offset_size(&self) -> (f64, f64);

    /// Registers a resize notification; fires on box-size changes
    fn observe_resize(&self, callback: ResizeCallback) -> ObserverId;

    /// Cancels a resize registration; unknown ids are ignored
    fn unobserve_resize(&self, id: ObserverId);
}

/// In-memory host element for headless use and tests.
///
/// Resize observers are invoked synchronously from [`SimElement::set_size`],
/// outside the element's lock, so a callback may call back into the element.
pub struct SimElement {
    inner: Mutex<SimElementInner>,
}

struct SimElementInner {
    styles: HashMap<String, String>,
    size: (f64, f64),
    observers: Vec<(ObserverId, Arc<Mutex<ResizeCallback>>)>,
    next_observer: u64,
}

impl SimElement {
    /// Creates an element with no layout yet: (0, 0) offset size
    pub fn new() -> Self {
        Self::with_size(0.0, 0.0)
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            inner: Mutex::new(SimElementInner {
                styles: HashMap::default(),
                size: (width, height),
                observers: Vec::new(),
                next_observer: 1,
            }),
        }
    }

    /// Updates the rendered size and fires all resize observers.
    ///
    /// The observer list is snapshotted and the callbacks run with the
    /// element lock released; an observer unregistered mid-notification
    /// still sees this one.
    pub fn set_size(&self, width: f64, height: f64) {
        let snapshot: Vec<Arc<Mutex<ResizeCallback>>> = {
            let mut inner = self.lock();
            inner.size = (width, height);
            inner.observers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in snapshot {
            let mut callback = callback.lock().unwrap_or_else(|e| e.into_inner());
            (*callback)(width, height);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimElementInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SimElement {
    fn default() -> Self {
        Self::new()
    }
}

impl HostElement for SimElement {
    fn inline_style(&self, property: &str) -> Option<String> {
        self.lock().styles.get(property).cloned()
    }

    fn set_inline_style(&self, property: &str, value: &str) {
        self.lock()
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn computed_style(&self, property: &str) -> String {
        if let Some(value) = self.inline_style(property) {
            return value;
        }
        // Resolved defaults of an unstyled block element
        match property {
            "position" => "static".to_string(),
            "display" => "block".to_string(),
            _ => String::new(),
        }
    }

    fn offset_size(&self) -> (f64, f64) {
        self.lock().size
    }

    fn observe_resize(&self, callback: ResizeCallback) -> ObserverId {
        let mut inner = self.lock();
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push((id, Arc::new(Mutex::new(callback))));
        id
    }

    fn unobserve_resize(&self, id: ObserverId) {
        self.lock().observers.retain(|(observer, _)| *observer != id);
    }
}
