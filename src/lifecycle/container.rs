//! Host-container preparation.
//!
//! Runs before the surface mounts: gives the element a usable fallback
//! size and a positioned layout context so absolutely-positioned overlay
//! controls anchor to it.

use crate::host::HostElement;

/// Width fallback when the element has no explicit width
pub const FALLBACK_WIDTH: &str = "100%";

/// Height fallback when the surrounding layout does not constrain the
/// element
pub const FALLBACK_HEIGHT: &str = "400px";

/// Normalizes the host element. Idempotent: a second call finds every
/// style already set and changes nothing.
pub fn prepare(element: &dyn HostElement) {
    if element.inline_style("width").is_none() {
        element.set_inline_style("width", FALLBACK_WIDTH);
    }
    if element.inline_style("height").is_none() {
        element.set_inline_style("height", FALLBACK_HEIGHT);
    }
    if element.computed_style("position") == "static" {
        element.set_inline_style("position", "relative");
    }
}
