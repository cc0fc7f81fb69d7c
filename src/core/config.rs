//! Configuration for the rendering surface and the initialization retry loop
//!
//! Caller-supplied overrides are merged over documented defaults into one
//! total configuration; no partial config ever reaches the surface
//! constructor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Effective surface configuration. Every key is always present after
/// [`SurfaceConfig::merge`]; keys the crate does not know about are carried
/// through `extra` untouched so newer callers keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub home_button: bool,
    pub scene_mode_picker: bool,
    pub base_layer_picker: bool,
    pub navigation_help_button: bool,
    pub navigation_instructions_initially_visible: bool,
    pub geocoder: bool,
    pub timeline: bool,
    pub fullscreen_button: bool,
    pub info_box: bool,
    pub selection_indicator: bool,
    pub request_render_mode: bool,
    /// Render-pacing budget in seconds; infinity means unbounded and is
    /// encoded as JSON `null`
    #[serde(with = "render_time_budget")]
    pub maximum_render_time_change: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            home_button: true,
            scene_mode_picker: true,
            base_layer_picker: false,
            navigation_help_button: false,
            navigation_instructions_initially_visible: false,
            geocoder: false,
            timeline: false,
            fullscreen_button: false,
            info_box: true,
            selection_indicator: true,
            request_render_mode: true,
            maximum_render_time_change: f64::INFINITY,
            extra: Map::new(),
        }
    }
}

impl SurfaceConfig {
    /// Merges caller overrides over the defaults. Pure: neither input is
    /// mutated, any key present in `overrides` wins, absent keys keep the
    /// default, and unknown keys pass through unchanged.
    pub fn merge(defaults: &SurfaceConfig, overrides: &SurfaceOverrides) -> SurfaceConfig {
        let mut merged = defaults.clone();

        if let Some(v) = overrides.home_button {
            merged.home_button = v;
        }
        if let Some(v) = overrides.scene_mode_picker {
            merged.scene_mode_picker = v;
        }
        if let Some(v) = overrides.base_layer_picker {
            merged.base_layer_picker = v;
        }
        if let Some(v) = overrides.navigation_help_button {
            merged.navigation_help_button = v;
        }
        if let Some(v) = overrides.navigation_instructions_initially_visible {
            merged.navigation_instructions_initially_visible = v;
        }
        if let Some(v) = overrides.geocoder {
            merged.geocoder = v;
        }
        if let Some(v) = overrides.timeline {
            merged.timeline = v;
        }
        if let Some(v) = overrides.fullscreen_button {
            merged.fullscreen_button = v;
        }
        if let Some(v) = overrides.info_box {
            merged.info_box = v;
        }
        if let Some(v) = overrides.selection_indicator {
            merged.selection_indicator = v;
        }
        if let Some(v) = overrides.request_render_mode {
            merged.request_render_mode = v;
        }
        if let Some(v) = overrides.maximum_render_time_change {
            merged.maximum_render_time_change = v;
        }
        for (key, value) in &overrides.extra {
            merged.extra.insert(key.clone(), value.clone());
        }

        merged
    }
}

/// Caller-supplied configuration overrides; unset keys keep their default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceOverrides {
    pub home_button: Option<bool>,
    pub scene_mode_picker: Option<bool>,
    pub base_layer_picker: Option<bool>,
    pub navigation_help_button: Option<bool>,
    pub navigation_instructions_initially_visible: Option<bool>,
    pub geocoder: Option<bool>,
    pub timeline: Option<bool>,
    pub fullscreen_button: Option<bool>,
    pub info_box: Option<bool>,
    pub selection_indicator: Option<bool>,
    pub request_render_mode: Option<bool>,
    pub maximum_render_time_change: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SurfaceOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_home_button(mut self, enabled: bool) -> Self {
        self.home_button = Some(enabled);
        self
    }

    pub fn with_scene_mode_picker(mut self, enabled: bool) -> Self {
        self.scene_mode_picker = Some(enabled);
        self
    }

    pub fn with_base_layer_picker(mut self, enabled: bool) -> Self {
        self.base_layer_picker = Some(enabled);
        self
    }

    pub fn with_navigation_help_button(mut self, enabled: bool) -> Self {
        self.navigation_help_button = Some(enabled);
        self
    }

    pub fn with_timeline(mut self, enabled: bool) -> Self {
        self.timeline = Some(enabled);
        self
    }

    pub fn with_fullscreen_button(mut self, enabled: bool) -> Self {
        self.fullscreen_button = Some(enabled);
        self
    }

    pub fn with_info_box(mut self, enabled: bool) -> Self {
        self.info_box = Some(enabled);
        self
    }

    pub fn with_selection_indicator(mut self, enabled: bool) -> Self {
        self.selection_indicator = Some(enabled);
        self
    }

    pub fn with_request_render_mode(mut self, enabled: bool) -> Self {
        self.request_render_mode = Some(enabled);
        self
    }

    pub fn with_maximum_render_time_change(mut self, seconds: f64) -> Self {
        self.maximum_render_time_change = Some(seconds);
        self
    }
}

/// Initial camera view in degrees, with a height in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl InitialView {
    /// Height used when the caller does not supply one
    pub const DEFAULT_HEIGHT: f64 = 10_000_000.0;

    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            height: Self::DEFAULT_HEIGHT,
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }
}

/// Retry behavior for the zero-size initialization poll.
///
/// The default reproduces the observed behavior: a fixed 100 ms interval
/// with no attempt cap. Callers that cannot tolerate an element that never
/// gains size should set `max_attempts`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: None,
            exponential_backoff: false,
        }
    }
}

impl RetryPolicy {
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self) -> Self {
        self.exponential_backoff = true;
        self
    }

    /// Delay before the next poll after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if self.exponential_backoff {
            // Capped doubling so the delay stays bounded
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1).min(6));
            self.interval.saturating_mul(factor)
        } else {
            self.interval
        }
    }
}

/// JSON has no infinity, so the unbounded render-time budget round-trips
/// as `null`
mod render_time_budget {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
