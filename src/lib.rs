//! # Globelet
//!
//! A Rust-native lifecycle engine for a singleton 3D-globe rendering surface.
//!
//! The crate manages one long-lived viewer handle embedded in a
//! dynamically-sized host container: it prepares the container, defers
//! initialization until the container reports real pixel dimensions
//! (retrying on zero size), wires resize notifications to surface
//! re-layout, and routes all camera and entity operations through the
//! registry that owns the handle.

pub mod camera;
pub mod core;
pub mod host;
pub mod lifecycle;
pub mod prelude;
pub mod surface;

// Re-export public API
pub use crate::core::{
    config::{InitialView, RetryPolicy, SurfaceConfig, SurfaceOverrides},
    geo::{Cartesian3, Cartographic},
};

pub use host::{HostElement, ObserverId, SimElement};

pub use lifecycle::{
    init::{InitProgress, InitState, ViewerInitializer},
    mount::{MountOptions, SurfaceMount},
    resize::ResizeWatcher,
};

pub use surface::{
    entity::{Color, EntityId, EntitySpec, LabelStyle, PointStyle, Position, SceneEntity},
    factory::{SoftwareSurfaceFactory, SurfaceFactory},
    handle::{HandleId, ImageryLayer, Scene, SceneMode, ViewerHandle},
    registry::{global, SubscriptionId, ViewerRegistry},
};

pub use camera::{CameraController, NamedLocation};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, GlobeError>;

/// Common error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlobeError {
    #[error("viewer not initialized")]
    NotInitialized,

    #[error("surface construction failed: {0}")]
    Construction(String),

    #[error("surface destruction failed: {0}")]
    Destruction(String),

    #[error("container never reported a positive size after {attempts} polls")]
    SizePollTimeout { attempts: u32 },

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = GlobeError;
