//! Prelude module for common globelet types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use globelet::prelude::*;`

pub use crate::core::{
    config::{InitialView, RetryPolicy, SurfaceConfig, SurfaceOverrides},
    geo::{Cartesian3, Cartographic},
};

pub use crate::host::{HostElement, ObserverId, ResizeCallback, SimElement};

pub use crate::lifecycle::{
    container,
    init::{InitProgress, InitState, ViewerInitializer},
    mount::{MountOptions, SurfaceMount},
    resize::ResizeWatcher,
};

pub use crate::surface::{
    entity::{Color, EntityId, EntitySpec, LabelStyle, PointStyle, Position, SceneEntity},
    factory::{SoftwareSurfaceFactory, SurfaceFactory},
    handle::{HandleId, ImageryLayer, Scene, SceneMode, ViewerHandle},
    registry::{global, SubscriptionId, ViewerRegistry},
};

pub use crate::camera::{CameraController, NamedLocation};

pub use crate::{Error as GlobeError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
