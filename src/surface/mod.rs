pub mod entity;
pub mod factory;
pub mod handle;
pub mod registry;

// Re-export main types
pub use entity::{Color, EntityId, EntitySpec, LabelStyle, PointStyle, Position, SceneEntity};
pub use factory::{SoftwareSurfaceFactory, SurfaceFactory};
pub use handle::{HandleId, ImageryLayer, Scene, SceneMode, ViewerHandle};
pub use registry::{global, SubscriptionId, ViewerRegistry};
