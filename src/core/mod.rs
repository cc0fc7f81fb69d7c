pub mod config;
pub mod geo;

// Re-export main types
pub use config::{InitialView, RetryPolicy, SurfaceConfig, SurfaceOverrides};
pub use geo::{Cartesian3, Cartographic};
