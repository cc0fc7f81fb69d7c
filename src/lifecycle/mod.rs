pub mod container;
pub mod init;
pub mod mount;
pub mod resize;

// Re-export main types
pub use init::{InitProgress, InitState, ViewerInitializer};
pub use mount::{MountOptions, SurfaceMount};
pub use resize::ResizeWatcher;
