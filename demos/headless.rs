//! Headless lifecycle demo: mounts the surface on a simulated container,
//! flies between cities, drops a marker, toggles the projection, and tears
//! the viewer down.
//!
//! Run with: cargo run --example headless

use globelet::prelude::*;

#[tokio::main]
async fn main() -> globelet::Result<()> {
    #[cfg(feature = "debug")]
    env_logger::init();

    let element = Arc::new(SimElement::new());
    let registry = ViewerRegistry::new();

    let options = MountOptions {
        initial_view: Some(InitialView::new(-74.0060, 40.7128).with_height(1_000_000.0)),
        ..Default::default()
    };
    let mut mount = SurfaceMount::new(element.clone(), registry.clone(), options);
    mount.on_ready(|id| println!("viewer ready: {id:?}"));
    mount.on_error(|e| eprintln!("viewer error: {e}"));

    // Simulate the host layout settling a few frames after mount
    let element_clone = element.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        element_clone.set_size(800.0, 600.0);
    });

    mount.attach().await?;

    let camera = CameraController::new(registry.clone());
    camera.fly_to(NamedLocation::London, 2.0)?;

    let marker = registry.add_entity(
        EntitySpec::at_degrees(-0.1276, 51.5074)
            .with_point(PointStyle::default())
            .with_label(LabelStyle::new("London")),
    )?;
    println!("placed marker {marker:?}");

    let mode = camera.toggle_projection()?;
    println!("scene morphed to {mode:?}");

    // The container grows; the surface follows
    element.set_size(1280.0, 720.0);
    let viewport = registry.with_handle(|h| h.scene.viewport())?;
    println!("viewport now {viewport:?}");

    registry.destroy();
    Ok(())
}
