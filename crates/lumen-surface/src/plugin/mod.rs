//! Render-thread observers.
//!
//! Plugins hear about context creation, surface resizes and every frame. They
//! are notified in registration order, sequentially, on the render thread.

mod registry;

pub use registry::{PluginId, PluginRegistry, SurfaceEvent, SurfacePlugin};
