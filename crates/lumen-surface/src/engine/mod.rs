//! Contracts with the external collaborators of the bridge.
//!
//! This module defines the interface between the render loop and:
//! - the native engine core that is stepped once per frame
//! - the platform graphics context that frames are presented on
//! - the host that owns the surface and wants to hear about its milestones
//!
//! Apart from `ContextFactory::available_configs`, every method here is invoked
//! on the render thread only.

mod context;
mod headless;
mod native;

pub use context::{ContextFactory, ContextOptions, GraphicsContext, HostCallbacks, NoHostCallbacks};
pub use headless::{HeadlessContext, HeadlessContextFactory, HeadlessStats};
pub use native::NativeEngine;
