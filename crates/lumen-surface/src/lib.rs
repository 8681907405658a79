//! Lumen surface crate.
//!
//! Bridges a host application's surface lifecycle and input onto a dedicated
//! render thread that owns the graphics context and steps the native engine.

pub mod config;
pub mod engine;
pub mod executor;
pub mod input;
pub mod lifecycle;
pub mod plugin;
pub mod time;

pub mod logging;
mod error;

pub use error::{BridgeError, BridgeResult};
pub use lifecycle::{RenderMode, SurfaceConfig, SurfaceState, SurfaceView};
