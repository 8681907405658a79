//! Surface lifecycle.
//!
//! [`SurfaceView`] is the host-facing half: every call returns immediately and
//! only queues work. The render-thread half owns the engine, the context and
//! the state machine, and is the only writer of [`SurfaceState`].

mod config;
mod render_loop;
mod state;
mod view;

pub use config::{RenderMode, SurfaceConfig};
pub use state::{SurfaceState, SurfaceStateCell};
pub use view::{SurfaceView, SurfaceViewBuilder};
