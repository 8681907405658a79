//! Render-thread executor.
//!
//! Owns the single worker thread that holds the graphics context and drains a
//! FIFO queue of work items against worker-owned state.

mod thread;

pub use thread::{RenderHandle, RenderThread, StopMode, WorkItem, WorkerState};
