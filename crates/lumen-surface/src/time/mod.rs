//! Frame timing for the render loop.
//!
//! One `FrameClock` lives in the render-thread state. Each frame tick calls
//! `tick()`; continuous rendering optionally waits for `remaining()` first.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
