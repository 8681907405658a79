//! Input subsystem.
//!
//! Public API is platform-agnostic. Hosts translate their native events into
//! [`RawInputEvent`]s (see [`platform::winit`] for desktop windows), the
//! [`InputEventBridge`] classifies them and queues the results on the render thread.

mod bridge;
mod gesture;
pub mod platform;
mod types;

pub use bridge::{classify, InputEventBridge, InputTarget};
pub use gesture::{GestureConfig, GestureDetector};
pub use types::{
    ButtonMask,
    InputEvent,
    KeyEvent,
    KeyState,
    Modifiers,
    MotionEvent,
    PointerAction,
    PointerEvent,
    RawInputEvent,
};
