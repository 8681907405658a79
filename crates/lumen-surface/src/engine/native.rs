use crate::input::InputEvent;

/// Native engine core driven by the render loop.
///
/// Each method corresponds to one logical occurrence and is called at most once
/// for it, in the order the lifecycle defines.
pub trait NativeEngine: Send + 'static {
    /// A fresh graphics context is current; (re)create GPU resources.
    fn on_context_created(&mut self);

    /// The drawable changed size (physical pixels).
    fn on_surface_resized(&mut self, width: u32, height: u32);

    /// Advances and renders one frame.
    fn step_frame(&mut self);

    /// First frame after the host came back to the foreground.
    fn on_resumed(&mut self);

    /// The host went to the background; no frames follow until resumed.
    fn on_paused(&mut self);

    fn deliver_input_event(&mut self, event: InputEvent);

    /// Window focus follows the host's foreground state.
    fn on_focus_changed(&mut self, focused: bool) {
        let _ = focused;
    }

    /// The host's back/navigation action.
    fn on_back_pressed(&mut self) {}
}

impl<E: NativeEngine + ?Sized> NativeEngine for Box<E> {
    fn on_context_created(&mut self) {
        (**self).on_context_created()
    }

    fn on_surface_resized(&mut self, width: u32, height: u32) {
        (**self).on_surface_resized(width, height)
    }

    fn step_frame(&mut self) {
        (**self).step_frame()
    }

    fn on_resumed(&mut self) {
        (**self).on_resumed()
    }

    fn on_paused(&mut self) {
        (**self).on_paused()
    }

    fn deliver_input_event(&mut self, event: InputEvent) {
        (**self).deliver_input_event(event)
    }

    fn on_focus_changed(&mut self, focused: bool) {
        (**self).on_focus_changed(focused)
    }

    fn on_back_pressed(&mut self) {
        (**self).on_back_pressed()
    }
}
