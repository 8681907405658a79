use std::fmt;
use std::time::Duration;

/// Held pointer buttons, using the platform's bit layout.
///
/// Touch contacts report an empty mask.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ButtonMask(pub u32);

impl ButtonMask {
    pub const NONE: ButtonMask = ButtonMask(0);
    pub const PRIMARY: ButtonMask = ButtonMask(1 << 0);
    pub const SECONDARY: ButtonMask = ButtonMask(1 << 1);
    pub const TERTIARY: ButtonMask = ButtonMask(1 << 2);
    pub const BACK: ButtonMask = ButtonMask(1 << 3);
    pub const FORWARD: ButtonMask = ButtonMask(1 << 4);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: ButtonMask) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ButtonMask) {
        self.0 &= !other.0;
    }
}

/// Modifier keys state.
///
/// Snapshot taken when the key or pointer event was produced.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    /// The platform took the gesture away (e.g. a system swipe).
    Cancel,
}

/// Raw event as the host UI thread receives it.
///
/// `time` is the platform event timestamp, measured from any fixed origin.
/// Coordinates are surface-local physical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Pointer {
        action: PointerAction,
        pointer_id: u32,
        x: f32,
        y: f32,
        buttons: ButtonMask,
        time: Duration,
    },
    Key {
        state: KeyState,
        event: KeyEvent,
        time: Duration,
    },
    /// Hover, wheel and other non-contact motion.
    Motion { event: MotionEvent, time: Duration },
}

/// Pointer contact in surface-local pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    pub x: f32,
    pub y: f32,
    pub buttons: ButtonMask,
}

/// Keyboard event.
///
/// `keycode` is the platform key code; the native core owns the mapping.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub keycode: u32,
    /// Character produced by the key, if any.
    pub unicode: Option<char>,
    pub repeat: bool,
    pub modifiers: Modifiers,
}

/// Non-contact motion (hover, wheel, joystick axes).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionEvent {
    pub x: f32,
    pub y: f32,
    pub buttons: ButtonMask,
    pub hscroll: f32,
    pub vscroll: f32,
}

/// Event delivered to the native core on the render thread.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),

    KeyDown(KeyEvent),
    KeyUp(KeyEvent),

    /// Drag distance since the previous scroll, `previous - current`, whole pixels.
    Scroll { dx: i32, dy: i32 },

    /// Confirmed single tap at the press position.
    Tap { x: i32, y: i32, buttons: ButtonMask },

    /// Second tap of a double tap, at the second press position.
    DoubleTap { x: i32, y: i32, buttons: ButtonMask },

    /// High-velocity release after a drag, in pixels per second.
    ///
    /// Classified but never delivered; reserved.
    Fling { vx: f32, vy: f32 },

    GenericMotion(MotionEvent),
}

impl InputEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InputEvent::PointerDown(_) => "pointer-down",
            InputEvent::PointerMove(_) => "pointer-move",
            InputEvent::PointerUp(_) => "pointer-up",
            InputEvent::KeyDown(_) => "key-down",
            InputEvent::KeyUp(_) => "key-up",
            InputEvent::Scroll { .. } => "scroll",
            InputEvent::Tap { .. } => "tap",
            InputEvent::DoubleTap { .. } => "double-tap",
            InputEvent::Fling { .. } => "fling",
            InputEvent::GenericMotion(_) => "generic-motion",
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::Scroll { dx, dy } => write!(f, "scroll({dx}, {dy})"),
            InputEvent::Tap { x, y, .. } => write!(f, "tap({x}, {y})"),
            InputEvent::DoubleTap { x, y, .. } => write!(f, "double-tap({x}, {y})"),
            other => f.write_str(other.kind()),
        }
    }
}
