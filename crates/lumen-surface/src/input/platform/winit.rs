use std::time::{Duration, Instant};

use ::winit::event::{
    ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
};
use ::winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::input::{
    ButtonMask, KeyEvent, KeyState, Modifiers, MotionEvent, PointerAction, RawInputEvent,
};

/// Wheel pixel deltas are reported in lines to the native core.
const PIXELS_PER_LINE: f32 = 20.0;

/// Pointer id used for the mouse. Touch contacts use their platform id.
pub const MOUSE_POINTER_ID: u32 = 0;

/// Translates winit window events into raw input events.
///
/// winit does not timestamp events or report held buttons with cursor motion,
/// so both are tracked here. Coordinates stay in physical pixels, which is the
/// surface-local space of the render surface.
#[derive(Debug, Clone)]
pub struct WinitInputTranslator {
    epoch: Instant,
    modifiers: Modifiers,
    pointer: (f32, f32),
    buttons: ButtonMask,
}

impl WinitInputTranslator {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            modifiers: Modifiers::default(),
            pointer: (0.0, 0.0),
            buttons: ButtonMask::NONE,
        }
    }

    /// Current time on the clock used to stamp translated events.
    pub fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Returns `None` for events not represented by the input subsystem.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<RawInputEvent> {
        let time = self.epoch.elapsed();

        match event {
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
                None
            }

            WindowEvent::Focused(false) => {
                // Avoid stuck buttons when focus changes mid-press.
                self.buttons = ButtonMask::NONE;
                None
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = (position.x as f32, position.y as f32);
                if self.buttons.is_empty() {
                    Some(self.motion(0.0, 0.0, time))
                } else {
                    Some(self.mouse(PointerAction::Move, time))
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let mask = map_mouse_button(*button);
                let was_empty = self.buttons.is_empty();
                let action = match state {
                    ElementState::Pressed => {
                        self.buttons.insert(mask);
                        if was_empty { PointerAction::Down } else { PointerAction::Move }
                    }
                    ElementState::Released => {
                        if was_empty {
                            return None;
                        }
                        self.buttons.remove(mask);
                        if self.buttons.is_empty() { PointerAction::Up } else { PointerAction::Move }
                    }
                };

                let mut raw = self.mouse(action, time);
                // The release itself reports the button that went up.
                if let RawInputEvent::Pointer { buttons, .. } = &mut raw {
                    if action == PointerAction::Up {
                        *buttons = mask;
                    }
                }
                Some(raw)
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (h, v) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                    MouseScrollDelta::PixelDelta(p) => {
                        (p.x as f32 / PIXELS_PER_LINE, p.y as f32 / PIXELS_PER_LINE)
                    }
                };
                Some(self.motion(h, v, time))
            }

            WindowEvent::Touch(touch) => {
                let action = match touch.phase {
                    TouchPhase::Started => PointerAction::Down,
                    TouchPhase::Moved => PointerAction::Move,
                    TouchPhase::Ended => PointerAction::Up,
                    TouchPhase::Cancelled => PointerAction::Cancel,
                };
                Some(RawInputEvent::Pointer {
                    action,
                    pointer_id: touch.id as u32,
                    x: touch.location.x as f32,
                    y: touch.location.y as f32,
                    buttons: ButtonMask::NONE,
                    time,
                })
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let state = match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                };

                Some(RawInputEvent::Key {
                    state,
                    event: KeyEvent {
                        keycode: map_keycode(event.physical_key),
                        unicode: event.text.as_ref().and_then(|t| t.chars().next()),
                        repeat: event.repeat,
                        modifiers: self.modifiers,
                    },
                    time,
                })
            }

            _ => None,
        }
    }

    fn mouse(&self, action: PointerAction, time: Duration) -> RawInputEvent {
        RawInputEvent::Pointer {
            action,
            pointer_id: MOUSE_POINTER_ID,
            x: self.pointer.0,
            y: self.pointer.1,
            buttons: self.buttons,
            time,
        }
    }

    fn motion(&self, hscroll: f32, vscroll: f32, time: Duration) -> RawInputEvent {
        RawInputEvent::Motion {
            event: MotionEvent {
                x: self.pointer.0,
                y: self.pointer.1,
                buttons: self.buttons,
                hscroll,
                vscroll,
            },
            time,
        }
    }
}

impl Default for WinitInputTranslator {
    fn default() -> Self {
        Self::new()
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> ButtonMask {
    match b {
        WinitMouseButton::Left => ButtonMask::PRIMARY,
        WinitMouseButton::Right => ButtonMask::SECONDARY,
        WinitMouseButton::Middle => ButtonMask::TERTIARY,
        WinitMouseButton::Back => ButtonMask::BACK,
        WinitMouseButton::Forward => ButtonMask::FORWARD,
        WinitMouseButton::Other(_) => ButtonMask::NONE,
    }
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE, KeyCode::KeyF,
    KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ, KeyCode::KeyK, KeyCode::KeyL,
    KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO, KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR,
    KeyCode::KeyS, KeyCode::KeyT, KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX,
    KeyCode::KeyY, KeyCode::KeyZ,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
    KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
];

/// Maps a physical key onto the mobile keycode table the native core expects.
///
/// Unmapped keys report 0 (unknown).
pub fn map_keycode(key: PhysicalKey) -> u32 {
    let PhysicalKey::Code(code) = key else {
        return 0;
    };

    let offset = |table: &[KeyCode], base: u32| {
        table.iter().position(|k| *k == code).map(|i| base + i as u32)
    };

    if let Some(k) = offset(&LETTERS, 29)
        .or_else(|| offset(&DIGITS, 7))
        .or_else(|| offset(&FUNCTION_KEYS, 131))
    {
        return k;
    }

    match code {
        KeyCode::ArrowUp => 19,
        KeyCode::ArrowDown => 20,
        KeyCode::ArrowLeft => 21,
        KeyCode::ArrowRight => 22,
        KeyCode::AltLeft => 57,
        KeyCode::AltRight => 58,
        KeyCode::ShiftLeft => 59,
        KeyCode::ShiftRight => 60,
        KeyCode::Tab => 61,
        KeyCode::Space => 62,
        KeyCode::Enter => 66,
        KeyCode::Backspace => 67,
        KeyCode::PageUp => 92,
        KeyCode::PageDown => 93,
        KeyCode::Escape => 111,
        KeyCode::Delete => 112,
        KeyCode::ControlLeft => 113,
        KeyCode::ControlRight => 114,
        KeyCode::SuperLeft => 117,
        KeyCode::SuperRight => 118,
        KeyCode::Home => 122,
        KeyCode::End => 123,
        KeyCode::Insert => 124,
        _ => 0,
    }
}
