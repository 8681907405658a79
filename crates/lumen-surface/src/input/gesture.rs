use std::time::Duration;

use super::types::{ButtonMask, InputEvent, PointerAction};

/// Samples older than this at release time no longer count toward fling velocity.
const VELOCITY_HORIZON: Duration = Duration::from_millis(100);

/// Thresholds for gesture classification.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Longest press that still counts as a tap.
    pub tap_timeout: Duration,

    /// Longest gap between a release and the next press of a double tap.
    pub double_tap_timeout: Duration,

    /// Movement (pixels) after which a press becomes a drag.
    pub touch_slop: f32,

    /// Largest distance (pixels) between the two presses of a double tap.
    pub double_tap_slop: f32,

    /// Release speed (pixels/second) at which a drag ends in a fling.
    pub min_fling_velocity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_timeout: Duration::from_millis(400),
            double_tap_timeout: Duration::from_millis(300),
            touch_slop: 8.0,
            double_tap_slop: 100.0,
            min_fling_velocity: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Press {
    pointer_id: u32,
    buttons: ButtonMask,
    down: (f32, f32),
    down_time: Duration,
    /// Position at the last emitted scroll; sub-pixel motion accumulates here.
    anchor: (f32, f32),
    last: (f32, f32),
    last_time: Duration,
    velocity: (f32, f32),
    scrolling: bool,
    double_tap: bool,
    multi_touch: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    down: (f32, f32),
    up_time: Duration,
    buttons: ButtonMask,
}

/// Classifies the primary pointer's contacts into semantic gestures.
///
/// Time is injected through event timestamps, so classification is deterministic.
/// A tap is only confirmed once the double-tap window has lapsed, which is
/// observed on the next event or on [`GestureDetector::poll`].
#[derive(Debug, Default)]
pub struct GestureDetector {
    config: GestureConfig,
    press: Option<Press>,
    pending_tap: Option<PendingTap>,
}

impl GestureDetector {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
            pending_tap: None,
        }
    }

    /// Feeds one pointer sample; classified gestures are appended to `out`.
    pub fn on_pointer(
        &mut self,
        action: PointerAction,
        pointer_id: u32,
        x: f32,
        y: f32,
        buttons: ButtonMask,
        time: Duration,
        out: &mut Vec<InputEvent>,
    ) {
        self.poll(time, out);

        match action {
            PointerAction::Down => self.on_down(pointer_id, (x, y), buttons, time, out),
            PointerAction::Move => self.on_move(pointer_id, (x, y), time, out),
            PointerAction::Up => self.on_up(pointer_id, time, out),
            PointerAction::Cancel => {
                self.press = None;
                self.pending_tap = None;
            }
        }
    }

    /// Confirms a pending tap whose double-tap window has lapsed at `now`.
    pub fn poll(&mut self, now: Duration, out: &mut Vec<InputEvent>) {
        if let Some(tap) = self.pending_tap {
            if now.saturating_sub(tap.up_time) > self.config.double_tap_timeout {
                self.pending_tap = None;
                out.push(tap_event(tap));
            }
        }
    }

    /// Returns `true` while a tap waits for a possible second press.
    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap.is_some()
    }

    fn on_down(
        &mut self,
        pointer_id: u32,
        pos: (f32, f32),
        buttons: ButtonMask,
        time: Duration,
        out: &mut Vec<InputEvent>,
    ) {
        if let Some(press) = self.press.as_mut() {
            if press.pointer_id != pointer_id {
                press.multi_touch = true;
            }
            return;
        }

        let mut double_tap = false;
        if let Some(tap) = self.pending_tap.take() {
            if distance(tap.down, pos) <= self.config.double_tap_slop {
                double_tap = true;
                out.push(InputEvent::DoubleTap {
                    x: round_px(pos.0),
                    y: round_px(pos.1),
                    buttons,
                });
            } else {
                out.push(tap_event(tap));
            }
        }

        self.press = Some(Press {
            pointer_id,
            buttons,
            down: pos,
            down_time: time,
            anchor: pos,
            last: pos,
            last_time: time,
            velocity: (0.0, 0.0),
            scrolling: false,
            double_tap,
            multi_touch: false,
        });
    }

    fn on_move(&mut self, pointer_id: u32, pos: (f32, f32), time: Duration, out: &mut Vec<InputEvent>) {
        let slop = self.config.touch_slop;
        let Some(press) = self.press.as_mut().filter(|p| p.pointer_id == pointer_id) else {
            return;
        };

        let dt = time.saturating_sub(press.last_time).as_secs_f32();
        if dt > 0.0 {
            press.velocity = ((pos.0 - press.last.0) / dt, (pos.1 - press.last.1) / dt);
        }
        press.last = pos;
        press.last_time = time;

        if press.multi_touch || press.double_tap {
            return;
        }

        if !press.scrolling {
            if distance(press.down, pos) <= slop {
                return;
            }
            press.scrolling = true;
        }

        let dx = round_px(press.anchor.0 - pos.0);
        let dy = round_px(press.anchor.1 - pos.1);
        if dx != 0 || dy != 0 {
            press.anchor = (press.anchor.0 - dx as f32, press.anchor.1 - dy as f32);
            out.push(InputEvent::Scroll { dx, dy });
        }
    }

    fn on_up(&mut self, pointer_id: u32, time: Duration, out: &mut Vec<InputEvent>) {
        let Some(press) = self.press.take_if(|p| p.pointer_id == pointer_id) else {
            return;
        };

        if press.multi_touch || press.double_tap {
            return;
        }

        if press.scrolling {
            if time.saturating_sub(press.last_time) > VELOCITY_HORIZON {
                return;
            }
            let (vx, vy) = press.velocity;
            let min = self.config.min_fling_velocity;
            if vx.abs() >= min || vy.abs() >= min {
                out.push(InputEvent::Fling { vx, vy });
            }
            return;
        }

        if time.saturating_sub(press.down_time) <= self.config.tap_timeout {
            self.pending_tap = Some(PendingTap {
                down: press.down,
                up_time: time,
                buttons: press.buttons,
            });
        }
    }
}

fn tap_event(tap: PendingTap) -> InputEvent {
    InputEvent::Tap {
        x: round_px(tap.down.0),
        y: round_px(tap.down.1),
        buttons: tap.buttons,
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

fn round_px(v: f32) -> i32 {
    v.round() as i32
}
