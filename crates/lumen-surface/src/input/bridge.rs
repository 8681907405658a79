use std::time::Duration;

use parking_lot::Mutex;

use crate::error::BridgeResult;
use crate::executor::{RenderHandle, WorkerState};

use super::gesture::{GestureConfig, GestureDetector};
use super::types::{InputEvent, KeyState, PointerAction, PointerEvent, RawInputEvent};

/// Render-thread side of input delivery.
pub trait InputTarget: WorkerState {
    fn deliver_input(&mut self, event: InputEvent) -> BridgeResult<()>;
}

/// Moves input from the host UI thread onto the render thread.
///
/// Every raw event is forwarded as-is, followed by any gesture it completes.
/// Classification and enqueueing happen under one lock so concurrent callers
/// cannot interleave their events.
pub struct InputEventBridge<S> {
    detector: Mutex<GestureDetector>,
    render: RenderHandle<S>,
}

impl<S: InputTarget> InputEventBridge<S> {
    pub fn new(config: GestureConfig, render: RenderHandle<S>) -> Self {
        Self {
            detector: Mutex::new(GestureDetector::new(config)),
            render,
        }
    }

    /// Classifies `raw` and queues the resulting events. Returns how many were queued.
    pub fn forward(&self, raw: RawInputEvent) -> BridgeResult<usize> {
        let mut detector = self.detector.lock();
        let events = classify(&mut detector, raw);
        self.enqueue_all(events)
    }

    /// Confirms taps whose double-tap window lapsed at `now` (event clock).
    pub fn poll(&self, now: Duration) -> BridgeResult<usize> {
        let mut detector = self.detector.lock();
        let mut events = Vec::new();
        detector.poll(now, &mut events);
        self.enqueue_all(events)
    }

    fn enqueue_all(&self, events: Vec<InputEvent>) -> BridgeResult<usize> {
        let mut queued = 0;
        for event in events {
            if let InputEvent::Fling { vx, vy } = event {
                log::trace!("fling ({vx:.0}, {vy:.0}) px/s accepted, not delivered");
                continue;
            }

            self.render.enqueue(move |target: &mut S| target.deliver_input(event))?;
            queued += 1;
        }
        Ok(queued)
    }
}

/// Expands one raw event into the events delivered to the native core.
pub fn classify(detector: &mut GestureDetector, raw: RawInputEvent) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(2);

    match raw {
        RawInputEvent::Pointer {
            action,
            pointer_id,
            x,
            y,
            buttons,
            time,
        } => {
            let pointer = PointerEvent {
                pointer_id,
                x,
                y,
                buttons,
            };
            events.push(match action {
                PointerAction::Down => InputEvent::PointerDown(pointer),
                PointerAction::Move => InputEvent::PointerMove(pointer),
                // A cancelled contact still has to be released on the native side.
                PointerAction::Up | PointerAction::Cancel => InputEvent::PointerUp(pointer),
            });
            detector.on_pointer(action, pointer_id, x, y, buttons, time, &mut events);
        }

        RawInputEvent::Key { state, event, time } => {
            detector.poll(time, &mut events);
            events.push(match state {
                KeyState::Pressed => InputEvent::KeyDown(event),
                KeyState::Released => InputEvent::KeyUp(event),
            });
        }

        RawInputEvent::Motion { event, time } => {
            detector.poll(time, &mut events);
            events.push(InputEvent::GenericMotion(event));
        }
    }

    events
}
