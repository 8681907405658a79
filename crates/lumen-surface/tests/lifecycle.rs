//! End-to-end lifecycle tests against a recording engine and the headless context.
//!
//! Surfaces run in on-demand mode unless a test is about continuous pacing, so
//! every frame is one the test asked for.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use lumen_surface::config::{ConfigChooser, ContextConfig};
use lumen_surface::engine::{HeadlessContextFactory, HeadlessStats, HostCallbacks, NativeEngine};
use lumen_surface::input::{
    ButtonMask, InputEvent, KeyEvent, KeyState, Modifiers, PointerAction, RawInputEvent,
};
use lumen_surface::plugin::{PluginRegistry, SurfacePlugin};
use lumen_surface::{BridgeError, RenderMode, SurfaceState, SurfaceView};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ContextCreated,
    Resized(u32, u32),
    Frame,
    Resumed,
    Paused,
    Focus(bool),
    Input(InputEvent),
    Back,
}

type Calls = Arc<Mutex<Vec<Call>>>;

struct Recorder {
    calls: Calls,
}

impl NativeEngine for Recorder {
    fn on_context_created(&mut self) {
        self.calls.lock().push(Call::ContextCreated);
    }

    fn on_surface_resized(&mut self, width: u32, height: u32) {
        self.calls.lock().push(Call::Resized(width, height));
    }

    fn step_frame(&mut self) {
        self.calls.lock().push(Call::Frame);
    }

    fn on_resumed(&mut self) {
        self.calls.lock().push(Call::Resumed);
    }

    fn on_paused(&mut self) {
        self.calls.lock().push(Call::Paused);
    }

    fn deliver_input_event(&mut self, event: InputEvent) {
        self.calls.lock().push(Call::Input(event));
    }

    fn on_focus_changed(&mut self, focused: bool) {
        self.calls.lock().push(Call::Focus(focused));
    }

    fn on_back_pressed(&mut self) {
        self.calls.lock().push(Call::Back);
    }
}

#[derive(Clone, Default)]
struct HostLog(Arc<Mutex<Vec<&'static str>>>);

impl HostCallbacks for HostLog {
    fn on_setup_completed(&mut self) {
        self.0.lock().push("setup-completed");
    }

    fn on_main_loop_started(&mut self) {
        self.0.lock().push("main-loop-started");
    }

    fn on_surface_lost(&mut self) {
        self.0.lock().push("surface-lost");
    }
}

type View = SurfaceView<Recorder, HeadlessContextFactory>;

struct Fixture {
    view: View,
    calls: Calls,
    stats: Arc<HeadlessStats>,
    host: HostLog,
}

fn build_fixture(mode: RenderMode, interval: Duration, plugins: Arc<PluginRegistry>) -> Fixture {
    let calls = Calls::default();
    let factory = HeadlessContextFactory::new();
    let stats = factory.stats();
    let host = HostLog::default();

    let view = SurfaceView::builder(
        Recorder {
            calls: Arc::clone(&calls),
        },
        factory,
    )
    .render_mode(mode)
    .frame_interval(interval)
    .thread_name("lifecycle-test")
    .plugins(plugins)
    .host_callbacks(host.clone())
    .build()
    .unwrap();

    Fixture {
        view,
        calls,
        stats,
        host,
    }
}

fn fixture_with(mode: RenderMode, plugins: Arc<PluginRegistry>) -> Fixture {
    build_fixture(mode, Duration::from_millis(1), plugins)
}

fn continuous(interval: Duration) -> Fixture {
    build_fixture(RenderMode::Continuous, interval, Arc::new(PluginRegistry::new()))
}

fn fixture() -> Fixture {
    fixture_with(RenderMode::OnDemand, Arc::new(PluginRegistry::new()))
}

/// Blocks until everything queued so far has run.
fn settle(view: &View) {
    let (tx, rx) = mpsc::channel();
    view.queue_on_render_thread(move |_| {
        let _ = tx.send(());
    })
    .unwrap();
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

fn count(calls: &Calls, call: &Call) -> usize {
    calls.lock().iter().filter(|c| *c == call).count()
}

fn inputs(calls: &Calls) -> Vec<InputEvent> {
    calls
        .lock()
        .iter()
        .filter_map(|c| match c {
            Call::Input(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

fn pointer(action: PointerAction, x: f32, y: f32, ms: u64) -> RawInputEvent {
    RawInputEvent::Pointer {
        action,
        pointer_id: 0,
        x,
        y,
        buttons: ButtonMask::PRIMARY,
        time: Duration::from_millis(ms),
    }
}

fn click(view: &View, x: f32, y: f32, at: u64) {
    view.forward_input_event(pointer(PointerAction::Down, x, y, at));
    view.forward_input_event(pointer(PointerAction::Up, x, y, at + 50));
}

#[test_log::test]
fn fallback_config_is_chosen_when_only_16_bit_depth_exists() {
    let view = SurfaceView::builder(
        Recorder {
            calls: Calls::default(),
        },
        HeadlessContextFactory::with_configs(vec![ContextConfig::rgba8(16, 0)]),
    )
    .chooser(
        ConfigChooser::new(ContextConfig::rgba8(24, 0)).with_fallback(ContextConfig::rgba8(16, 0)),
    )
    .plugins(Arc::new(PluginRegistry::new()))
    .build()
    .unwrap();

    assert_eq!(view.chosen_config(), ContextConfig::rgba8(16, 0));
}

#[test_log::test]
fn build_fails_without_matching_config() {
    let result = SurfaceView::builder(
        Recorder {
            calls: Calls::default(),
        },
        HeadlessContextFactory::with_configs(vec![ContextConfig::new(5, 6, 5, 0, 16, 0)]),
    )
    .plugins(Arc::new(PluginRegistry::new()))
    .build();

    assert!(matches!(result, Err(BridgeError::NoMatchingConfig { .. })));
}

#[test_log::test]
fn work_runs_in_submission_order() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_surface_resize(100, 200);
    f.view.request_render();
    f.view.on_host_paused();
    settle(&f.view);

    assert_eq!(
        *f.calls.lock(),
        vec![
            Call::ContextCreated,
            Call::Resized(100, 200),
            Call::Frame,
            Call::Focus(false),
            Call::Paused,
        ]
    );
    assert_eq!(f.view.state(), SurfaceState::Paused);
    assert_eq!(f.stats.viewport(), (100, 200));
    assert_eq!(f.stats.frames_presented(), 1);
}

#[test_log::test]
fn pausing_twice_pauses_once() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_host_paused();
    f.view.on_host_paused();
    settle(&f.view);

    assert_eq!(count(&f.calls, &Call::Paused), 1);
}

#[test_log::test]
fn no_frames_while_paused() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_host_paused();
    settle(&f.view);

    for _ in 0..3 {
        f.view.request_render();
    }
    settle(&f.view);
    assert_eq!(count(&f.calls, &Call::Frame), 0);

    f.view.on_host_resumed();
    f.view.request_render();
    settle(&f.view);
    assert_eq!(count(&f.calls, &Call::Frame), 1);
}

#[test_log::test]
fn resume_is_delivered_on_the_next_frame() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_host_paused();
    f.view.on_host_resumed();
    settle(&f.view);

    assert_eq!(f.view.state(), SurfaceState::Active);
    assert_eq!(f.calls.lock().last(), Some(&Call::Focus(true)));
    assert_eq!(count(&f.calls, &Call::Resumed), 0);

    f.view.request_render();
    f.view.request_render();
    settle(&f.view);

    let calls = f.calls.lock();
    let tail = &calls[calls.len() - 3..];
    assert_eq!(tail, &[Call::Resumed, Call::Frame, Call::Frame]);
}

#[test_log::test]
fn resume_while_active_is_ignored() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_host_resumed();
    f.view.request_render();
    settle(&f.view);

    assert_eq!(*f.calls.lock(), vec![Call::ContextCreated, Call::Frame]);
}

#[test_log::test]
fn pause_before_create_starts_paused() {
    let f = fixture();
    f.view.on_host_paused();
    f.view.on_surface_create();
    f.view.request_render();
    settle(&f.view);

    assert_eq!(f.view.state(), SurfaceState::Paused);
    assert_eq!(*f.calls.lock(), vec![Call::ContextCreated]);

    f.view.on_host_resumed();
    f.view.request_render();
    settle(&f.view);
    assert_eq!(f.view.state(), SurfaceState::Active);
    assert_eq!(count(&f.calls, &Call::Frame), 1);
}

#[test_log::test]
fn second_surface_create_is_ignored() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_surface_create();
    settle(&f.view);

    assert_eq!(count(&f.calls, &Call::ContextCreated), 1);
    assert_eq!(f.stats.contexts_created(), 1);
}

#[test_log::test]
fn resize_before_create_is_ignored() {
    let f = fixture();
    f.view.on_surface_resize(640, 480);
    f.view.on_surface_create();
    settle(&f.view);

    assert_eq!(*f.calls.lock(), vec![Call::ContextCreated]);
    assert_eq!(f.stats.viewport(), (0, 0));
}

#[test_log::test]
fn double_tap_within_window_is_one_double_tap() {
    let f = fixture();
    f.view.on_surface_create();
    click(&f.view, 10.0, 10.0, 0);
    click(&f.view, 12.0, 11.0, 150);
    f.view.poll_input(Duration::from_secs(10));
    settle(&f.view);

    let gestures: Vec<_> = inputs(&f.calls)
        .into_iter()
        .filter(|e| matches!(e, InputEvent::Tap { .. } | InputEvent::DoubleTap { .. }))
        .collect();
    assert_eq!(
        gestures,
        vec![InputEvent::DoubleTap {
            x: 12,
            y: 11,
            buttons: ButtonMask::PRIMARY,
        }]
    );
}

#[test_log::test]
fn taps_outside_window_are_two_taps() {
    let f = fixture();
    f.view.on_surface_create();
    click(&f.view, 10.0, 10.0, 0);
    click(&f.view, 12.0, 11.0, 1_000);
    f.view.poll_input(Duration::from_secs(10));
    settle(&f.view);

    let taps: Vec<_> = inputs(&f.calls)
        .into_iter()
        .filter(|e| matches!(e, InputEvent::Tap { .. } | InputEvent::DoubleTap { .. }))
        .collect();
    assert_eq!(
        taps,
        vec![
            InputEvent::Tap {
                x: 10,
                y: 10,
                buttons: ButtonMask::PRIMARY,
            },
            InputEvent::Tap {
                x: 12,
                y: 11,
                buttons: ButtonMask::PRIMARY,
            },
        ]
    );
}

#[test_log::test]
fn input_before_context_is_dropped() {
    let f = fixture();
    f.view.forward_input_event(RawInputEvent::Key {
        state: KeyState::Pressed,
        event: KeyEvent {
            keycode: 62,
            unicode: Some(' '),
            repeat: false,
            modifiers: Modifiers::default(),
        },
        time: Duration::ZERO,
    });
    settle(&f.view);

    assert!(inputs(&f.calls).is_empty());
}

#[test_log::test]
fn destroyed_surface_ignores_input_and_resume() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_host_paused();
    settle(&f.view);

    f.view.on_host_destroyed();
    f.view.forward_input_event(pointer(PointerAction::Down, 1.0, 1.0, 0));
    f.view.on_host_resumed();
    assert!(matches!(
        f.view.queue_on_render_thread(|_| {}),
        Err(BridgeError::ExecutorStopped)
    ));
    assert!(wait_until(|| f.view.state() == SurfaceState::Destroyed));

    let calls = f.calls.clone();
    f.view.shutdown().unwrap();
    assert!(inputs(&calls).is_empty());
    assert_eq!(count(&calls, &Call::Resumed), 0);
    assert_eq!(count(&calls, &Call::Focus(true)), 0);
}

#[test_log::test]
fn context_loss_destroys_surface_and_tells_host() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.request_render();
    settle(&f.view);

    f.stats.lose_context();
    f.view.request_render();
    settle(&f.view);

    assert_eq!(f.view.state(), SurfaceState::Destroyed);
    assert_eq!(
        *f.host.0.lock(),
        vec!["setup-completed", "main-loop-started", "surface-lost"]
    );

    f.view.request_render();
    f.view.on_host_resumed();
    assert_eq!(count(&f.calls, &Call::Frame), 2);
}

#[test_log::test]
fn main_loop_started_fires_once() {
    let f = fixture();
    f.view.on_surface_create();
    for _ in 0..4 {
        f.view.request_render();
    }
    settle(&f.view);

    assert_eq!(*f.host.0.lock(), vec!["setup-completed", "main-loop-started"]);
    assert_eq!(f.stats.frames_presented(), 4);
}

#[test_log::test]
fn back_press_reaches_engine() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_back_pressed();
    settle(&f.view);

    assert_eq!(count(&f.calls, &Call::Back), 1);
}

#[test_log::test]
fn panicking_work_does_not_stop_rendering() {
    let f = fixture();
    f.view.on_surface_create();
    f.view
        .queue_on_render_thread(|_| panic!("host work exploded"))
        .unwrap();
    f.view.request_render();
    settle(&f.view);

    assert_eq!(count(&f.calls, &Call::Frame), 1);
}

struct Exploding;

impl SurfacePlugin for Exploding {
    fn on_frame(&self) -> anyhow::Result<()> {
        panic!("plugin bug");
    }
}

#[derive(Default)]
struct Counting {
    created: AtomicUsize,
    resized: AtomicUsize,
    frames: AtomicUsize,
}

impl SurfacePlugin for Counting {
    fn on_context_created(&self) -> anyhow::Result<()> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_surface_resized(&self, _width: u32, _height: u32) -> anyhow::Result<()> {
        self.resized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_frame(&self) -> anyhow::Result<()> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test_log::test]
fn panicking_plugin_does_not_starve_later_plugins() {
    let registry = Arc::new(PluginRegistry::new());
    let counting = Arc::new(Counting::default());
    registry.register(Arc::new(Exploding));
    registry.register(counting.clone());

    let f = fixture_with(RenderMode::OnDemand, registry);
    f.view.on_surface_create();
    f.view.on_surface_resize(320, 240);
    f.view.request_render();
    f.view.request_render();
    settle(&f.view);

    assert_eq!(counting.created.load(Ordering::SeqCst), 1);
    assert_eq!(counting.resized.load(Ordering::SeqCst), 1);
    assert_eq!(counting.frames.load(Ordering::SeqCst), 2);
    assert_eq!(f.stats.frames_presented(), 2);
}

#[test_log::test]
fn continuous_mode_renders_until_paused() {
    let f = fixture_with(RenderMode::Continuous, Arc::new(PluginRegistry::new()));
    f.view.on_surface_create();
    assert!(wait_until(|| f.stats.frames_presented() >= 3));

    f.view.on_host_paused();
    settle(&f.view);
    let frozen = f.stats.frames_presented();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(f.stats.frames_presented(), frozen);

    f.view.on_host_resumed();
    assert!(wait_until(|| f.stats.frames_presented() >= frozen + 3));
}

#[test_log::test]
fn pause_mid_interval_is_not_held_behind_the_frame_pacing() {
    let f = continuous(Duration::from_millis(500));
    f.view.on_surface_create();
    assert!(wait_until(|| f.stats.frames_presented() >= 1));

    let frames = count(&f.calls, &Call::Frame);
    let requested = Instant::now();
    f.view.on_host_paused();
    settle(&f.view);

    assert_eq!(f.view.state(), SurfaceState::Paused);
    assert_eq!(count(&f.calls, &Call::Frame), frames);
    assert!(requested.elapsed() < Duration::from_millis(250));
}

#[test_log::test]
fn continuous_loop_stops_ticking_after_context_loss() {
    let f = continuous(Duration::from_millis(1));
    f.view.on_surface_create();
    assert!(wait_until(|| f.stats.frames_presented() >= 2));

    f.stats.lose_context();
    assert!(wait_until(|| f.view.state() == SurfaceState::Destroyed));
    settle(&f.view);

    let presented = f.stats.frames_presented();
    let stepped = count(&f.calls, &Call::Frame);
    thread::sleep(Duration::from_millis(30));
    settle(&f.view);

    assert_eq!(f.stats.frames_presented(), presented);
    assert_eq!(count(&f.calls, &Call::Frame), stepped);
    assert_eq!(f.host.0.lock().last(), Some(&"surface-lost"));
}

#[test_log::test]
fn resize_while_paused_keeps_state_and_applies_viewport() {
    let f = fixture();
    f.view.on_surface_create();
    f.view.on_surface_resize(100, 100);
    f.view.on_host_paused();
    f.view.on_surface_resize(300, 200);
    f.view.request_render();
    settle(&f.view);

    assert_eq!(f.view.state(), SurfaceState::Paused);
    assert_eq!(f.stats.viewport(), (300, 200));
    assert_eq!(f.calls.lock().last(), Some(&Call::Resized(300, 200)));
    assert_eq!(count(&f.calls, &Call::Frame), 0);
}
