use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use lumen_surface::engine::{HeadlessContextFactory, HostCallbacks, NativeEngine};
use lumen_surface::input::platform::winit::WinitInputTranslator;
use lumen_surface::input::InputEvent;
use lumen_surface::logging::{init_logging, LoggingConfig};
use lumen_surface::SurfaceView;

/// How often pending taps are confirmed while the event loop idles.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Engine core stand-in that logs what it is told.
#[derive(Default)]
struct LoggingEngine {
    frames: u64,
}

impl NativeEngine for LoggingEngine {
    fn on_context_created(&mut self) {
        log::info!("engine: context created");
    }

    fn on_surface_resized(&mut self, width: u32, height: u32) {
        log::info!("engine: surface {width}x{height}");
    }

    fn step_frame(&mut self) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            log::info!("engine: {} frames", self.frames);
        }
    }

    fn on_resumed(&mut self) {
        log::info!("engine: resumed");
    }

    fn on_paused(&mut self) {
        log::info!("engine: paused after {} frames", self.frames);
    }

    fn deliver_input_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove(_) | InputEvent::GenericMotion(_) => log::trace!("engine: {event}"),
            _ => log::info!("engine: {event}"),
        }
    }

    fn on_focus_changed(&mut self, focused: bool) {
        log::debug!("engine: focus {focused}");
    }

    fn on_back_pressed(&mut self) {
        log::info!("engine: back");
    }
}

struct DemoHost;

impl HostCallbacks for DemoHost {
    fn on_setup_completed(&mut self) {
        log::info!("host: setup completed");
    }

    fn on_main_loop_started(&mut self) {
        log::info!("host: main loop started");
    }

    fn on_surface_lost(&mut self) {
        log::warn!("host: surface lost");
    }
}

type DemoView = SurfaceView<LoggingEngine, HeadlessContextFactory>;

struct Demo {
    window: Option<Window>,
    view: Option<DemoView>,
    input: WinitInputTranslator,
}

impl Demo {
    fn new() -> Self {
        Self {
            window: None,
            view: None,
            input: WinitInputTranslator::new(),
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("lumen demo")
            .with_inner_size(LogicalSize::new(960.0, 540.0));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let view = SurfaceView::builder(LoggingEngine::default(), HeadlessContextFactory::new())
            .debug_context(cfg!(debug_assertions))
            .host_callbacks(DemoHost)
            .build()
            .context("failed to set up render surface")?;

        let size = window.inner_size();
        view.on_surface_create();
        view.on_surface_resize(size.width, size.height);

        self.window = Some(window);
        self.view = Some(view);
        Ok(())
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(view) = self.view.take() {
            if let Err(e) = view.shutdown() {
                log::error!("render thread shutdown failed: {e}");
            }
        }
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(view) = &self.view {
            view.on_host_resumed();
            return;
        }

        if let Err(e) = self.open(event_loop) {
            log::error!("{e:#}");
            event_loop.exit();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(view) = &self.view {
            view.on_host_paused();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            self.close(event_loop);
            return;
        }

        let Some(view) = &self.view else {
            return;
        };

        match &event {
            WindowEvent::Resized(size) => view.on_surface_resize(size.width, size.height),
            WindowEvent::Occluded(true) => view.on_host_paused(),
            WindowEvent::Occluded(false) => view.on_host_resumed(),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                view.on_back_pressed();
            }
            _ => {}
        }

        if let Some(raw) = self.input.translate(&event) {
            view.forward_input_event(raw);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(view) = &self.view {
            view.poll_input(self.input.now());
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + INPUT_POLL));
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut demo = Demo::new();

    event_loop
        .run_app(&mut demo)
        .context("winit event loop terminated with error")?;

    Ok(())
}
