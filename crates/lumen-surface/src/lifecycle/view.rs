use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigChooser, ContextConfig};
use crate::engine::{ContextFactory, HostCallbacks, NativeEngine, NoHostCallbacks};
use crate::error::{BridgeError, BridgeResult};
use crate::executor::{RenderThread, StopMode};
use crate::input::{GestureConfig, InputEventBridge, RawInputEvent};
use crate::plugin::PluginRegistry;

use super::config::{RenderMode, SurfaceConfig};
use super::render_loop::{LoopParts, RenderLoop};
use super::state::{SurfaceState, SurfaceStateCell};

/// Builder for [`SurfaceView`].
pub struct SurfaceViewBuilder<E, F> {
    engine: E,
    factory: F,
    config: SurfaceConfig,
    plugins: Option<Arc<PluginRegistry>>,
    host: Box<dyn HostCallbacks>,
}

impl<E: NativeEngine, F: ContextFactory> SurfaceViewBuilder<E, F> {
    pub fn config(mut self, config: SurfaceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.config.render_mode = mode;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.config.frame_interval = interval;
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    pub fn chooser(mut self, chooser: ConfigChooser) -> Self {
        self.config.chooser = chooser;
        self
    }

    pub fn gesture(mut self, gesture: GestureConfig) -> Self {
        self.config.gesture = gesture;
        self
    }

    pub fn debug_context(mut self, debug: bool) -> Self {
        self.config.context.debug = debug;
        self
    }

    pub fn translucent(mut self, translucent: bool) -> Self {
        self.config.context.translucent = translucent;
        self
    }

    /// Uses `plugins` instead of [`PluginRegistry::global`].
    pub fn plugins(mut self, plugins: Arc<PluginRegistry>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    pub fn host_callbacks(mut self, host: impl HostCallbacks) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Selects the context configuration and starts the render thread.
    ///
    /// Fails with [`BridgeError::NoMatchingConfig`] when the platform offers
    /// nothing the chooser accepts.
    pub fn build(self) -> BridgeResult<SurfaceView<E, F>> {
        let SurfaceConfig {
            thread_name,
            render_mode,
            frame_interval,
            chooser,
            context,
            gesture,
        } = self.config;

        let candidates = self.factory.available_configs();
        let chosen = chooser.choose(&candidates)?;
        log::info!("surface uses context config {chosen} ({render_mode:?} rendering)");

        let state = Arc::new(SurfaceStateCell::new());
        let parts = LoopParts {
            engine: self.engine,
            factory: self.factory,
            config: chosen,
            options: context,
            plugins: self.plugins.unwrap_or_else(PluginRegistry::global),
            host: self.host,
            state: Arc::clone(&state),
            mode: render_mode,
            frame_interval,
        };

        let thread = RenderThread::start(thread_name, move |handle| RenderLoop::new(parts, handle))?;
        let input = InputEventBridge::new(gesture, thread.handle());

        Ok(SurfaceView {
            thread,
            input,
            state,
            destroy_requested: AtomicBool::new(false),
            chosen,
        })
    }
}

/// Host-facing handle of one render surface.
///
/// Every method may be called from any host thread and returns without waiting
/// for the render thread. Once destroy has been requested all of them are
/// ignored. Dropping the view destroys the surface and joins the render thread.
pub struct SurfaceView<E: NativeEngine, F: ContextFactory> {
    thread: RenderThread<RenderLoop<E, F>>,
    input: InputEventBridge<RenderLoop<E, F>>,
    state: Arc<SurfaceStateCell>,
    destroy_requested: AtomicBool,
    chosen: ContextConfig,
}

impl<E: NativeEngine, F: ContextFactory> SurfaceView<E, F> {
    pub fn builder(engine: E, factory: F) -> SurfaceViewBuilder<E, F> {
        SurfaceViewBuilder {
            engine,
            factory,
            config: SurfaceConfig::default(),
            plugins: None,
            host: Box::new(NoHostCallbacks),
        }
    }

    /// Last state published by the render thread.
    pub fn state(&self) -> SurfaceState {
        self.state.load()
    }

    pub fn chosen_config(&self) -> ContextConfig {
        self.chosen
    }

    pub fn is_destroy_requested(&self) -> bool {
        self.destroy_requested.load(Ordering::Acquire)
    }

    /// The platform surface is ready; the context is created on the render thread.
    pub fn on_surface_create(&self) {
        self.post("surface-create", |rl| rl.create_surface());
    }

    pub fn on_surface_resize(&self, width: u32, height: u32) {
        self.post("surface-resize", move |rl| rl.resize(width, height));
    }

    pub fn on_host_resumed(&self) {
        self.post("host-resumed", |rl| rl.resume());
    }

    /// Frames already queued still run; none follow until resumed.
    pub fn on_host_paused(&self) {
        self.post("host-paused", |rl| rl.pause());
    }

    /// Releases the context after everything already queued, then lets the
    /// render thread exit.
    pub fn on_host_destroyed(&self) {
        if self.destroy_requested.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Err(err) = self.thread.enqueue(|rl: &mut RenderLoop<E, F>| rl.destroy()) {
            log::debug!("surface-destroy not queued: {err}");
        }
        self.thread.request_stop(StopMode::Drain);
    }

    /// Forwards the host's back action to the engine.
    pub fn on_back_pressed(&self) {
        self.post("back-pressed", |rl| rl.back_pressed());
    }

    /// Classifies a raw input event and queues the results for the engine.
    pub fn forward_input_event(&self, raw: RawInputEvent) {
        if self.is_gone() {
            log::trace!("input dropped after destroy");
            return;
        }

        if let Err(err) = self.input.forward(raw) {
            log::debug!("input not queued: {err}");
        }
    }

    /// Confirms single taps whose double-tap window has lapsed at `now`, on the
    /// same clock as the raw event timestamps.
    pub fn poll_input(&self, now: Duration) {
        if self.is_gone() {
            return;
        }

        if let Err(err) = self.input.poll(now) {
            log::debug!("input not queued: {err}");
        }
    }

    /// Queues one frame. The only source of frames in [`RenderMode::OnDemand`].
    pub fn request_render(&self) {
        self.post("render", |rl| rl.frame());
    }

    /// Runs `work` against the engine on the render thread.
    pub fn queue_on_render_thread<W>(&self, work: W) -> BridgeResult<()>
    where
        W: FnOnce(&mut E) + Send + 'static,
    {
        if self.is_destroy_requested() {
            return Err(BridgeError::ExecutorStopped);
        }

        self.thread.enqueue(move |rl: &mut RenderLoop<E, F>| {
            work(rl.engine_mut());
            Ok(())
        })
    }

    /// Destroys the surface and waits for the render thread to finish.
    pub fn shutdown(self) -> BridgeResult<()> {
        self.on_host_destroyed();
        self.thread.stop(StopMode::Drain)
    }

    fn is_gone(&self) -> bool {
        self.is_destroy_requested() || self.state() == SurfaceState::Destroyed
    }

    fn post<W>(&self, what: &'static str, work: W)
    where
        W: FnOnce(&mut RenderLoop<E, F>) -> BridgeResult<()> + Send + 'static,
    {
        if self.is_gone() {
            log::debug!("{what} ignored after destroy");
            return;
        }

        if let Err(err) = self.thread.enqueue(work) {
            log::debug!("{what} not queued: {err}");
        }
    }
}

impl<E: NativeEngine, F: ContextFactory> Drop for SurfaceView<E, F> {
    fn drop(&mut self) {
        self.on_host_destroyed();
    }
}
