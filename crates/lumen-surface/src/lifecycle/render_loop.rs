use std::sync::Arc;
use std::time::Duration;

use crate::config::ContextConfig;
use crate::engine::{ContextFactory, ContextOptions, GraphicsContext, HostCallbacks, NativeEngine};
use crate::error::{BridgeError, BridgeResult};
use crate::executor::{RenderHandle, WorkerState};
use crate::input::{InputEvent, InputTarget};
use crate::plugin::{PluginRegistry, SurfaceEvent};
use crate::time::FrameClock;

use super::config::RenderMode;
use super::state::{SurfaceState, SurfaceStateCell};

/// Render-thread half of a surface.
///
/// Built on the render thread and never leaves it, so the graphics context it
/// owns is only ever touched there.
pub(crate) struct RenderLoop<E, F: ContextFactory> {
    engine: E,
    factory: F,
    context: Option<F::Context>,
    config: ContextConfig,
    options: ContextOptions,

    plugins: Arc<PluginRegistry>,
    host: Box<dyn HostCallbacks>,
    state: Arc<SurfaceStateCell>,
    handle: RenderHandle<Self>,

    mode: RenderMode,
    frame_interval: Duration,
    clock: FrameClock,

    /// The host is in the background.
    host_paused: bool,
    /// `on_resumed` is owed on the next frame.
    just_resumed: bool,
    main_loop_started: bool,
    tick_queued: bool,
}

/// Everything the render loop needs, moved onto the render thread at start.
pub(crate) struct LoopParts<E, F> {
    pub engine: E,
    pub factory: F,
    pub config: ContextConfig,
    pub options: ContextOptions,
    pub plugins: Arc<PluginRegistry>,
    pub host: Box<dyn HostCallbacks>,
    pub state: Arc<SurfaceStateCell>,
    pub mode: RenderMode,
    pub frame_interval: Duration,
}

impl<E: NativeEngine, F: ContextFactory> RenderLoop<E, F> {
    pub(crate) fn new(parts: LoopParts<E, F>, handle: RenderHandle<Self>) -> Self {
        Self {
            engine: parts.engine,
            factory: parts.factory,
            context: None,
            config: parts.config,
            options: parts.options,
            plugins: parts.plugins,
            host: parts.host,
            state: parts.state,
            handle,
            mode: parts.mode,
            frame_interval: parts.frame_interval,
            clock: FrameClock::new(),
            host_paused: false,
            just_resumed: false,
            main_loop_started: false,
            tick_queued: false,
        }
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn state(&self) -> SurfaceState {
        self.state.load()
    }

    fn transition(&mut self, next: SurfaceState) {
        let prev = self.state();
        if prev != next {
            log::debug!("surface {prev} -> {next}");
            self.state.store(next);
        }
    }

    fn invalid(&self, event: &'static str) -> BridgeError {
        BridgeError::InvalidEventSequence {
            event,
            state: self.state().as_str(),
        }
    }

    /// The platform surface exists: create the context and start rendering.
    pub(crate) fn create_surface(&mut self) -> BridgeResult<()> {
        if self.state() != SurfaceState::Uninitialized {
            return Err(self.invalid("surface-create"));
        }

        let context = self
            .factory
            .create(&self.config, &self.options)
            .map_err(|err| match err {
                lost @ BridgeError::ContextLost(_) => lost,
                other => BridgeError::ContextLost(format!("context creation failed: {other}")),
            })?;
        self.context = Some(context);
        log::info!("graphics context created with {}", self.config);

        self.engine.on_context_created();
        self.plugins.notify_all(SurfaceEvent::ContextCreated);
        self.transition(SurfaceState::ContextCreated);
        self.host.on_setup_completed();

        if self.host_paused {
            self.transition(SurfaceState::Paused);
        } else {
            self.transition(SurfaceState::Active);
            self.schedule_tick();
        }
        Ok(())
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> BridgeResult<()> {
        if !self.state().has_context() {
            return Err(self.invalid("surface-resize"));
        }

        if let Some(context) = self.context.as_mut() {
            context.set_viewport(width, height)?;
        }
        log::debug!("surface resized to {width}x{height}");

        self.engine.on_surface_resized(width, height);
        self.plugins
            .notify_all(SurfaceEvent::SurfaceResized { width, height });

        if self.state() == SurfaceState::ContextCreated {
            self.transition(SurfaceState::Active);
            self.schedule_tick();
        }
        Ok(())
    }

    pub(crate) fn pause(&mut self) -> BridgeResult<()> {
        match self.state() {
            SurfaceState::Uninitialized => self.host_paused = true,
            SurfaceState::ContextCreated | SurfaceState::Active => {
                self.host_paused = true;
                self.just_resumed = false;
                self.engine.on_focus_changed(false);
                self.engine.on_paused();
                self.transition(SurfaceState::Paused);
            }
            SurfaceState::Paused | SurfaceState::Destroyed => {
                log::debug!("pause ignored while {}", self.state());
            }
        }
        Ok(())
    }

    pub(crate) fn resume(&mut self) -> BridgeResult<()> {
        match self.state() {
            SurfaceState::Uninitialized => self.host_paused = false,
            SurfaceState::Paused => {
                self.host_paused = false;
                self.just_resumed = true;
                self.engine.on_focus_changed(true);
                self.clock.reset();
                self.transition(SurfaceState::Active);
                self.schedule_tick();
            }
            SurfaceState::ContextCreated | SurfaceState::Active | SurfaceState::Destroyed => {
                log::debug!("resume ignored while {}", self.state());
            }
        }
        Ok(())
    }

    /// Releases the context. Terminal.
    pub(crate) fn destroy(&mut self) -> BridgeResult<()> {
        if self.state() == SurfaceState::Destroyed {
            return Ok(());
        }

        self.context = None;
        self.transition(SurfaceState::Destroyed);
        log::info!("surface destroyed");
        Ok(())
    }

    /// One frame. Does nothing unless the surface is active.
    pub(crate) fn frame(&mut self) -> BridgeResult<()> {
        if self.state() != SurfaceState::Active {
            return Ok(());
        }

        if std::mem::take(&mut self.just_resumed) {
            self.engine.on_resumed();
        }

        let time = self.clock.tick();
        log::trace!("frame {} dt={:.4}s", time.frame_index, time.dt);

        self.engine.step_frame();
        self.plugins.notify_all(SurfaceEvent::Frame);

        if let Some(context) = self.context.as_mut() {
            context.present()?;
        }

        if !self.main_loop_started {
            self.main_loop_started = true;
            log::info!("main loop started");
            self.host.on_main_loop_started();
        }

        Ok(())
    }

    /// Frame tick queued by the loop itself in continuous mode.
    fn tick(&mut self) -> BridgeResult<()> {
        self.tick_queued = false;
        if self.state() != SurfaceState::Active {
            return Ok(());
        }

        let wait = self.clock.remaining(self.frame_interval);
        if !wait.is_zero() && self.handle.wait_for_work(wait) {
            // Host work arrived mid-interval; it runs first, pacing resumes after.
            self.schedule_tick();
            return Ok(());
        }

        let result = self.frame();
        if !matches!(&result, Err(err) if err.is_context_lost()) {
            self.schedule_tick();
        }
        result
    }

    fn schedule_tick(&mut self) {
        if self.mode != RenderMode::Continuous
            || self.tick_queued
            || self.state() != SurfaceState::Active
        {
            return;
        }

        match self.handle.enqueue(|rl: &mut Self| rl.tick()) {
            Ok(()) => self.tick_queued = true,
            Err(err) => log::debug!("frame tick not scheduled: {err}"),
        }
    }

    pub(crate) fn back_pressed(&mut self) -> BridgeResult<()> {
        if self.state() != SurfaceState::Destroyed {
            self.engine.on_back_pressed();
        }
        Ok(())
    }
}

impl<E: NativeEngine, F: ContextFactory> WorkerState for RenderLoop<E, F> {
    fn context_lost(&mut self, err: &BridgeError) {
        log::warn!("surface lost: {err}");
        self.context = None;
        self.transition(SurfaceState::Destroyed);
        self.host.on_surface_lost();
    }
}

impl<E: NativeEngine, F: ContextFactory> InputTarget for RenderLoop<E, F> {
    fn deliver_input(&mut self, event: InputEvent) -> BridgeResult<()> {
        if self.state().has_context() {
            self.engine.deliver_input_event(event);
        } else {
            log::trace!("{event} dropped while {}", self.state());
        }
        Ok(())
    }
}
