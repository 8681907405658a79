use std::time::Duration;

use crate::config::ConfigChooser;
use crate::engine::ContextOptions;
use crate::input::GestureConfig;

/// How frame ticks are scheduled while the surface is active.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RenderMode {
    /// Each frame queues the next one, paced by `frame_interval`.
    #[default]
    Continuous,
    /// Frames run only when the host calls `request_render`.
    OnDemand,
}

/// Surface configuration.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Name of the render thread.
    pub thread_name: String,

    pub render_mode: RenderMode,

    /// Target frame period in [`RenderMode::Continuous`].
    pub frame_interval: Duration,

    /// Ordered context configuration strategies.
    pub chooser: ConfigChooser,

    pub context: ContextOptions,

    pub gesture: GestureConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            thread_name: "lumen-render".to_owned(),
            render_mode: RenderMode::Continuous,
            frame_interval: Duration::from_micros(16_667),
            chooser: ConfigChooser::default(),
            context: ContextOptions::default(),
            gesture: GestureConfig::default(),
        }
    }
}
