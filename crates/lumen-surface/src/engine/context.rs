use crate::config::ContextConfig;
use crate::error::BridgeResult;

/// Creation flags forwarded to the platform context factory.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ContextOptions {
    /// Request a debug context (validation/error callbacks), if supported.
    pub debug: bool,

    /// Request a surface with an alpha channel visible to the compositor.
    pub translucent: bool,
}

/// A live graphics context bound to the surface.
///
/// Lives and dies on the render thread. Dropping it releases the context.
pub trait GraphicsContext {
    fn set_viewport(&mut self, width: u32, height: u32) -> BridgeResult<()>;

    /// Presents the frame. Reports [`crate::BridgeError::ContextLost`] when the
    /// context became unusable.
    fn present(&mut self) -> BridgeResult<()>;
}

/// Platform side of context creation.
pub trait ContextFactory: Send + 'static {
    type Context: GraphicsContext + 'static;

    /// Configurations the platform can create. Queried once, at surface construction.
    fn available_configs(&self) -> Vec<ContextConfig>;

    /// Creates a context for the selected configuration. Called on the render thread.
    fn create(&mut self, config: &ContextConfig, options: &ContextOptions) -> BridgeResult<Self::Context>;
}

/// Milestones reported back to the host. Invoked on the render thread.
pub trait HostCallbacks: Send + 'static {
    /// The context exists and the engine has been told about it.
    fn on_setup_completed(&mut self) {}

    /// The first frame has been stepped.
    fn on_main_loop_started(&mut self) {}

    /// The context was lost; this surface is finished and may be recreated.
    fn on_surface_lost(&mut self) {}
}

/// Host that ignores every milestone.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoHostCallbacks;

impl HostCallbacks for NoHostCallbacks {}
