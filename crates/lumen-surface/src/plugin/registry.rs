use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

/// Observer of render-surface events.
///
/// Every callback runs on the render thread. Returning an error (or panicking)
/// is logged and does not prevent later plugins from being notified.
pub trait SurfacePlugin: Send + Sync + 'static {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn on_context_created(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_surface_resized(&self, width: u32, height: u32) -> anyhow::Result<()> {
        let _ = (width, height);
        Ok(())
    }

    fn on_frame(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Event broadcast through [`PluginRegistry::notify_all`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceEvent {
    ContextCreated,
    SurfaceResized { width: u32, height: u32 },
    Frame,
}

impl SurfaceEvent {
    fn dispatch(self, plugin: &dyn SurfacePlugin) -> anyhow::Result<()> {
        match self {
            SurfaceEvent::ContextCreated => plugin.on_context_created(),
            SurfaceEvent::SurfaceResized { width, height } => plugin.on_surface_resized(width, height),
            SurfaceEvent::Frame => plugin.on_frame(),
        }
    }
}

/// Registration token returned by [`PluginRegistry::register`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PluginId(u64);

struct Entry {
    id: PluginId,
    plugin: Arc<dyn SurfacePlugin>,
}

/// Ordered plugin registry.
///
/// Cheap to share behind an `Arc`. Notification iterates a snapshot, so plugins
/// may register or unregister (themselves included) from inside a callback.
pub struct PluginRegistry {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Process-wide registry, used by surfaces that are not given their own.
    pub fn global() -> Arc<PluginRegistry> {
        static GLOBAL: OnceLock<Arc<PluginRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(PluginRegistry::new())))
    }

    pub fn register(&self, plugin: Arc<dyn SurfacePlugin>) -> PluginId {
        let id = PluginId(self.next_id.fetch_add(1, Ordering::Relaxed));
        log::debug!("plugin '{}' registered as {id:?}", plugin.name());
        self.entries.write().push(Entry { id, plugin });
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unregister(&self, id: PluginId) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|e| e.id == id) {
            Some(index) => {
                let removed = entries.remove(index);
                log::debug!("plugin '{}' unregistered", removed.plugin.name());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Notifies every registered plugin of `event`, in registration order.
    pub fn notify_all(&self, event: SurfaceEvent) {
        let snapshot: Vec<Arc<dyn SurfacePlugin>> = self
            .entries
            .read()
            .iter()
            .map(|e| Arc::clone(&e.plugin))
            .collect();

        for plugin in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| event.dispatch(plugin.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::error!("plugin '{}' failed on {event:?}: {err:#}", plugin.name());
                }
                Err(_) => {
                    log::error!("plugin '{}' panicked on {event:?}", plugin.name());
                }
            }
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        f.debug_list()
            .entries(entries.iter().map(|e| (e.id, e.plugin.name())))
            .finish()
    }
}
