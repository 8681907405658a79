use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ContextConfig;
use crate::error::{BridgeError, BridgeResult};

use super::{ContextFactory, ContextOptions, GraphicsContext};

/// Counters shared between a headless factory, its contexts and the caller.
#[derive(Debug, Default)]
pub struct HeadlessStats {
    contexts: AtomicU64,
    presents: AtomicU64,
    viewport: AtomicU64,
    lose_next: AtomicBool,
}

impl HeadlessStats {
    pub fn contexts_created(&self) -> u64 {
        self.contexts.load(Ordering::Acquire)
    }

    pub fn frames_presented(&self) -> u64 {
        self.presents.load(Ordering::Acquire)
    }

    /// Last viewport as `(width, height)`; `(0, 0)` before the first resize.
    pub fn viewport(&self) -> (u32, u32) {
        let packed = self.viewport.load(Ordering::Acquire);
        ((packed >> 32) as u32, packed as u32)
    }

    /// Makes the next `present` report a lost context.
    pub fn lose_context(&self) {
        self.lose_next.store(true, Ordering::Release);
    }
}

/// Context factory without a GPU.
///
/// Used for tooling, demos and tests: frames are counted, nothing is drawn.
#[derive(Debug, Clone)]
pub struct HeadlessContextFactory {
    configs: Vec<ContextConfig>,
    stats: Arc<HeadlessStats>,
}

impl HeadlessContextFactory {
    /// Offers 8-bit RGBA with 24- and 16-bit depth.
    pub fn new() -> Self {
        Self::with_configs(vec![ContextConfig::rgba8(24, 8), ContextConfig::rgba8(16, 0)])
    }

    pub fn with_configs(configs: Vec<ContextConfig>) -> Self {
        Self {
            configs,
            stats: Arc::new(HeadlessStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<HeadlessStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for HeadlessContextFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextFactory for HeadlessContextFactory {
    type Context = HeadlessContext;

    fn available_configs(&self) -> Vec<ContextConfig> {
        self.configs.clone()
    }

    fn create(&mut self, config: &ContextConfig, options: &ContextOptions) -> BridgeResult<HeadlessContext> {
        log::debug!("headless context {config} created (debug: {})", options.debug);
        self.stats.contexts.fetch_add(1, Ordering::AcqRel);
        Ok(HeadlessContext {
            stats: Arc::clone(&self.stats),
        })
    }
}

#[derive(Debug)]
pub struct HeadlessContext {
    stats: Arc<HeadlessStats>,
}

impl GraphicsContext for HeadlessContext {
    fn set_viewport(&mut self, width: u32, height: u32) -> BridgeResult<()> {
        let packed = (u64::from(width) << 32) | u64::from(height);
        self.stats.viewport.store(packed, Ordering::Release);
        Ok(())
    }

    fn present(&mut self) -> BridgeResult<()> {
        if self.stats.lose_next.swap(false, Ordering::AcqRel) {
            return Err(BridgeError::ContextLost("headless context dropped".into()));
        }
        self.stats.presents.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_round_trips_through_packed_atomic() {
        let mut factory = HeadlessContextFactory::new();
        let stats = factory.stats();
        let mut ctx = factory
            .create(&ContextConfig::rgba8(24, 0), &ContextOptions::default())
            .unwrap();

        assert_eq!(stats.viewport(), (0, 0));
        ctx.set_viewport(1920, 1080).unwrap();
        assert_eq!(stats.viewport(), (1920, 1080));
        assert_eq!(stats.contexts_created(), 1);
    }

    #[test]
    fn lost_context_fails_one_present() {
        let mut factory = HeadlessContextFactory::new();
        let stats = factory.stats();
        let mut ctx = factory
            .create(&ContextConfig::rgba8(16, 0), &ContextOptions::default())
            .unwrap();

        ctx.present().unwrap();
        stats.lose_context();
        assert!(ctx.present().unwrap_err().is_context_lost());
        ctx.present().unwrap();
        assert_eq!(stats.frames_presented(), 2);
    }
}
