use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of one render surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum SurfaceState {
    Uninitialized = 0,
    ContextCreated = 1,
    Active = 2,
    Paused = 3,
    /// Terminal.
    Destroyed = 4,
}

impl SurfaceState {
    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceState::Uninitialized => "uninitialized",
            SurfaceState::ContextCreated => "context-created",
            SurfaceState::Active => "active",
            SurfaceState::Paused => "paused",
            SurfaceState::Destroyed => "destroyed",
        }
    }

    /// `true` while a graphics context exists.
    pub fn has_context(self) -> bool {
        matches!(
            self,
            SurfaceState::ContextCreated | SurfaceState::Active | SurfaceState::Paused
        )
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SurfaceState::Uninitialized,
            1 => SurfaceState::ContextCreated,
            2 => SurfaceState::Active,
            3 => SurfaceState::Paused,
            _ => SurfaceState::Destroyed,
        }
    }
}

impl fmt::Display for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomically published [`SurfaceState`].
///
/// Written by the render thread only; readable from any thread. Readers may see
/// a stale value but never a torn one.
#[derive(Debug)]
pub struct SurfaceStateCell(AtomicU8);

impl SurfaceStateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SurfaceState::Uninitialized as u8))
    }

    pub fn load(&self) -> SurfaceState {
        SurfaceState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: SurfaceState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

impl Default for SurfaceStateCell {
    fn default() -> Self {
        Self::new()
    }
}
