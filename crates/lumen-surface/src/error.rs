//! Error taxonomy for the surface bridge.

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised by the surface bridge.
///
/// Only configuration and spawn failures are returned to the host synchronously.
/// Everything that happens on the render thread is contained there and reported
/// through logging.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No available context configuration satisfies any strategy in the chain.
    #[error("no context configuration matches the requested chain ({requested})")]
    NoMatchingConfig {
        /// Human-readable summary of every strategy that was tried.
        requested: String,
    },

    /// The graphics context is gone; the surface cannot render anymore.
    #[error("graphics context lost: {0}")]
    ContextLost(String),

    /// A single work item failed. The render loop keeps going.
    #[error("work item failed: {0}")]
    WorkItemFailure(String),

    /// A lifecycle signal arrived in a state that cannot accept it.
    #[error("invalid event sequence: {event} while {state}")]
    InvalidEventSequence {
        event: &'static str,
        state: &'static str,
    },

    /// The executor no longer accepts work.
    #[error("render thread is stopped")]
    ExecutorStopped,

    /// `stop` was called on the render thread itself, which would deadlock.
    #[error("render thread cannot stop itself")]
    StopFromRenderThread,

    /// The render thread could not be spawned.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` for errors that end the surface instance.
    pub fn is_context_lost(&self) -> bool {
        matches!(self, BridgeError::ContextLost(_))
    }
}
