//! Sandbox failure modes.
//!
//! These never reach a [`Sandbox`](crate::Sandbox) caller as errors; they are
//! rendered into [`ExecutionResult::error`](crate::ExecutionResult).

use std::time::Duration;

/// Errors raised while preparing, running, or collecting a child process.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The interpreter could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The language runtime is missing or unusable.
    #[error("{language} runtime unavailable: {reason}")]
    RuntimeUnavailable { language: String, reason: String },

    /// The run exceeded its time budget and was killed.
    #[error("execution timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),

    /// Filesystem I/O error in the per-run directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
