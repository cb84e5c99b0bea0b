//! The outcome of one sandbox run.

use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Captured output and first uncaught failure of a run.
///
/// `error` is empty when the program completed without failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
}

impl ExecutionResult {
    pub fn new(output: impl Into<String>, error: impl Into<String>) -> Self {
        ExecutionResult {
            output: output.into(),
            error: error.into(),
        }
    }

    /// A run that failed before producing any output.
    pub fn failure(error: impl Into<String>) -> Self {
        ExecutionResult {
            output: String::new(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

impl From<SandboxError> for ExecutionResult {
    fn from(err: SandboxError) -> Self {
        ExecutionResult::failure(err.to_string())
    }
}
