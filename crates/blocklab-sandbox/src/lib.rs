//! Code execution sandboxes for generated JavaScript and Python source.
//!
//! Every [`Sandbox`] honours one contract: `execute(source)` always returns an
//! [`ExecutionResult`] and never propagates a failure to its caller. Spawn
//! failures, a missing runtime, timeouts, and uncaught exceptions all land in
//! [`ExecutionResult::error`].
//!
//! Both process-backed variants run the user source in a fresh child process
//! inside a per-run temporary directory. Output capture is a handle owned by
//! that one run (the wrapper's buffers and its result file), so repeated or
//! concurrent runs cannot observe each other.
//!
//! # Modules
//!
//! - [`config`]: SandboxConfig (interpreter binaries, timeout)
//! - [`error`]: SandboxError, the internal failure type folded into results
//! - [`javascript`]: JavaScriptSandbox (node, fresh `vm` context per run)
//! - [`python`]: PythonSandbox with a lazily probed, cached runtime
//! - [`result`]: ExecutionResult

pub mod config;
pub mod error;
pub mod javascript;
pub mod python;
pub mod result;

mod process;

use std::sync::Arc;

use async_trait::async_trait;
use blocklab_storage::Language;

pub use config::SandboxConfig;
pub use error::SandboxError;
pub use javascript::JavaScriptSandbox;
pub use python::{PythonRuntime, PythonSandbox};
pub use result::ExecutionResult;

/// Runs source text for one language, capturing output and the first error.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// The language this sandbox executes.
    fn language(&self) -> Language;

    /// Executes `source`. Never fails: every failure is captured in the
    /// returned result's `error` field.
    async fn execute(&self, source: &str) -> ExecutionResult;
}

/// One sandbox per supported language.
#[derive(Clone)]
pub struct SandboxSet {
    javascript: Arc<dyn Sandbox>,
    python: Arc<dyn Sandbox>,
}

impl SandboxSet {
    pub fn new(javascript: Arc<dyn Sandbox>, python: Arc<dyn Sandbox>) -> Self {
        SandboxSet { javascript, python }
    }

    /// Builds the child-process sandboxes for both languages.
    pub fn from_config(config: SandboxConfig) -> Self {
        SandboxSet {
            javascript: Arc::new(JavaScriptSandbox::new(config.clone())),
            python: Arc::new(PythonSandbox::new(config)),
        }
    }

    /// The sandbox registered for `language`.
    pub fn get(&self, language: Language) -> &Arc<dyn Sandbox> {
        match language {
            Language::JavaScript => &self.javascript,
            Language::Python => &self.python,
        }
    }

    pub async fn execute(&self, language: Language, source: &str) -> ExecutionResult {
        self.get(language).execute(source).await
    }
}

impl std::fmt::Debug for SandboxSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxSet")
            .field("javascript", &self.javascript.language())
            .field("python", &self.python.language())
            .finish()
    }
}
