//! Sandbox configuration.

use std::time::Duration;

/// Default wall-clock budget for one run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interpreter binaries and limits shared by the process sandboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Wall-clock budget per run; the child is killed when it is exceeded.
    pub timeout: Duration,
    /// Node.js executable used for JavaScript.
    pub node_bin: String,
    /// Python 3 executable.
    pub python_bin: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        SandboxConfig {
            timeout: DEFAULT_TIMEOUT,
            node_bin: "node".to_string(),
            python_bin: "python3".to_string(),
        }
    }
}

impl SandboxConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
