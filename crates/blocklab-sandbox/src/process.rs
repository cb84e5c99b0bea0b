//! Child-process plumbing shared by the language sandboxes.
//!
//! A run lays out a fresh temporary directory holding the wrapper script, the
//! user source, and the path of a result file. The wrapper executes the
//! source with its own capture buffers and writes an [`ExecutionResult`] as
//! JSON to the result file. The directory is removed when the [`RunDir`] is
//! dropped.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Command;

use crate::error::SandboxError;
use crate::result::ExecutionResult;

pub(crate) const RESULT_FILE: &str = "result.json";

/// Environment variables passed through to the child. Everything else is
/// cleared.
const INHERITED_ENV: &[&str] = &["PATH", "SYSTEMROOT"];

/// Per-run scratch directory.
pub(crate) struct RunDir {
    dir: TempDir,
}

impl RunDir {
    pub(crate) fn create() -> Result<Self, SandboxError> {
        let dir = tempfile::Builder::new().prefix("blocklab-run-").tempdir()?;
        Ok(RunDir { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `contents` to `name` inside the run directory.
    pub(crate) async fn write(&self, name: &str, contents: &str) -> Result<PathBuf, SandboxError> {
        let path = self.file(name);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

/// A fully described child invocation.
pub(crate) struct ChildSpec<'a> {
    pub program: &'a str,
    pub args: Vec<OsString>,
    pub env: &'a [(&'a str, &'a str)],
    pub timeout: Duration,
}

/// Runs the wrapper child to completion and collects its result file.
///
/// The child gets null stdin, a cleared environment, and the run directory
/// as working directory. When the timeout elapses the pending wait is
/// dropped, which kills the child.
pub(crate) async fn run_wrapper(
    spec: ChildSpec<'_>,
    run_dir: &RunDir,
) -> Result<ExecutionResult, SandboxError> {
    let mut cmd = Command::new(spec.program);
    cmd.args(&spec.args)
        .current_dir(run_dir.path())
        .env_clear()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for key in INHERITED_ENV {
        if let Some(value) = std::env::var_os(key) {
            cmd.env(key, value);
        }
    }
    for (key, value) in spec.env {
        cmd.env(key, value);
    }

    let child = cmd.spawn().map_err(|source| SandboxError::Spawn {
        program: spec.program.to_string(),
        source,
    })?;

    let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            tracing::warn!(
                program = spec.program,
                timeout_ms = spec.timeout.as_millis() as u64,
                "sandbox run timed out"
            );
            return Err(SandboxError::TimedOut(spec.timeout));
        }
    };

    match read_result(&run_dir.file(RESULT_FILE)).await {
        Some(result) => Ok(result),
        None => {
            // The wrapper died before reporting (hard exit, crash, or a
            // failure in the wrapper itself).
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let error = match (stderr.is_empty(), output.status.success()) {
                (false, _) => stderr,
                (true, true) => String::new(),
                (true, false) => format!("process exited with {}", output.status),
            };
            tracing::debug!(
                program = spec.program,
                status = %output.status,
                "wrapper produced no result file"
            );
            Ok(ExecutionResult::new(stdout, error))
        }
    }
}

async fn read_result(path: &Path) -> Option<ExecutionResult> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    serde_json::from_str(&raw).ok()
}
