//! Python sandbox with a lazily resolved, cached runtime.
//!
//! The first run probes the configured interpreter (`--version`) and caches
//! the resolved [`PythonRuntime`]; later runs reuse it. A failed probe is
//! reported in the run's error and retried by the next run.
//!
//! The wrapper swaps `sys.stdout`/`sys.stderr` for in-memory buffers, runs
//! the source under an exception guard that writes the exception text to the
//! error buffer, restores the real streams, and reports both buffers.

use std::ffi::OsString;
use std::process::Stdio;

use async_trait::async_trait;
use blocklab_storage::Language;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::process::{self, ChildSpec, RunDir, RESULT_FILE};
use crate::result::ExecutionResult;
use crate::Sandbox;

const WRAPPER: &str = r#"import io
import json
import sys

source_path, result_path = sys.argv[1], sys.argv[2]
with open(source_path, encoding="utf-8") as handle:
    source = handle.read()

out, err = io.StringIO(), io.StringIO()
real_stdout, real_stderr = sys.stdout, sys.stderr
sys.stdout, sys.stderr = out, err
try:
    exec(compile(source, "program.py", "exec"), {"__name__": "__main__"})
except SystemExit as exc:
    if exc.code not in (None, 0):
        err.write("SystemExit: " + str(exc.code))
except BaseException as exc:
    err.write(str(exc) or type(exc).__name__)
finally:
    sys.stdout, sys.stderr = real_stdout, real_stderr


def well_formed(text):
    return text.encode("utf-8", "surrogatepass").decode("utf-8", "replace")


with open(result_path, "w", encoding="utf-8") as handle:
    json.dump(
        {"output": well_formed(out.getvalue()), "error": well_formed(err.getvalue())},
        handle,
    )
"#;

const CHILD_ENV: &[(&str, &str)] = &[
    ("PYTHONIOENCODING", "utf-8"),
    ("PYTHONDONTWRITEBYTECODE", "1"),
];

/// A resolved Python 3 interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRuntime {
    pub interpreter: String,
    /// Output of `--version`, e.g. `Python 3.12.1`.
    pub version: String,
}

impl PythonRuntime {
    /// Runs `interpreter --version` and checks for a Python 3 runtime.
    pub async fn probe(config: &SandboxConfig) -> Result<Self, SandboxError> {
        let unavailable = |reason: String| SandboxError::RuntimeUnavailable {
            language: Language::Python.display_name().to_string(),
            reason,
        };

        let child = Command::new(&config.python_bin)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SandboxError::Spawn {
                program: config.python_bin.clone(),
                source,
            })?;
        let output = tokio::time::timeout(config.timeout, child.wait_with_output())
            .await
            .map_err(|_| SandboxError::TimedOut(config.timeout))??;

        if !output.status.success() {
            return Err(unavailable(format!(
                "`{} --version` exited with {}",
                config.python_bin, output.status
            )));
        }

        // Older interpreters print the version on stderr.
        let mut version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            version = String::from_utf8_lossy(&output.stderr).trim().to_string();
        }
        if !version.starts_with("Python 3") {
            return Err(unavailable(format!(
                "expected a Python 3 interpreter, found '{}'",
                version
            )));
        }

        Ok(PythonRuntime {
            interpreter: config.python_bin.clone(),
            version,
        })
    }
}

/// Executes Python 3 in a child process.
#[derive(Debug)]
pub struct PythonSandbox {
    config: SandboxConfig,
    runtime: OnceCell<PythonRuntime>,
}

impl PythonSandbox {
    pub fn new(config: SandboxConfig) -> Self {
        PythonSandbox {
            config,
            runtime: OnceCell::new(),
        }
    }

    /// The cached runtime, resolving it on first use.
    pub async fn runtime(&self) -> Result<&PythonRuntime, SandboxError> {
        self.runtime
            .get_or_try_init(|| async {
                let runtime = PythonRuntime::probe(&self.config).await?;
                tracing::info!(
                    interpreter = %runtime.interpreter,
                    version = %runtime.version,
                    "python runtime loaded"
                );
                Ok::<_, SandboxError>(runtime)
            })
            .await
    }

    /// True once a runtime has been resolved and cached.
    pub fn is_runtime_loaded(&self) -> bool {
        self.runtime.initialized()
    }

    async fn run(&self, source: &str) -> Result<ExecutionResult, SandboxError> {
        let runtime = self.runtime().await?;

        let run_dir = RunDir::create()?;
        let wrapper = run_dir.write("wrapper.py", WRAPPER).await?;
        let program = run_dir.write("program.py", source).await?;
        let args: Vec<OsString> = vec![
            wrapper.into_os_string(),
            program.into_os_string(),
            run_dir.file(RESULT_FILE).into_os_string(),
        ];

        process::run_wrapper(
            ChildSpec {
                program: &runtime.interpreter,
                args,
                env: CHILD_ENV,
                timeout: self.config.timeout,
            },
            &run_dir,
        )
        .await
    }
}

#[async_trait]
impl Sandbox for PythonSandbox {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn execute(&self, source: &str) -> ExecutionResult {
        let result = self.run(source).await.unwrap_or_else(ExecutionResult::from);
        tracing::debug!(success = result.is_success(), "python run finished");
        result
    }
}
