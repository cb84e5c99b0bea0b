//! JavaScript sandbox backed by Node.js.
//!
//! The user source runs in a fresh `vm` context whose only globals are a
//! capturing `console`, an `alert` that captures the same way (the block
//! editor's print block emits `window.alert`), and `window` pointing at the
//! context itself. Each console call becomes one output line.

use std::ffi::OsString;

use async_trait::async_trait;
use blocklab_storage::Language;

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::process::{self, ChildSpec, RunDir, RESULT_FILE};
use crate::result::ExecutionResult;
use crate::Sandbox;

const WRAPPER: &str = r#"'use strict';
const fs = require('fs');
const vm = require('vm');

const [sourcePath, resultPath] = process.argv.slice(2);
const source = fs.readFileSync(sourcePath, 'utf8');
const lines = [];

function format(value) {
  if (typeof value === 'object' && value !== null) {
    try {
      return JSON.stringify(value, null, 2);
    } catch (_) {
      return String(value);
    }
  }
  return String(value);
}

function capture(...args) {
  lines.push(args.map(format).join(' '));
}

const context = {
  console: { log: capture, info: capture, debug: capture, warn: capture, error: capture },
  alert: capture,
};
context.window = context;

let error = '';
try {
  vm.runInNewContext(source, context, { filename: 'program.js' });
} catch (err) {
  try {
    error = String(err);
  } catch (_) {
    error = 'uncaught exception';
  }
}

// Lone surrogates would be escaped as invalid JSON text.
function wellFormed(text) {
  if (typeof text.toWellFormed === 'function') {
    return text.toWellFormed();
  }
  return text.replace(/[\uD800-\uDBFF](?![\uDC00-\uDFFF])|(?<![\uD800-\uDBFF])[\uDC00-\uDFFF]/g, '\uFFFD');
}

fs.writeFileSync(
  resultPath,
  JSON.stringify({ output: wellFormed(lines.join('\n')), error: wellFormed(error) }),
);
"#;

/// Executes JavaScript in a Node.js child process.
#[derive(Debug, Clone)]
pub struct JavaScriptSandbox {
    config: SandboxConfig,
}

impl JavaScriptSandbox {
    pub fn new(config: SandboxConfig) -> Self {
        JavaScriptSandbox { config }
    }

    async fn run(&self, source: &str) -> Result<ExecutionResult, SandboxError> {
        let run_dir = RunDir::create()?;
        let wrapper = run_dir.write("wrapper.js", WRAPPER).await?;
        let program = run_dir.write("program.js", source).await?;
        let args: Vec<OsString> = vec![
            wrapper.into_os_string(),
            program.into_os_string(),
            run_dir.file(RESULT_FILE).into_os_string(),
        ];

        process::run_wrapper(
            ChildSpec {
                program: &self.config.node_bin,
                args,
                env: &[],
                timeout: self.config.timeout,
            },
            &run_dir,
        )
        .await
    }
}

#[async_trait]
impl Sandbox for JavaScriptSandbox {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    async fn execute(&self, source: &str) -> ExecutionResult {
        let result = self.run(source).await.unwrap_or_else(ExecutionResult::from);
        tracing::debug!(success = result.is_success(), "javascript run finished");
        result
    }
}
