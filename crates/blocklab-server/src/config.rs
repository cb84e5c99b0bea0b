//! Server configuration read from the environment.
//!
//! - `BLOCKLAB_DB_PATH`: SQLite database file path (default: "blocklab.db")
//! - `BLOCKLAB_PORT`: server listen port (default: 3000)
//! - `BLOCKLAB_EXEC_TIMEOUT_MS`: per-run execution budget (default: 10000)
//! - `BLOCKLAB_NODE_BIN`: Node.js executable (default: "node")
//! - `BLOCKLAB_PYTHON_BIN`: Python 3 executable (default: "python3")

use std::time::Duration;

use blocklab_sandbox::SandboxConfig;

pub const DEFAULT_DB_PATH: &str = "blocklab.db";
pub const DEFAULT_PORT: u16 = 3000;

/// A variable was set to a value that does not parse.
#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub port: u16,
    pub sandbox: SandboxConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: DEFAULT_DB_PATH.to_string(),
            port: DEFAULT_PORT,
            sandbox: SandboxConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();

        if let Some(path) = lookup("BLOCKLAB_DB_PATH") {
            config.db_path = path;
        }
        if let Some(port) = lookup("BLOCKLAB_PORT") {
            config.port = parse_var("BLOCKLAB_PORT", port)?;
        }
        if let Some(ms) = lookup("BLOCKLAB_EXEC_TIMEOUT_MS") {
            let ms: u64 = parse_var("BLOCKLAB_EXEC_TIMEOUT_MS", ms)?;
            if ms == 0 {
                return Err(ConfigError {
                    var: "BLOCKLAB_EXEC_TIMEOUT_MS",
                    value: "0".to_string(),
                    reason: "timeout must be positive".to_string(),
                });
            }
            config.sandbox.timeout = Duration::from_millis(ms);
        }
        if let Some(node) = lookup("BLOCKLAB_NODE_BIN") {
            config.sandbox.node_bin = node;
        }
        if let Some(python) = lookup("BLOCKLAB_PYTHON_BIN") {
            config.sandbox.python_bin = python;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError {
        var,
        reason: err.to_string(),
        value,
    })
}
