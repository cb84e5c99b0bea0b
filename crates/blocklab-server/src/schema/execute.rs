//! Execution request types.
//!
//! The response body is [`ExecutionResult`](blocklab_sandbox::ExecutionResult):
//! `{"output": "...", "error": "..."}`.

use blocklab_storage::Language;
use serde::Deserialize;

use crate::error::ApiError;

pub const NOTHING_TO_RUN: &str = "No code to run";

/// Body of `POST /execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub language: String,
    #[serde(default)]
    pub code: String,
}

impl ExecuteRequest {
    /// Resolves the language and rejects blank source before any sandbox runs.
    pub fn validate(&self) -> Result<Language, ApiError> {
        let language: Language = self.language.parse()?;
        if self.code.trim().is_empty() {
            return Err(ApiError::BadRequest(NOTHING_TO_RUN.to_string()));
        }
        Ok(language)
    }
}
