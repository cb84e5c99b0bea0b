//! Code execution handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use blocklab_sandbox::ExecutionResult;

use crate::error::ApiError;
use crate::schema::execute::ExecuteRequest;
use crate::state::AppState;

/// Runs generated source in the sandbox for its language.
///
/// `POST /execute`
///
/// Program failures are part of a successful response (`error` is set);
/// only an unknown language or blank source is a 400.
pub async fn execute_code(
    State(state): State<AppState>,
    body: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<ExecutionResult>, ApiError> {
    let Json(req) = body?;
    let language = req.validate()?;
    let result = state.sandboxes.execute(language, &req.code).await;
    tracing::debug!(%language, success = result.is_success(), "execution finished");
    Ok(Json(result))
}
