//! Project CRUD handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use blocklab_storage::{Project, ProjectId};

use crate::error::ApiError;
use crate::schema::projects::{CreateProjectRequest, UpdateProjectRequest};
use crate::state::AppState;

/// Lists all projects, newest first.
///
/// `GET /projects`
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let service = state.service.lock().await;
    let projects = service.list_projects()?;
    Ok(Json(projects))
}

/// Creates a new project.
///
/// `POST /projects`
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Json(req) = body?;
    let project = req.into_new_project()?;
    let mut service = state.service.lock().await;
    let created = service.create_project(project)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetches one project.
///
/// `GET /projects/{id}`
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let id = ProjectId::parse(&id)?;
    let service = state.service.lock().await;
    Ok(Json(service.get_project(id)?))
}

/// Merges the supplied fields into a project.
///
/// `PUT /projects/{id}`
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<Json<Project>, ApiError> {
    let id = ProjectId::parse(&id)?;
    let Json(req) = body?;
    let patch = req.into_patch()?;
    let mut service = state.service.lock().await;
    Ok(Json(service.update_project(id, patch)?))
}

/// Deletes a project by ID.
///
/// `DELETE /projects/{id}`
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = ProjectId::parse(&id)?;
    let mut service = state.service.lock().await;
    service.delete_project(id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
