//! ProjectService: the single coordinator between HTTP handlers and the
//! project store.
//!
//! Handlers are thin wrappers that delegate to these methods. Storage
//! failures become [`ApiError`]s here.

use blocklab_storage::{
    NewProject, Project, ProjectId, ProjectPatch, ProjectStore, SqliteStore,
};

use crate::error::ApiError;

/// Owns the store connection for the lifetime of the server.
pub struct ProjectService {
    store: Box<dyn ProjectStore + Send>,
}

impl ProjectService {
    /// Opens (and migrates) the SQLite database at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, ApiError> {
        let store = SqliteStore::new(db_path).map_err(|e| {
            tracing::error!(error = %e, db_path, "failed to open project store");
            ApiError::InternalError(format!("failed to open store: {}", e))
        })?;
        Ok(ProjectService::with_store(store))
    }

    /// A service over a private in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, ApiError> {
        let store = SqliteStore::in_memory()
            .map_err(|e| ApiError::InternalError(format!("failed to open test store: {}", e)))?;
        Ok(ProjectService::with_store(store))
    }

    pub fn with_store(store: impl ProjectStore + Send + 'static) -> Self {
        ProjectService {
            store: Box::new(store),
        }
    }

    /// All projects, newest first.
    pub fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        Ok(self.store.list_projects()?)
    }

    pub fn create_project(&mut self, project: NewProject) -> Result<Project, ApiError> {
        let created = self.store.create_project(project)?;
        tracing::info!(id = %created.id, language = %created.language, "project created");
        Ok(created)
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Project, ApiError> {
        Ok(self.store.get_project(id)?)
    }

    pub fn update_project(
        &mut self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, ApiError> {
        let updated = self.store.update_project(id, patch)?;
        tracing::debug!(id = %updated.id, "project updated");
        Ok(updated)
    }

    pub fn delete_project(&mut self, id: ProjectId) -> Result<(), ApiError> {
        self.store.delete_project(id)?;
        tracing::info!(id = %id, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklab_storage::{InMemoryStore, Language};

    #[test]
    fn missing_project_is_not_found() {
        let mut service = ProjectService::with_store(InMemoryStore::new());
        let id = ProjectId::new_v4();
        assert!(matches!(service.get_project(id), Err(ApiError::NotFound(_))));
        assert!(matches!(service.delete_project(id), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let mut service = ProjectService::in_memory().unwrap();
        let err = service
            .create_project(NewProject::new("  ", Language::Python, "<xml/>", ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
