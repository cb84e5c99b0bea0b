//! The [`ProjectStore`] trait defining the storage contract for projects.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, ensuring
//! they are fully swappable without changing the service layer.

use crate::error::StorageError;
use crate::types::{NewProject, Project, ProjectId, ProjectPatch};

/// The storage contract for project documents.
///
/// The trait is synchronous; async callers hold the store behind a mutex.
pub trait ProjectStore {
    /// Lists every stored project, most recently created first.
    ///
    /// Projects created in the same microsecond are ordered by insertion,
    /// newest first.
    fn list_projects(&self) -> Result<Vec<Project>, StorageError>;

    /// Validates and persists a new project.
    ///
    /// Stamps `created_at == updated_at == now` and assigns a fresh
    /// [`ProjectId`]. Every call creates a new document; there is no
    /// deduplication by name.
    fn create_project(&mut self, project: NewProject) -> Result<Project, StorageError>;

    /// Retrieves a project by ID.
    fn get_project(&self, id: ProjectId) -> Result<Project, StorageError>;

    /// Merges `patch` into an existing project and returns the result.
    ///
    /// `updated_at` always advances, even when the patch is empty.
    fn update_project(
        &mut self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, StorageError>;

    /// Deletes a project. Fails with NotFound when nothing was removed.
    fn delete_project(&mut self, id: ProjectId) -> Result<(), StorageError>;
}
