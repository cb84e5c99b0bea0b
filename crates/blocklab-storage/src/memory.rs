//! In-memory implementation of [`ProjectStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! sessions. It keeps documents in insertion order with identical semantics
//! to the SQLite backend.

use crate::error::StorageError;
use crate::timestamp;
use crate::traits::ProjectStore;
use crate::types::{NewProject, Project, ProjectId, ProjectPatch};

/// In-memory implementation of [`ProjectStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Documents in insertion order.
    projects: Vec<Project>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    fn position(&self, id: ProjectId) -> Result<usize, StorageError> {
        self.projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(StorageError::NotFound(id))
    }
}

impl ProjectStore for InMemoryStore {
    fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        // Newest insertion first, then a stable sort keeps that order for ties.
        let mut projects: Vec<Project> = self.projects.iter().rev().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    fn create_project(&mut self, project: NewProject) -> Result<Project, StorageError> {
        project.validate()?;
        let project = project.into_project(ProjectId::new_v4(), timestamp::now());
        self.projects.push(project.clone());
        Ok(project)
    }

    fn get_project(&self, id: ProjectId) -> Result<Project, StorageError> {
        let index = self.position(id)?;
        Ok(self.projects[index].clone())
    }

    fn update_project(
        &mut self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, StorageError> {
        patch.validate()?;
        let index = self.position(id)?;
        let project = &mut self.projects[index];
        let updated_at = timestamp::after(project.updated_at);
        patch.apply(project, updated_at);
        Ok(project.clone())
    }

    fn delete_project(&mut self, id: ProjectId) -> Result<(), StorageError> {
        let index = self.position(id)?;
        self.projects.remove(index);
        Ok(())
    }
}
