//! The persistence-facing contract used by the session.

use std::sync::Arc;

use async_trait::async_trait;
use blocklab_storage::{NewProject, Project, ProjectId, ProjectPatch, ProjectStore, StorageError};
use tokio::sync::Mutex;

/// Failures of project persistence as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Missing or malformed input (HTTP 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed project key (HTTP 400).
    #[error("invalid project id: {0}")]
    InvalidIdentifier(String),

    /// No such project (HTTP 404).
    #[error("project not found: {0}")]
    NotFound(String),

    /// The store could not be reached or failed (HTTP 500, transport errors).
    #[error("project store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(msg) => GatewayError::Validation(msg),
            StorageError::InvalidIdentifier(raw) => GatewayError::InvalidIdentifier(raw),
            StorageError::NotFound(id) => GatewayError::NotFound(id.to_string()),
            other => GatewayError::StoreUnavailable(other.to_string()),
        }
    }
}

/// CRUD over project documents.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    /// All projects, most recently created first.
    async fn list_projects(&self) -> Result<Vec<Project>, GatewayError>;

    async fn create_project(&self, project: NewProject) -> Result<Project, GatewayError>;

    async fn get_project(&self, id: ProjectId) -> Result<Project, GatewayError>;

    /// Merges `patch`; `updated_at` always advances.
    async fn update_project(
        &self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, GatewayError>;

    async fn delete_project(&self, id: ProjectId) -> Result<(), GatewayError>;
}

/// Runs a [`ProjectStore`] in-process behind an async mutex.
pub struct StoreGateway<S> {
    store: Arc<Mutex<S>>,
}

impl<S> StoreGateway<S> {
    pub fn new(store: S) -> Self {
        StoreGateway {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

impl<S> Clone for StoreGateway<S> {
    fn clone(&self) -> Self {
        StoreGateway {
            store: Arc::clone(&self.store),
        }
    }
}

#[async_trait]
impl<S> ProjectGateway for StoreGateway<S>
where
    S: ProjectStore + Send + 'static,
{
    async fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
        Ok(self.store.lock().await.list_projects()?)
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, GatewayError> {
        Ok(self.store.lock().await.create_project(project)?)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, GatewayError> {
        Ok(self.store.lock().await.get_project(id)?)
    }

    async fn update_project(
        &self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, GatewayError> {
        Ok(self.store.lock().await.update_project(id, patch)?)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), GatewayError> {
        Ok(self.store.lock().await.delete_project(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklab_storage::{InMemoryStore, Language};

    #[tokio::test]
    async fn store_gateway_maps_storage_errors() {
        let gateway = StoreGateway::new(InMemoryStore::new());
        let missing = ProjectId::new_v4();
        assert_eq!(
            gateway.get_project(missing).await,
            Err(GatewayError::NotFound(missing.to_string()))
        );
        assert!(matches!(
            gateway
                .create_project(NewProject::new("", Language::Python, "<xml/>", ""))
                .await,
            Err(GatewayError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn store_gateway_round_trips_projects() {
        let gateway = StoreGateway::new(InMemoryStore::new());
        let created = gateway
            .create_project(NewProject::new("p", Language::JavaScript, "<xml/>", "x"))
            .await
            .unwrap();
        let renamed = gateway
            .update_project(created.id, ProjectPatch::rename("q"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "q");
        assert_eq!(gateway.list_projects().await.unwrap(), vec![renamed]);
        gateway.delete_project(created.id).await.unwrap();
        assert!(gateway.list_projects().await.unwrap().is_empty());
    }
}
