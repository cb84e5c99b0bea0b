//! [`ProjectGateway`] over the blocklab REST API.

use async_trait::async_trait;
use blocklab_storage::{Language, NewProject, Project, ProjectId, ProjectPatch};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayError, ProjectGateway};

/// HTTP client for `/projects`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

/// Body of `POST /projects` and `PUT /projects/{id}`. Absent fields are
/// omitted so a PUT only touches what the patch carries.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagram: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_code: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl HttpGateway {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpGateway::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpGateway { client, base_url }
    }

    fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    fn project_url(&self, id: ProjectId) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::StoreUnavailable(format!("request failed: {}", err)))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| GatewayError::StoreUnavailable(format!("malformed response: {}", err)))
    }
}

/// Maps an error response onto the gateway taxonomy.
async fn error_from_response(response: Response) -> GatewayError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => (String::new(), text),
    };

    match status {
        StatusCode::BAD_REQUEST if code == "INVALID_IDENTIFIER" => {
            GatewayError::InvalidIdentifier(message)
        }
        StatusCode::BAD_REQUEST => GatewayError::Validation(message),
        StatusCode::NOT_FOUND => GatewayError::NotFound(message),
        other => GatewayError::StoreUnavailable(format!("{}: {}", other, message)),
    }
}

#[async_trait]
impl ProjectGateway for HttpGateway {
    async fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
        self.json(self.client.get(self.projects_url())).await
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, GatewayError> {
        let body = ProjectBody {
            name: Some(&project.name),
            language: Some(project.language),
            diagram: Some(&project.diagram),
            generated_code: Some(&project.generated_code),
        };
        self.json(self.client.post(self.projects_url()).json(&body))
            .await
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, GatewayError> {
        self.json(self.client.get(self.project_url(id))).await
    }

    async fn update_project(
        &self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, GatewayError> {
        let body = ProjectBody {
            name: patch.name.as_deref(),
            language: patch.language,
            diagram: patch.diagram.as_deref(),
            generated_code: patch.generated_code.as_deref(),
        };
        self.json(self.client.put(self.project_url(id)).json(&body))
            .await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), GatewayError> {
        self.send(self.client.delete(self.project_url(id))).await?;
        Ok(())
    }
}
