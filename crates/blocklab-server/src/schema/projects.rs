//! Project request types.
//!
//! Responses are the stored [`Project`](blocklab_storage::Project) itself.
//! Request fields are all optional at the serde level so a missing field
//! yields the API's own 400 body instead of an extractor rejection.

use blocklab_storage::{Language, NewProject, ProjectPatch};
use serde::Deserialize;

use crate::error::ApiError;

pub const MISSING_FIELDS: &str = "Missing required project fields";

/// Body of `POST /projects`. Client-supplied `id` and timestamps are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "blocklyXml")]
    pub diagram: Option<String>,
    pub generated_code: Option<String>,
}

impl CreateProjectRequest {
    pub fn into_new_project(self) -> Result<NewProject, ApiError> {
        let (Some(name), Some(language), Some(diagram)) = (
            non_empty(self.name),
            non_empty(self.language),
            non_empty(self.diagram),
        ) else {
            return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
        };
        let language: Language = language.parse()?;
        Ok(NewProject::new(
            name,
            language,
            diagram,
            self.generated_code.unwrap_or_default(),
        ))
    }
}

/// Body of `PUT /projects/{id}`; only the supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "blocklyXml")]
    pub diagram: Option<String>,
    pub generated_code: Option<String>,
}

impl UpdateProjectRequest {
    pub fn into_patch(self) -> Result<ProjectPatch, ApiError> {
        let language = self
            .language
            .map(|raw| raw.parse::<Language>())
            .transpose()?;
        Ok(ProjectPatch {
            name: self.name,
            language,
            diagram: self.diagram,
            generated_code: self.generated_code,
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
