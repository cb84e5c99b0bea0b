//! Storage-layer types for project identity, language, and documents.
//!
//! [`ProjectId`] is defined here because project identity is a storage
//! concern: a project only gains an ID when the store persists it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

/// Unique identifier for a stored project.
///
/// Serialized as the hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Allocates a fresh random identifier.
    pub fn new_v4() -> Self {
        ProjectId(Uuid::new_v4())
    }

    /// Parses a raw key, failing with [`StorageError::InvalidIdentifier`]
    /// when it is not a well-formed UUID.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        Uuid::parse_str(raw.trim())
            .map(ProjectId)
            .map_err(|_| StorageError::InvalidIdentifier(raw.to_string()))
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ProjectId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectId::parse(s)
    }
}

/// Source language of a project's generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::JavaScript, Language::Python];

    /// Wire and storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }

    /// Human-facing name.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "javascript" => Ok(Language::JavaScript),
            "python" => Ok(Language::Python),
            other => Err(StorageError::Validation(format!(
                "unsupported language '{}': expected javascript or python",
                other
            ))),
        }
    }
}

/// A persisted unit of work.
///
/// `diagram` is opaque to the store; only the block editor understands it.
/// On input it also accepts the editor's historical `blocklyXml` field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub language: Language,
    #[serde(alias = "blocklyXml")]
    pub diagram: String,
    #[serde(default)]
    pub generated_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub language: Language,
    pub diagram: String,
    pub generated_code: String,
}

impl NewProject {
    pub fn new(
        name: impl Into<String>,
        language: Language,
        diagram: impl Into<String>,
        generated_code: impl Into<String>,
    ) -> Self {
        NewProject {
            name: name.into(),
            language,
            diagram: diagram.into(),
            generated_code: generated_code.into(),
        }
    }

    /// Checks that name and diagram are present.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.name.trim().is_empty() || self.diagram.is_empty() {
            return Err(StorageError::Validation(
                "Missing required project fields".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the stored document with the given key and creation time.
    pub(crate) fn into_project(self, id: ProjectId, now: DateTime<Utc>) -> Project {
        Project {
            id,
            name: self.name,
            language: self.language,
            diagram: self.diagram,
            generated_code: self.generated_code,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a project. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub language: Option<Language>,
    pub diagram: Option<String>,
    pub generated_code: Option<String>,
}

impl ProjectPatch {
    /// Patch that only renames.
    pub fn rename(name: impl Into<String>) -> Self {
        ProjectPatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A supplied name or diagram may not be blank.
    pub fn validate(&self) -> Result<(), StorageError> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(StorageError::Validation(
                "project name must not be empty".to_string(),
            ));
        }
        if matches!(&self.diagram, Some(diagram) if diagram.is_empty()) {
            return Err(StorageError::Validation(
                "project diagram must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Merges the supplied fields into `project` and stamps `updated_at`.
    pub(crate) fn apply(self, project: &mut Project, updated_at: DateTime<Utc>) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(language) = self.language {
            project.language = language;
        }
        if let Some(diagram) = self.diagram {
            project.diagram = diagram;
        }
        if let Some(code) = self.generated_code {
            project.generated_code = code;
        }
        project.updated_at = updated_at;
    }
}
