//! SQLite implementation of [`ProjectStore`].
//!
//! [`SqliteStore`] persists projects in a single `projects` table with WAL
//! mode, a transaction around every write, and automatic schema migrations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StorageError;
use crate::timestamp;
use crate::traits::ProjectStore;
use crate::types::{Language, NewProject, Project, ProjectId, ProjectPatch};

const SELECT_COLUMNS: &str =
    "SELECT id, name, language, diagram, generated_code, created_at, updated_at FROM projects";

/// SQLite-backed implementation of [`ProjectStore`].
///
/// Holds one connection for its whole lifetime; the connection closes when
/// the store is dropped.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    fn find(&self, id: ProjectId) -> Result<Option<Project>, StorageError> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let row = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params![id.to_string()], ProjectRow::from_row)
            .optional()?;
        row.map(ProjectRow::into_project).transpose()
    }
}

/// Raw column values of one `projects` row.
struct ProjectRow {
    id: String,
    name: String,
    language: String,
    diagram: String,
    generated_code: String,
    created_at: i64,
    updated_at: i64,
}

impl ProjectRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ProjectRow {
            id: row.get(0)?,
            name: row.get(1)?,
            language: row.get(2)?,
            diagram: row.get(3)?,
            generated_code: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_project(self) -> Result<Project, StorageError> {
        let corrupt = |reason: String| StorageError::Corrupt { reason };
        let id = ProjectId::parse(&self.id)
            .map_err(|_| corrupt(format!("bad id '{}'", self.id)))?;
        let language = self
            .language
            .parse::<Language>()
            .map_err(|_| corrupt(format!("project {}: bad language '{}'", id, self.language)))?;
        let created_at = timestamp::from_micros(self.created_at)
            .ok_or_else(|| corrupt(format!("project {}: bad created_at", id)))?;
        let updated_at = timestamp::from_micros(self.updated_at)
            .ok_or_else(|| corrupt(format!("project {}: bad updated_at", id)))?;
        Ok(Project {
            id,
            name: self.name,
            language,
            diagram: self.diagram,
            generated_code: self.generated_code,
            created_at,
            updated_at,
        })
    }
}

impl ProjectStore for SqliteStore {
    fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        let sql = format!("{} ORDER BY created_at DESC, seq DESC", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], ProjectRow::from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?.into_project()?);
        }
        Ok(result)
    }

    fn create_project(&mut self, project: NewProject) -> Result<Project, StorageError> {
        project.validate()?;
        let project = project.into_project(ProjectId::new_v4(), timestamp::now());

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO projects (id, name, language, diagram, generated_code, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                project.id.to_string(),
                project.name,
                project.language.as_str(),
                project.diagram,
                project.generated_code,
                timestamp::to_micros(project.created_at),
                timestamp::to_micros(project.updated_at),
            ],
        )?;
        tx.commit()?;
        Ok(project)
    }

    fn get_project(&self, id: ProjectId) -> Result<Project, StorageError> {
        self.find(id)?.ok_or(StorageError::NotFound(id))
    }

    fn update_project(
        &mut self,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, StorageError> {
        patch.validate()?;
        let mut project = self.get_project(id)?;
        let updated_at = timestamp::after(project.updated_at);
        patch.apply(&mut project, updated_at);

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE projects
             SET name = ?2, language = ?3, diagram = ?4, generated_code = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                id.to_string(),
                project.name,
                project.language.as_str(),
                project.diagram,
                project.generated_code,
                timestamp::to_micros(project.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }
        tx.commit()?;
        Ok(project)
    }

    fn delete_project(&mut self, id: ProjectId) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;
        if removed == 0 {
            return Err(StorageError::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> NewProject {
        NewProject::new(
            name,
            Language::JavaScript,
            "<xml><block type=\"text_print\"/></xml>",
            "console.log('hi');\n",
        )
    }

    #[test]
    fn create_then_get_returns_stored_fields() {
        let mut store = SqliteStore::in_memory().unwrap();
        let created = store.create_project(sample("hello")).unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get_project(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "hello");
        assert_eq!(fetched.language, Language::JavaScript);
        assert_eq!(fetched.generated_code, "console.log('hi');\n");
    }

    #[test]
    fn create_rejects_missing_fields() {
        let mut store = SqliteStore::in_memory().unwrap();
        let err = store
            .create_project(NewProject::new("", Language::Python, "<xml/>", ""))
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn identical_creates_produce_distinct_documents() {
        let mut store = SqliteStore::in_memory().unwrap();
        let a = store.create_project(sample("same")).unwrap();
        let b = store.create_project(sample("same")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list_projects().unwrap().len(), 2);
    }

    #[test]
    fn rename_leaves_other_fields_and_advances_updated_at() {
        let mut store = SqliteStore::in_memory().unwrap();
        let created = store.create_project(sample("before")).unwrap();

        let updated = store
            .update_project(created.id, ProjectPatch::rename("X"))
            .unwrap();
        assert_eq!(updated.name, "X");
        assert_eq!(updated.language, created.language);
        assert_eq!(updated.diagram, created.diagram);
        assert_eq!(updated.generated_code, created.generated_code);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        assert_eq!(store.get_project(created.id).unwrap(), updated);
    }

    #[test]
    fn empty_patch_still_refreshes_updated_at() {
        let mut store = SqliteStore::in_memory().unwrap();
        let created = store.create_project(sample("p")).unwrap();
        let first = store
            .update_project(created.id, ProjectPatch::default())
            .unwrap();
        let second = store
            .update_project(created.id, ProjectPatch::default())
            .unwrap();
        assert!(first.updated_at > created.updated_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn update_and_delete_unknown_id_are_not_found() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = ProjectId::new_v4();
        assert!(matches!(
            store.update_project(id, ProjectPatch::rename("x")),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_project(id),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let mut store = SqliteStore::in_memory().unwrap();
        let created = store.create_project(sample("gone")).unwrap();
        store.delete_project(created.id).unwrap();
        assert!(matches!(
            store.get_project(created.id),
            Err(StorageError::NotFound(id)) if id == created.id
        ));
    }

    #[test]
    fn list_is_newest_first() {
        let mut store = SqliteStore::in_memory().unwrap();
        let first = store.create_project(sample("first")).unwrap();
        let second = store.create_project(sample("second")).unwrap();
        let third = store.create_project(sample("third")).unwrap();

        let ids: Vec<_> = store.list_projects().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.db");
        let path = path.to_str().unwrap();
        let created = {
            let mut store = SqliteStore::new(path).unwrap();
            store.create_project(sample("kept")).unwrap()
        };
        let store = SqliteStore::new(path).unwrap();
        assert_eq!(store.get_project(created.id).unwrap(), created);
    }
}
