//! Connection setup and embedded migrations for the project database.
//!
//! Migration state lives in SQLite's `user_version` pragma, managed by
//! `rusqlite_migration`.

use std::time::Duration;

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::error::StorageError;

/// Server and CLI may open the same file; writers wait this long for the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const PRAGMAS: &[(&str, &str)] = &[
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("foreign_keys", "ON"),
];

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(include_str!("migrations/001_initial_schema.sql")),
        M::up(include_str!("migrations/002_language_guard.sql")),
    ])
}

/// Opens (or creates) the project database at `path`, migrated to the
/// latest schema.
pub fn open_database(path: &str) -> Result<Connection, StorageError> {
    prepare(Connection::open(path)?)
}

/// A private in-memory database. Each call yields an independent store.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    prepare(Connection::open_in_memory()?)
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> Result<i64, StorageError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn prepare(mut conn: Connection) -> Result<Connection, StorageError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    for &(pragma, value) in PRAGMAS {
        conn.pragma_update(None, pragma, value)?;
    }
    migrations()
        .to_latest(&mut conn)
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_valid() {
        assert!(migrations().validate().is_ok());
    }

    #[test]
    fn fresh_database_is_at_latest_version() {
        let conn = open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 2);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn database_rejects_unknown_languages() {
        let conn = open_in_memory().unwrap();
        let insert = "INSERT INTO projects (id, name, language, diagram, created_at, updated_at)
                      VALUES (?1, 'p', ?2, '<xml/>', 0, 0)";
        conn.execute(insert, ["a", "python"]).unwrap();
        assert!(conn.execute(insert, ["b", "ruby"]).is_err());
        assert!(conn
            .execute("UPDATE projects SET language = 'ruby' WHERE id = 'a'", [])
            .is_err());
    }

    #[test]
    fn reopening_a_file_keeps_the_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.db");
        let path = path.to_str().unwrap();
        drop(open_database(path).unwrap());
        let conn = open_database(path).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }
}
