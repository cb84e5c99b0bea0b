//! Storage abstraction for blocklab projects.
//!
//! Provides the [`ProjectStore`] trait defining the storage contract that all
//! backends implement, plus the [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: ProjectId, Language, Project and its create/patch inputs
//! - [`traits`]: ProjectStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: migration setup and connection configuration
//! - [`sqlite`]: SqliteStore implementation
//! - [`timestamp`]: store clock with strictly advancing update stamps

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod timestamp;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::ProjectStore;
pub use types::{Language, NewProject, Project, ProjectId, ProjectPatch};
