//! Repository layer: the domain store consumed by the navigation engine.
//!
//! # Responsibility
//! - Define per-kind repository contracts (find, list, upsert, delete).
//! - Keep SQLite details (SQL, constraint codes, savepoints) behind those
//!   contracts.
//!
//! # Invariants
//! - Unique-name violations surface as `RepoError::DuplicateName`, never as a
//!   raw SQLite error.
//! - Multi-statement writes are all-or-nothing (savepoint per write).
//! - Returned objects are detached copies of stored rows.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod category_repo;
pub mod entity_repo;
pub mod relationship_repo;
pub mod store;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Kind of stored object, used in errors and change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredKind {
    Category,
    Entity,
    Tag,
    FacetProperty,
    Relationship,
}

impl StoredKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Entity => "Entity",
            Self::Tag => "Tag",
            Self::FacetProperty => "FacetProperty",
            Self::Relationship => "Relationship",
        }
    }
}

impl Display for StoredKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from domain store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound(Uuid),
    /// A unique-name index rejected the write.
    DuplicateName { kind: StoredKind, name: String },
    /// The write points at a row that does not exist.
    DanglingReference(String),
    /// Delete refused because other rows still point at the target.
    StillReferenced {
        id: Uuid,
        by: StoredKind,
        count: usize,
    },
    /// The root category cannot be renamed, re-parented or deleted.
    RootImmutable,
    /// Persisted or submitted data cannot form a valid model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "stored object not found: {id}"),
            Self::DuplicateName { kind, name } => {
                write!(f, "a {kind} named `{name}` already exists in this scope")
            }
            Self::DanglingReference(details) => write!(f, "dangling reference: {details}"),
            Self::StillReferenced { id, by, count } => write!(
                f,
                "{id} is still referenced by {count} {by} row(s)"
            ),
            Self::RootImmutable => write!(f, "the root category cannot be modified"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "domain store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "domain store requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(format!("json encoding failed: {value}"))
    }
}

/// Translates constraint failures of a write into semantic errors.
pub(crate) fn classify_write_error(err: rusqlite::Error, kind: StoredKind, name: &str) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return RepoError::DuplicateName {
                kind,
                name: name.to_string(),
            };
        }
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return RepoError::DanglingReference(format!(
                "{kind} `{name}` points at a missing row"
            ));
        }
    }
    err.into()
}

/// Runs `op` inside a named SQLite savepoint.
///
/// Savepoints nest, so this is safe both standalone and inside an outer
/// store-level atomic scope. Any `Err` rolls back every write made by `op`.
pub(crate) fn in_savepoint<T, E>(
    conn: &Connection,
    label: &str,
    op: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<RepoError>,
{
    conn.execute_batch(&format!("SAVEPOINT {label};"))
        .map_err(|err| E::from(RepoError::from(err)))?;
    match op() {
        Ok(value) => match conn.execute_batch(&format!("RELEASE {label};")) {
            Ok(()) => Ok(value),
            Err(err) => {
                rollback_savepoint(conn, label);
                Err(E::from(RepoError::from(err)))
            }
        },
        Err(err) => {
            rollback_savepoint(conn, label);
            Err(err)
        }
    }
}

fn rollback_savepoint(conn: &Connection, label: &str) {
    if let Err(err) = conn.execute_batch(&format!("ROLLBACK TO {label}; RELEASE {label};")) {
        warn!("event=savepoint_rollback module=repo status=error label={label} error={err}");
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn row_exists(conn: &Connection, sql: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id.to_string()], |row| row.get(0))?;
    Ok(exists == 1)
}

const REQUIRED_TABLES: &[&str] = &[
    "categories",
    "entities",
    "entity_tags",
    "entity_values",
    "tags",
    "facet_properties",
    "relationships",
];

/// Verifies the connection was opened through `db::open_db*`.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
