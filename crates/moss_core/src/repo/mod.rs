//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define loader-oriented data access contracts.
//! - Isolate SQLite statements from load orchestration.
//!
//! # Invariants
//! - Repositories refuse to start when a table they write is missing.
//! - Inserts that may repeat across runs are conflict-tolerant; none update
//!   existing rows.

use crate::db::{table_exists, DbError};
use crate::model::RowId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod species_repo;
pub mod taxonomy_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalogue persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(
                f,
                "required table `{table}` is missing; initialize the schema first"
            ),
            Self::InvalidData(message) => write!(f, "invalid catalogue data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
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

/// Outcome of a resolve-or-insert lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: RowId,
    /// `true` when the row was inserted by this call.
    pub created: bool,
}

impl Resolved {
    pub fn existing(id: RowId) -> Self {
        Self { id, created: false }
    }

    pub fn created(id: RowId) -> Self {
        Self { id, created: true }
    }
}

fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
