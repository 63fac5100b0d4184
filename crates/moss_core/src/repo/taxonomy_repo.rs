//! Taxonomy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve or insert CLASS, ORDER, FAMILY and GENUS rows.
//!
//! # Invariants
//! - A CLASS is identified by name alone; lower levels by name plus parent id.
//! - An existing row is reused rather than duplicated, so repeated loads keep
//!   one row per (name, parent).
//! - Rows are never updated once written.

use super::{ensure_tables, RepoError, RepoResult, Resolved};
use crate::model::RowId;
use rusqlite::{params, Connection, OptionalExtension};

/// Statements for one taxonomy level.
#[derive(Debug, Clone, Copy)]
struct TaxonLevel {
    label: &'static str,
    select_sql: &'static str,
    insert_sql: &'static str,
}

const CLASS_LEVEL: TaxonLevel = TaxonLevel {
    label: "class",
    select_sql: "SELECT CID FROM CLASS WHERE NAME = ?1 ORDER BY CID LIMIT 1;",
    insert_sql: "INSERT INTO CLASS (NAME) VALUES (?1);",
};

const ORDER_LEVEL: TaxonLevel = TaxonLevel {
    label: "order",
    select_sql: "SELECT OID FROM \"ORDER\" WHERE NAME = ?1 AND CID = ?2 ORDER BY OID LIMIT 1;",
    insert_sql: "INSERT INTO \"ORDER\" (NAME, CID) VALUES (?1, ?2);",
};

const FAMILY_LEVEL: TaxonLevel = TaxonLevel {
    label: "family",
    select_sql: "SELECT FID FROM FAMILY WHERE NAME = ?1 AND OID = ?2 ORDER BY FID LIMIT 1;",
    insert_sql: "INSERT INTO FAMILY (NAME, OID) VALUES (?1, ?2);",
};

const GENUS_LEVEL: TaxonLevel = TaxonLevel {
    label: "genus",
    select_sql: "SELECT GID FROM GENUS WHERE NAME = ?1 AND FID = ?2 ORDER BY GID LIMIT 1;",
    insert_sql: "INSERT INTO GENUS (NAME, FID) VALUES (?1, ?2);",
};

/// Repository interface for the taxonomy tree.
pub trait TaxonomyRepository {
    fn resolve_class(&self, name: &str) -> RepoResult<Resolved>;
    fn resolve_order(&self, name: &str, class_id: RowId) -> RepoResult<Resolved>;
    fn resolve_family(&self, name: &str, order_id: RowId) -> RepoResult<Resolved>;
    fn resolve_genus(&self, name: &str, family_id: RowId) -> RepoResult<Resolved>;
}

/// SQLite-backed taxonomy repository.
pub struct SqliteTaxonomyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaxonomyRepository<'conn> {
    /// Constructs a repository over an initialized schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["CLASS", "ORDER", "FAMILY", "GENUS"])?;
        Ok(Self { conn })
    }

    fn resolve(
        &self,
        level: TaxonLevel,
        name: &str,
        parent: Option<RowId>,
    ) -> RepoResult<Resolved> {
        let mut select = self.conn.prepare_cached(level.select_sql)?;
        let existing = match parent {
            Some(parent_id) => select
                .query_row(params![name, parent_id], |row| row.get::<_, RowId>(0))
                .optional()?,
            None => select
                .query_row([name], |row| row.get::<_, RowId>(0))
                .optional()?,
        };
        if let Some(id) = existing {
            return Ok(Resolved::existing(id));
        }

        let mut insert = self.conn.prepare_cached(level.insert_sql)?;
        let changed = match parent {
            Some(parent_id) => insert.execute(params![name, parent_id])?,
            None => insert.execute([name])?,
        };
        if changed == 0 {
            return Err(RepoError::InvalidData(format!(
                "insert of {} `{name}` wrote no row",
                level.label
            )));
        }

        Ok(Resolved::created(self.conn.last_insert_rowid()))
    }
}

impl TaxonomyRepository for SqliteTaxonomyRepository<'_> {
    fn resolve_class(&self, name: &str) -> RepoResult<Resolved> {
        self.resolve(CLASS_LEVEL, name, None)
    }

    fn resolve_order(&self, name: &str, class_id: RowId) -> RepoResult<Resolved> {
        self.resolve(ORDER_LEVEL, name, Some(class_id))
    }

    fn resolve_family(&self, name: &str, order_id: RowId) -> RepoResult<Resolved> {
        self.resolve(FAMILY_LEVEL, name, Some(order_id))
    }

    fn resolve_genus(&self, name: &str, family_id: RowId) -> RepoResult<Resolved> {
        self.resolve(GENUS_LEVEL, name, Some(family_id))
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteTaxonomyRepository, TaxonomyRepository};
    use crate::db::{initialize_schema, open_db_in_memory};
    use crate::repo::RepoError;

    #[test]
    fn try_new_requires_initialized_schema() {
        let conn = open_db_in_memory().unwrap();
        let err = SqliteTaxonomyRepository::try_new(&conn)
            .err()
            .expect("empty database must be rejected");
        assert!(matches!(err, RepoError::MissingRequiredTable("CLASS")));
    }

    #[test]
    fn resolve_reuses_rows_under_same_parent() {
        let mut conn = open_db_in_memory().unwrap();
        initialize_schema(&mut conn).unwrap();
        let repo = SqliteTaxonomyRepository::try_new(&conn).unwrap();

        let class = repo.resolve_class("Bryopsida").unwrap();
        assert!(class.created);
        let again = repo.resolve_class("Bryopsida").unwrap();
        assert!(!again.created);
        assert_eq!(again.id, class.id);

        let order = repo.resolve_order("Hypnales", class.id).unwrap();
        let other_class = repo.resolve_class("Sphagnopsida").unwrap();
        let same_name_other_parent = repo.resolve_order("Hypnales", other_class.id).unwrap();
        assert!(same_name_other_parent.created);
        assert_ne!(same_name_other_parent.id, order.id);
        assert_eq!(repo.resolve_order("Hypnales", class.id).unwrap().id, order.id);
    }

    #[test]
    fn resolve_rejects_unknown_parent() {
        let mut conn = open_db_in_memory().unwrap();
        initialize_schema(&mut conn).unwrap();
        let repo = SqliteTaxonomyRepository::try_new(&conn).unwrap();

        let err = repo.resolve_genus("Hypnum", 999).unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
    }
}
