//! Destructive schema reset for the moss catalogue.
//!
//! # Responsibility
//! - Drop every known table, children before parents.
//! - Recreate all tables with keys, foreign keys and check constraints.
//!
//! # Invariants
//! - The reset is one transaction: either every statement applies or none do.
//! - Tables outside [`DROP_ORDER`] are never touched.
//! - [`DROP_ORDER`] is the reverse dependency order of [`CREATE_ORDER`].

use crate::db::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

const CREATE_TABLES_SQL: &str = include_str!("create_tables.sql");

/// Tables in creation order; every table appears after the tables it references.
pub const CREATE_ORDER: &[&str] = &[
    "CLASS",
    "ORDER",
    "FAMILY",
    "GENUS",
    "LOCATION",
    "PHOTO",
    "MOSS",
    "COUNTRY",
    "MOSS_COUNTRY",
    "NUTRIENT",
    "PRODUCES",
    "CONSUMES",
    "ACCOUNT",
    "EXPERT",
    "SIGHTING",
    "CONFIRMS",
    "CAPTURES",
    "POSTS",
    "IS_SEEN_IN",
];

/// Tables in drop order; every table appears before the tables it references.
pub const DROP_ORDER: &[&str] = &[
    "IS_SEEN_IN",
    "POSTS",
    "CAPTURES",
    "CONFIRMS",
    "SIGHTING",
    "EXPERT",
    "ACCOUNT",
    "CONSUMES",
    "PRODUCES",
    "NUTRIENT",
    "MOSS_COUNTRY",
    "COUNTRY",
    "MOSS",
    "PHOTO",
    "LOCATION",
    "GENUS",
    "FAMILY",
    "ORDER",
    "CLASS",
];

/// Drops and recreates the whole schema.
///
/// Destroys all existing rows in known tables.
///
/// # Errors
/// - Returns the first SQLite error; nothing is committed in that case.
pub fn initialize_schema(conn: &mut Connection) -> DbResult<()> {
    let started_at = Instant::now();
    info!(
        "event=schema_init module=db status=start tables={}",
        CREATE_ORDER.len()
    );

    match reset_in_transaction(conn) {
        Ok(()) => {
            info!(
                "event=schema_init module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=schema_init module=db status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn reset_in_transaction(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
    tx.execute_batch(&drop_tables_sql())?;
    tx.execute_batch(CREATE_TABLES_SQL)?;
    tx.commit()?;
    Ok(())
}

fn drop_tables_sql() -> String {
    DROP_ORDER
        .iter()
        .map(|table| format!("DROP TABLE IF EXISTS \"{table}\";\n"))
        .collect()
}
