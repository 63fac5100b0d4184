//! Domain model for the moss catalogue.
//!
//! # Responsibility
//! - Define the input document shapes read by the loader.
//! - Define normalized row payloads written to storage.
//! - Mirror the schema's checked value sets as typed enums.
//!
//! # Invariants
//! - Generated row ids are SQLite rowids (`RowId`); species ids are upstream
//!   taxon ids (`TaxonId`) and are never generated locally.

pub mod species;
pub mod status;
pub mod taxonomy;

/// Generated integer primary key of a taxonomy or country row.
pub type RowId = i64;
