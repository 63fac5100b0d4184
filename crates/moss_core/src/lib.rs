//! Core library for the moss taxonomy catalogue.
//! Owns the relational schema and the JSON bulk loader.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{initialize_schema, open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_stderr_logging, LogTarget};
pub use model::species::{MossRow, SpeciesRecord, TaxonId};
pub use model::status::{ConfirmationStatus, ConservationStatus, ExpertDegree};
pub use model::taxonomy::{TaxonomyDocument, TaxonomyIndex};
pub use model::RowId;
pub use repo::species_repo::{SpeciesRepository, SqliteSpeciesRepository};
pub use repo::taxonomy_repo::{SqliteTaxonomyRepository, TaxonomyRepository};
pub use repo::{RepoError, RepoResult, Resolved};
pub use service::load_service::{
    load_files, load_into, read_species, read_taxonomy, LoadError, LoadReport, LoadResult,
    MossLoader, SkippedSpecies,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
