//! Species and habitat repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert `MOSS` rows keyed by upstream taxon id.
//! - Resolve or create `COUNTRY` rows and link them through `MOSS_COUNTRY`.
//!
//! # Invariants
//! - `MOSS` inserts never overwrite: a conflicting row is left as-is.
//! - Country names are unique; one `MOSS_COUNTRY` row per (species, country).

use super::{ensure_tables, RepoResult, Resolved};
use crate::model::species::{MossRow, TaxonId};
use crate::model::RowId;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for species rows and their habitat links.
pub trait SpeciesRepository {
    /// Inserts one species row; returns `false` when a conflicting row exists.
    fn insert_moss(&self, row: &MossRow) -> RepoResult<bool>;
    fn moss_exists(&self, mid: TaxonId) -> RepoResult<bool>;
    /// Returns `None` only when the country can neither be found nor inserted.
    fn resolve_country(&self, name: &str) -> RepoResult<Option<Resolved>>;
    /// Links a species to a country; returns `false` when already linked.
    fn link_country(&self, mid: TaxonId, country_id: RowId) -> RepoResult<bool>;
}

/// SQLite-backed species repository.
pub struct SqliteSpeciesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSpeciesRepository<'conn> {
    /// Constructs a repository over an initialized schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["MOSS", "COUNTRY", "MOSS_COUNTRY"])?;
        Ok(Self { conn })
    }
}

impl SpeciesRepository for SqliteSpeciesRepository<'_> {
    fn insert_moss(&self, row: &MossRow) -> RepoResult<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO MOSS (
                MID,
                SCIENTIFIC_NAME,
                COMMON_NAME,
                CONSERVATION_STATUS,
                POSSIBLY_EXTINCT,
                GID,
                DISCOVERED,
                PUBLISHED_IN,
                IUCN_URL,
                ASSESSMENT_YEAR
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT DO NOTHING;",
        )?;
        let changed = stmt.execute(params![
            row.mid,
            row.scientific_name.as_str(),
            row.common_name.as_deref(),
            row.conservation_status.map(|status| status.as_db_str()),
            row.possibly_extinct,
            row.gid,
            row.discovered,
            row.published_in.as_deref(),
            row.iucn_url.as_deref(),
            row.assessment_year,
        ])?;
        Ok(changed > 0)
    }

    fn moss_exists(&self, mid: TaxonId) -> RepoResult<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT EXISTS(SELECT 1 FROM MOSS WHERE MID = ?1);")?;
        let exists: i64 = stmt.query_row([mid], |row| row.get(0))?;
        Ok(exists == 1)
    }

    fn resolve_country(&self, name: &str) -> RepoResult<Option<Resolved>> {
        let mut select = self
            .conn
            .prepare_cached("SELECT CID FROM COUNTRY WHERE NAME = ?1;")?;
        if let Some(id) = select
            .query_row([name], |row| row.get::<_, RowId>(0))
            .optional()?
        {
            return Ok(Some(Resolved::existing(id)));
        }

        let mut insert = self.conn.prepare_cached(
            "INSERT INTO COUNTRY (NAME)
             VALUES (?1)
             ON CONFLICT (NAME) DO NOTHING;",
        )?;
        if insert.execute([name])? == 0 {
            return Ok(None);
        }
        Ok(Some(Resolved::created(self.conn.last_insert_rowid())))
    }

    fn link_country(&self, mid: TaxonId, country_id: RowId) -> RepoResult<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO MOSS_COUNTRY (MID, CID)
             VALUES (?1, ?2)
             ON CONFLICT (MID, CID) DO NOTHING;",
        )?;
        let changed = stmt.execute(params![mid, country_id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::{SpeciesRepository, SqliteSpeciesRepository};
    use crate::db::{initialize_schema, open_db_in_memory};
    use crate::model::species::MossRow;
    use crate::model::status::ConservationStatus;
    use rusqlite::Connection;

    fn seeded_genus(conn: &Connection) -> i64 {
        conn.execute_batch(
            "INSERT INTO CLASS (NAME) VALUES ('Bryopsida');
             INSERT INTO \"ORDER\" (NAME, CID) VALUES ('Hypnales', 1);
             INSERT INTO FAMILY (NAME, OID) VALUES ('Hypnaceae', 1);
             INSERT INTO GENUS (NAME, FID) VALUES ('Hypnum', 1);",
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn row(mid: i64, name: &str, gid: i64) -> MossRow {
        MossRow {
            mid,
            scientific_name: name.to_string(),
            common_name: None,
            conservation_status: None,
            possibly_extinct: Some(false),
            gid,
            discovered: Some(1801),
            published_in: None,
            iucn_url: None,
            assessment_year: None,
        }
    }

    #[test]
    fn insert_moss_is_conflict_tolerant() {
        let mut conn = open_db_in_memory().unwrap();
        initialize_schema(&mut conn).unwrap();
        let gid = seeded_genus(&conn);
        let repo = SqliteSpeciesRepository::try_new(&conn).unwrap();

        assert!(repo.insert_moss(&row(10, "Hypnum cupressiforme", gid)).unwrap());
        assert!(!repo.insert_moss(&row(10, "Hypnum cupressiforme", gid)).unwrap());
        assert!(!repo.insert_moss(&row(11, "Hypnum cupressiforme", gid)).unwrap());
        assert!(repo.moss_exists(10).unwrap());
        assert!(!repo.moss_exists(11).unwrap());
    }

    #[test]
    fn insert_moss_writes_conservation_code() {
        let mut conn = open_db_in_memory().unwrap();
        initialize_schema(&mut conn).unwrap();
        let gid = seeded_genus(&conn);
        let repo = SqliteSpeciesRepository::try_new(&conn).unwrap();

        let mut endangered = row(12, "Hypnum lindbergii", gid);
        endangered.conservation_status = Some(ConservationStatus::Endangered);
        repo.insert_moss(&endangered).unwrap();

        let code: String = conn
            .query_row(
                "SELECT CONSERVATION_STATUS FROM MOSS WHERE MID = 12;",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(code, "EN");
    }

    #[test]
    fn countries_are_reused_and_links_deduplicated() {
        let mut conn = open_db_in_memory().unwrap();
        initialize_schema(&mut conn).unwrap();
        let gid = seeded_genus(&conn);
        let repo = SqliteSpeciesRepository::try_new(&conn).unwrap();
        repo.insert_moss(&row(10, "Hypnum cupressiforme", gid)).unwrap();

        let first = repo.resolve_country("Norway").unwrap().unwrap();
        assert!(first.created);
        let second = repo.resolve_country("Norway").unwrap().unwrap();
        assert!(!second.created);
        assert_eq!(first.id, second.id);

        assert!(repo.link_country(10, first.id).unwrap());
        assert!(!repo.link_country(10, first.id).unwrap());
    }
}
