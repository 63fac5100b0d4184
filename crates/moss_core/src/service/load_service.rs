//! Two-phase catalogue import.
//!
//! # Responsibility
//! - Phase 1: walk the taxonomy document top-down, resolving every level and
//!   building the name→id caches.
//! - Phase 2: insert species rows under their cached genus and link habitat
//!   countries.
//!
//! # Invariants
//! - Caches live only for one load; nothing is held between runs.
//! - A species whose genus is not in the taxonomy is skipped, never fatal.
//! - [`load_into`] commits once at the end; any error rolls back the run.

use crate::model::species::{MossRow, SpeciesRecord, TaxonId};
use crate::model::taxonomy::{TaxonomyDocument, TaxonomyIndex};
use crate::model::RowId;
use crate::repo::species_repo::{SpeciesRepository, SqliteSpeciesRepository};
use crate::repo::taxonomy_repo::{SqliteTaxonomyRepository, TaxonomyRepository};
use crate::repo::RepoError;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type LoadResult<T> = Result<T, LoadError>;

/// Fatal load error. Per-record problems are reported in [`LoadReport`].
#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A species entry cannot be mapped to a row at all.
    InvalidRecord {
        index: usize,
        message: String,
    },
    Repo(RepoError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid JSON in `{}`: {source}", path.display())
            }
            Self::InvalidRecord { index, message } => {
                write!(f, "invalid species record #{index}: {message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidRecord { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for LoadError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for LoadError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Species entry left out of `MOSS` because its genus was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSpecies {
    pub taxon_id: Option<TaxonId>,
    pub scientific_name: String,
    pub genus: String,
}

/// Counters for one load run.
///
/// Taxonomy counts are rows resolved by this run, whether reused or new.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub classes: usize,
    pub orders: usize,
    pub families: usize,
    pub genera: usize,
    pub taxa_created: usize,
    pub species_inserted: usize,
    pub species_existing: usize,
    pub skipped: Vec<SkippedSpecies>,
    pub countries_created: usize,
    pub links_inserted: usize,
}

/// Orchestrates both load phases over repository implementations.
pub struct MossLoader<T: TaxonomyRepository, S: SpeciesRepository> {
    taxonomy: T,
    species: S,
}

impl<T: TaxonomyRepository, S: SpeciesRepository> MossLoader<T, S> {
    pub fn new(taxonomy: T, species: S) -> Self {
        Self { taxonomy, species }
    }

    /// Runs phase 1 then phase 2.
    pub fn run(
        &self,
        document: &TaxonomyDocument,
        records: &[SpeciesRecord],
    ) -> LoadResult<LoadReport> {
        let mut report = LoadReport::default();
        let index = self.load_taxonomy(document, &mut report)?;
        self.load_species(&index, records, &mut report)?;
        Ok(report)
    }

    /// Resolves every taxonomy level and returns the resulting caches.
    ///
    /// When one genus name appears under several families the last one
    /// visited wins the cache entry.
    pub fn load_taxonomy(
        &self,
        document: &TaxonomyDocument,
        report: &mut LoadReport,
    ) -> LoadResult<TaxonomyIndex> {
        let mut index = TaxonomyIndex::default();

        for (class_name, orders) in &document.classes {
            let class = self.taxonomy.resolve_class(class_name)?;
            report.classes += 1;
            report.taxa_created += usize::from(class.created);
            index.classes.insert(class_name.clone(), class.id);

            for (order_name, families) in orders {
                let order = self.taxonomy.resolve_order(order_name, class.id)?;
                report.orders += 1;
                report.taxa_created += usize::from(order.created);
                index.orders.insert(order_name.clone(), order.id);

                for (family_name, genera) in families {
                    let family = self.taxonomy.resolve_family(family_name, order.id)?;
                    report.families += 1;
                    report.taxa_created += usize::from(family.created);
                    index.families.insert(family_name.clone(), family.id);

                    for genus_name in genera {
                        let genus = self.taxonomy.resolve_genus(genus_name, family.id)?;
                        report.genera += 1;
                        report.taxa_created += usize::from(genus.created);
                        if let Some(previous) = index.genera.insert(genus_name.clone(), genus.id)
                        {
                            if previous != genus.id {
                                debug!(
                                    "event=genus_shadowed module=loader genus={} previous_gid={} gid={}",
                                    genus_name, previous, genus.id
                                );
                            }
                        }
                    }
                }
            }
        }

        info!(
            "event=taxonomy_loaded module=loader classes={} orders={} families={} genera={} created={}",
            report.classes, report.orders, report.families, report.genera, report.taxa_created
        );
        Ok(index)
    }

    /// Inserts species rows and their habitat links.
    pub fn load_species(
        &self,
        index: &TaxonomyIndex,
        records: &[SpeciesRecord],
        report: &mut LoadReport,
    ) -> LoadResult<()> {
        let mut countries: HashMap<&str, RowId> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            let Some(gid) = index.genus_id(&record.genus) else {
                warn!(
                    "event=species_skip module=loader reason=genus_not_found record={} genus={}",
                    position, record.genus
                );
                report.skipped.push(SkippedSpecies {
                    taxon_id: record.taxon_id(),
                    scientific_name: record.scientific_name.clone(),
                    genus: record.genus.clone(),
                });
                continue;
            };

            let row =
                MossRow::from_record(record, gid).ok_or_else(|| LoadError::InvalidRecord {
                    index: position,
                    message: format!("taxonID `{}` is not an integer", record.taxon_id),
                })?;

            if self.species.insert_moss(&row)? {
                report.species_inserted += 1;
            } else {
                report.species_existing += 1;
                if !self.species.moss_exists(row.mid)? {
                    warn!(
                        "event=habitat_skip module=loader reason=scientific_name_taken mid={} name={}",
                        row.mid, row.scientific_name
                    );
                    continue;
                }
            }

            for habitat in record.habitats() {
                let country_id = match countries.get(habitat.as_str()) {
                    Some(id) => *id,
                    None => match self.species.resolve_country(habitat)? {
                        Some(country) => {
                            report.countries_created += usize::from(country.created);
                            countries.insert(habitat.as_str(), country.id);
                            country.id
                        }
                        None => continue,
                    },
                };
                if self.species.link_country(row.mid, country_id)? {
                    report.links_inserted += 1;
                }
            }
        }

        info!(
            "event=species_loaded module=loader inserted={} existing={} skipped={} countries_created={} links={}",
            report.species_inserted,
            report.species_existing,
            report.skipped.len(),
            report.countries_created,
            report.links_inserted
        );
        Ok(())
    }
}

/// Loads both documents inside one transaction on `conn`.
///
/// # Errors
/// - Returns `RepoError::MissingRequiredTable` when the schema is absent.
/// - Returns the first database error; the transaction is rolled back.
pub fn load_into(
    conn: &mut Connection,
    document: &TaxonomyDocument,
    records: &[SpeciesRecord],
) -> LoadResult<LoadReport> {
    let started_at = Instant::now();
    info!(
        "event=load module=loader status=start classes={} species={}",
        document.classes.len(),
        records.len()
    );

    let result = run_in_transaction(conn, document, records);
    match &result {
        Ok(report) => info!(
            "event=load module=loader status=ok duration_ms={} inserted={} skipped={}",
            started_at.elapsed().as_millis(),
            report.species_inserted,
            report.skipped.len()
        ),
        Err(err) => error!(
            "event=load module=loader status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn run_in_transaction(
    conn: &mut Connection,
    document: &TaxonomyDocument,
    records: &[SpeciesRecord],
) -> LoadResult<LoadReport> {
    let tx = conn.transaction()?;
    let report = {
        let loader = MossLoader::new(
            SqliteTaxonomyRepository::try_new(&tx)?,
            SqliteSpeciesRepository::try_new(&tx)?,
        );
        loader.run(document, records)?
    };
    tx.commit()?;
    Ok(report)
}

/// Reads both input files and loads them with [`load_into`].
pub fn load_files(
    conn: &mut Connection,
    taxonomy_path: impl AsRef<Path>,
    species_path: impl AsRef<Path>,
) -> LoadResult<LoadReport> {
    let document = read_taxonomy(taxonomy_path)?;
    let records = read_species(species_path)?;
    load_into(conn, &document, &records)
}

/// Reads the nested taxonomy document.
pub fn read_taxonomy(path: impl AsRef<Path>) -> LoadResult<TaxonomyDocument> {
    read_json(path.as_ref())
}

/// Reads the species list document.
pub fn read_species(path: impl AsRef<Path>) -> LoadResult<Vec<SpeciesRecord>> {
    read_json(path.as_ref())
}

fn read_json<D: DeserializeOwned>(path: &Path) -> LoadResult<D> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
