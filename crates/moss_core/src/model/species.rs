//! Species input record and its normalized `MOSS` row.
//!
//! # Responsibility
//! - Deserialize one entry of the species list document.
//! - Normalize loosely typed year fields into nullable integers.
//!
//! # Invariants
//! - `discovered: "Unknown"` normalizes to `None`.
//! - Year values that cannot be coerced normalize to `None`, never an error.
//! - Assessment years pass through a `YYYY-01-01` calendar date before being
//!   reduced back to the year; 4-digit years survive unchanged.

use super::status::ConservationStatus;
use super::RowId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::macros::format_description;
use time::Date;

/// Upstream taxon identifier, used verbatim as `MOSS.MID`.
pub type TaxonId = i64;

/// Sentinel the source data uses for an unknown discovery year.
pub const UNKNOWN_DISCOVERY: &str = "Unknown";

/// One species entry from the species list document.
///
/// Year and id fields stay as raw JSON because the source mixes numbers and
/// strings for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    #[serde(rename = "taxonID")]
    pub taxon_id: Value,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    #[serde(rename = "vernacularName", default)]
    pub vernacular_name: Option<String>,
    pub genus: String,
    #[serde(default)]
    pub discovered: Option<Value>,
    #[serde(default)]
    pub assessment_year: Option<Value>,
    /// Missing means `false`; an explicit `null` is kept as unknown.
    #[serde(default = "default_possibly_extinct")]
    pub possibly_extinct: Option<bool>,
    #[serde(rename = "publishedIn", default)]
    pub published_in: Option<String>,
    #[serde(default)]
    pub assessment_url: Option<String>,
    #[serde(default)]
    pub habitats: Option<Vec<String>>,
}

fn default_possibly_extinct() -> Option<bool> {
    Some(false)
}

impl SpeciesRecord {
    /// Parses `taxonID` from a JSON integer or a numeric string.
    pub fn taxon_id(&self) -> Option<TaxonId> {
        match &self.taxon_id {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Habitat country names, empty when absent.
    pub fn habitats(&self) -> &[String] {
        self.habitats.as_deref().unwrap_or_default()
    }
}

/// Normalized payload for one `MOSS` insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MossRow {
    pub mid: TaxonId,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub conservation_status: Option<ConservationStatus>,
    pub possibly_extinct: Option<bool>,
    pub gid: RowId,
    pub discovered: Option<i32>,
    pub published_in: Option<String>,
    pub iucn_url: Option<String>,
    pub assessment_year: Option<i32>,
}

impl MossRow {
    /// Builds the row for `record` under the resolved genus id.
    ///
    /// Returns `None` when the record's taxon id is not an integer.
    pub fn from_record(record: &SpeciesRecord, gid: RowId) -> Option<Self> {
        Some(Self {
            mid: record.taxon_id()?,
            scientific_name: record.scientific_name.clone(),
            common_name: record.vernacular_name.clone(),
            // Source data carries no Red List category.
            conservation_status: None,
            possibly_extinct: record.possibly_extinct,
            gid,
            discovered: normalize_discovered(record.discovered.as_ref()),
            published_in: record.published_in.clone(),
            iucn_url: record.assessment_url.clone(),
            assessment_year: normalize_assessment_year(record.assessment_year.as_ref()),
        })
    }
}

/// Normalizes the discovery year.
pub fn normalize_discovered(raw: Option<&Value>) -> Option<i32> {
    match raw {
        Some(Value::String(text)) if text == UNKNOWN_DISCOVERY => None,
        Some(value) => coerce_year(value),
        None => None,
    }
}

/// Normalizes the assessment year via its `YYYY-01-01` date form.
pub fn normalize_assessment_year(raw: Option<&Value>) -> Option<i32> {
    assessment_date(raw).as_deref().and_then(year_of_date)
}

/// Rewrites a raw assessment year as a January 1st date string.
///
/// Empty, null and zero values yield `None`. Numbers follow the same
/// coercion as the discovery year.
pub fn assessment_date(raw: Option<&Value>) -> Option<String> {
    let year = match raw? {
        number @ Value::Number(_) => match coerce_year(number)? {
            0 => return None,
            year => year.to_string(),
        },
        Value::String(text) if text.trim().is_empty() => return None,
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Some(format!("{year}-01-01"))
}

/// Reduces a `YYYY-MM-DD` date string to its year.
pub fn year_of_date(date: &str) -> Option<i32> {
    Date::parse(date, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.year())
}

fn coerce_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && float.fract() == 0.0)
                    .map(|float| float as i64)
            })
            .and_then(|year| i32::try_from(year).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
