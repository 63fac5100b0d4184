//! Taxonomy input document and the name→id index built while loading it.
//!
//! # Responsibility
//! - Deserialize the nested class → order → family → genus document.
//! - Hold the four name→id caches produced by the taxonomy phase.
//!
//! # Invariants
//! - Document iteration follows input order at every level.
//! - Index lookups are exact (case-sensitive) name matches.

use super::RowId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Genus names under one family.
pub type GenusList = Vec<String>;
/// Families keyed by name under one order.
pub type FamilyMap = IndexMap<String, GenusList>;
/// Orders keyed by name under one class.
pub type OrderMap = IndexMap<String, FamilyMap>;

/// Nested taxonomy document: `{ class: { order: { family: [genus, ...] } } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomyDocument {
    pub classes: IndexMap<String, OrderMap>,
}

impl TaxonomyDocument {
    /// Total genus entries across all families, duplicates included.
    pub fn genus_count(&self) -> usize {
        self.classes
            .values()
            .flat_map(|orders| orders.values())
            .flat_map(|families| families.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Name→id caches for each taxonomy level, scoped to one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyIndex {
    pub classes: HashMap<String, RowId>,
    pub orders: HashMap<String, RowId>,
    pub families: HashMap<String, RowId>,
    pub genera: HashMap<String, RowId>,
}

impl TaxonomyIndex {
    pub fn genus_id(&self, genus_name: &str) -> Option<RowId> {
        self.genera.get(genus_name).copied()
    }
}
