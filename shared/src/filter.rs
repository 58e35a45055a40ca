//! Filter/sort engine: pure functions from a collection and view parameters
//! to an ordered derived view.
//!
//! Dimensions combine with AND. Within the category dimension the active tags
//! combine with OR, and an empty tag set passes everything through.

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::locale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::model::{Record, RecordId, RecordSequence};

/// Inclusive id interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationRange {
    pub min: u32,
    pub max: u32,
}

impl GenerationRange {
    #[must_use]
    pub const fn contains(self, id: RecordId) -> bool {
        id.0 >= self.min && id.0 <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    pub key: &'static str,
    pub label: &'static str,
    pub range: GenerationRange,
}

pub const ALL_GENERATIONS_LABEL: &str = "All Generations";

const fn entry(key: &'static str, label: &'static str, min: u32, max: u32) -> Generation {
    Generation {
        key,
        label,
        range: GenerationRange { min, max },
    }
}

/// Contiguous, non-overlapping, covering ids 1..=1025.
pub const GENERATIONS: [Generation; 9] = [
    entry("gen1", "Gen 1 (Kanto)", 1, 151),
    entry("gen2", "Gen 2 (Johto)", 152, 251),
    entry("gen3", "Gen 3 (Hoenn)", 252, 386),
    entry("gen4", "Gen 4 (Sinnoh)", 387, 493),
    entry("gen5", "Gen 5 (Unova)", 494, 649),
    entry("gen6", "Gen 6 (Kalos)", 650, 721),
    entry("gen7", "Gen 7 (Alola)", 722, 809),
    entry("gen8", "Gen 8 (Galar)", 810, 905),
    entry("gen9", "Gen 9 (Paldea)", 906, 1025),
];

#[must_use]
pub fn generation(key: &str) -> Option<&'static Generation> {
    GENERATIONS.iter().find(|g| g.key == key)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub categories: BTreeSet<String>,
    pub generation: Option<GenerationRange>,
    pub name_query: String,
}

impl FilterState {
    /// Adds the tag if absent, removes it otherwise. Returns whether the tag
    /// is active afterwards.
    pub fn toggle_category(&mut self, name: &str) -> bool {
        if self.categories.remove(name) {
            false
        } else {
            self.categories.insert(name.to_string());
            true
        }
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_categories(record) && self.matches_generation(record) && self.matches_name(record)
    }

    fn matches_categories(&self, record: &Record) -> bool {
        self.categories.is_empty()
            || record
                .categories
                .iter()
                .any(|c| self.categories.contains(c.name()))
    }

    fn matches_generation(&self, record: &Record) -> bool {
        self.generation.is_none_or(|range| range.contains(record.id))
    }

    fn matches_name(&self, record: &Record) -> bool {
        let query = self.name_query.trim();
        query.is_empty() || record.name.to_lowercase().contains(&query.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    #[must_use]
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Locale-aware name ordering. Falls back to code-point order if collation
/// data cannot be loaded.
pub struct NameCollator {
    collator: Option<CollatorBorrowed<'static>>,
}

impl NameCollator {
    #[must_use]
    pub fn new() -> Self {
        let collator = match Collator::try_new(locale!("en").into(), CollatorOptions::default()) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(error = %e, "collation data unavailable, using code-point order");
                None
            }
        };
        Self { collator }
    }

    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::new()
    }
}

/// Filters `records` and sorts the survivors. The sort is stable; descending
/// order reverses the comparison, so ties keep their input order in both
/// directions.
#[must_use]
pub fn derive(records: &[Arc<Record>], filter: &FilterState, sort: SortState) -> RecordSequence {
    let mut derived: Vec<Arc<Record>> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    let collator = match sort.key {
        SortKey::Name => Some(NameCollator::new()),
        SortKey::Id => None,
    };

    derived.sort_by(|a, b| {
        let ordering = match &collator {
            Some(collator) => collator.compare(&a.name, &b.name),
            None => a.id.cmp(&b.id),
        };
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    RecordSequence::from(derived)
}
