use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, ops::Deref, sync::Arc};
use thiserror::Error;
use url::Url;

use crate::MAX_METRIC_VALUE;

/// Upstream numbering: stable, 1-based, unique across the catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl RecordId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record id must be at least 1")]
    InvalidId,
    #[error("record {id} has an empty name")]
    EmptyName { id: RecordId },
    #[error("record {id} has no categories")]
    MissingCategories { id: RecordId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("duplicate record id {0}")]
    DuplicateId(RecordId),
}

/// The closed set of category kinds the views know how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl CategoryKind {
    pub const ALL: [Self; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Electric => "electric",
            Self::Grass => "grass",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }

    #[must_use]
    pub const fn color_hex(self) -> &'static str {
        match self {
            Self::Normal => "#A8A878",
            Self::Fire => "#F08030",
            Self::Water => "#6890F0",
            Self::Electric => "#F8D030",
            Self::Grass => "#78C850",
            Self::Ice => "#98D8D8",
            Self::Fighting => "#C03028",
            Self::Poison => "#A040A0",
            Self::Ground => "#E0C068",
            Self::Flying => "#A890F0",
            Self::Psychic => "#F85888",
            Self::Bug => "#A8B820",
            Self::Rock => "#B8A038",
            Self::Ghost => "#705898",
            Self::Dragon => "#7038F8",
            Self::Dark => "#705848",
            Self::Steel => "#B8B8D0",
            Self::Fairy => "#EE99AC",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category applied to a record. The upstream name is kept verbatim so
/// kinds added upstream still filter correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTag(pub String);

impl CategoryTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn kind(&self) -> Option<CategoryKind> {
        CategoryKind::from_name(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: u8,
}

impl Metric {
    /// Share of the metric scale, always within `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        f32::from(self.value) / f32::from(MAX_METRIC_VALUE)
    }
}

/// Upstream units: decimetres and hectograms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub length_dm: u32,
    pub mass_hg: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Lowercase canonical name.
    pub name: String,
    pub primary_media: Option<Url>,
    pub thumbnail: Option<Url>,
    /// Primary category first.
    pub categories: Vec<CategoryTag>,
    pub attributes: Vec<Ability>,
    pub metrics: Vec<Metric>,
    pub size: Size,
}

impl Record {
    pub fn validate(self) -> Result<Self, RecordError> {
        if self.id.0 == 0 {
            return Err(RecordError::InvalidId);
        }
        if self.name.trim().is_empty() {
            return Err(RecordError::EmptyName { id: self.id });
        }
        if self.categories.is_empty() {
            return Err(RecordError::MissingCategories { id: self.id });
        }
        Ok(self)
    }

    #[must_use]
    pub fn primary_category(&self) -> Option<&CategoryTag> {
        self.categories.first()
    }

    #[must_use]
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name() == name)
    }
}

/// An ordered, shared sequence of records. Cloning shares the same backing
/// storage; records themselves are never copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSequence(Arc<[Arc<Record>]>);

impl RecordSequence {
    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// True when both handles point at the same backing sequence.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.0.iter().position(|r| r.id == id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<RecordId> {
        self.0.iter().map(|r| r.id).collect()
    }
}

impl Default for RecordSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for RecordSequence {
    type Target = [Arc<Record>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Arc<Record>>> for RecordSequence {
    fn from(records: Vec<Arc<Record>>) -> Self {
        Self(Arc::from(records))
    }
}

/// Every record fetched for one view session, unique by id and immutable
/// until the next load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    records: RecordSequence,
}

impl Collection {
    pub fn new(records: Vec<Record>) -> Result<Self, CollectionError> {
        Self::from_shared(records.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(records: Vec<Arc<Record>>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(CollectionError::DuplicateId(record.id));
            }
        }
        Ok(Self {
            records: RecordSequence::from(records),
        })
    }

    #[must_use]
    pub fn records(&self) -> &RecordSequence {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Arc<Record>> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl Deref for Collection {
    type Target = [Arc<Record>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
