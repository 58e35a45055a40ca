// lib.rs - Pokédex catalog core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod display;
pub mod event;
pub mod fetcher;
pub mod filter;
pub mod model;
pub mod navigation;
pub mod pagination;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use app::{App, Model, ScreenView, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use config::{CatalogConfig, ConfigError, FilterDimensions, MediaSlot, ViewConfig, ViewKind};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::{Event, MountToken, Route};
pub use model::{Collection, Record, RecordId, RecordSequence};

pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_FETCH_LIMIT: usize = 1025;
pub const LIST_PAGE_SIZE: usize = 70;
pub const GALLERY_PAGE_SIZE: usize = 72;
pub const MAX_METRIC_VALUE: u8 = 255;
pub const MAX_PAGE_LABELS: usize = 5;
pub const EXCLUDED_CATEGORY_KINDS: &[&str] = &["unknown", "shadow"];
pub const EMPTY_RESULTS_MESSAGE: &str = "No entries found with selected filters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    FetchFailure,
    NotFound,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FetchFailure => "FETCH_FAILURE",
            Self::NotFound => "NOT_FOUND",
        }
    }

    /// Whether a user-triggered reload can plausibly succeed. The core never
    /// retries on its own.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::FetchFailure)
    }
}

/// Which upstream request a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchStage {
    Index,
    Record { position: u32 },
    Detail { id: RecordId },
    CategoryKinds,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index page"),
            Self::Record { position } => write!(f, "record at position {position}"),
            Self::Detail { id } => write!(f, "record {id}"),
            Self::CategoryKinds => f.write_str("category kinds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CatalogError {
    #[error("failed to fetch {stage}: {reason}")]
    FetchFailure { stage: FetchStage, reason: String },

    #[error("no record with id {id}")]
    NotFound { id: RecordId },
}

impl CatalogError {
    pub fn fetch(stage: FetchStage, reason: impl Into<String>) -> Self {
        Self::FetchFailure {
            stage,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FetchFailure { .. } => ErrorKind::FetchFailure,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::FetchFailure { .. } => "Unable to load".into(),
            Self::NotFound { .. } => "Not found".into(),
        }
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self {
            Self::FetchFailure { .. } => {
                "The catalog could not be loaded. Please check your connection and reload.".into()
            }
            Self::NotFound { id } => format!("There is no entry with number {id}."),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
