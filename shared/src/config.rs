use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{HttpError, ValidatedUrl};
use crate::{
    DEFAULT_API_BASE_URL, DEFAULT_FETCH_LIMIT, EXCLUDED_CATEGORY_KINDS, GALLERY_PAGE_SIZE,
    LIST_PAGE_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid api base url: {0}")]
    BaseUrl(#[from] HttpError),
    #[error("{view} view: page size must be at least 1")]
    ZeroPageSize { view: ViewKind },
    #[error("{view} view: fetch limit must be at least 1")]
    ZeroFetchLimit { view: ViewKind },
}

/// The two browse views. They differ only in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    List,
    Gallery,
}

impl ViewKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Gallery => "gallery",
        }
    }

    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::List => "I Choose You!",
            Self::Gallery => "Pokédex Gallery",
        }
    }

    #[must_use]
    pub const fn loading_message(self) -> &'static str {
        match self {
            Self::List => "Loading Pokémon...",
            Self::Gallery => "Loading Gallery...",
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which filter and sort controls a browse view exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDimensions {
    pub name_search: bool,
    pub sort: bool,
    pub category: bool,
    pub generation: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSlot {
    #[default]
    Thumbnail,
    Artwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub fetch_limit: usize,
    pub page_size: usize,
    #[serde(default)]
    pub filters: FilterDimensions,
    #[serde(default)]
    pub media: MediaSlot,
}

impl ViewConfig {
    #[must_use]
    pub fn list() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            page_size: LIST_PAGE_SIZE,
            filters: FilterDimensions {
                name_search: true,
                sort: true,
                ..FilterDimensions::default()
            },
            media: MediaSlot::Thumbnail,
        }
    }

    #[must_use]
    pub fn gallery() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            page_size: GALLERY_PAGE_SIZE,
            filters: FilterDimensions {
                category: true,
                generation: true,
                ..FilterDimensions::default()
            },
            media: MediaSlot::Artwork,
        }
    }

    fn validate(&self, view: ViewKind) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize { view });
        }
        if self.fetch_limit == 0 {
            return Err(ConfigError::ZeroFetchLimit { view });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub excluded_category_kinds: Vec<String>,
    pub list: ViewConfig,
    pub gallery: ViewConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            excluded_category_kinds: EXCLUDED_CATEGORY_KINDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            list: ViewConfig::list(),
            gallery: ViewConfig::gallery(),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn view(&self, kind: ViewKind) -> &ViewConfig {
        match kind {
            ViewKind::List => &self.list,
            ViewKind::Gallery => &self.gallery,
        }
    }

    pub fn base_url(&self) -> Result<ValidatedUrl, ConfigError> {
        Ok(ValidatedUrl::new(self.api_base_url.as_str())?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.list.validate(ViewKind::List)?;
        self.gallery.validate(ViewKind::Gallery)?;
        Ok(())
    }

    #[must_use]
    pub fn is_excluded_category(&self, name: &str) -> bool {
        self.excluded_category_kinds.iter().any(|k| k == name)
    }
}
