use serde::{Deserialize, Serialize};

use crate::capabilities::IndexPage;
use crate::config::{CatalogConfig, ViewKind};
use crate::filter::{SortDirection, SortKey};
use crate::model::RecordId;

/// Identifies one mounted screen. Responses carrying any other token belong
/// to a screen that has since been unmounted and are discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MountToken(pub u64);

impl MountToken {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    List,
    Gallery,
    Detail { id: RecordId },
}

impl Route {
    #[must_use]
    pub const fn browse(kind: ViewKind) -> Self {
        match kind {
            ViewKind::List => Self::List,
            ViewKind::Gallery => Self::Gallery,
        }
    }
}

type HttpResult<T> = crux_http::Result<crux_http::Response<T>>;

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    Configure(CatalogConfig),
    Mount(Route),
    Unmount,
    Reload,

    SearchChanged(String),
    SortKeyChanged(SortKey),
    SortDirectionChanged(SortDirection),
    CategoryToggled(String),
    GenerationSelected(Option<String>),
    PageSelected(usize),
    NextPage,
    PreviousPage,

    RecordSelected {
        id: RecordId,
    },
    PreviousRecord,
    NextRecord,

    #[serde(skip)]
    IndexFetched {
        token: MountToken,
        result: HttpResult<IndexPage>,
    },
    /// Record bodies stay raw until the status has been checked.
    #[serde(skip)]
    RecordFetched {
        token: MountToken,
        position: u32,
        result: HttpResult<Vec<u8>>,
    },
    #[serde(skip)]
    CategoryKindsFetched {
        token: MountToken,
        result: HttpResult<IndexPage>,
    },
    #[serde(skip)]
    DetailFetched {
        token: MountToken,
        id: RecordId,
        result: HttpResult<Vec<u8>>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::Mount(_) => "mount",
            Self::Unmount => "unmount",
            Self::Reload => "reload",
            Self::SearchChanged(_) => "search_changed",
            Self::SortKeyChanged(_) => "sort_key_changed",
            Self::SortDirectionChanged(_) => "sort_direction_changed",
            Self::CategoryToggled(_) => "category_toggled",
            Self::GenerationSelected(_) => "generation_selected",
            Self::PageSelected(_) => "page_selected",
            Self::NextPage => "next_page",
            Self::PreviousPage => "previous_page",
            Self::RecordSelected { .. } => "record_selected",
            Self::PreviousRecord => "previous_record",
            Self::NextRecord => "next_record",
            Self::IndexFetched { .. } => "index_fetched",
            Self::RecordFetched { .. } => "record_fetched",
            Self::CategoryKindsFetched { .. } => "category_kinds_fetched",
            Self::DetailFetched { .. } => "detail_fetched",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::Configure(_)
                | Self::IndexFetched { .. }
                | Self::RecordFetched { .. }
                | Self::CategoryKindsFetched { .. }
                | Self::DetailFetched { .. }
        )
    }
}
