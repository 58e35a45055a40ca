use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, Endpoints};
use crate::config::{CatalogConfig, ViewConfig, ViewKind};
use crate::display::{CategoryStyle, RecordCard, RecordDetail};
use crate::event::{Event, MountToken, Route};
use crate::fetcher::{self, AssemblyProgress, CollectionAssembly, RecordFetcher};
use crate::filter::{self, SortState, ALL_GENERATIONS_LABEL, GENERATIONS};
use crate::model::{CategoryKind, Record, RecordId};
use crate::navigation::{DetailNavigator, NavigationRequest};
use crate::pagination::{PageLabel, PageSummary};
use crate::store::CollectionStore;
use crate::{CatalogError, FetchStage, EMPTY_RESULTS_MESSAGE};

pub const DETAIL_LOADING_MESSAGE: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(CatalogError),
}

/// State of a mounted list or gallery view.
#[derive(Debug)]
pub struct BrowseScreen {
    pub kind: ViewKind,
    pub view: ViewConfig,
    pub endpoints: Endpoints,
    pub status: LoadStatus,
    pub assembly: Option<CollectionAssembly>,
    pub store: CollectionStore,
    pub category_choices: Vec<String>,
}

#[derive(Debug)]
pub struct DetailScreen {
    pub navigator: DetailNavigator,
    pub endpoints: Endpoints,
    pub status: LoadStatus,
    pub record: Option<Arc<Record>>,
}

#[derive(Debug, Default)]
pub enum Screen {
    #[default]
    Idle,
    /// Mounting failed before any request could be made.
    Unavailable {
        route: Route,
        error: CatalogError,
    },
    Browse(Box<BrowseScreen>),
    Detail(Box<DetailScreen>),
}

/// Everything the core holds. Each mount replaces `screen` and bumps `token`,
/// so nothing survives from one view to the next.
#[derive(Debug, Default)]
pub struct Model {
    pub config: CatalogConfig,
    pub token: MountToken,
    pub screen: Screen,
}

impl Model {
    fn browse_mut(&mut self) -> Option<&mut BrowseScreen> {
        match &mut self.screen {
            Screen::Browse(browse) => Some(&mut **browse),
            _ => None,
        }
    }

    fn detail_mut(&mut self) -> Option<&mut DetailScreen> {
        match &mut self.screen {
            Screen::Detail(detail) => Some(&mut **detail),
            _ => None,
        }
    }

    /// Route that would recreate the current screen.
    fn current_route(&self) -> Option<Route> {
        match &self.screen {
            Screen::Idle => None,
            Screen::Unavailable { route, .. } => Some(*route),
            Screen::Browse(browse) => Some(Route::browse(browse.kind)),
            Screen::Detail(detail) => Some(Route::Detail {
                id: detail.navigator.target(),
            }),
        }
    }

    fn accepts(&self, token: MountToken, event: &'static str) -> bool {
        if token == self.token {
            return true;
        }
        debug!(
            event,
            stale = token.0,
            current = self.token.0,
            "discarding response for an unmounted screen"
        );
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub screen: ScreenView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScreenView {
    Idle,
    Loading {
        message: String,
    },
    Failed {
        title: String,
        message: String,
        code: String,
        can_reload: bool,
    },
    Browse(BrowseView),
    Detail(DetailView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseView {
    pub kind: ViewKind,
    pub heading: String,
    pub cards: Vec<RecordCard>,
    pub summary: PageSummary,
    /// Absent while everything fits on one page.
    pub pagination: Option<PaginationView>,
    pub search: Option<String>,
    pub sort: Option<SortState>,
    pub categories: Option<Vec<CategoryChip>>,
    pub generations: Option<Vec<GenerationOption>>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationView {
    pub labels: Vec<PageLabel>,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChip {
    pub name: String,
    pub style: CategoryStyle,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOption {
    /// `None` is "all generations".
    pub key: Option<String>,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
    pub record: RecordDetail,
    pub has_previous: bool,
    pub has_next: bool,
}

impl ScreenView {
    fn failed(error: &CatalogError) -> Self {
        Self::Failed {
            title: error.title(),
            message: error.user_facing_message(),
            code: error.code().to_string(),
            can_reload: error.is_retryable(),
        }
    }
}

impl BrowseScreen {
    fn to_view(&self) -> BrowseView {
        let window = self.store.page_window();
        let filter = self.store.filter();
        let dims = self.view.filters;

        let cards = self
            .store
            .visible_slice()
            .iter()
            .map(|record| RecordCard::new(record, self.view.media))
            .collect();

        let pagination = (window.total > self.store.page_size()).then(|| PaginationView {
            labels: window.labels.clone(),
            current_page: window.current_page,
            total_pages: window.total_pages,
            has_previous: window.has_previous(),
            has_next: window.has_next(),
        });

        let categories = dims.category.then(|| {
            self.category_choices
                .iter()
                .map(|name| CategoryChip {
                    name: name.clone(),
                    style: CategoryStyle::for_name(name),
                    active: filter.categories.contains(name),
                })
                .collect()
        });

        let generations = dims.generation.then(|| {
            std::iter::once(GenerationOption {
                key: None,
                label: ALL_GENERATIONS_LABEL.to_string(),
                selected: filter.generation.is_none(),
            })
            .chain(GENERATIONS.iter().map(|g| GenerationOption {
                key: Some(g.key.to_string()),
                label: g.label.to_string(),
                selected: filter.generation == Some(g.range),
            }))
            .collect()
        });

        BrowseView {
            kind: self.kind,
            heading: self.kind.heading().to_string(),
            cards,
            summary: window.summary(),
            pagination,
            search: dims.name_search.then(|| filter.name_query.clone()),
            sort: dims.sort.then(|| self.store.sort()),
            categories,
            generations,
            empty_message: (window.total == 0).then(|| EMPTY_RESULTS_MESSAGE.to_string()),
        }
    }
}

#[derive(Default)]
pub struct App;

impl App {
    fn endpoints(config: &CatalogConfig) -> Result<Endpoints, CatalogError> {
        config
            .base_url()
            .map(Endpoints::new)
            .map_err(|e| CatalogError::fetch(FetchStage::Index, e.to_string()))
    }

    fn mount(route: Route, model: &mut Model, caps: &Capabilities) {
        match route {
            Route::List => Self::mount_browse(ViewKind::List, model, caps),
            Route::Gallery => Self::mount_browse(ViewKind::Gallery, model, caps),
            Route::Detail { id } => Self::navigate(NavigationRequest::direct(id), model, caps),
        }
    }

    fn mount_browse(kind: ViewKind, model: &mut Model, caps: &Capabilities) {
        model.token = model.token.next();
        let token = model.token;

        let endpoints = match Self::endpoints(&model.config) {
            Ok(endpoints) => endpoints,
            Err(error) => {
                warn!(view = %kind, error = %error, "cannot mount view");
                model.screen = Screen::Unavailable {
                    route: Route::browse(kind),
                    error,
                };
                return;
            }
        };

        let view = model.config.view(kind).clone();
        let fetcher = RecordFetcher::new(&caps.http, &endpoints, token);
        fetcher.fetch_index(view.fetch_limit);
        if view.filters.category {
            fetcher.fetch_category_kinds();
        }

        info!(view = %kind, token = token.0, limit = view.fetch_limit, "mounted browse view");
        model.screen = Screen::Browse(Box::new(BrowseScreen {
            kind,
            store: CollectionStore::new(view.page_size),
            view,
            endpoints,
            status: LoadStatus::Loading,
            assembly: None,
            category_choices: Vec::new(),
        }));
    }

    /// Moves to the detail view for `request.target`, carrying its context.
    fn navigate(request: NavigationRequest, model: &mut Model, caps: &Capabilities) {
        model.token = model.token.next();
        let token = model.token;
        let target = request.target;

        let endpoints = match Self::endpoints(&model.config) {
            Ok(endpoints) => endpoints,
            Err(error) => {
                warn!(%target, error = %error, "cannot open detail view");
                model.screen = Screen::Unavailable {
                    route: Route::Detail { id: target },
                    error,
                };
                return;
            }
        };

        RecordFetcher::new(&caps.http, &endpoints, token).fetch_record(target);

        let navigator = DetailNavigator::arrive(request);
        info!(
            %target,
            token = token.0,
            position = ?navigator.position(),
            "opened detail view"
        );
        model.screen = Screen::Detail(Box::new(DetailScreen {
            navigator,
            endpoints,
            status: LoadStatus::Loading,
            record: None,
        }));
    }

    fn reload(model: &mut Model, caps: &Capabilities) {
        if let Screen::Detail(detail) = &model.screen {
            let request = match detail.navigator.context() {
                Some(context) => {
                    NavigationRequest::with_context(detail.navigator.target(), context.clone())
                }
                None => NavigationRequest::direct(detail.navigator.target()),
            };
            Self::navigate(request, model, caps);
            return;
        }
        match model.current_route() {
            Some(route) => Self::mount(route, model, caps),
            None => debug!("nothing mounted, reload ignored"),
        }
    }

    fn on_index(
        model: &mut Model,
        result: crux_http::Result<crux_http::Response<crate::capabilities::IndexPage>>,
        caps: &Capabilities,
    ) -> bool {
        let token = model.token;
        let Some(browse) = model.browse_mut() else {
            return false;
        };
        if browse.status != LoadStatus::Loading || browse.assembly.is_some() {
            warn!("unexpected index response, ignoring");
            return false;
        }

        let page = match fetcher::index_result(result, FetchStage::Index) {
            Ok(page) => page,
            Err(error) => {
                warn!(error = %error, "index fetch failed");
                browse.status = LoadStatus::Failed(error);
                return true;
            }
        };

        let summaries = fetcher::summarize(page, browse.view.fetch_limit);
        let assembly = CollectionAssembly::new(&summaries);
        info!(entries = summaries.len(), "index received");

        if summaries.is_empty() {
            Self::finish_assembly(browse, assembly.progress());
            return true;
        }

        RecordFetcher::new(&caps.http, &browse.endpoints, token).fetch_records(&summaries);
        browse.assembly = Some(assembly);
        false
    }

    fn on_record(
        model: &mut Model,
        position: u32,
        result: crux_http::Result<crux_http::Response<Vec<u8>>>,
    ) -> bool {
        let Some(browse) = model.browse_mut() else {
            return false;
        };
        let Some(assembly) = browse.assembly.as_mut() else {
            debug!(position, "no collection being assembled, discarding record");
            return false;
        };

        let progress = assembly.accept(position, fetcher::record_result(position, result));
        Self::finish_assembly(browse, progress)
    }

    /// Applies a finished assembly to the screen. Returns whether anything
    /// visible changed.
    fn finish_assembly(browse: &mut BrowseScreen, progress: AssemblyProgress) -> bool {
        match progress {
            AssemblyProgress::Pending { .. } => false,
            AssemblyProgress::Complete(collection) => {
                info!(view = %browse.kind, records = collection.len(), "collection loaded");
                browse.assembly = None;
                browse.store.set_collection(collection);
                browse.status = LoadStatus::Ready;
                true
            }
            AssemblyProgress::Failed(error) => {
                warn!(view = %browse.kind, error = %error, "collection load failed");
                browse.assembly = None;
                browse.status = LoadStatus::Failed(error);
                true
            }
        }
    }

    fn on_category_kinds(
        model: &mut Model,
        result: crux_http::Result<crux_http::Response<crate::capabilities::IndexPage>>,
    ) -> bool {
        let choices: Vec<String> = match fetcher::index_result(result, FetchStage::CategoryKinds) {
            Ok(page) => page
                .results
                .into_iter()
                .map(|kind| kind.name)
                .filter(|name| !model.config.is_excluded_category(name))
                .collect(),
            Err(error) => {
                warn!(error = %error, "category kinds unavailable, offering known kinds");
                CategoryKind::ALL
                    .iter()
                    .map(|kind| kind.as_str().to_string())
                    .collect()
            }
        };

        match model.browse_mut() {
            Some(browse) => {
                debug!(count = choices.len(), "category choices updated");
                browse.category_choices = choices;
                true
            }
            None => false,
        }
    }

    fn on_detail(
        model: &mut Model,
        id: RecordId,
        result: crux_http::Result<crux_http::Response<Vec<u8>>>,
    ) -> bool {
        let Some(detail) = model.detail_mut() else {
            return false;
        };
        if detail.navigator.target() != id {
            warn!(%id, target = %detail.navigator.target(), "detail response for another record");
            return false;
        }

        match fetcher::detail_result(id, result) {
            Ok(record) => {
                debug!(%id, "detail record loaded");
                detail.record = Some(Arc::new(record));
                detail.status = LoadStatus::Ready;
            }
            Err(error) => {
                warn!(%id, error = %error, "detail fetch failed");
                detail.record = None;
                detail.status = LoadStatus::Failed(error);
            }
        }
        true
    }

    /// Follows the carried sequence one record in the direction `hop` picks.
    fn step(
        model: &mut Model,
        caps: &Capabilities,
        event: &'static str,
        hop: fn(&DetailNavigator) -> Option<NavigationRequest>,
    ) -> bool {
        let request = match &model.screen {
            Screen::Detail(detail) => hop(&detail.navigator),
            _ => None,
        };
        match request {
            Some(request) => {
                Self::navigate(request, model, caps);
                true
            }
            None => {
                debug!(event, "no neighbouring record");
                false
            }
        }
    }

    /// Runs `edit` against the mounted browse view when `enabled` allows it.
    fn with_browse(
        model: &mut Model,
        event: &'static str,
        enabled: impl FnOnce(&ViewConfig) -> bool,
        edit: impl FnOnce(&mut CollectionStore),
    ) -> bool {
        let Some(browse) = model.browse_mut() else {
            warn!(event, "no browse view mounted");
            return false;
        };
        if !enabled(&browse.view) {
            warn!(event, view = %browse.kind, "control not enabled for this view");
            return false;
        }
        edit(&mut browse.store);
        true
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            info!(event = event_name, "handling event");
        } else {
            debug!(event = event_name, "handling event");
        }

        let changed = match event {
            Event::Configure(config) => match config.validate() {
                Ok(()) => {
                    info!(base_url = %config.api_base_url, "configuration applied");
                    model.config = config;
                    false
                }
                Err(error) => {
                    warn!(error = %error, "rejected configuration, keeping previous");
                    false
                }
            },

            Event::Mount(route) => {
                Self::mount(route, model, caps);
                true
            }

            Event::Unmount => {
                model.token = model.token.next();
                model.screen = Screen::Idle;
                true
            }

            Event::Reload => {
                Self::reload(model, caps);
                true
            }

            Event::SearchChanged(query) => Self::with_browse(
                model,
                event_name,
                |view| view.filters.name_search,
                |store| store.update_filter(|f| f.name_query = query),
            ),

            Event::SortKeyChanged(key) => Self::with_browse(
                model,
                event_name,
                |view| view.filters.sort,
                |store| store.set_sort(SortState::new(key, store.sort().direction)),
            ),

            Event::SortDirectionChanged(direction) => Self::with_browse(
                model,
                event_name,
                |view| view.filters.sort,
                |store| store.set_sort(SortState::new(store.sort().key, direction)),
            ),

            Event::CategoryToggled(name) => Self::with_browse(
                model,
                event_name,
                |view| view.filters.category,
                |store| {
                    store.update_filter(|f| {
                        f.toggle_category(&name);
                    });
                },
            ),

            Event::GenerationSelected(key) => {
                let range = match key.as_deref() {
                    None => Some(None),
                    Some(key) => filter::generation(key).map(|g| Some(g.range)),
                };
                match range {
                    Some(range) => Self::with_browse(
                        model,
                        event_name,
                        |view| view.filters.generation,
                        |store| store.update_filter(|f| f.generation = range),
                    ),
                    None => {
                        warn!(key = ?key, "unknown generation, ignoring");
                        false
                    }
                }
            }

            Event::PageSelected(page) => {
                Self::with_browse(model, event_name, |_| true, |store| store.set_page(page))
            }

            Event::NextPage => Self::with_browse(model, event_name, |_| true, CollectionStore::next_page),

            Event::PreviousPage => {
                Self::with_browse(model, event_name, |_| true, CollectionStore::prev_page)
            }

            Event::RecordSelected { id } => match &model.screen {
                Screen::Browse(browse) => {
                    let context = browse.store.derived().clone();
                    Self::navigate(NavigationRequest::with_context(id, context), model, caps);
                    true
                }
                _ => {
                    warn!(%id, "record selected outside a browse view");
                    false
                }
            },

            Event::PreviousRecord => {
                Self::step(model, caps, event_name, DetailNavigator::previous)
            }

            Event::NextRecord => Self::step(model, caps, event_name, DetailNavigator::next),

            Event::IndexFetched { token, result } => {
                model.accepts(token, event_name) && Self::on_index(model, result, caps)
            }

            Event::RecordFetched {
                token,
                position,
                result,
            } => model.accepts(token, event_name) && Self::on_record(model, position, result),

            Event::CategoryKindsFetched { token, result } => {
                model.accepts(token, event_name) && Self::on_category_kinds(model, result)
            }

            Event::DetailFetched { token, id, result } => {
                model.accepts(token, event_name) && Self::on_detail(model, id, result)
            }
        };

        if changed {
            caps.render.render();
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let screen = match &model.screen {
            Screen::Idle => ScreenView::Idle,
            Screen::Unavailable { error, .. } => ScreenView::failed(error),
            Screen::Browse(browse) => match &browse.status {
                LoadStatus::Loading => ScreenView::Loading {
                    message: browse.kind.loading_message().to_string(),
                },
                LoadStatus::Failed(error) => ScreenView::failed(error),
                LoadStatus::Ready => ScreenView::Browse(browse.to_view()),
            },
            Screen::Detail(detail) => match (&detail.status, &detail.record) {
                (LoadStatus::Failed(error), _) => ScreenView::failed(error),
                (LoadStatus::Ready, Some(record)) => ScreenView::Detail(DetailView {
                    record: RecordDetail::from(&**record),
                    has_previous: detail.navigator.has_previous(),
                    has_next: detail.navigator.has_next(),
                }),
                _ => ScreenView::Loading {
                    message: DETAIL_LOADING_MESSAGE.to_string(),
                },
            },
        };
        ViewModel { screen }
    }
}
