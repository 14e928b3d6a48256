//! Terminal catalog browser.
//!
//! [`CatalogApp`] is a bubbletea-rs model on top of the
//! [`ViewState`](crate::viewmodel::ViewState) view model. Key presses become
//! view-model actions; whenever the resulting state needs data, a fetch runs
//! as a command and comes back as a [`PageLoadedMsg`] tagged with its
//! request sequence number.
//!
//! ## Modes
//!
//! - **Browse**: page and row navigation, `/` to search, `enter` for details,
//!   `tab`/`shift+tab` to switch collection.
//! - **Search**: typed characters edit the query; results update per key.
//! - **Detail**: one Pokemon in tabs; `tab`/`←`/`→` switch tabs, `esc`
//!   returns to the list.
//!
//! ## Switching collections
//!
//! Sources come from a [`SourceFactory`], one set per collection, cached
//! once built. Switching starts from a fresh view model. Every page
//! response carries the generation it was requested in; responses for an
//! earlier generation are dropped, since the new view model reuses
//! sequence numbers.
//!
//! ## Launch settings
//!
//! `Model::init` takes no arguments, so the binary hands over the
//! configuration and source factory through [`configure`] before starting
//! the program. Without it the app falls back to the default configuration.

mod keys;
mod render;
pub mod style;

pub use keys::AppKeyMap;
pub use style::AppStyles;

use std::collections::HashMap;
use std::sync::Arc;

use bubbletea_rs::{Cmd, KeyMsg, Model as BubbleTeaModel, Msg, WindowSizeMsg};
use crossterm::event::{KeyCode, KeyModifiers};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::catalog::{Item, PokemonDetail, PokemonSpecies, ResourceKind};
use crate::config::{Config, SourceFactory, Sources};
use crate::help;
use crate::key::{self, KeyMap};
use crate::paginator::{self, PageAction};
use crate::source::Page;
use crate::viewmodel::{Action, AdapterFailure, ViewState};

static LAUNCH: OnceCell<Launch> = OnceCell::new();

/// What [`CatalogApp::init`](BubbleTeaModel::init) starts with.
#[derive(Clone)]
pub struct Launch {
    /// Effective configuration.
    pub config: Config,
    /// Builds the sources for each collection.
    pub factory: Arc<dyn SourceFactory>,
}

/// Stores the launch settings for the next `init`. Returns the value back if
/// settings were already stored.
pub fn configure(launch: Launch) -> Result<(), Launch> {
    LAUNCH.set(launch)
}

/// A page fetch finished.
#[derive(Debug)]
pub struct PageLoadedMsg {
    /// Collection generation the request was made in.
    pub generation: u64,
    /// Sequence number of the request.
    pub seq: u64,
    /// The page, or why it could not be fetched.
    pub result: Result<Page, AdapterFailure>,
}

/// A detail fetch finished.
#[derive(Debug)]
pub struct DetailLoadedMsg {
    /// Sequence number of the request.
    pub seq: u64,
    /// The detail, or why it could not be fetched.
    pub result: Result<PokemonDetail, AdapterFailure>,
}

/// A species fetch finished. Shares the sequence number of the detail
/// fetch that triggered it.
#[derive(Debug)]
pub struct SpeciesLoadedMsg {
    /// Sequence number of the detail request.
    pub seq: u64,
    /// The species, or why it could not be fetched.
    pub result: Result<PokemonSpecies, AdapterFailure>,
}

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Paged list.
    #[default]
    Browse,
    /// Editing the query.
    Search,
    /// One entry.
    Detail,
}

/// State of the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    /// Waiting for the entry named here.
    Loading(String),
    /// Loaded.
    Loaded(Box<PokemonDetail>),
    /// The fetch failed.
    Failed(String),
}

/// Tabs of the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    /// Base stats with bars.
    #[default]
    Stats,
    /// Current abilities.
    Abilities,
    /// Learnable moves.
    Moves,
    /// Forms, items, games, cries and species facts.
    More,
    /// Types in earlier generations.
    PastTypes,
    /// Abilities in earlier generations.
    PastAbilities,
}

impl DetailTab {
    /// Tabs shown for `detail`; the history tabs only when there is history.
    pub fn available(detail: &PokemonDetail) -> Vec<DetailTab> {
        let mut tabs = vec![
            DetailTab::Stats,
            DetailTab::Abilities,
            DetailTab::Moves,
            DetailTab::More,
        ];
        if !detail.past_types.is_empty() {
            tabs.push(DetailTab::PastTypes);
        }
        if !detail.past_abilities.is_empty() {
            tabs.push(DetailTab::PastAbilities);
        }
        tabs
    }

    /// Tab label.
    pub fn title(self) -> &'static str {
        match self {
            DetailTab::Stats => "Stats",
            DetailTab::Abilities => "Abilities",
            DetailTab::Moves => "Moves",
            DetailTab::More => "More",
            DetailTab::PastTypes => "Type history",
            DetailTab::PastAbilities => "Ability history",
        }
    }
}

/// The catalog browser model.
pub struct CatalogApp {
    pub(crate) config: Config,
    pub(crate) factory: Arc<dyn SourceFactory>,
    pub(crate) cache: HashMap<ResourceKind, Sources>,
    pub(crate) kind: ResourceKind,
    pub(crate) sources: Result<Sources, String>,
    pub(crate) generation: u64,
    pub(crate) state: ViewState,
    pub(crate) mode: Mode,
    pub(crate) selected: usize,
    pub(crate) detail: Option<DetailView>,
    pub(crate) species: Option<PokemonSpecies>,
    pub(crate) tab: DetailTab,
    pub(crate) detail_seq: u64,
    pub(crate) keys: AppKeyMap,
    pub(crate) help: help::Model,
    pub(crate) paginator: paginator::Model,
    pub(crate) styles: AppStyles,
    pub(crate) width: usize,
}

impl CatalogApp {
    /// A browser over the collection `config` names, with sources from
    /// `factory`. Call [`start`](Self::start) for the first fetch.
    pub fn new(config: &Config, factory: Arc<dyn SourceFactory>) -> Self {
        let mut app = Self {
            config: config.clone(),
            factory,
            cache: HashMap::new(),
            kind: config.resource,
            sources: Err("not loaded".to_string()),
            generation: 0,
            state: ViewState::new(config.effective_page_size(), config.paging.unwrap_or_default()),
            mode: Mode::Browse,
            selected: 0,
            detail: None,
            species: None,
            tab: DetailTab::default(),
            detail_seq: 0,
            keys: AppKeyMap::default(),
            help: help::Model::new(),
            paginator: paginator::Model::new()
                .with_type(config.page_strip)
                .with_max_buttons(config.max_page_buttons),
            styles: AppStyles::default(),
            width: 80,
        };
        app.load_kind(config.resource);
        app
    }

    /// Issues the first fetch.
    pub fn start(&mut self) -> Option<Cmd> {
        self.fetch()
    }

    /// The view model state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The collection being browsed.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Row index of the selection on the current page.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The detail screen state, when one was opened.
    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Species of the open detail, once loaded.
    pub fn species(&self) -> Option<&PokemonSpecies> {
        self.species.as_ref()
    }

    /// The active detail tab.
    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    /// Applies a view-model action and fetches what the new state needs.
    pub fn apply(&mut self, action: Action) -> Option<Cmd> {
        let before = self.state.pagination_summary().current_page;
        self.state = self.state.dispatch(action);
        if self.state.pagination_summary().current_page != before {
            self.selected = 0;
        }
        self.clamp_selection();
        self.fetch()
    }

    /// Browses `kind` from a fresh view model and fetches its first page.
    pub fn switch_resource(&mut self, kind: ResourceKind) -> Option<Cmd> {
        self.load_kind(kind);
        self.fetch()
    }

    fn load_kind(&mut self, kind: ResourceKind) {
        let sources = match self.cache.get(&kind) {
            Some(sources) => Ok(sources.clone()),
            None => match self.factory.sources(kind) {
                Ok(sources) => {
                    self.cache.insert(kind, sources.clone());
                    Ok(sources)
                }
                Err(err) => {
                    error!(%err, resource = %kind, "no data source available");
                    Err(err.to_string())
                }
            },
        };
        let paging = match &sources {
            Ok(sources) => self.config.effective_paging(sources.list.as_ref()),
            Err(_) => self.config.paging.unwrap_or_default(),
        };
        let page_size = self.config.page_size_for(kind);

        self.state = ViewState::new(page_size, paging)
            .with_match_mode(self.config.match_mode)
            .with_bulk_limit(self.config.bulk_limit)
            .with_max_buttons(self.config.max_page_buttons);
        self.kind = kind;
        self.sources = sources;
        self.generation += 1;
        self.mode = Mode::Browse;
        self.selected = 0;
        self.close_detail();
        // In-flight detail responses belong to the previous collection.
        self.detail_seq += 1;
        info!(
            source = self.sources.as_ref().map(|s| s.list.name()).unwrap_or("none"),
            resource = %kind,
            ?paging,
            page_size,
            generation = self.generation,
            "browsing collection"
        );
    }

    fn fetch(&mut self) -> Option<Cmd> {
        let (next, request) = self.state.begin_fetch()?;
        self.state = next;
        let sources = match &self.sources {
            Ok(sources) => sources.clone(),
            Err(reason) => {
                let failure = AdapterFailure::new(reason.clone());
                self.state = self.state.receive(request.seq, Err(failure));
                return None;
            }
        };
        let generation = self.generation;
        debug!(seq = request.seq, generation, source = sources.list.name(), "dispatching page fetch");
        Some(Box::pin(async move {
            let result = sources
                .list
                .fetch_page(request.offset, request.limit, request.query.as_deref())
                .await
                .map_err(AdapterFailure::from);
            Some(Box::new(PageLoadedMsg {
                generation,
                seq: request.seq,
                result,
            }) as Msg)
        }))
    }

    fn open_selected(&mut self) -> Option<Cmd> {
        if !self.kind.has_detail() {
            return None;
        }
        let item: Item = self.state.visible_items().get(self.selected)?.clone();
        let sources = self.sources.as_ref().ok()?.clone();

        self.detail_seq += 1;
        let seq = self.detail_seq;
        self.mode = Mode::Detail;
        self.close_detail();
        self.detail = Some(DetailView::Loading(item.name.clone()));
        debug!(seq, id = %item.id, "dispatching detail fetch");
        Some(Box::pin(async move {
            let result = sources
                .detail
                .fetch_detail(&item.id)
                .await
                .map_err(AdapterFailure::from);
            Some(Box::new(DetailLoadedMsg { seq, result }) as Msg)
        }))
    }

    fn close_detail(&mut self) {
        self.detail = None;
        self.species = None;
        self.tab = DetailTab::default();
    }

    fn fetch_species(&self, detail: &PokemonDetail) -> Option<Cmd> {
        let key = detail.species_key()?;
        let sources = self.sources.as_ref().ok()?.clone();
        let seq = self.detail_seq;
        debug!(seq, species = %key, "dispatching species fetch");
        Some(Box::pin(async move {
            let result = sources
                .detail
                .fetch_species(&key)
                .await
                .map_err(AdapterFailure::from);
            Some(Box::new(SpeciesLoadedMsg { seq, result }) as Msg)
        }))
    }

    fn on_page_loaded(&mut self, msg: PageLoadedMsg) -> Option<Cmd> {
        if msg.generation != self.generation {
            debug!(
                generation = msg.generation,
                current = self.generation,
                "page for a previous collection discarded"
            );
            return None;
        }
        self.state = self.state.receive(msg.seq, msg.result);
        self.clamp_selection();
        self.fetch()
    }

    fn on_detail_loaded(&mut self, msg: DetailLoadedMsg) -> Option<Cmd> {
        if msg.seq != self.detail_seq || self.mode != Mode::Detail {
            debug!(seq = msg.seq, latest = self.detail_seq, "stale detail discarded");
            return None;
        }
        match msg.result {
            Ok(detail) => {
                let cmd = self.fetch_species(&detail);
                self.detail = Some(DetailView::Loaded(Box::new(detail)));
                cmd
            }
            Err(failure) => {
                self.detail = Some(DetailView::Failed(failure.message));
                None
            }
        }
    }

    fn on_species_loaded(&mut self, msg: SpeciesLoadedMsg) -> Option<Cmd> {
        if msg.seq != self.detail_seq || self.mode != Mode::Detail {
            debug!(seq = msg.seq, latest = self.detail_seq, "stale species discarded");
            return None;
        }
        match msg.result {
            Ok(species) => self.species = Some(species),
            // The detail stays usable without species data.
            Err(failure) => warn!(message = %failure.message, "species fetch failed"),
        }
        None
    }

    fn clamp_selection(&mut self) {
        let rows = self.state.visible_items().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    fn cycle_tab(&mut self, forward: bool) {
        let Some(DetailView::Loaded(detail)) = &self.detail else {
            return;
        };
        let tabs = DetailTab::available(detail);
        let current = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        let next = if forward {
            (current + 1) % tabs.len()
        } else {
            (current + tabs.len() - 1) % tabs.len()
        };
        self.tab = tabs[next];
    }

    fn handle_browse_key(&mut self, msg: &KeyMsg) -> Option<Cmd> {
        if let Some(action) = self.paginator.action_for(msg) {
            let summary = self.state.pagination_summary();
            let page = match action {
                PageAction::Previous => return self.apply(Action::PreviousPage),
                PageAction::Next => return self.apply(Action::NextPage),
                PageAction::First => 1,
                PageAction::Last => summary.total_pages,
                PageAction::Button(n) => self.paginator.button_page(&summary, n)?,
            };
            return self.apply(Action::GoToPage(page as i64));
        }

        if self.keys.quit.matches(msg) {
            return Some(bubbletea_rs::quit());
        }
        if self.keys.cursor_up.matches(msg) {
            self.selected = self.selected.saturating_sub(1);
        } else if self.keys.cursor_down.matches(msg) {
            self.selected += 1;
            self.clamp_selection();
        } else if self.keys.open.matches(msg) {
            return self.open_selected();
        } else if self.keys.next_collection.matches(msg) {
            return self.switch_resource(self.kind.next());
        } else if self.keys.prev_collection.matches(msg) {
            return self.switch_resource(self.kind.previous());
        } else if self.keys.search.matches(msg) {
            self.mode = Mode::Search;
        } else if self.keys.clear_search.matches(msg) {
            if self.state.search().is_active() {
                return self.apply(Action::SetQuery(String::new()));
            }
        } else if self.keys.retry.matches(msg) {
            return self.apply(Action::Retry);
        } else if self.keys.toggle_help.matches(msg) {
            self.help.show_all = !self.help.show_all;
        }
        None
    }

    fn handle_search_key(&mut self, msg: &KeyMsg) -> Option<Cmd> {
        if self.keys.accept_search.matches(msg) {
            self.mode = Mode::Browse;
            return None;
        }
        let mut query = self.state.search().query().to_string();
        match msg.key {
            KeyCode::Backspace => {
                query.pop()?;
            }
            KeyCode::Char(c)
                if !msg
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                query.push(c);
            }
            _ => return None,
        }
        self.selected = 0;
        self.apply(Action::SetQuery(query))
    }

    fn handle_detail_key(&mut self, msg: &KeyMsg) -> Option<Cmd> {
        if self.keys.back.matches(msg) {
            self.mode = Mode::Browse;
            self.close_detail();
        } else if self.keys.next_tab.matches(msg) {
            self.cycle_tab(true);
        } else if self.keys.prev_tab.matches(msg) {
            self.cycle_tab(false);
        } else if self.keys.quit.matches(msg) {
            return Some(bubbletea_rs::quit());
        }
        None
    }
}

impl KeyMap for CatalogApp {
    fn short_help(&self) -> Vec<&key::Binding> {
        match self.mode {
            Mode::Browse => {
                let mut bindings = vec![
                    &self.paginator.keymap.prev_page,
                    &self.paginator.keymap.next_page,
                    &self.keys.search,
                ];
                if self.kind.has_detail() {
                    bindings.push(&self.keys.open);
                }
                bindings.push(&self.keys.next_collection);
                if self.state.error().is_some() {
                    bindings.push(&self.keys.retry);
                }
                bindings.extend([&self.keys.toggle_help, &self.keys.quit]);
                bindings
            }
            Mode::Search => vec![&self.keys.accept_search, &self.keys.force_quit],
            Mode::Detail => vec![
                &self.keys.next_tab,
                &self.keys.prev_tab,
                &self.keys.back,
                &self.keys.quit,
            ],
        }
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![
                &self.paginator.keymap.prev_page,
                &self.paginator.keymap.next_page,
                &self.paginator.keymap.first_page,
                &self.paginator.keymap.last_page,
            ],
            vec![&self.keys.cursor_up, &self.keys.cursor_down, &self.keys.open],
            vec![&self.keys.next_collection, &self.keys.prev_collection],
            vec![&self.keys.search, &self.keys.clear_search, &self.keys.retry],
            vec![&self.keys.toggle_help, &self.keys.quit, &self.keys.force_quit],
        ]
    }
}

impl BubbleTeaModel for CatalogApp {
    fn init() -> (Self, Option<Cmd>) {
        let mut app = match LAUNCH.get() {
            Some(launch) => Self::new(&launch.config, launch.factory.clone()),
            None => {
                let config = Config::default();
                Self::new(&config, Arc::new(config.clone()))
            }
        };
        let cmd = app.start();
        (app, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let msg = match msg.downcast::<PageLoadedMsg>() {
            Ok(loaded) => return self.on_page_loaded(*loaded),
            Err(msg) => msg,
        };
        let msg = match msg.downcast::<DetailLoadedMsg>() {
            Ok(loaded) => return self.on_detail_loaded(*loaded),
            Err(msg) => msg,
        };
        let msg = match msg.downcast::<SpeciesLoadedMsg>() {
            Ok(loaded) => return self.on_species_loaded(*loaded),
            Err(msg) => msg,
        };
        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.width = size.width as usize;
            self.help.width = self.width;
            return None;
        }
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keys.force_quit.matches(key_msg) {
                return Some(bubbletea_rs::quit());
            }
            return match self.mode {
                Mode::Browse => self.handle_browse_key(key_msg),
                Mode::Search => self.handle_search_key(key_msg),
                Mode::Detail => self.handle_detail_key(key_msg),
            };
        }
        None
    }

    fn view(&self) -> String {
        match self.mode {
            Mode::Detail => self.view_detail(),
            Mode::Browse | Mode::Search => self.view_list(),
        }
    }
}

#[cfg(test)]
mod tests;
