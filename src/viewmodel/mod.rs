//! Search/pagination view model.
//!
//! [`ViewState`] is an immutable value. Every transition (`dispatch`,
//! `set_query`, `next_page`, ...) returns a new state and leaves the old one
//! untouched, so the presentation layer can hold on to a state while a fetch
//! for the next one is in flight.
//!
//! Two collection modes are supported (see [`Paging`]):
//!
//! - **client-held**: the whole collection is fetched once, then filtered
//!   and sliced locally;
//! - **server-paged**: every window or query change becomes a request and
//!   the returned page is displayed as is.
//!
//! Fetching is driven from outside. [`ViewState::begin_fetch`] says whether
//! the state needs data and hands out a [`PageRequest`] tagged with a
//! sequence number; [`ViewState::receive`] accepts the result only if it
//! carries the latest sequence number. Older responses are dropped, so a
//! slow reply for `"cha"` can never overwrite the results for `"char"`.
//!
//! # Examples
//!
//! ```rust
//! use pokemonster::catalog::Item;
//! use pokemonster::source::{Page, Paging};
//! use pokemonster::viewmodel::{Action, ViewState};
//!
//! let state = ViewState::new(20, Paging::ClientHeld);
//! let (state, request) = state.begin_fetch().expect("nothing loaded yet");
//!
//! let items: Vec<Item> = (1..=34).map(|i| Item::new(i, format!("mon-{i}"), "")).collect();
//! let state = state.receive(request.seq, Ok(Page::from_slice(&items, 0, items.len())));
//!
//! let props = state.props();
//! assert_eq!(props.total_pages, 2);
//! assert!(props.has_next);
//!
//! let state = state.dispatch(Action::NextPage);
//! assert_eq!(state.props().visible_items.len(), 14);
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::Item;
use crate::error::AdapterError;
use crate::paginator::{PageWindow, PaginationSummary, DEFAULT_MAX_BUTTONS};
use crate::search::{filter_items, MatchMode, SearchState};
use crate::source::{Page, Paging};


/// Default `limit` for the one-off bulk load of a client-held collection.
pub const DEFAULT_BULK_LIMIT: usize = 100_000;

/// A failed fetch, as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterFailure {
    /// Human readable message.
    pub message: String,
}

impl AdapterFailure {
    /// A failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&AdapterError> for AdapterFailure {
    fn from(err: &AdapterError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<AdapterError> for AdapterFailure {
    fn from(err: AdapterError) -> Self {
        Self::from(&err)
    }
}

/// User intents the presentation layer can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the query, verbatim.
    SetQuery(String),
    /// Go forward one page.
    NextPage,
    /// Go back one page.
    PreviousPage,
    /// Jump to a 1-based page; out-of-range values are clamped.
    GoToPage(i64),
    /// Forget a failed fetch so it is issued again.
    Retry,
}

/// Progress of the data behind the current state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request failed.
    Failed(AdapterFailure),
}

/// A fetch the caller should run against its data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Sequence number to pass back to [`ViewState::receive`].
    pub seq: u64,
    /// Offset argument for the source.
    pub offset: usize,
    /// Limit argument for the source.
    pub limit: usize,
    /// Query argument for the source.
    pub query: Option<String>,
}

// What a set of loaded items answers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DataKey {
    Collection,
    Page {
        offset: usize,
        limit: usize,
        query: Option<String>,
    },
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Props {
    /// Items on the current page.
    pub visible_items: Vec<Item>,
    /// Matched character positions, parallel to `visible_items`.
    pub visible_matches: Vec<Vec<usize>>,
    /// 1-based current page.
    pub current_page: usize,
    /// Number of pages; 0 when there are no results.
    pub total_pages: usize,
    /// Whether `NextPage` would move.
    pub has_next: bool,
    /// Whether `PreviousPage` would move.
    pub has_previous: bool,
    /// Page buttons to draw.
    pub visible_page_numbers: Vec<usize>,
    /// The raw query.
    pub query: String,
    /// Number of results across all pages.
    pub total_count: usize,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the latest failed fetch.
    pub error: Option<String>,
    /// `Showing a - b of n`.
    pub range_label: String,
}

/// The view model state. Cheap to clone: the loaded items are shared.
#[derive(Debug, Clone)]
pub struct ViewState {
    items: Arc<[Item]>,
    loaded: Option<DataKey>,
    page_total: usize,
    page_has_next: bool,
    search: SearchState,
    window: PageWindow,
    paging: Paging,
    status: LoadStatus,
    pending: Option<DataKey>,
    latest_seq: u64,
    bulk_limit: usize,
    max_buttons: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(20, Paging::default())
    }
}

impl ViewState {
    /// An empty state showing `page_size` items per page.
    pub fn new(page_size: usize, paging: Paging) -> Self {
        Self {
            items: Arc::from(Vec::new()),
            loaded: None,
            page_total: 0,
            page_has_next: false,
            search: SearchState::default(),
            window: PageWindow::new(page_size),
            paging,
            status: LoadStatus::Idle,
            pending: None,
            latest_seq: 0,
            bulk_limit: DEFAULT_BULK_LIMIT,
            max_buttons: DEFAULT_MAX_BUTTONS,
        }
    }

    /// A state already holding a client-side collection. Nothing needs to be
    /// fetched.
    pub fn with_items(items: impl Into<Arc<[Item]>>, page_size: usize) -> Self {
        Self {
            items: items.into(),
            loaded: Some(DataKey::Collection),
            ..Self::new(page_size, Paging::ClientHeld)
        }
    }

    /// Sets the match mode, keeping the query.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.search = SearchState::new(mode).with_query(self.search.query());
        self
    }

    /// Sets the bulk load limit for client-held collections.
    pub fn with_bulk_limit(mut self, limit: usize) -> Self {
        self.bulk_limit = limit.max(1);
        self
    }

    /// Sets how many page buttons are shown.
    pub fn with_max_buttons(mut self, max_buttons: usize) -> Self {
        self.max_buttons = max_buttons;
        self
    }

    /// Applies one action.
    pub fn dispatch(&self, action: Action) -> Self {
        match action {
            Action::SetQuery(query) => self.set_query(query),
            Action::NextPage => self.next_page(),
            Action::PreviousPage => self.previous_page(),
            Action::GoToPage(page) => self.go_to_page(page),
            Action::Retry => self.retry(),
        }
    }

    /// Replaces the query and returns to the first page.
    pub fn set_query(&self, query: impl Into<String>) -> Self {
        Self {
            search: self.search.with_query(query),
            window: self.window.first(),
            ..self.clone()
        }
    }

    /// One page forward when there is a next page.
    pub fn next_page(&self) -> Self {
        if !self.has_next() {
            return self.clone();
        }
        Self {
            window: self.window.next(true),
            ..self.clone()
        }
    }

    /// One page back when there is a previous page.
    pub fn previous_page(&self) -> Self {
        Self {
            window: self.window.previous(),
            ..self.clone()
        }
    }

    /// Jumps to 1-based `page`, clamped to the existing pages.
    pub fn go_to_page(&self, page: i64) -> Self {
        Self {
            window: self.effective_window().go_to_page(page),
            ..self.clone()
        }
    }

    /// Forgets a failed request so [`begin_fetch`](Self::begin_fetch) issues
    /// it again. A no-op unless the state has failed.
    pub fn retry(&self) -> Self {
        match self.status {
            LoadStatus::Failed(_) => Self {
                status: LoadStatus::Idle,
                pending: None,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// The active search.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// The paging mode.
    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// Load progress.
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.status, LoadStatus::Loading)
    }

    /// The latest failure, if the latest fetch failed.
    pub fn error(&self) -> Option<&AdapterFailure> {
        match &self.status {
            LoadStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Items on the current page. Calling it twice yields the same items.
    pub fn visible_items(&self) -> Vec<Item> {
        self.visible().into_iter().map(|(item, _)| item).collect()
    }

    /// Items on the current page with matched character positions.
    pub fn visible_matches(&self) -> Vec<(Item, Vec<usize>)> {
        self.visible()
    }

    /// Number of results across all pages for the active search.
    pub fn total_count(&self) -> usize {
        match self.paging {
            Paging::ClientHeld => {
                if self.search.is_active() {
                    filter_items(&self.items, &self.search).len()
                } else {
                    self.items.len()
                }
            }
            Paging::ServerPaged => self.page_total,
        }
    }

    /// Derived page metadata.
    pub fn pagination_summary(&self) -> PaginationSummary {
        let window = self.effective_window();
        window.summary(self.has_next_in(&window))
    }

    /// Page buttons around the current page.
    pub fn visible_page_numbers(&self) -> Vec<usize> {
        self.pagination_summary()
            .visible_page_numbers(self.max_buttons)
    }

    /// `Showing a - b of n` for the current page.
    pub fn range_label(&self) -> String {
        self.effective_window().range_label()
    }

    /// Everything the presentation layer needs, in one value. The collection
    /// is filtered once per call.
    pub fn props(&self) -> Props {
        let (window, visible) = self.snapshot();
        let summary = window.summary(self.has_next_in(&window));
        let (visible_items, visible_matches) = visible.into_iter().unzip();
        Props {
            visible_items,
            visible_matches,
            current_page: summary.current_page,
            total_pages: summary.total_pages,
            has_next: summary.has_next,
            has_previous: summary.has_previous,
            visible_page_numbers: summary.visible_page_numbers(self.max_buttons),
            query: self.search.query().to_string(),
            total_count: window.total_count(),
            loading: self.is_loading(),
            error: self.error().map(|f| f.message.clone()),
            range_label: window.range_label(),
        }
    }

    /// Starts a fetch when the loaded data does not answer the current
    /// window and query.
    ///
    /// Returns `None` when the data is current, when the same request is
    /// already in flight, or when it has failed and was not retried.
    pub fn begin_fetch(&self) -> Option<(Self, PageRequest)> {
        let wanted = self.wanted_key();
        if self.loaded.as_ref() == Some(&wanted) {
            return None;
        }
        if self.pending.as_ref() == Some(&wanted)
            && matches!(self.status, LoadStatus::Loading | LoadStatus::Failed(_))
        {
            return None;
        }

        let seq = self.latest_seq + 1;
        let request = match &wanted {
            DataKey::Collection => PageRequest {
                seq,
                offset: 0,
                limit: self.bulk_limit,
                query: None,
            },
            DataKey::Page {
                offset,
                limit,
                query,
            } => PageRequest {
                seq,
                offset: *offset,
                limit: *limit,
                query: query.clone(),
            },
        };
        debug!(
            seq,
            offset = request.offset,
            limit = request.limit,
            query = request.query.as_deref().unwrap_or(""),
            "fetch issued"
        );
        let next = Self {
            status: LoadStatus::Loading,
            pending: Some(wanted),
            latest_seq: seq,
            ..self.clone()
        };
        Some((next, request))
    }

    /// Applies the result of request `seq`. Results of any request other
    /// than the latest one are discarded.
    pub fn receive(&self, seq: u64, result: Result<Page, AdapterFailure>) -> Self {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "stale response discarded");
            return self.clone();
        }
        match result {
            Ok(page) => Self {
                items: Arc::from(page.items),
                loaded: self.pending.clone(),
                page_total: page.total_count,
                page_has_next: page.has_next,
                status: LoadStatus::Idle,
                ..self.clone()
            },
            Err(failure) => {
                warn!(seq, error = %failure.message, "adapter failure");
                Self {
                    status: LoadStatus::Failed(failure),
                    ..self.clone()
                }
            }
        }
    }

    fn wanted_key(&self) -> DataKey {
        match self.paging {
            Paging::ClientHeld => DataKey::Collection,
            Paging::ServerPaged => DataKey::Page {
                offset: self.window.offset(),
                limit: self.window.page_size(),
                query: self.search.as_filter().map(str::to_string),
            },
        }
    }

    fn page_is_current(&self) -> bool {
        self.loaded.as_ref() == Some(&self.wanted_key())
    }

    fn effective_window(&self) -> PageWindow {
        self.window.with_total_count(self.total_count())
    }

    fn has_next(&self) -> bool {
        self.has_next_in(&self.effective_window())
    }

    // `window` must carry the current total count.
    fn has_next_in(&self, window: &PageWindow) -> bool {
        match self.paging {
            Paging::ServerPaged if self.page_is_current() => self.page_has_next,
            _ => window.has_next(),
        }
    }

    fn visible(&self) -> Vec<(Item, Vec<usize>)> {
        self.snapshot().1
    }

    // The window with its total count, plus the visible rows.
    fn snapshot(&self) -> (PageWindow, Vec<(Item, Vec<usize>)>) {
        match self.paging {
            Paging::ClientHeld if self.search.is_active() => {
                let filtered = filter_items(&self.items, &self.search);
                let window = self.window.with_total_count(filtered.len());
                let (start, end) = window.slice_bounds(filtered.len());
                let rows = filtered
                    .into_iter()
                    .skip(start)
                    .take(end - start)
                    .map(|f| (f.item, f.matches))
                    .collect();
                (window, rows)
            }
            Paging::ClientHeld => {
                let window = self.window.with_total_count(self.items.len());
                let (start, end) = window.slice_bounds(self.items.len());
                let rows = self.items[start..end]
                    .iter()
                    .map(|item| (item.clone(), Vec::new()))
                    .collect();
                (window, rows)
            }
            Paging::ServerPaged => {
                // Server pages are shown as delivered; highlights are
                // computed locally and may be empty for server-side matches
                // the local matcher does not reproduce.
                let mut highlights = vec![Vec::new(); self.items.len()];
                if self.search.is_active() {
                    for f in filter_items(&self.items, &self.search) {
                        highlights[f.index] = f.matches;
                    }
                }
                let rows = self.items.iter().cloned().zip(highlights).collect();
                (self.window.with_total_count(self.page_total), rows)
            }
        }
    }
}
