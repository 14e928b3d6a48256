//! Offset-based pagination arithmetic and the page strip renderer.
//!
//! [`PageWindow`] is the paging state: an offset, a page size and the total
//! number of results. It is a small `Copy` value; every navigation method
//! returns a new window instead of mutating in place, and every method is
//! total. Out-of-range input is clamped, never rejected.
//!
//! [`Model`] renders a [`PaginationSummary`] as a page strip and maps key
//! presses to [`PageAction`]s. It does not hold any paging state itself.

use crate::key::{self, KeyMap as KeyMapTrait};
use bubbletea_rs::KeyMsg;
use lipgloss_extras::prelude::*;

/// Number of page buttons shown by default.
pub const DEFAULT_MAX_BUTTONS: usize = 7;

/// Which slice of a result set is displayed.
///
/// # Examples
///
/// ```rust
/// use pokemonster::paginator::PageWindow;
///
/// let window = PageWindow::new(20).with_total_count(34);
/// assert_eq!(window.total_pages(), 2);
/// assert_eq!(window.current_page(), 1);
/// assert!(window.has_next());
/// assert!(!window.has_previous());
///
/// let last = window.go_to_page(999);
/// assert_eq!(last.current_page(), 2);
/// assert_eq!(last.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    offset: usize,
    page_size: usize,
    total_count: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(20)
    }
}

impl PageWindow {
    /// A window on the first page. Page sizes below 1 are clamped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    /// Builds a window from untrusted signed values: negative offsets and
    /// totals become 0, page sizes below 1 become 1.
    pub fn from_signed(offset: i64, page_size: i64, total_count: i64) -> Self {
        Self {
            offset: offset.max(0) as usize,
            page_size: page_size.max(1) as usize,
            total_count: total_count.max(0) as usize,
        }
    }

    /// Sets the total number of results (builder pattern).
    pub fn with_total_count(mut self, total_count: usize) -> Self {
        self.total_count = total_count;
        self
    }

    /// Sets the offset as is (builder pattern). Navigation keeps offsets on
    /// page boundaries; this does not.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Index of the first displayed result.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Results per page, at least 1.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total number of results.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// `ceil(total_count / page_size)`; 0 for an empty result set.
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    /// 1-based page containing `offset`.
    pub fn current_page(&self) -> usize {
        (self.offset / self.page_size).saturating_add(1)
    }

    /// Whether results exist past the current page.
    pub fn has_next(&self) -> bool {
        self.offset.saturating_add(self.page_size) < self.total_count
    }

    /// Whether the window is past the first result.
    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    /// The first page.
    pub fn first(self) -> Self {
        Self { offset: 0, ..self }
    }

    /// Advances one page when `has_next` is true; returns `self` otherwise.
    ///
    /// `has_next` is passed in because server-paged sources decide it, not
    /// the window.
    pub fn next(self, has_next: bool) -> Self {
        if has_next {
            Self {
                offset: self.offset.saturating_add(self.page_size),
                ..self
            }
        } else {
            self
        }
    }

    /// Goes back one page when there is one, floored at offset 0.
    pub fn previous(self) -> Self {
        if self.has_previous() {
            Self {
                offset: self.offset.saturating_sub(self.page_size),
                ..self
            }
        } else {
            self
        }
    }

    /// Jumps to 1-based page `page`, clamped to `1..=total_pages`. With no
    /// pages at all the window returns to the first page.
    pub fn go_to_page(self, page: i64) -> Self {
        let last = i64::try_from(self.total_pages().max(1)).unwrap_or(i64::MAX);
        let page = page.clamp(1, last) as usize;
        Self {
            offset: (page - 1) * self.page_size,
            ..self
        }
    }

    /// Start and end indices of the window within a slice of `len` items.
    /// Both are clamped to `len`, so the result is always a valid range.
    pub fn slice_bounds(&self, len: usize) -> (usize, usize) {
        let start = self.offset.min(len);
        let end = start.saturating_add(self.page_size).min(len);
        (start, end)
    }

    /// `Showing 21 - 34 of 34`, as printed under the page strip.
    pub fn range_label(&self) -> String {
        if self.total_count == 0 {
            return "Showing 0 of 0".to_string();
        }
        let first = self.offset.saturating_add(1).min(self.total_count);
        let last = self.offset.saturating_add(self.page_size).min(self.total_count);
        format!("Showing {} - {} of {}", first, last, self.total_count)
    }

    /// Derived pagination metadata with `has_next` supplied by the caller.
    pub fn summary(&self, has_next: bool) -> PaginationSummary {
        PaginationSummary {
            current_page: self.current_page(),
            total_pages: self.total_pages(),
            has_next,
            has_previous: self.has_previous(),
        }
    }
}

/// Pagination metadata for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationSummary {
    /// 1-based current page.
    pub current_page: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// A next page exists.
    pub has_next: bool,
    /// A previous page exists.
    pub has_previous: bool,
}

impl PaginationSummary {
    /// Page numbers for the page buttons; see [`visible_page_numbers`].
    pub fn visible_page_numbers(&self, max_buttons: usize) -> Vec<usize> {
        visible_page_numbers(self.current_page, self.total_pages, max_buttons)
    }
}

/// A bounded window of page numbers around `current_page`.
///
/// All pages are listed when they fit in `max_buttons`. Otherwise the window
/// is pinned to the start while `current_page` is within `max_buttons / 2`
/// of page 1, pinned to the end while it is within `max_buttons / 2` of the
/// last page, and centered on `current_page` in between.
///
/// ```rust
/// use pokemonster::paginator::visible_page_numbers;
///
/// assert_eq!(visible_page_numbers(10, 20, 7), vec![7, 8, 9, 10, 11, 12, 13]);
/// assert_eq!(visible_page_numbers(19, 20, 7), vec![14, 15, 16, 17, 18, 19, 20]);
/// assert_eq!(visible_page_numbers(2, 3, 7), vec![1, 2, 3]);
/// ```
pub fn visible_page_numbers(current_page: usize, total_pages: usize, max_buttons: usize) -> Vec<usize> {
    if total_pages == 0 || max_buttons == 0 {
        return Vec::new();
    }
    if total_pages <= max_buttons {
        return (1..=total_pages).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let half = max_buttons / 2;
    let start = if current <= half + 1 {
        1
    } else if current.saturating_add(half) >= total_pages {
        total_pages - max_buttons + 1
    } else {
        current - half
    };
    (0..max_buttons).map(|i| start + i).collect()
}

/// A navigation request produced from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    /// Go back one page.
    Previous,
    /// Go forward one page.
    Next,
    /// Jump to page 1.
    First,
    /// Jump to the last page.
    Last,
    /// Jump to the n-th visible page button (1-based).
    Button(usize),
}

/// How the page strip is drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// Page buttons: `‹ 1 2 [3] 4 5 ›`.
    #[default]
    Numbers,
    /// `3/10`.
    Arabic,
    /// One dot per visible page button: `○ ○ ● ○ ○`.
    Dots,
}

/// Key bindings for page navigation.
#[derive(Debug, Clone)]
pub struct PaginatorKeyMap {
    /// Previous page. Default: PageUp, Left, `h`.
    pub prev_page: key::Binding,
    /// Next page. Default: PageDown, Right, `l`.
    pub next_page: key::Binding,
    /// First page. Default: Home.
    pub first_page: key::Binding,
    /// Last page. Default: End.
    pub last_page: key::Binding,
}

impl Default for PaginatorKeyMap {
    fn default() -> Self {
        Self {
            prev_page: key::new_binding(vec![
                key::with_keys_str(&["pgup", "left", "h"]),
                key::with_help("←/h", "prev page"),
            ]),
            next_page: key::new_binding(vec![
                key::with_keys_str(&["pgdown", "right", "l"]),
                key::with_help("→/l", "next page"),
            ]),
            first_page: key::new_binding(vec![
                key::with_keys_str(&["home"]),
                key::with_help("home", "first page"),
            ]),
            last_page: key::new_binding(vec![
                key::with_keys_str(&["end"]),
                key::with_help("end", "last page"),
            ]),
        }
    }
}

impl KeyMapTrait for PaginatorKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.prev_page, &self.next_page]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![vec![
            &self.prev_page,
            &self.next_page,
            &self.first_page,
            &self.last_page,
        ]]
    }
}

/// Styles for the page strip.
#[derive(Debug, Clone)]
pub struct PaginatorStyles {
    /// The current page button.
    pub active: Style,
    /// Other page buttons.
    pub inactive: Style,
    /// Arrows when navigation is possible.
    pub arrow: Style,
    /// Arrows when navigation is not possible.
    pub arrow_disabled: Style,
}

impl Default for PaginatorStyles {
    fn default() -> Self {
        Self {
            active: Style::new()
                .bold(true)
                .foreground(Color::from("#000000"))
                .background(Color::from("#FFDB33")),
            inactive: Style::new().foreground(AdaptiveColor {
                Light: "#1A1A1A",
                Dark: "#DDDDDD",
            }),
            arrow: Style::new().bold(true),
            arrow_disabled: Style::new().foreground(AdaptiveColor {
                Light: "#DDDADA",
                Dark: "#3C3C3C",
            }),
        }
    }
}

/// Page strip renderer and key handler.
///
/// ```rust
/// use pokemonster::paginator::{Model, PaginationSummary, Type};
///
/// let summary = PaginationSummary { current_page: 2, total_pages: 5, has_next: true, has_previous: true };
/// let mut strip = Model::new();
/// strip.paginator_type = Type::Arabic;
/// assert_eq!(strip.view(&summary), "2/5");
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// Rendering mode.
    pub paginator_type: Type,
    /// Maximum page buttons in `Numbers` and `Dots` mode.
    pub max_buttons: usize,
    /// Dot for the current page in `Dots` mode.
    pub active_dot: String,
    /// Dot for other pages in `Dots` mode.
    pub inactive_dot: String,
    /// Format for `Arabic` mode; the first `%d` is the page, the second the total.
    pub arabic_format: String,
    /// Styles for `Numbers` mode.
    pub styles: PaginatorStyles,
    /// Key bindings.
    pub keymap: PaginatorKeyMap,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            paginator_type: Type::default(),
            max_buttons: DEFAULT_MAX_BUTTONS,
            active_dot: "•".to_string(),
            inactive_dot: "○".to_string(),
            arabic_format: "%d/%d".to_string(),
            styles: PaginatorStyles::default(),
            keymap: PaginatorKeyMap::default(),
        }
    }
}

impl Model {
    /// Creates a strip with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rendering mode (builder pattern).
    pub fn with_type(mut self, paginator_type: Type) -> Self {
        self.paginator_type = paginator_type;
        self
    }

    /// Sets the button limit (builder pattern).
    pub fn with_max_buttons(mut self, max_buttons: usize) -> Self {
        self.max_buttons = max_buttons;
        self
    }

    /// Maps a key press to a navigation request. Digits `1`–`9` select the
    /// n-th visible page button.
    pub fn action_for(&self, msg: &KeyMsg) -> Option<PageAction> {
        if self.keymap.next_page.matches(msg) {
            Some(PageAction::Next)
        } else if self.keymap.prev_page.matches(msg) {
            Some(PageAction::Previous)
        } else if self.keymap.first_page.matches(msg) {
            Some(PageAction::First)
        } else if self.keymap.last_page.matches(msg) {
            Some(PageAction::Last)
        } else if let crossterm::event::KeyCode::Char(c @ '1'..='9') = msg.key {
            c.to_digit(10).map(|d| PageAction::Button(d as usize))
        } else {
            None
        }
    }

    /// Page number behind the n-th (1-based) visible button, if any.
    pub fn button_page(&self, summary: &PaginationSummary, button: usize) -> Option<usize> {
        summary
            .visible_page_numbers(self.max_buttons)
            .get(button.checked_sub(1)?)
            .copied()
    }

    /// Renders the strip. Empty when there are no pages.
    pub fn view(&self, summary: &PaginationSummary) -> String {
        if summary.total_pages == 0 {
            return String::new();
        }
        match self.paginator_type {
            Type::Numbers => self.numbers_view(summary),
            Type::Arabic => self.arabic_view(summary),
            Type::Dots => self.dots_view(summary),
        }
    }

    fn numbers_view(&self, summary: &PaginationSummary) -> String {
        let arrow = |enabled: bool, s: &str| {
            if enabled {
                self.styles.arrow.clone().inline(true).render(s)
            } else {
                self.styles.arrow_disabled.clone().inline(true).render(s)
            }
        };

        let mut parts = vec![arrow(summary.has_previous, "‹")];
        for page in summary.visible_page_numbers(self.max_buttons) {
            let label = format!(" {} ", page);
            let style = if page == summary.current_page {
                &self.styles.active
            } else {
                &self.styles.inactive
            };
            parts.push(style.clone().inline(true).render(&label));
        }
        parts.push(arrow(summary.has_next, "›"));
        parts.join(" ")
    }

    fn arabic_view(&self, summary: &PaginationSummary) -> String {
        self.arabic_format
            .replacen("%d", &summary.current_page.to_string(), 1)
            .replacen("%d", &summary.total_pages.to_string(), 1)
    }

    fn dots_view(&self, summary: &PaginationSummary) -> String {
        summary
            .visible_page_numbers(self.max_buttons)
            .into_iter()
            .map(|page| {
                if page == summary.current_page {
                    self.active_dot.as_str()
                } else {
                    self.inactive_dot.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
