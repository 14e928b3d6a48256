//! Colours and styles for the catalog browser.
//!
//! The palette is the retro one of the web front end: yellow accent,
//! red alerts, muted greys for secondary text.

use lipgloss_extras::prelude::*;

/// Ellipsis used when names or messages are cut.
pub const ELLIPSIS: &str = "…";

/// Marker in front of the selected row.
pub const CURSOR: &str = "▸";

/// Full block used for filled stat bars.
pub const BAR_FILL: &str = "█";

/// Light shade used for the empty part of stat bars.
pub const BAR_EMPTY: &str = "░";

/// Styles for every part of the browser.
#[derive(Debug, Clone)]
pub struct AppStyles {
    /// Collection title.
    pub title: Style,
    /// Backend name next to the title.
    pub subtitle: Style,
    /// `Search:` prompt.
    pub search_prompt: Style,
    /// Query text.
    pub search_text: Style,
    /// Hint shown when no search is active.
    pub hint: Style,
    /// `Page x of y` and result counts.
    pub status: Style,
    /// Unselected rows.
    pub item: Style,
    /// The selected row.
    pub item_selected: Style,
    /// `#0025` prefix.
    pub item_number: Style,
    /// Matched characters of a name.
    pub match_highlight: Style,
    /// Error alert.
    pub error: Style,
    /// Empty result notice.
    pub empty: Style,
    /// `Showing a - b of n`.
    pub range: Style,
    /// Section headings in the detail view.
    pub heading: Style,
    /// Field labels in the detail view.
    pub label: Style,
    /// The active detail tab.
    pub tab_active: Style,
    /// Inactive detail tabs and collections.
    pub tab_inactive: Style,
    /// Legendary, mythical and baby badges.
    pub badge: Style,
    /// Pokedex flavor text.
    pub flavor: Style,
    /// Filled part of stat bars.
    pub bar_fill: Style,
    /// Empty part of stat bars.
    pub bar_empty: Style,
}

impl Default for AppStyles {
    fn default() -> Self {
        let subdued = AdaptiveColor {
            Light: "#A49FA5",
            Dark: "#777777",
        };
        let text = AdaptiveColor {
            Light: "#1A1A1A",
            Dark: "#DDDDDD",
        };

        Self {
            title: Style::new()
                .foreground(Color::from("#000000"))
                .background(Color::from("#FFDB33"))
                .bold(true)
                .padding(0, 1, 0, 1),
            subtitle: Style::new().foreground(subdued.clone()),
            search_prompt: Style::new().foreground(Color::from("#FFDB33")).bold(true),
            search_text: Style::new().foreground(text.clone()),
            hint: Style::new().foreground(subdued.clone()).italic(true),
            status: Style::new().foreground(subdued.clone()),
            item: Style::new().foreground(text),
            item_selected: Style::new().foreground(Color::from("#FFDB33")).bold(true),
            item_number: Style::new().foreground(subdued.clone()),
            match_highlight: Style::new().underline(true).bold(true),
            error: Style::new()
                .foreground(Color::from("#FFFFFF"))
                .background(Color::from("#E3350D"))
                .bold(true)
                .padding(0, 1, 0, 1),
            empty: Style::new().foreground(subdued.clone()).italic(true),
            range: Style::new().foreground(subdued.clone()),
            heading: Style::new()
                .foreground(Color::from("#FFDB33"))
                .bold(true)
                .underline(true),
            label: Style::new().foreground(subdued.clone()),
            tab_active: Style::new()
                .foreground(Color::from("#000000"))
                .background(Color::from("#30A7D7"))
                .bold(true)
                .padding(0, 1, 0, 1),
            tab_inactive: Style::new().foreground(subdued.clone()).padding(0, 1, 0, 1),
            badge: Style::new()
                .foreground(Color::from("#000000"))
                .background(Color::from("#E6BC2F"))
                .bold(true)
                .padding(0, 1, 0, 1),
            flavor: Style::new().foreground(subdued.clone()).italic(true),
            bar_fill: Style::new().foreground(Color::from("#30A7D7")),
            bar_empty: Style::new().foreground(subdued),
        }
    }
}

/// Badge style for a Pokemon type.
pub fn type_badge(color_hex: &str) -> Style {
    Style::new()
        .foreground(Color::from("#FFFFFF"))
        .background(Color::from(color_hex))
        .bold(true)
        .padding(0, 1, 0, 1)
}
