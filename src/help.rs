//! Help footer generated from key bindings.
//!
//! The short view prints bindings on one line separated by bullets
//! (`←/h prev page • →/l next page • / search`). The full view lays the
//! binding groups out as columns. Both truncate with an ellipsis when a
//! width is set and the content would not fit.

use crate::key::{Binding, KeyMap};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;

/// Styles for the help footer.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Ellipsis appended when content is cut.
    pub ellipsis: Style,
    /// Key labels.
    pub key: Style,
    /// Descriptions.
    pub desc: Style,
    /// Separators between items and columns.
    pub separator: Style,
}

impl Default for Styles {
    fn default() -> Self {
        use lipgloss::AdaptiveColor;

        let key = Style::new().foreground(AdaptiveColor {
            Light: "#909090",
            Dark: "#626262",
        });
        let desc = Style::new().foreground(AdaptiveColor {
            Light: "#B2B2B2",
            Dark: "#4A4A4A",
        });
        let separator = Style::new().foreground(AdaptiveColor {
            Light: "#DDDADA",
            Dark: "#3C3C3C",
        });

        Self {
            ellipsis: separator.clone(),
            key,
            desc,
            separator,
        }
    }
}

/// Help view state.
///
/// # Examples
///
/// ```rust
/// use pokemonster::help::Model;
/// use pokemonster::key::{Binding, KeyMap};
/// use crossterm::event::KeyCode;
///
/// struct Keys {
///     quit: Binding,
/// }
///
/// impl KeyMap for Keys {
///     fn short_help(&self) -> Vec<&Binding> {
///         vec![&self.quit]
///     }
///     fn full_help(&self) -> Vec<Vec<&Binding>> {
///         vec![vec![&self.quit]]
///     }
/// }
///
/// let keys = Keys { quit: Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit") };
/// let view = Model::new().view(&keys);
/// assert!(view.contains("quit"));
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// Show the column layout instead of the single line.
    pub show_all: bool,
    /// Maximum width in columns; 0 disables truncation.
    pub width: usize,
    /// Separator between short-help items.
    pub short_separator: String,
    /// Separator between full-help columns.
    pub full_separator: String,
    /// Marker for cut content.
    pub ellipsis: String,
    /// Styles.
    pub styles: Styles,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            show_all: false,
            width: 0,
            short_separator: " • ".to_string(),
            full_separator: "    ".to_string(),
            ellipsis: "…".to_string(),
            styles: Styles::default(),
        }
    }
}

impl Model {
    /// Creates a help model with default styles and no width limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the width limit (builder pattern).
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Renders the short or full help for `keymap`, depending on `show_all`.
    pub fn view<K: KeyMap>(&self, keymap: &K) -> String {
        if self.show_all {
            self.full_help_view(keymap.full_help())
        } else {
            self.short_help_view(keymap.short_help())
        }
    }

    /// Renders enabled bindings on a single line.
    pub fn short_help_view(&self, bindings: Vec<&Binding>) -> String {
        let separator = self
            .styles
            .separator
            .clone()
            .inline(true)
            .render(&self.short_separator);

        let mut out = String::new();
        let mut total_width = 0;
        for binding in bindings.into_iter().filter(|b| b.enabled()) {
            let sep = if total_width > 0 { separator.as_str() } else { "" };
            let item = format!("{}{}", sep, self.render_binding(binding));
            let item_width = lipgloss::width_visible(&item);

            if let Some(tail) = self.overflow_tail(total_width, item_width) {
                out.push_str(&tail);
                break;
            }
            total_width += item_width;
            out.push_str(&item);
        }
        out
    }

    /// Renders binding groups as side-by-side columns.
    pub fn full_help_view(&self, groups: Vec<Vec<&Binding>>) -> String {
        let mut columns = Vec::new();
        let mut total_width = 0;

        for group in groups {
            let rows: Vec<String> = group
                .into_iter()
                .filter(|b| b.enabled())
                .map(|b| self.render_binding(b))
                .collect();
            if rows.is_empty() {
                continue;
            }

            let column = rows.join("\n");
            let (_, column_width) = lipgloss::get_lines_visible(&column);
            if let Some(tail) = self.overflow_tail(total_width, column_width) {
                if !tail.is_empty() {
                    columns.push(tail);
                }
                break;
            }
            total_width += column_width + lipgloss::width_visible(&self.full_separator);
            columns.push(column);
        }

        let separator = self
            .styles
            .separator
            .clone()
            .inline(true)
            .render(&self.full_separator);
        let mut parts: Vec<&str> = Vec::new();
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                parts.push(separator.as_str());
            }
            parts.push(column.as_str());
        }
        lipgloss::join_horizontal(lipgloss::TOP, &parts)
    }

    fn render_binding(&self, binding: &Binding) -> String {
        let help = binding.help();
        format!(
            "{} {}",
            self.styles.key.clone().inline(true).render(&help.key),
            self.styles.desc.clone().inline(true).render(&help.desc)
        )
    }

    // Some(tail) when the item does not fit; the tail is the ellipsis if
    // that still fits, otherwise empty.
    fn overflow_tail(&self, total_width: usize, item_width: usize) -> Option<String> {
        if self.width == 0 || total_width + item_width <= self.width {
            return None;
        }
        let tail = format!(
            " {}",
            self.styles
                .ellipsis
                .clone()
                .inline(true)
                .render(&self.ellipsis)
        );
        if total_width + lipgloss::width_visible(&tail) < self.width {
            Some(tail)
        } else {
            Some(String::new())
        }
    }
}
