//! Key bindings for the catalog browser.
//!
//! Page navigation (`←/h/pgup`, `→/l/pgdn`, `home`, `end`, `1`–`9`) lives in
//! the [`paginator`](crate::paginator) key map. This map covers selection,
//! collection switching, search, detail tabs and the global keys.

use crate::key;
use crossterm::event::KeyCode;

/// Bindings used outside the page strip.
#[derive(Debug, Clone)]
pub struct AppKeyMap {
    /// Move selection up one row.
    pub cursor_up: key::Binding,
    /// Move selection down one row.
    pub cursor_down: key::Binding,
    /// Open the selected entry.
    pub open: key::Binding,
    /// Browse the next collection.
    pub next_collection: key::Binding,
    /// Browse the previous collection.
    pub prev_collection: key::Binding,
    /// Enter search mode.
    pub search: key::Binding,
    /// Clear the active query.
    pub clear_search: key::Binding,
    /// Leave search mode, keeping the query.
    pub accept_search: key::Binding,
    /// Return from the detail view.
    pub back: key::Binding,
    /// Next detail tab.
    pub next_tab: key::Binding,
    /// Previous detail tab.
    pub prev_tab: key::Binding,
    /// Re-issue a failed fetch.
    pub retry: key::Binding,
    /// Toggle the expanded help.
    pub toggle_help: key::Binding,
    /// Quit.
    pub quit: key::Binding,
    /// Quit from any mode.
    pub force_quit: key::Binding,
}

impl Default for AppKeyMap {
    fn default() -> Self {
        Self {
            cursor_up: key::Binding::new(vec![KeyCode::Up, KeyCode::Char('k')])
                .with_help("↑/k", "up"),
            cursor_down: key::Binding::new(vec![KeyCode::Down, KeyCode::Char('j')])
                .with_help("↓/j", "down"),
            open: key::Binding::new(vec![KeyCode::Enter]).with_help("enter", "details"),
            next_collection: key::Binding::new(vec![KeyCode::Tab]).with_help("tab", "collection"),
            prev_collection: key::Binding::new(vec![KeyCode::BackTab])
                .with_help("shift+tab", "prev collection"),
            search: key::Binding::new(vec![KeyCode::Char('/')]).with_help("/", "search"),
            clear_search: key::Binding::new(vec![KeyCode::Esc]).with_help("esc", "clear search"),
            accept_search: key::Binding::new(vec![KeyCode::Enter, KeyCode::Esc])
                .with_help("enter/esc", "done"),
            back: key::Binding::new(vec![KeyCode::Esc, KeyCode::Backspace])
                .with_help("esc", "back"),
            next_tab: key::Binding::new(vec![KeyCode::Tab, KeyCode::Right, KeyCode::Char('l')])
                .with_help("tab/→", "next tab"),
            prev_tab: key::Binding::new(vec![KeyCode::BackTab, KeyCode::Left, KeyCode::Char('h')])
                .with_help("←", "prev tab"),
            retry: key::Binding::new(vec![KeyCode::Char('r')]).with_help("r", "retry"),
            toggle_help: key::Binding::new(vec![KeyCode::Char('?')]).with_help("?", "more"),
            quit: key::Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit"),
            force_quit: key::new_binding(vec![
                key::with_keys_str(&["ctrl+c"]),
                key::with_help("ctrl+c", "quit"),
            ]),
        }
    }
}
