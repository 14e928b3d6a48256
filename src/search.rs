//! Name search over catalog items.
//!
//! The default [`MatchMode::Substring`] keeps an item when its name contains
//! the query, ignoring case. The query is used verbatim: no trimming, so a
//! leading space is part of what is searched for. [`MatchMode::Fuzzy`] uses
//! the skim matcher instead. Both keep the original relative order of the
//! items and record the matched character positions for highlighting.

use crate::catalog::Item;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

/// How a query is compared against item names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Skim-style fuzzy match (`pkch` finds `pikachu`).
    Fuzzy,
}

/// The active search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    query: String,
    mode: MatchMode,
}

impl SearchState {
    /// An empty search using `mode`.
    pub fn new(mode: MatchMode) -> Self {
        Self {
            query: String::new(),
            mode,
        }
    }

    /// The same search with a different query.
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: self.mode,
        }
    }

    /// The raw query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The match mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Whether a filter applies, i.e. the query is non-empty.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// The query for adapters, `None` when inactive.
    pub fn as_filter(&self) -> Option<&str> {
        if self.is_active() {
            Some(&self.query)
        } else {
            None
        }
    }
}

/// An item that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredItem {
    /// Position of the item in the unfiltered collection.
    pub index: usize,
    /// The item.
    pub item: Item,
    /// Character positions in the name that matched the query.
    pub matches: Vec<usize>,
}

/// Filters `items` by `search`, preserving order. An inactive search keeps
/// every item with no match positions.
///
/// ```rust
/// use pokemonster::catalog::Item;
/// use pokemonster::search::{filter_items, MatchMode, SearchState};
///
/// let items: Vec<Item> = ["charmander", "squirtle", "charizard"]
///     .iter()
///     .enumerate()
///     .map(|(i, n)| Item::new(i as u32 + 1, *n, ""))
///     .collect();
/// let search = SearchState::new(MatchMode::Substring).with_query("CHAR");
/// let names: Vec<_> = filter_items(&items, &search).into_iter().map(|f| f.item.name).collect();
/// assert_eq!(names, vec!["charmander", "charizard"]);
/// ```
pub fn filter_items(items: &[Item], search: &SearchState) -> Vec<FilteredItem> {
    if !search.is_active() {
        return items
            .iter()
            .enumerate()
            .map(|(index, item)| FilteredItem {
                index,
                item: item.clone(),
                matches: Vec::new(),
            })
            .collect();
    }

    match search.mode {
        MatchMode::Substring => {
            let needle = search.query.as_str();
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    substring_indices(&item.name, needle).map(|matches| FilteredItem {
                        index,
                        item: item.clone(),
                        matches,
                    })
                })
                .collect()
        }
        MatchMode::Fuzzy => {
            let matcher = SkimMatcherV2::default();
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    matcher
                        .fuzzy_indices(&item.name, &search.query)
                        .map(|(_, matches)| FilteredItem {
                            index,
                            item: item.clone(),
                            matches,
                        })
                })
                .collect()
        }
    }
}

/// Whether `name` matches `search`. Inactive searches match everything.
pub fn matches(name: &str, search: &SearchState) -> bool {
    if !search.is_active() {
        return true;
    }
    match search.mode {
        MatchMode::Substring => substring_indices(name, &search.query).is_some(),
        MatchMode::Fuzzy => SkimMatcherV2::default()
            .fuzzy_match(name, &search.query)
            .is_some(),
    }
}

// Character positions in `name` of the first case-insensitive occurrence
// of `needle`. Names are folded one character at a time so positions stay
// valid when lowercasing changes the character count.
fn substring_indices(name: &str, needle: &str) -> Option<Vec<usize>> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Some(Vec::new());
    }
    let folded: Vec<(usize, char)> = name
        .chars()
        .enumerate()
        .flat_map(|(i, c)| c.to_lowercase().map(move |lower| (i, lower)))
        .collect();
    let start = folded
        .windows(needle.len())
        .position(|w| w.iter().map(|(_, c)| *c).eq(needle.iter().copied()))?;
    let mut positions: Vec<usize> = folded[start..start + needle.len()]
        .iter()
        .map(|(i, _)| *i)
        .collect();
    positions.dedup();
    Some(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<Item> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Item::new(i as u32 + 1, *n, format!("https://pokeapi.co/api/v2/pokemon/{}/", i + 1)))
            .collect()
    }

    fn names(filtered: &[FilteredItem]) -> Vec<&str> {
        filtered.iter().map(|f| f.item.name.as_str()).collect()
    }

    #[test]
    fn substring_keeps_relative_order() {
        let all = items(&["charmander", "squirtle", "charizard"]);
        let search = SearchState::default().with_query("char");
        let filtered = filter_items(&all, &search);
        assert_eq!(names(&filtered), vec!["charmander", "charizard"]);
        assert_eq!(filtered[1].index, 2);
        assert_eq!(filtered[0].matches, vec![0, 1, 2, 3]);
    }

    #[test]
    fn substring_is_case_insensitive() {
        let all = items(&["Mr-Mime", "mime-jr", "pikachu"]);
        let search = SearchState::default().with_query("MIME");
        assert_eq!(names(&filter_items(&all, &search)), vec!["Mr-Mime", "mime-jr"]);
    }

    #[test]
    fn query_is_not_trimmed() {
        let all = items(&["charmander", "tapu-koko"]);
        let search = SearchState::default().with_query(" char");
        assert!(filter_items(&all, &search).is_empty());
        assert!(!matches("charmander", &search));
    }

    #[test]
    fn match_positions_point_into_name() {
        let all = items(&["bulbasaur"]);
        let search = SearchState::default().with_query("saur");
        assert_eq!(filter_items(&all, &search)[0].matches, vec![5, 6, 7, 8]);
    }

    #[test]
    fn match_positions_survive_case_folding_that_grows() {
        // 'İ' lowercases to two characters.
        let all = items(&["İvysaur", "ivysaur"]);
        let search = SearchState::default().with_query("VY");
        let filtered = filter_items(&all, &search);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].matches, vec![1, 2]);
        assert_eq!(filtered[1].matches, vec![1, 2]);

        let search = SearchState::default().with_query("i");
        assert_eq!(filter_items(&all, &search)[0].matches, vec![0]);
    }

    #[test]
    fn empty_query_keeps_everything() {
        let all = items(&["a", "b"]);
        let filtered = filter_items(&all, &SearchState::default());
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|f| f.matches.is_empty()));
        assert_eq!(SearchState::default().as_filter(), None);
    }

    #[test]
    fn fuzzy_mode_matches_scattered_letters() {
        let all = items(&["pikachu", "raichu", "pichu"]);
        let search = SearchState::new(MatchMode::Fuzzy).with_query("pkch");
        assert_eq!(names(&filter_items(&all, &search)), vec!["pikachu"]);
        assert!(matches("pikachu", &search));
    }

    #[test]
    fn zero_matches_is_empty_not_error() {
        let all = items(&["eevee"]);
        let search = SearchState::default().with_query("zzz");
        assert!(filter_items(&all, &search).is_empty());
    }
}
