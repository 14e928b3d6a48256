//! In-memory source over an owned item list.

use async_trait::async_trait;

use super::{DataSource, Page, Paging};
use crate::catalog::Item;
use crate::error::AdapterError;
use crate::search::{self, MatchMode, SearchState};

/// Serves pages out of a fixed list, filtering by substring.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<Item>,
    paging: Paging,
}

impl MemorySource {
    /// Wraps `items`; prefers client-held paging.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            paging: Paging::ClientHeld,
        }
    }

    /// Overrides the preferred paging mode (builder pattern).
    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }

    /// Builds items from plain names, numbering them from 1.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let items = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let id = i as u32 + 1;
                Item::new(
                    id,
                    name.as_ref(),
                    format!("memory://catalog/{id}/"),
                )
            })
            .collect();
        Self::new(items)
    }
}

#[async_trait]
impl DataSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn preferred_paging(&self) -> Paging {
        self.paging
    }

    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Page, AdapterError> {
        match query {
            Some(q) if !q.is_empty() => {
                let search = SearchState::new(MatchMode::Substring).with_query(q);
                let matching: Vec<Item> = self
                    .items
                    .iter()
                    .filter(|item| search::matches(&item.name, &search))
                    .cloned()
                    .collect();
                Ok(Page::from_slice(&matching, offset, limit))
            }
            _ => Ok(Page::from_slice(&self.items, offset, limit)),
        }
    }
}
