//! Data Source Adapters.
//!
//! A [`DataSource`] turns `(offset, limit, query)` into a [`Page`] of
//! normalized [`Item`]s. The view model only sees this trait, so REST,
//! GraphQL and in-memory sources are interchangeable.

pub mod graphql;
pub mod memory;
pub mod rest;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{Item, PokemonDetail, PokemonSpecies};
use crate::error::AdapterError;

pub use graphql::GraphqlSource;
pub use memory::MemorySource;
pub use rest::RestSource;

/// Where pagination happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Paging {
    /// The whole collection is fetched once and paged locally.
    ClientHeld,
    /// Each page is requested from the source.
    #[default]
    ServerPaged,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    /// Items on this page, in source order.
    pub items: Vec<Item>,
    /// Number of results across all pages.
    pub total_count: usize,
    /// A page after this one exists.
    pub has_next: bool,
    /// A page before this one exists.
    pub has_previous: bool,
}

impl Page {
    /// Slices an already filtered collection the way a paging server would.
    pub fn from_slice(all: &[Item], offset: usize, limit: usize) -> Self {
        let start = offset.min(all.len());
        let end = start.saturating_add(limit).min(all.len());
        Self {
            items: all[start..end].to_vec(),
            total_count: all.len(),
            has_next: end < all.len(),
            has_previous: offset > 0,
        }
    }
}

/// A source of catalog pages.
///
/// Implementations must be idempotent for identical arguments and must not
/// mutate shared state visible to callers.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs, e.g. `rest` or `graphql`.
    fn name(&self) -> &'static str;

    /// The paging mode this source works best with.
    fn preferred_paging(&self) -> Paging;

    /// Fetches up to `limit` items starting at `offset`, filtered by `query`
    /// when given.
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Page, AdapterError>;
}

/// A source of Pokemon details.
#[async_trait]
pub trait DetailSource: Send + Sync {
    /// Fetches one Pokemon by numeric id or by name.
    async fn fetch_detail(&self, id_or_name: &str) -> Result<PokemonDetail, AdapterError>;

    /// Fetches the species a Pokemon belongs to, by species id or name.
    async fn fetch_species(&self, id_or_name: &str) -> Result<PokemonSpecies, AdapterError>;
}

/// Builds the HTTP client shared by the network sources.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, AdapterError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pokemonster/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| AdapterError::Transport {
            url: String::new(),
            source,
        })
}

// Shared response handling: status mapping, then JSON decoding. An empty
// body decodes as `{}` like the original request wrapper did.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, AdapterError> {
    let status = response.status();
    let body = response.text().await.map_err(|source| AdapterError::Transport {
        url: url.to_string(),
        source,
    })?;
    if !status.is_success() {
        return Err(AdapterError::status(url, status.as_u16(), &body));
    }
    let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
    serde_json::from_str(body).map_err(|source| AdapterError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: u32) -> Vec<Item> {
        (1..=n).map(|i| Item::new(i, format!("item-{i}"), "")).collect()
    }

    #[test]
    fn page_from_slice_sets_links() {
        let all = items(34);
        let first = Page::from_slice(&all, 0, 20);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.total_count, 34);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = Page::from_slice(&all, 20, 20);
        assert_eq!(second.items.len(), 14);
        assert!(!second.has_next);
        assert!(second.has_previous);
    }

    #[test]
    fn page_from_slice_past_end_is_empty() {
        let page = Page::from_slice(&items(5), 40, 20);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 5);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }
}
