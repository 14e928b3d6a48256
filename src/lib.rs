#![warn(missing_docs)]

//! # pokemonster
//!
//! A terminal catalog browser for the public [PokeAPI](https://pokeapi.co),
//! built on [bubbletea-rs](https://github.com/joshka/bubbletea-rs).
//!
//! ## Overview
//!
//! The crate is layered leaves first:
//!
//! - [`source`]: data sources turning `(offset, limit, query)` into a
//!   [`Page`](source::Page) of normalized [`Item`](catalog::Item)s. PokeAPI
//!   REST, PokeAPI GraphQL and an in-memory list are provided.
//! - [`viewmodel`]: the search/pagination view model. Pure, synchronous and
//!   immutable: every user intent returns a new [`ViewState`].
//! - [`app`]: the bubbletea-rs program rendering the view model, switching
//!   collections through a [`SourceFactory`](config::SourceFactory).
//!
//! [`paginator`], [`search`], [`key`] and [`help`] are the building blocks
//! the view model and the terminal front end share.
//!
//! ## Paging a collection
//!
//! ```rust
//! use pokemonster::prelude::*;
//!
//! let names = ["charmander", "squirtle", "charizard"];
//! let items: Vec<Item> = names
//!     .iter()
//!     .enumerate()
//!     .map(|(i, n)| Item::new(i as u32 + 1, *n, ""))
//!     .collect();
//!
//! let state = ViewState::with_items(items, 20).dispatch(Action::SetQuery("char".into()));
//! let props = state.props();
//! let shown: Vec<_> = props.visible_items.iter().map(|i| i.name.as_str()).collect();
//! assert_eq!(shown, vec!["charmander", "charizard"]);
//! assert_eq!(props.current_page, 1);
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`] events (fetch issued, stale response
//! discarded, adapter failure). Installing a subscriber is up to the binary.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod help;
pub mod key;
pub mod paginator;
pub mod search;
pub mod source;
pub mod viewmodel;

pub use app::CatalogApp;
pub use catalog::{Item, PokemonDetail, PokemonSpecies, ResourceKind};
pub use config::{Backend, Config, HttpSources, SourceFactory, Sources};
pub use error::{AdapterError, ConfigError};
pub use help::Model as HelpModel;
pub use key::{new_binding, with_help, with_keys_str, Binding, KeyMap, KeyPress};
pub use paginator::{visible_page_numbers, PageWindow, PaginationSummary};
pub use search::{MatchMode, SearchState};
pub use source::{DataSource, DetailSource, Page, Paging};
pub use viewmodel::{Action, AdapterFailure, PageRequest, Props, ViewState};

/// Commonly used types in one import.
///
/// ```rust
/// use pokemonster::prelude::*;
///
/// let window = PageWindow::new(24).with_total_count(1302);
/// assert_eq!(window.total_pages(), 55);
/// ```
pub mod prelude {
    pub use crate::catalog::{Item, PokemonDetail, PokemonSpecies, ResourceKind};
    pub use crate::config::{Backend, Config, SourceFactory, Sources};
    pub use crate::error::{AdapterError, ConfigError};
    pub use crate::paginator::{PageWindow, PaginationSummary};
    pub use crate::search::{MatchMode, SearchState};
    pub use crate::source::{
        DataSource, DetailSource, GraphqlSource, MemorySource, Page, Paging, RestSource,
    };
    pub use crate::viewmodel::{Action, AdapterFailure, Props, ViewState};
}
