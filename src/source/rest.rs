//! PokeAPI REST source.
//!
//! Lists come from `GET /api/v2/{kind}/?limit=&offset=`, which answers with
//! `{count, next, previous, results: [{name, url}]}`. The REST API has no
//! name filter, so searches are served from the full index, fetched once
//! per source and filtered locally.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::{read_json, DataSource, DetailSource, Page, Paging};
use crate::catalog::detail::{collect_sprites, dedup_moves};
use crate::catalog::species::clean_flavor_text;
use crate::catalog::{
    Ability, Cries, Item, Move, PastAbilities, PastTypes, PokemonDetail, PokemonSpecies,
    ResourceKind, Stat,
};
use crate::catalog::parse_id;
use crate::error::AdapterError;
use crate::search::{self, MatchMode, SearchState};

/// Default REST host.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co";

/// Largest `limit` sent when fetching the full index.
pub const DEFAULT_INDEX_LIMIT: usize = 100_000;

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    count: usize,
    next: Option<String>,
    previous: Option<String>,
    #[serde(default)]
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    slot: u32,
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
    #[serde(default)]
    is_hidden: bool,
}

#[derive(Debug, Deserialize)]
struct StatEntry {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct VersionGroupDetail {
    #[serde(default)]
    level_learned_at: u32,
    move_learn_method: Option<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct MoveEntry {
    #[serde(rename = "move")]
    entry: NamedResource,
    #[serde(default)]
    version_group_details: Vec<VersionGroupDetail>,
}

impl From<MoveEntry> for Move {
    fn from(m: MoveEntry) -> Self {
        let first = m.version_group_details.into_iter().next();
        Move {
            name: m.entry.name,
            level: first
                .as_ref()
                .map(|d| d.level_learned_at)
                .filter(|level| *level > 0),
            method: first.and_then(|d| d.move_learn_method).map(|r| r.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HeldItem {
    item: NamedResource,
}

#[derive(Debug, Deserialize)]
struct GameIndex {
    version: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct CriesResource {
    latest: Option<String>,
    legacy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PastTypeEntry {
    generation: NamedResource,
    #[serde(default)]
    types: Vec<TypeSlot>,
}

#[derive(Debug, Deserialize)]
struct PastAbilityEntry {
    generation: NamedResource,
    #[serde(default)]
    abilities: Vec<PastAbilitySlot>,
}

// Past ability slots may carry a null ability, meaning the slot was empty.
#[derive(Debug, Deserialize)]
struct PastAbilitySlot {
    ability: Option<NamedResource>,
    #[serde(default)]
    is_hidden: bool,
}

#[derive(Debug, Deserialize)]
struct PokemonResource {
    id: u32,
    name: String,
    height: Option<u32>,
    weight: Option<u32>,
    base_experience: Option<u32>,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    stats: Vec<StatEntry>,
    #[serde(default)]
    sprites: serde_json::Value,
    species: Option<NamedResource>,
    #[serde(default)]
    moves: Vec<MoveEntry>,
    #[serde(default)]
    forms: Vec<NamedResource>,
    #[serde(default)]
    held_items: Vec<HeldItem>,
    #[serde(default)]
    game_indices: Vec<GameIndex>,
    #[serde(default)]
    cries: Option<CriesResource>,
    #[serde(default)]
    past_types: Vec<PastTypeEntry>,
    #[serde(default)]
    past_abilities: Vec<PastAbilityEntry>,
}

impl From<PokemonResource> for PokemonDetail {
    fn from(mut p: PokemonResource) -> Self {
        p.types.sort_by_key(|t| t.slot);
        PokemonDetail {
            id: p.id,
            name: p.name,
            height: p.height,
            weight: p.weight,
            base_experience: p.base_experience,
            types: p.types.into_iter().map(|t| t.kind.name).collect(),
            abilities: p
                .abilities
                .into_iter()
                .map(|a| Ability {
                    name: a.ability.name,
                    hidden: a.is_hidden,
                })
                .collect(),
            stats: p
                .stats
                .into_iter()
                .map(|s| Stat {
                    name: s.stat.name,
                    base: s.base_stat,
                })
                .collect(),
            sprites: collect_sprites(&p.sprites),
            species_id: p.species.as_ref().and_then(|s| parse_id(&s.url)),
            species: p.species.map(|s| s.name),
            moves: dedup_moves(p.moves.into_iter().map(Move::from)),
            forms: p.forms.into_iter().map(|f| f.name).collect(),
            held_items: p.held_items.into_iter().map(|h| h.item.name).collect(),
            games: p.game_indices.into_iter().map(|g| g.version.name).collect(),
            cries: p
                .cries
                .map(|c| Cries {
                    latest: c.latest,
                    legacy: c.legacy,
                })
                .unwrap_or_default(),
            past_types: p
                .past_types
                .into_iter()
                .map(|mut past| {
                    past.types.sort_by_key(|t| t.slot);
                    PastTypes {
                        generation: past.generation.name,
                        types: past.types.into_iter().map(|t| t.kind.name).collect(),
                    }
                })
                .collect(),
            past_abilities: p
                .past_abilities
                .into_iter()
                .map(|past| PastAbilities {
                    generation: past.generation.name,
                    abilities: past
                        .abilities
                        .into_iter()
                        .filter_map(|slot| {
                            slot.ability.map(|a| Ability {
                                name: a.name,
                                hidden: slot.is_hidden,
                            })
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Language {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: Language,
}

#[derive(Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: Language,
}

#[derive(Debug, Deserialize)]
struct SpeciesResource {
    id: u32,
    name: String,
    #[serde(default)]
    is_legendary: bool,
    #[serde(default)]
    is_mythical: bool,
    #[serde(default)]
    is_baby: bool,
    capture_rate: Option<u32>,
    base_happiness: Option<u32>,
    hatch_counter: Option<u32>,
    growth_rate: Option<NamedResource>,
    #[serde(default)]
    egg_groups: Vec<NamedResource>,
    habitat: Option<NamedResource>,
    color: Option<NamedResource>,
    shape: Option<NamedResource>,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
}

const ENGLISH: &str = "en";

impl From<SpeciesResource> for PokemonSpecies {
    fn from(s: SpeciesResource) -> Self {
        PokemonSpecies {
            id: s.id,
            name: s.name,
            genus: s
                .genera
                .into_iter()
                .find(|g| g.language.name == ENGLISH)
                .map(|g| g.genus),
            flavor_text: s
                .flavor_text_entries
                .iter()
                .find(|f| f.language.name == ENGLISH)
                .map(|f| clean_flavor_text(&f.flavor_text)),
            is_legendary: s.is_legendary,
            is_mythical: s.is_mythical,
            is_baby: s.is_baby,
            capture_rate: s.capture_rate,
            base_happiness: s.base_happiness,
            hatch_counter: s.hatch_counter,
            growth_rate: s.growth_rate.map(|r| r.name),
            egg_groups: s.egg_groups.into_iter().map(|g| g.name).collect(),
            habitat: s.habitat.map(|r| r.name),
            color: s.color.map(|r| r.name),
            shape: s.shape.map(|r| r.name),
        }
    }
}

/// REST-backed catalog source.
#[derive(Debug)]
pub struct RestSource {
    client: reqwest::Client,
    base_url: String,
    kind: ResourceKind,
    index_limit: usize,
    index: OnceCell<Vec<Item>>,
}

impl RestSource {
    /// A source listing `kind` from `base_url` (e.g. `https://pokeapi.co`).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            kind,
            index_limit: DEFAULT_INDEX_LIMIT,
            index: OnceCell::new(),
        }
    }

    /// Sets the `limit` used for the full index (builder pattern).
    pub fn with_index_limit(mut self, limit: usize) -> Self {
        self.index_limit = limit.max(1);
        self
    }

    fn list_url(&self) -> String {
        format!("{}/api/v2/{}/", self.base_url, self.kind.path())
    }

    async fn fetch_list(&self, offset: usize, limit: usize) -> Result<ResourceList, AdapterError> {
        let url = self.list_url();
        debug!(%url, offset, limit, "GET resource list");
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await
            .map_err(|source| AdapterError::Transport {
                url: url.clone(),
                source,
            })?;
        read_json(&url, response).await
    }

    // GET of a single resource; 404 becomes `NotFound` for `kind`.
    async fn fetch_one<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        id_or_name: &str,
    ) -> Result<T, AdapterError> {
        let url = format!(
            "{}/api/v2/{}/{}/",
            self.base_url,
            kind,
            id_or_name.trim().to_lowercase()
        );
        debug!(%url, "GET resource");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| AdapterError::Transport {
                url: url.clone(),
                source,
            })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound {
                kind: kind.to_string(),
                id: id_or_name.to_string(),
            });
        }
        read_json(&url, response).await
    }

    async fn full_index(&self) -> Result<&Vec<Item>, AdapterError> {
        self.index
            .get_or_try_init(|| async {
                let list = self.fetch_list(0, self.index_limit).await?;
                debug!(count = list.results.len(), "cached full index");
                Ok(list
                    .results
                    .into_iter()
                    .map(|r| Item::from_resource(r.name, r.url))
                    .collect())
            })
            .await
    }
}

#[async_trait]
impl DataSource for RestSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn preferred_paging(&self) -> Paging {
        Paging::ServerPaged
    }

    #[instrument(level = "debug", skip(self), fields(kind = %self.kind))]
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Page, AdapterError> {
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            let search = SearchState::new(MatchMode::Substring).with_query(q);
            let matching: Vec<Item> = self
                .full_index()
                .await?
                .iter()
                .filter(|item| search::matches(&item.name, &search))
                .cloned()
                .collect();
            return Ok(Page::from_slice(&matching, offset, limit));
        }

        let list = self.fetch_list(offset, limit).await?;
        Ok(Page {
            items: list
                .results
                .into_iter()
                .map(|r| Item::from_resource(r.name, r.url))
                .collect(),
            total_count: list.count,
            has_next: list.next.is_some(),
            has_previous: list.previous.is_some(),
        })
    }
}

#[async_trait]
impl DetailSource for RestSource {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_detail(&self, id_or_name: &str) -> Result<PokemonDetail, AdapterError> {
        let resource: PokemonResource = self.fetch_one("pokemon", id_or_name).await?;
        Ok(resource.into())
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_species(&self, id_or_name: &str) -> Result<PokemonSpecies, AdapterError> {
        let resource: SpeciesResource = self.fetch_one("pokemon-species", id_or_name).await?;
        Ok(resource.into())
    }
}
