//! PokeAPI GraphQL source.
//!
//! Every list request selects the requested window and the aggregate count
//! of the same filter in one round trip. Fields are aliased (`items`,
//! `total`) so one response type serves every collection.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::{read_json, DataSource, DetailSource, Page, Paging};
use crate::catalog::detail::{collect_sprites, dedup_moves};
use crate::catalog::species::clean_flavor_text;
use crate::catalog::{
    resource_url, Ability, Cries, Item, Move, PastAbilities, PastTypes, PokemonDetail,
    PokemonSpecies, ResourceKind, Stat,
};
use crate::error::AdapterError;

/// Public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://graphql.pokeapi.co/v1beta2";

const DETAIL_QUERY: &str = r#"query PokemonDetail($where: pokemon_bool_exp) {
  pokemon(where: $where, limit: 1) {
    id
    name
    height
    weight
    base_experience
    pokemonsprites { sprites }
    pokemontypes(order_by: {slot: asc}) { slot type { name } }
    pokemonabilities { is_hidden ability { name } }
    pokemonstats { base_stat stat { name } }
    pokemonmoves(order_by: {id: asc}) { level move { name } movelearnmethod { name } }
    pokemonforms(order_by: {id: asc}) { name }
    pokemonitems { item { name } }
    pokemongameindices { version { name } }
    pokemoncries { cries }
    pokemontypepasts(order_by: {slot: asc}) { generation { name } type { name } }
    pokemonabilitypasts { is_hidden generation { name } ability { name } }
    pokemonspecy { id name }
  }
}"#;

// language_id 9 is English.
const SPECIES_QUERY: &str = r#"query PokemonSpecies($where: pokemonspecies_bool_exp) {
  pokemonspecies(where: $where, limit: 1) {
    id
    name
    base_happiness
    capture_rate
    hatch_counter
    is_baby
    is_legendary
    is_mythical
    growthrate { name }
    pokemoncolor { name }
    pokemonshape { name }
    pokemonhabitat { name }
    pokemonegggroups { egggroup { name } }
    pokemonspeciesflavortexts(where: {language_id: {_eq: 9}}, limit: 1) { flavor_text }
    pokemonspeciesnames(where: {language_id: {_eq: 9}}) { genus }
  }
}"#;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, AdapterError> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AdapterError::GraphQl(message));
        }
        self.data
            .ok_or_else(|| AdapterError::GraphQl("response carried no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct Row {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AggregateCount {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct Aggregate {
    aggregate: Option<AggregateCount>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    items: Vec<Row>,
    total: Aggregate,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpriteRow {
    sprites: Value,
}

#[derive(Debug, Deserialize)]
struct TypeRow {
    slot: u32,
    #[serde(rename = "type")]
    kind: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct AbilityRow {
    #[serde(default)]
    is_hidden: bool,
    ability: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct StatRow {
    base_stat: u32,
    stat: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct MoveRow {
    level: Option<u32>,
    #[serde(rename = "move")]
    entry: Option<Named>,
    movelearnmethod: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct ItemRow {
    item: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct GameIndexRow {
    version: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct CryRow {
    cries: Value,
}

#[derive(Debug, Deserialize)]
struct TypePastRow {
    generation: Option<Named>,
    #[serde(rename = "type")]
    kind: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct AbilityPastRow {
    #[serde(default)]
    is_hidden: bool,
    generation: Option<Named>,
    ability: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct SpeciesRef {
    id: Option<u32>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DetailRow {
    id: u32,
    name: String,
    height: Option<u32>,
    weight: Option<u32>,
    base_experience: Option<u32>,
    #[serde(default)]
    pokemonsprites: Vec<SpriteRow>,
    #[serde(default)]
    pokemontypes: Vec<TypeRow>,
    #[serde(default)]
    pokemonabilities: Vec<AbilityRow>,
    #[serde(default)]
    pokemonstats: Vec<StatRow>,
    #[serde(default)]
    pokemonmoves: Vec<MoveRow>,
    #[serde(default)]
    pokemonforms: Vec<Named>,
    #[serde(default)]
    pokemonitems: Vec<ItemRow>,
    #[serde(default)]
    pokemongameindices: Vec<GameIndexRow>,
    #[serde(default)]
    pokemoncries: Vec<CryRow>,
    #[serde(default)]
    pokemontypepasts: Vec<TypePastRow>,
    #[serde(default)]
    pokemonabilitypasts: Vec<AbilityPastRow>,
    pokemonspecy: Option<SpeciesRef>,
}

#[derive(Debug, Deserialize)]
struct DetailData {
    pokemon: Vec<DetailRow>,
}

impl From<DetailRow> for PokemonDetail {
    fn from(mut row: DetailRow) -> Self {
        row.pokemontypes.sort_by_key(|t| t.slot);
        let sprites = row
            .pokemonsprites
            .first()
            .map(|s| collect_sprites(&json_column(&s.sprites, "sprites")))
            .unwrap_or_default();
        PokemonDetail {
            id: row.id,
            name: row.name,
            height: row.height,
            weight: row.weight,
            base_experience: row.base_experience,
            types: row
                .pokemontypes
                .into_iter()
                .filter_map(|t| t.kind.map(|k| k.name))
                .collect(),
            abilities: row
                .pokemonabilities
                .into_iter()
                .filter_map(|a| {
                    a.ability.map(|ability| Ability {
                        name: ability.name,
                        hidden: a.is_hidden,
                    })
                })
                .collect(),
            stats: row
                .pokemonstats
                .into_iter()
                .filter_map(|s| {
                    s.stat.map(|stat| Stat {
                        name: stat.name,
                        base: s.base_stat,
                    })
                })
                .collect(),
            sprites,
            species_id: row.pokemonspecy.as_ref().and_then(|s| s.id),
            species: row.pokemonspecy.map(|s| s.name),
            moves: dedup_moves(row.pokemonmoves.into_iter().filter_map(|m| {
                m.entry.map(|entry| Move {
                    name: entry.name,
                    level: m.level.filter(|level| *level > 0),
                    method: m.movelearnmethod.map(|method| method.name),
                })
            })),
            forms: row.pokemonforms.into_iter().map(|f| f.name).collect(),
            held_items: row
                .pokemonitems
                .into_iter()
                .filter_map(|i| i.item.map(|item| item.name))
                .collect(),
            games: row
                .pokemongameindices
                .into_iter()
                .filter_map(|g| g.version.map(|v| v.name))
                .collect(),
            cries: row
                .pokemoncries
                .first()
                .map(|c| cries(&json_column(&c.cries, "cries")))
                .unwrap_or_default(),
            past_types: group_by_generation(
                row.pokemontypepasts
                    .into_iter()
                    .filter_map(|p| Some((p.generation?.name, p.kind?.name))),
            )
            .into_iter()
            .map(|(generation, types)| PastTypes { generation, types })
            .collect(),
            past_abilities: group_by_generation(row.pokemonabilitypasts.into_iter().filter_map(
                |p| {
                    let ability = Ability {
                        name: p.ability?.name,
                        hidden: p.is_hidden,
                    };
                    Some((p.generation?.name, ability))
                },
            ))
            .into_iter()
            .map(|(generation, abilities)| PastAbilities {
                generation,
                abilities,
            })
            .collect(),
        }
    }
}

// Rows arrive flat; consecutive or not, they are grouped by generation in
// first-seen order.
fn group_by_generation<T>(rows: impl IntoIterator<Item = (String, T)>) -> Vec<(String, Vec<T>)> {
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for (generation, value) in rows {
        match groups.iter_mut().find(|(g, _)| *g == generation) {
            Some((_, values)) => values.push(value),
            None => groups.push((generation, vec![value])),
        }
    }
    groups
}

fn cries(value: &Value) -> Cries {
    let url = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    Cries {
        latest: url("latest"),
        legacy: url("legacy"),
    }
}

#[derive(Debug, Deserialize)]
struct FlavorRow {
    flavor_text: String,
}

#[derive(Debug, Deserialize)]
struct GenusRow {
    genus: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EggGroupRow {
    egggroup: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct SpeciesRow {
    id: u32,
    name: String,
    base_happiness: Option<u32>,
    capture_rate: Option<u32>,
    hatch_counter: Option<u32>,
    #[serde(default)]
    is_baby: bool,
    #[serde(default)]
    is_legendary: bool,
    #[serde(default)]
    is_mythical: bool,
    growthrate: Option<Named>,
    pokemoncolor: Option<Named>,
    pokemonshape: Option<Named>,
    pokemonhabitat: Option<Named>,
    #[serde(default)]
    pokemonegggroups: Vec<EggGroupRow>,
    #[serde(default)]
    pokemonspeciesflavortexts: Vec<FlavorRow>,
    #[serde(default)]
    pokemonspeciesnames: Vec<GenusRow>,
}

#[derive(Debug, Deserialize)]
struct SpeciesData {
    pokemonspecies: Vec<SpeciesRow>,
}

impl From<SpeciesRow> for PokemonSpecies {
    fn from(row: SpeciesRow) -> Self {
        PokemonSpecies {
            id: row.id,
            name: row.name,
            genus: row
                .pokemonspeciesnames
                .into_iter()
                .find_map(|n| n.genus.filter(|g| !g.is_empty())),
            flavor_text: row
                .pokemonspeciesflavortexts
                .first()
                .map(|f| clean_flavor_text(&f.flavor_text)),
            is_legendary: row.is_legendary,
            is_mythical: row.is_mythical,
            is_baby: row.is_baby,
            capture_rate: row.capture_rate,
            base_happiness: row.base_happiness,
            hatch_counter: row.hatch_counter,
            growth_rate: row.growthrate.map(|n| n.name),
            egg_groups: row
                .pokemonegggroups
                .into_iter()
                .filter_map(|g| g.egggroup.map(|e| e.name))
                .collect(),
            habitat: row.pokemonhabitat.map(|n| n.name),
            color: row.pokemoncolor.map(|n| n.name),
            shape: row.pokemonshape.map(|n| n.name),
        }
    }
}

/// JSON columns (`sprites`, `cries`); some deployments return them as strings.
fn json_column(value: &Value, column: &str) -> Value {
    match value {
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(%err, column, "column is not valid JSON");
            Value::Null
        }),
        other => other.clone(),
    }
}

// Numeric input filters by id, anything else by lowercased name.
fn id_or_name_filter(id_or_name: &str) -> Value {
    let key = id_or_name.trim();
    match key.parse::<u32>() {
        Ok(id) => json!({ "id": { "_eq": id } }),
        Err(_) => json!({ "name": { "_eq": key.to_lowercase() } }),
    }
}

/// Escapes the `_ilike` wildcards so the query matches literally.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn list_query(kind: ResourceKind) -> String {
    let table = kind.path();
    format!(
        "query CatalogPage($limit: Int!, $offset: Int!, $where: {table}_bool_exp) {{\n  \
         items: {table}(limit: $limit, offset: $offset, where: $where, order_by: {{id: asc}}) {{ id name }}\n  \
         total: {table}_aggregate(where: $where) {{ aggregate {{ count }} }}\n}}"
    )
}

fn name_filter(query: Option<&str>) -> Value {
    match query {
        Some(q) if !q.is_empty() => json!({ "name": { "_ilike": format!("%{}%", escape_like(q)) } }),
        _ => json!({}),
    }
}

/// GraphQL-backed catalog source.
#[derive(Debug, Clone)]
pub struct GraphqlSource {
    client: reqwest::Client,
    endpoint: String,
    rest_base_url: String,
    kind: ResourceKind,
}

impl GraphqlSource {
    /// A source listing `kind` from the GraphQL `endpoint`.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            rest_base_url: super::rest::DEFAULT_BASE_URL.to_string(),
            kind,
        }
    }

    /// REST host used to build each item's `source_url` (builder pattern).
    pub fn with_rest_base_url(mut self, base: impl Into<String>) -> Self {
        self.rest_base_url = base.into();
        self
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, AdapterError> {
        let body = json!({ "query": query, "variables": variables });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| AdapterError::Transport {
                url: self.endpoint.clone(),
                source,
            })?;
        let envelope: Envelope<T> = read_json(&self.endpoint, response).await?;
        envelope.into_data()
    }
}

#[async_trait]
impl DataSource for GraphqlSource {
    fn name(&self) -> &'static str {
        "graphql"
    }

    fn preferred_paging(&self) -> Paging {
        Paging::ClientHeld
    }

    #[instrument(level = "debug", skip(self), fields(kind = %self.kind))]
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Page, AdapterError> {
        let variables = json!({
            "limit": limit,
            "offset": offset,
            "where": name_filter(query),
        });
        let data: ListData = self.post(&list_query(self.kind), variables).await?;
        let total_count = data.total.aggregate.map(|a| a.count).unwrap_or(0);
        debug!(rows = data.items.len(), total_count, "graphql page");

        let items: Vec<Item> = data
            .items
            .into_iter()
            .map(|row| Item::new(row.id, row.name, resource_url(&self.rest_base_url, self.kind, row.id)))
            .collect();
        Ok(Page {
            has_next: offset + items.len() < total_count,
            has_previous: offset > 0,
            items,
            total_count,
        })
    }
}

#[async_trait]
impl DetailSource for GraphqlSource {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_detail(&self, id_or_name: &str) -> Result<PokemonDetail, AdapterError> {
        let variables = json!({ "where": id_or_name_filter(id_or_name) });
        let data: DetailData = self.post(DETAIL_QUERY, variables).await?;
        data.pokemon
            .into_iter()
            .next()
            .map(PokemonDetail::from)
            .ok_or_else(|| AdapterError::NotFound {
                kind: "pokemon".to_string(),
                id: id_or_name.to_string(),
            })
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_species(&self, id_or_name: &str) -> Result<PokemonSpecies, AdapterError> {
        let variables = json!({ "where": id_or_name_filter(id_or_name) });
        let data: SpeciesData = self.post(SPECIES_QUERY, variables).await?;
        data.pokemonspecies
            .into_iter()
            .next()
            .map(PokemonSpecies::from)
            .ok_or_else(|| AdapterError::NotFound {
                kind: "pokemon-species".to_string(),
                id: id_or_name.to_string(),
            })
    }
}
