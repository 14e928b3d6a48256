//! Catalog entries as every data source delivers them.
//!
//! Upstream REST and GraphQL responses have different shapes. Adapters
//! normalize both into [`Item`] so the view model never sees the difference.

pub mod detail;
pub mod species;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use detail::{Ability, Cries, Move, PastAbilities, PastTypes, PokemonDetail, Sprite, Stat};
pub use species::PokemonSpecies;

/// Base of the public sprite repository used for list thumbnails.
pub const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// The PokeAPI collection a catalog lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Creatures, `/api/v2/pokemon/`.
    #[default]
    Pokemon,
    /// Berries, `/api/v2/berry/`.
    Berry,
    /// Locations, `/api/v2/location/`.
    Location,
}

impl ResourceKind {
    /// Every collection, in the order the front end cycles through them.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Pokemon,
        ResourceKind::Berry,
        ResourceKind::Location,
    ];

    /// The collection after this one, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// The collection before this one, wrapping around.
    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Path segment of the REST endpoint and name of the GraphQL table.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Pokemon => "pokemon",
            ResourceKind::Berry => "berry",
            ResourceKind::Location => "location",
        }
    }

    /// Heading shown above the list.
    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Pokemon => "Pokemon",
            ResourceKind::Berry => "Berries",
            ResourceKind::Location => "Locations",
        }
    }

    /// Noun for result counts, singular or plural.
    pub fn noun(self, count: usize) -> &'static str {
        match (self, count == 1) {
            (ResourceKind::Pokemon, _) => "pokemon",
            (ResourceKind::Berry, true) => "berry",
            (ResourceKind::Berry, false) => "berries",
            (ResourceKind::Location, true) => "location",
            (ResourceKind::Location, false) => "locations",
        }
    }

    /// Whether a detail view exists for this collection.
    pub fn has_detail(self) -> bool {
        matches!(self, ResourceKind::Pokemon)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pokemon" => Ok(ResourceKind::Pokemon),
            "berry" | "berries" => Ok(ResourceKind::Berry),
            "location" | "locations" => Ok(ResourceKind::Location),
            other => Err(format!("unknown resource '{other}'")),
        }
    }
}

/// A reference to a single catalog entry.
///
/// `id` is always a non-negative integer string. When a source only hands
/// out resource URLs, the id is the last numeric path segment of the URL.
///
/// # Examples
///
/// ```rust
/// use pokemonster::catalog::Item;
///
/// let item = Item::from_resource("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
/// assert_eq!(item.id, "25");
/// assert_eq!(item.display_number(4), "#0025");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Numeric id as a string.
    pub id: String,
    /// Entry name, lowercase with dashes as upstream spells it.
    pub name: String,
    /// REST URL of the entry.
    pub source_url: String,
}

impl Item {
    /// Creates an item from already known parts.
    pub fn new(id: u32, name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
            source_url: source_url.into(),
        }
    }

    /// Creates an item from a named resource reference, deriving the id
    /// from the URL. URLs without a numeric segment yield id `"0"`.
    pub fn from_resource(name: impl Into<String>, url: impl Into<String>) -> Self {
        let source_url = url.into();
        let id = parse_id(&source_url).unwrap_or(0);
        Self {
            id: id.to_string(),
            name: name.into(),
            source_url,
        }
    }

    /// The id as a number.
    pub fn numeric_id(&self) -> u32 {
        self.id.parse().unwrap_or(0)
    }

    /// `#` followed by the id zero-padded to `width` digits.
    pub fn display_number(&self, width: usize) -> String {
        format!("#{:0>width$}", self.id, width = width)
    }

    /// Front sprite of the entry in the public sprite repository.
    pub fn sprite_url(&self) -> String {
        format!("{}/{}.png", SPRITE_BASE_URL, self.id)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_number(4), self.name)
    }
}

/// Extracts the numeric id from a PokeAPI resource URL.
///
/// The last non-empty path segment must be all digits, so both
/// `.../pokemon/25/` and `.../pokemon/25` parse while `.../pokemon/` does not.
pub fn parse_id(url: &str) -> Option<u32> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}

/// REST URL of an entry, used to give GraphQL items the same shape as REST
/// ones.
pub fn resource_url(rest_base: &str, kind: ResourceKind, id: u32) -> String {
    format!(
        "{}/api/v2/{}/{}/",
        rest_base.trim_end_matches('/'),
        kind.path(),
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_with_and_without_trailing_slash() {
        assert_eq!(parse_id("https://pokeapi.co/api/v2/pokemon/25/"), Some(25));
        assert_eq!(parse_id("https://pokeapi.co/api/v2/berry/7"), Some(7));
        assert_eq!(parse_id("https://pokeapi.co/api/v2/pokemon/10001/?x=1"), Some(10001));
    }

    #[test]
    fn rejects_urls_without_numeric_segment() {
        assert_eq!(parse_id("https://pokeapi.co/api/v2/pokemon/"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("https://pokeapi.co/api/v2/pokemon/pikachu/"), None);
    }

    #[test]
    fn item_without_numeric_url_gets_zero_id() {
        let item = Item::from_resource("missingno", "https://example.invalid/");
        assert_eq!(item.id, "0");
        assert_eq!(item.numeric_id(), 0);
    }

    #[test]
    fn display_number_pads() {
        let item = Item::new(7, "squirtle", "https://pokeapi.co/api/v2/pokemon/7/");
        assert_eq!(item.display_number(3), "#007");
        assert_eq!(item.to_string(), "#0007 squirtle");
        assert_eq!(
            item.sprite_url(),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/7.png"
        );
    }

    #[test]
    fn resource_kind_round_trips_through_str() {
        for kind in [ResourceKind::Pokemon, ResourceKind::Berry, ResourceKind::Location] {
            assert_eq!(kind.path().parse::<ResourceKind>(), Ok(kind));
        }
        assert_eq!("Berries".parse::<ResourceKind>(), Ok(ResourceKind::Berry));
        assert!("items".parse::<ResourceKind>().is_err());
        assert_eq!(ResourceKind::Berry.noun(1), "berry");
        assert_eq!(ResourceKind::Berry.noun(3), "berries");
    }

    #[test]
    fn resource_kind_cycles_both_ways() {
        assert_eq!(ResourceKind::Pokemon.next(), ResourceKind::Berry);
        assert_eq!(ResourceKind::Location.next(), ResourceKind::Pokemon);
        assert_eq!(ResourceKind::Pokemon.previous(), ResourceKind::Location);
        for kind in ResourceKind::ALL {
            assert_eq!(kind.next().previous(), kind);
        }
    }

    #[test]
    fn resource_url_normalizes_base() {
        assert_eq!(
            resource_url("https://pokeapi.co/", ResourceKind::Pokemon, 25),
            "https://pokeapi.co/api/v2/pokemon/25/"
        );
    }
}
