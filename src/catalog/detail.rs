//! Normalized Pokemon detail and the display helpers the detail view uses.

use serde::{Deserialize, Serialize};

/// Sprite keys in display order. Only keys present upstream are kept.
pub const SPRITE_KEYS: [&str; 8] = [
    "front_default",
    "back_default",
    "front_shiny",
    "back_shiny",
    "front_female",
    "back_female",
    "front_shiny_female",
    "back_shiny_female",
];

/// Highest base stat value; stat bars are scaled against it.
pub const MAX_BASE_STAT: u32 = 255;

/// Moves listed on the detail screen; the rest are only counted.
pub const MOVES_SHOWN: usize = 50;

/// Everything the detail view shows about one Pokemon.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PokemonDetail {
    /// Numeric id.
    pub id: u32,
    /// Name as spelled upstream.
    pub name: String,
    /// Height in decimetres.
    pub height: Option<u32>,
    /// Weight in hectograms.
    pub weight: Option<u32>,
    /// Experience gained for defeating it.
    pub base_experience: Option<u32>,
    /// Type names in slot order.
    pub types: Vec<String>,
    /// Abilities in upstream order.
    pub abilities: Vec<Ability>,
    /// Base stats in upstream order.
    pub stats: Vec<Stat>,
    /// Available sprites in [`SPRITE_KEYS`] order.
    pub sprites: Vec<Sprite>,
    /// Species name, when known.
    pub species: Option<String>,
    /// Species id, used for the follow-up species fetch.
    pub species_id: Option<u32>,
    /// Learnable moves, one entry per move.
    pub moves: Vec<Move>,
    /// Form names.
    pub forms: Vec<String>,
    /// Items the Pokemon may hold in the wild.
    pub held_items: Vec<String>,
    /// Game versions it appears in.
    pub games: Vec<String>,
    /// Cry recordings.
    pub cries: Cries,
    /// Types it had in earlier generations.
    pub past_types: Vec<PastTypes>,
    /// Abilities it had in earlier generations.
    pub past_abilities: Vec<PastAbilities>,
}

/// One learnable move, with the first recorded way of learning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Move name, dashed.
    pub name: String,
    /// Level it is learned at; 0 upstream means not learned by level.
    pub level: Option<u32>,
    /// Learn method, e.g. `level-up` or `machine`.
    pub method: Option<String>,
}

/// Cry recordings (OGG URLs).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cries {
    /// Current cry.
    pub latest: Option<String>,
    /// Cry from the original games.
    pub legacy: Option<String>,
}

/// Types as they were up to a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastTypes {
    /// Generation name, e.g. `generation-v`.
    pub generation: String,
    /// Type names in slot order.
    pub types: Vec<String>,
}

/// Abilities as they were up to a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastAbilities {
    /// Generation name.
    pub generation: String,
    /// Abilities in upstream order.
    pub abilities: Vec<Ability>,
}

/// One ability entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// Ability name, dashed.
    pub name: String,
    /// Hidden abilities are shown with a marker.
    pub hidden: bool,
}

/// One base stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Stat name, dashed (`special-attack`).
    pub name: String,
    /// Base value.
    pub base: u32,
}

/// One sprite image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    /// Upstream key, e.g. `front_shiny`.
    pub key: String,
    /// Image URL.
    pub url: String,
}

impl PokemonDetail {
    /// Height in metres.
    pub fn height_m(&self) -> Option<f64> {
        self.height.map(|h| f64::from(h) / 10.0)
    }

    /// Weight in kilograms.
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.map(|w| f64::from(w) / 10.0)
    }

    /// Sum of all base stats.
    pub fn stat_total(&self) -> u32 {
        self.stats.iter().map(|s| s.base).sum()
    }

    /// The first [`MOVES_SHOWN`] moves.
    pub fn shown_moves(&self) -> &[Move] {
        &self.moves[..self.moves.len().min(MOVES_SHOWN)]
    }

    /// What to ask the species endpoint for: the species id when known,
    /// its name otherwise.
    pub fn species_key(&self) -> Option<String> {
        self.species_id
            .map(|id| id.to_string())
            .or_else(|| self.species.clone())
    }
}

/// Keeps the first entry per move name, preserving order.
pub fn dedup_moves(moves: impl IntoIterator<Item = Move>) -> Vec<Move> {
    let mut seen = std::collections::HashSet::new();
    moves
        .into_iter()
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}

/// Picks the present, non-null sprite URLs out of an upstream `sprites`
/// object, in [`SPRITE_KEYS`] order.
pub fn collect_sprites(sprites: &serde_json::Value) -> Vec<Sprite> {
    SPRITE_KEYS
        .iter()
        .filter_map(|key| {
            sprites
                .get(*key)
                .and_then(|v| v.as_str())
                .filter(|url| !url.is_empty())
                .map(|url| Sprite {
                    key: (*key).to_string(),
                    url: url.to_string(),
                })
        })
        .collect()
}

/// `special-attack` → `Special Attack`.
pub fn format_stat_name(name: &str) -> String {
    title_case(&name.replace('-', " "))
}

/// `front_shiny_female` → `Front Shiny Female`.
pub fn format_sprite_key(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// `solar-power` → `solar power`. Used for every dashed upstream name
/// shown as plain text.
pub fn humanize(name: &str) -> String {
    name.replace('-', " ")
}

/// `generation-iii` → `GENERATION III`.
pub fn format_generation(name: &str) -> String {
    humanize(name).to_uppercase()
}

/// Share of [`MAX_BASE_STAT`] in percent, capped at 100.
pub fn stat_percentage(base: u32) -> f64 {
    (f64::from(base) / f64::from(MAX_BASE_STAT) * 100.0).min(100.0)
}

/// Badge colour for a type name; unknown types get a neutral grey.
pub fn type_color(type_name: &str) -> &'static str {
    match type_name.to_ascii_lowercase().as_str() {
        "bug" => "#A3E635",
        "dark" => "#374151",
        "dragon" => "#4F46E5",
        "electric" => "#FACC15",
        "fairy" => "#FDA4AF",
        "fighting" => "#EA580C",
        "fire" => "#F87171",
        "flying" => "#A5B4FC",
        "ghost" => "#8B5CF6",
        "grass" => "#4ADE80",
        "ground" => "#D97706",
        "ice" => "#67E8F9",
        "normal" => "#D1D5DB",
        "poison" => "#C084FC",
        "psychic" => "#F472B6",
        "rock" => "#78716C",
        "steel" => "#94A3B8",
        "water" => "#60A5FA",
        _ => "#E5E7EB",
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_names() {
        assert_eq!(format_stat_name("special-attack"), "Special Attack");
        assert_eq!(format_stat_name("hp"), "Hp");
        assert_eq!(format_sprite_key("back_shiny_female"), "Back Shiny Female");
        assert_eq!(humanize("solar-power"), "solar power");
        assert_eq!(format_generation("generation-iii"), "GENERATION III");
    }

    #[test]
    fn stat_percentage_is_capped() {
        assert_eq!(stat_percentage(0), 0.0);
        assert_eq!(stat_percentage(255), 100.0);
        assert_eq!(stat_percentage(300), 100.0);
        assert!((stat_percentage(51) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn collects_sprites_in_display_order() {
        let sprites = json!({
            "back_default": "b.png",
            "front_default": "f.png",
            "front_female": null,
            "other": { "home": {} },
            "front_shiny": ""
        });
        let collected = collect_sprites(&sprites);
        let keys: Vec<_> = collected.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["front_default", "back_default"]);
    }

    #[test]
    fn unit_conversions() {
        let detail = PokemonDetail {
            id: 25,
            name: "pikachu".into(),
            height: Some(4),
            weight: Some(60),
            base_experience: Some(112),
            types: vec!["electric".into()],
            abilities: vec![],
            stats: vec![
                Stat { name: "hp".into(), base: 35 },
                Stat { name: "speed".into(), base: 90 },
            ],
            species: Some("pikachu".into()),
            ..PokemonDetail::default()
        };
        assert_eq!(detail.height_m(), Some(0.4));
        assert_eq!(detail.weight_kg(), Some(6.0));
        assert_eq!(detail.stat_total(), 125);
        assert_eq!(type_color("Electric"), "#FACC15");
        assert_eq!(type_color("shadow"), "#E5E7EB");
    }

    #[test]
    fn moves_are_capped_and_deduplicated() {
        let moves = (0..60).flat_map(|i| {
            let entry = Move {
                name: format!("move-{i}"),
                level: Some(i),
                method: Some("level-up".into()),
            };
            [entry.clone(), Move { level: None, ..entry }]
        });
        let detail = PokemonDetail {
            moves: dedup_moves(moves),
            ..PokemonDetail::default()
        };
        assert_eq!(detail.moves.len(), 60);
        assert_eq!(detail.moves[1].level, Some(1));
        assert_eq!(detail.shown_moves().len(), MOVES_SHOWN);
        assert!(PokemonDetail::default().shown_moves().is_empty());
    }

    #[test]
    fn species_key_prefers_id() {
        let mut detail = PokemonDetail {
            species: Some("pikachu".into()),
            ..PokemonDetail::default()
        };
        assert_eq!(detail.species_key().as_deref(), Some("pikachu"));
        detail.species_id = Some(25);
        assert_eq!(detail.species_key().as_deref(), Some("25"));
    }
}
