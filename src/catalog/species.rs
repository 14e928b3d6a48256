//! Species data shown alongside a Pokemon's detail.

use serde::{Deserialize, Serialize};

/// Steps per egg cycle; `hatch_counter` counts cycles.
pub const STEPS_PER_EGG_CYCLE: u32 = 255;

/// Species-level facts for the detail header and the "more" tab.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PokemonSpecies {
    /// Species id.
    pub id: u32,
    /// Species name.
    pub name: String,
    /// English genus, e.g. `Lizard Pokémon`.
    pub genus: Option<String>,
    /// First English flavor text, already cleaned.
    pub flavor_text: Option<String>,
    /// Legendary species.
    pub is_legendary: bool,
    /// Mythical species.
    pub is_mythical: bool,
    /// Baby species.
    pub is_baby: bool,
    /// Capture rate out of 255.
    pub capture_rate: Option<u32>,
    /// Base happiness out of 255.
    pub base_happiness: Option<u32>,
    /// Egg cycles to hatch.
    pub hatch_counter: Option<u32>,
    /// Growth rate name.
    pub growth_rate: Option<String>,
    /// Egg group names.
    pub egg_groups: Vec<String>,
    /// Habitat name.
    pub habitat: Option<String>,
    /// Pokedex colour.
    pub color: Option<String>,
    /// Body shape.
    pub shape: Option<String>,
}

impl PokemonSpecies {
    /// Steps needed to hatch an egg of this species.
    pub fn hatch_steps(&self) -> Option<u32> {
        self.hatch_counter
            .map(|c| c.saturating_mul(STEPS_PER_EGG_CYCLE))
    }

    /// Badge labels for the header, in display order.
    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = Vec::new();
        if self.is_legendary {
            badges.push("Legendary");
        }
        if self.is_mythical {
            badges.push("Mythical");
        }
        if self.is_baby {
            badges.push("Baby");
        }
        badges
    }
}

/// Flavor text from the games contains form feeds and hard line breaks.
/// Both become single spaces.
pub fn clean_flavor_text(text: &str) -> String {
    text.replace(['\u{c}', '\n', '\r'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
