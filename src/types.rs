use crate::error::SpeciesParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Electric,
    Fire,
    Grass,
    Water,
}

impl Species {
    pub const ALL: [Species; 4] = [
        Species::Electric,
        Species::Fire,
        Species::Grass,
        Species::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Species::Electric => "electric",
            Species::Fire => "fire",
            Species::Grass => "grass",
            Species::Water => "water",
        }
    }
}

static SPECIES_BY_NAME: phf::Map<&'static str, Species> = phf::phf_map! {
    "electric" => Species::Electric,
    "fire" => Species::Fire,
    "grass" => Species::Grass,
    "water" => Species::Water,
};

impl FromStr for Species {
    type Err = SpeciesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        SPECIES_BY_NAME
            .get(key.as_str())
            .copied()
            .ok_or_else(|| SpeciesParseError(s.to_string()))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the defender's defense is treated for a single attack.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DefenseRule {
    Unchanged,
    /// Integer floor division by two.
    Halved,
    /// Defense counts as zero.
    Ignored,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DamageModifier {
    pub attack_multiplier: u32,
    pub defense: DefenseRule,
}

impl DamageModifier {
    pub const NEUTRAL: DamageModifier = DamageModifier {
        attack_multiplier: 1,
        defense: DefenseRule::Unchanged,
    };

    pub fn effective_attack(&self, atk: u32) -> u32 {
        atk.saturating_mul(self.attack_multiplier)
    }

    pub fn effective_defense(&self, def: u32) -> u32 {
        match self.defense {
            DefenseRule::Unchanged => def,
            DefenseRule::Halved => def / 2,
            DefenseRule::Ignored => 0,
        }
    }
}

/// Only the attacker's species rule fires; the defender's own species never
/// changes how it is hit beyond being the trigger.
pub fn damage_modifier(attacker: Species, defender: Species) -> DamageModifier {
    match (attacker, defender) {
        (Species::Water, Species::Fire) => DamageModifier {
            attack_multiplier: 3,
            defense: DefenseRule::Unchanged,
        },
        (Species::Grass, Species::Fire) => DamageModifier {
            attack_multiplier: 1,
            defense: DefenseRule::Halved,
        },
        (Species::Electric, Species::Water) => DamageModifier {
            attack_multiplier: 1,
            defense: DefenseRule::Ignored,
        },
        _ => DamageModifier::NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Water".parse::<Species>().unwrap(), Species::Water);
        assert_eq!(" ELECTRIC ".parse::<Species>().unwrap(), Species::Electric);
        assert!("dragon".parse::<Species>().is_err());
    }

    #[test]
    fn only_listed_matchups_are_modified() {
        for attacker in Species::ALL {
            for defender in Species::ALL {
                let m = damage_modifier(attacker, defender);
                let special = matches!(
                    (attacker, defender),
                    (Species::Water, Species::Fire)
                        | (Species::Grass, Species::Fire)
                        | (Species::Electric, Species::Water)
                );
                assert_eq!(m != DamageModifier::NEUTRAL, special, "{attacker} vs {defender}");
            }
        }
    }

    #[test]
    fn fire_has_no_rule() {
        for defender in Species::ALL {
            assert_eq!(damage_modifier(Species::Fire, defender), DamageModifier::NEUTRAL);
        }
    }

    #[test]
    fn halved_defense_floors() {
        let m = damage_modifier(Species::Grass, Species::Fire);
        assert_eq!(m.effective_defense(5), 2);
        assert_eq!(m.effective_defense(4), 2);
        assert_eq!(m.effective_attack(10), 10);
    }
}
