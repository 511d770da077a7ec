use crate::battle::compute_damage;
use crate::config::StatRanges;
use crate::roster::{SelectionPolicy, Trainer};
use crate::types::Species;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

fn clamp_stat(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// A single creature. Health, attack and defense are unsigned and every
/// setter clamps at zero, so they can never be observed negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combatant {
    name: String,
    species: Species,
    hp: u32,
    max_hp: u32,
    atk: u32,
    def: u32,
}

impl Combatant {
    pub fn new(name: impl Into<String>, species: Species, hp: i64, atk: i64, def: i64) -> Self {
        let hp = clamp_stat(hp);
        Combatant {
            name: name.into(),
            species,
            hp,
            max_hp: hp,
            atk: clamp_stat(atk),
            def: clamp_stat(def),
        }
    }

    /// Rolls attack in `1..=max_atk` and defense in `1..=max_def`; bots roll
    /// against scaled-down caps.
    pub fn random<R: Rng + ?Sized>(
        name: impl Into<String>,
        species: Species,
        ranges: &StatRanges,
        is_bot: bool,
        rng: &mut R,
    ) -> Self {
        let (max_atk, max_def) = ranges.caps(is_bot);
        let atk = rng.gen_range(1..=max_atk);
        let def = rng.gen_range(1..=max_def);
        Combatant::new(name, species, ranges.base_hp as i64, atk as i64, def as i64)
    }

    pub fn random_any<R: Rng + ?Sized>(
        name: impl Into<String>,
        ranges: &StatRanges,
        is_bot: bool,
        rng: &mut R,
    ) -> Self {
        let species = *Species::ALL.choose(rng).unwrap_or(&Species::Fire);
        Combatant::random(name, species, ranges, is_bot, rng)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn atk(&self) -> u32 {
        self.atk
    }

    pub fn def(&self) -> u32 {
        self.def
    }

    pub fn set_hp(&mut self, value: i64) {
        self.hp = clamp_stat(value);
    }

    pub fn set_atk(&mut self, value: i64) {
        self.atk = clamp_stat(value);
    }

    pub fn set_def(&mut self, value: i64) {
        self.def = clamp_stat(value);
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Greedy selection key.
    pub fn power(&self) -> u64 {
        self.atk as u64 + self.def as u64
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Resolves one attack against `target` and returns the health actually
    /// removed. No-op (returns 0) when either side is already fainted.
    pub fn attack(&self, target: &mut Combatant) -> u32 {
        let damage = compute_damage(self, target);
        if damage == 0 {
            return 0;
        }
        let before = target.hp;
        target.take_damage(damage);
        before - target.hp
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CombatantEntry {
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub hp: Option<i64>,
    #[serde(default)]
    pub atk: Option<i64>,
    #[serde(default)]
    pub def: Option<i64>,
}

impl CombatantEntry {
    /// Missing attack/defense are rolled with player caps; missing hp uses
    /// the configured base.
    pub fn build<R: Rng + ?Sized>(&self, ranges: &StatRanges, rng: &mut R) -> Combatant {
        let (max_atk, max_def) = ranges.caps(false);
        let hp = self.hp.unwrap_or(ranges.base_hp as i64);
        let atk = self
            .atk
            .unwrap_or_else(|| rng.gen_range(1..=max_atk) as i64);
        let def = self
            .def
            .unwrap_or_else(|| rng.gen_range(1..=max_def) as i64);
        Combatant::new(self.name.clone(), self.species, hp, atk, def)
    }
}

#[derive(Debug, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub policy: SelectionPolicy,
    #[serde(default)]
    pub combatants: Vec<CombatantEntry>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

impl RosterFile {
    /// Unrecognised top-level keys are logged and otherwise ignored.
    pub fn into_trainer<R: Rng + ?Sized>(self, ranges: &StatRanges, rng: &mut R) -> Trainer {
        let mut unknown: Vec<&str> = self.extras.keys().map(String::as_str).collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            warn!("Ignoring unknown roster keys: {}", unknown.join(", "));
        }
        let roster = self
            .combatants
            .iter()
            .map(|entry| entry.build(ranges, rng))
            .collect();
        Trainer::new(self.policy).with_roster(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn negative_stats_clamp_to_zero() {
        let mut c = Combatant::new("Ember", Species::Fire, -5, -1, -30);
        assert_eq!((c.hp(), c.atk(), c.def()), (0, 0, 0));
        assert!(c.is_fainted());
        c.set_hp(12);
        c.set_atk(-3);
        assert_eq!(c.hp(), 12);
        assert_eq!(c.atk(), 0);
        c.take_damage(40);
        assert_eq!(c.hp(), 0);
    }

    #[test]
    fn random_stats_stay_within_caps() {
        let ranges = StatRanges::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let (bot_atk, bot_def) = ranges.caps(true);
        for i in 0..200 {
            let c = Combatant::random_any(format!("Bot {i}"), &ranges, true, &mut rng);
            assert!((1..=bot_atk).contains(&c.atk()));
            assert!((1..=bot_def).contains(&c.def()));
            assert_eq!(c.hp(), ranges.base_hp);
        }
    }

    #[test]
    fn roster_entries_fill_missing_stats() {
        let raw = r#"{
            "policy": "greedy",
            "combatants": [
                {"name": "Squirt", "species": "water", "hp": 20, "atk": 10, "def": 5},
                {"name": "Leafy", "species": "grass"}
            ]
        }"#;
        let file: RosterFile = serde_json::from_str(raw).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let trainer = file.into_trainer(&StatRanges::default(), &mut rng);
        assert_eq!(trainer.policy(), SelectionPolicy::GreedyByPower);
        assert_eq!(trainer.len(), 2);
        let squirt = &trainer.roster()[0];
        assert_eq!((squirt.hp(), squirt.atk(), squirt.def()), (20, 10, 5));
        let leafy = &trainer.roster()[1];
        assert_eq!(leafy.hp(), StatRanges::default().base_hp);
        assert!(leafy.atk() >= 1);
    }

    #[test]
    fn unknown_roster_keys_are_collected_not_fatal() {
        let raw = r#"{
            "combatants": [{"name": "Sparky", "species": "electric"}],
            "notes": "starter box"
        }"#;
        let file: RosterFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.extras.len(), 1);
        assert!(file.extras.contains_key("notes"));
        let mut rng = SmallRng::seed_from_u64(2);
        let trainer = file.into_trainer(&StatRanges::default(), &mut rng);
        assert_eq!(trainer.policy(), SelectionPolicy::Arbitrary);
        assert_eq!(trainer.len(), 1);
    }
}
