use crate::config::StatRanges;
use crate::error::{PolicyParseError, RosterError};
use crate::model::Combatant;
use crate::types::Species;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Capability a battle needs from each side: hand over a team, take
/// combatants back, keep a win counter.
pub trait Pool {
    /// Removes and returns up to `n` combatants, front = first to fight.
    fn draw_team(&mut self, n: usize) -> Result<Vec<Combatant>, RosterError>;

    fn return_combatant(&mut self, combatant: Combatant);

    fn wins(&self) -> u32;

    fn wins_mut(&mut self) -> &mut u32;
}

impl<P: Pool + ?Sized> Pool for &mut P {
    fn draw_team(&mut self, n: usize) -> Result<Vec<Combatant>, RosterError> {
        (**self).draw_team(n)
    }

    fn return_combatant(&mut self, combatant: Combatant) {
        (**self).return_combatant(combatant)
    }

    fn wins(&self) -> u32 {
        (**self).wins()
    }

    fn wins_mut(&mut self) -> &mut u32 {
        (**self).wins_mut()
    }
}

impl<P: Pool + ?Sized> Pool for Box<P> {
    fn draw_team(&mut self, n: usize) -> Result<Vec<Combatant>, RosterError> {
        (**self).draw_team(n)
    }

    fn return_combatant(&mut self, combatant: Combatant) {
        (**self).return_combatant(combatant)
    }

    fn wins(&self) -> u32 {
        (**self).wins()
    }

    fn wins_mut(&mut self) -> &mut u32 {
        (**self).wins_mut()
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// First `n` in pool order.
    #[default]
    #[serde(rename = "arbitrary")]
    Arbitrary,
    /// Highest `atk + def` first, ties keep pool order.
    #[serde(rename = "greedy")]
    GreedyByPower,
    /// Greedy on `(atk + def, atk, def)`, filling with non-Fire combatants
    /// before falling back to Fire ones.
    #[serde(rename = "constrained")]
    SpeciesConstrained,
}

impl SelectionPolicy {
    pub const ALL: [SelectionPolicy; 3] = [
        SelectionPolicy::Arbitrary,
        SelectionPolicy::GreedyByPower,
        SelectionPolicy::SpeciesConstrained,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SelectionPolicy::Arbitrary => "arbitrary",
            SelectionPolicy::GreedyByPower => "greedy",
            SelectionPolicy::SpeciesConstrained => "constrained",
        }
    }

    /// Moves the selected team out of `roster`. Whatever stays behind keeps
    /// its original relative order.
    pub fn draw(
        self,
        roster: &mut Vec<Combatant>,
        n: usize,
    ) -> Result<Vec<Combatant>, RosterError> {
        let picks = match self {
            SelectionPolicy::Arbitrary => (0..n.min(roster.len())).collect(),
            SelectionPolicy::GreedyByPower => {
                let mut order: Vec<usize> = (0..roster.len()).collect();
                order.sort_by_key(|&idx| Reverse(roster[idx].power()));
                order.truncate(n);
                order
            }
            SelectionPolicy::SpeciesConstrained => constrained_picks(roster, n)?,
        };
        Ok(take_indices(roster, &picks))
    }
}

impl FromStr for SelectionPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arbitrary" | "easy" => Ok(SelectionPolicy::Arbitrary),
            "greedy" | "medium" => Ok(SelectionPolicy::GreedyByPower),
            "constrained" | "hard" => Ok(SelectionPolicy::SpeciesConstrained),
            _ => Err(PolicyParseError(s.to_string())),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn constrained_picks(roster: &[Combatant], n: usize) -> Result<Vec<usize>, RosterError> {
    let insufficient = RosterError::InsufficientRoster {
        requested: n,
        available: roster.len(),
    };
    if roster.len() < n {
        return Err(insufficient);
    }
    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.sort_by_key(|&idx| {
        let c = &roster[idx];
        Reverse((c.power(), c.atk(), c.def()))
    });
    let (fire, non_fire): (Vec<usize>, Vec<usize>) = order
        .into_iter()
        .partition(|&idx| roster[idx].species() == Species::Fire);

    let mut picks: Vec<usize> = non_fire.into_iter().take(n).collect();
    let mut fallback = fire.into_iter();
    while picks.len() < n {
        match fallback.next() {
            Some(idx) => picks.push(idx),
            None => return Err(insufficient),
        }
    }
    Ok(picks)
}

/// Extracts `picks` (in that order) and compacts the rest in place.
fn take_indices(roster: &mut Vec<Combatant>, picks: &[usize]) -> Vec<Combatant> {
    let mut slots: Vec<Option<Combatant>> = roster.drain(..).map(Some).collect();
    let team = picks
        .iter()
        .filter_map(|&idx| slots.get_mut(idx).and_then(Option::take))
        .collect();
    roster.extend(slots.into_iter().flatten());
    team
}

/// The standard pool: an unordered box of combatants drawn from with a
/// fixed selection policy.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    policy: SelectionPolicy,
    roster: Vec<Combatant>,
    wins: u32,
}

impl Trainer {
    pub fn new(policy: SelectionPolicy) -> Self {
        Trainer {
            policy,
            roster: Vec::new(),
            wins: 0,
        }
    }

    pub fn with_roster(mut self, roster: Vec<Combatant>) -> Self {
        self.roster = roster;
        self
    }

    pub fn add(&mut self, combatant: Combatant) {
        self.roster.push(combatant);
    }

    pub fn roster(&self) -> &[Combatant] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    /// Drops defeated combatants out of the box and hands them to the caller.
    pub fn release_fainted(&mut self) -> Vec<Combatant> {
        let (fainted, alive): (Vec<Combatant>, Vec<Combatant>) =
            self.roster.drain(..).partition(Combatant::is_fainted);
        self.roster = alive;
        fainted
    }

    /// Tops the box up to `target` with freshly rolled bot combatants.
    /// Returns how many were added.
    pub fn replenish<R: Rng + ?Sized>(
        &mut self,
        target: usize,
        ranges: &StatRanges,
        rng: &mut R,
    ) -> usize {
        let mut added = 0;
        while self.roster.len() < target {
            let name = format!("Bot {}", self.roster.len() + 1);
            self.roster.push(Combatant::random_any(name, ranges, true, rng));
            added += 1;
        }
        added
    }
}

impl Pool for Trainer {
    fn draw_team(&mut self, n: usize) -> Result<Vec<Combatant>, RosterError> {
        self.policy.draw(&mut self.roster, n)
    }

    fn return_combatant(&mut self, combatant: Combatant) {
        self.roster.push(combatant);
    }

    fn wins(&self) -> u32 {
        self.wins
    }

    fn wins_mut(&mut self) -> &mut u32 {
        &mut self.wins
    }
}
