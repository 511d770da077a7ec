use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RosterError {
    #[error("Insufficient roster: requested {requested} combatants but only {available} available")]
    InsufficientRoster { requested: usize, available: usize },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("Unknown species: {0}")]
pub struct SpeciesParseError(pub String);

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("Unknown selection policy: {0} (use arbitrary, greedy or constrained)")]
pub struct PolicyParseError(pub String);
