use crate::battle::{BattleResult, Side};
use crate::model::Combatant;
use serde_json::json;

/// Pipe-delimited transcript of one battle.
#[derive(Clone, Debug, Default)]
pub struct BattleLog {
    log: Vec<String>,
}

pub fn combatant_ident(side: Side, combatant: &Combatant) -> String {
    format!("{}: {}", side.label(), combatant.name())
}

impl BattleLog {
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    pub fn log_start(&mut self, team_a: usize, team_b: usize) {
        self.log.push(format!("|start|{team_a}|{team_b}"));
    }

    pub fn log_turn(&mut self, turn: u32) {
        self.log.push(format!("|turn|{turn}"));
    }

    pub fn log_attack(&mut self, attacker: &str, defender: &str, damage: u32) {
        self.log.push(format!("|attack|{attacker}|{defender}|{damage}"));
    }

    pub fn log_damage(&mut self, target: &str, hp: u32, max_hp: u32) {
        self.log.push(format!("|-damage|{target}|{hp}/{max_hp}"));
    }

    pub fn log_faint(&mut self, target: &str) {
        self.log.push(format!("|faint|{target}"));
    }

    pub fn log_result(&mut self, result: BattleResult) {
        match result {
            BattleResult::AWins => self.log.push(format!("|win|{}", Side::A.label())),
            BattleResult::BWins => self.log.push(format!("|win|{}", Side::B.label())),
            BattleResult::Aborted => self.log.push("|abort|".to_string()),
        }
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({ "log": self.log })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Species;

    #[test]
    fn records_lines_in_order() {
        let squirt = Combatant::new("Squirt", Species::Water, 20, 10, 5);
        let mut log = BattleLog::new();
        log.log_start(1, 1);
        log.log_turn(1);
        log.log_attack(&combatant_ident(Side::A, &squirt), "p2: Ember", 25);
        log.log_faint("p2: Ember");
        log.log_result(BattleResult::AWins);
        assert_eq!(
            log.log_lines(),
            &[
                "|start|1|1",
                "|turn|1",
                "|attack|p1: Squirt|p2: Ember|25",
                "|faint|p2: Ember",
                "|win|p1",
            ]
        );
        assert_eq!(log.to_json()["log"].as_array().map(Vec::len), Some(5));
    }
}
