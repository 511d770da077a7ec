use crate::battle_log::{combatant_ident, BattleLog};
use crate::config::BattleConfig;
use crate::error::RosterError;
use crate::model::Combatant;
use crate::roster::Pool;
use crate::types::damage_modifier;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "p1",
            Side::B => "p2",
        }
    }

    fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    fn victory(self) -> BattleResult {
        match self {
            Side::A => BattleResult::AWins,
            Side::B => BattleResult::BWins,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BattleResult {
    AWins,
    BWins,
    /// Cancelled or undecided; credits nobody.
    Aborted,
}

impl BattleResult {
    pub fn winner(self) -> Option<Side> {
        match self {
            BattleResult::AWins => Some(Side::A),
            BattleResult::BWins => Some(Side::B),
            BattleResult::Aborted => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BattleStatus {
    NotStarted,
    Running,
    Finished(BattleResult),
}

/// One resolved attack, as reported by [`Battle::update`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Action {
    pub attacker: Side,
    pub damage: u32,
    pub defender_fainted: bool,
    /// Set when this attack emptied the defending team.
    pub result: Option<BattleResult>,
}

/// Base damage `atk - def` with the attacker's species rule applied, floored
/// at 1. Zero when either combatant is already fainted.
pub fn compute_damage(attacker: &Combatant, defender: &Combatant) -> u32 {
    if attacker.is_fainted() || defender.is_fainted() {
        return 0;
    }
    let modifier = damage_modifier(attacker.species(), defender.species());
    let atk = modifier.effective_attack(attacker.atk());
    let def = modifier.effective_defense(defender.def());
    atk.saturating_sub(def).max(1)
}

struct Corner<'p> {
    pool: &'p mut dyn Pool,
    team: VecDeque<Combatant>,
    fallen: Vec<Combatant>,
}

impl<'p> Corner<'p> {
    fn new(pool: &'p mut dyn Pool, team: Vec<Combatant>) -> Self {
        Corner {
            pool,
            team: team.into(),
            fallen: Vec::new(),
        }
    }

    /// Keeps the invariant that the front fighter is alive or the team is
    /// empty.
    fn park_fainted_front(&mut self) {
        while self.team.front().is_some_and(Combatant::is_fainted) {
            if let Some(fainted) = self.team.pop_front() {
                self.fallen.push(fainted);
            }
        }
    }

    fn return_all(&mut self) {
        for combatant in self.team.drain(..).chain(self.fallen.drain(..)) {
            self.pool.return_combatant(combatant);
        }
    }
}

/// Turn-based battle between two teams, advanced by polling [`Battle::update`].
///
/// While running, the battle holds mutable borrows of both pools; everything
/// drawn from a pool is handed back to it by [`Battle::finish`].
pub struct Battle<'p> {
    config: BattleConfig,
    status: BattleStatus,
    corners: Option<[Corner<'p>; 2]>,
    turn: Side,
    last_action_ms: u64,
    turns_resolved: u32,
    log: BattleLog,
}

impl<'p> Battle<'p> {
    pub fn new(config: BattleConfig) -> Self {
        Battle {
            config,
            status: BattleStatus::NotStarted,
            corners: None,
            turn: Side::A,
            last_action_ms: 0,
            turns_resolved: 0,
            log: BattleLog::new(),
        }
    }

    /// Draws both teams and starts the clock. Ignored unless the battle has
    /// never been started. If side B cannot field a team, side A's team goes
    /// back to its pool and the battle stays unstarted.
    pub fn start(
        &mut self,
        pool_a: &'p mut dyn Pool,
        pool_b: &'p mut dyn Pool,
        now_ms: u64,
    ) -> Result<(), RosterError> {
        if self.status != BattleStatus::NotStarted {
            warn!("Ignoring start request: battle is {:?}", self.status);
            return Ok(());
        }

        let n = self.config.team_size;
        let team_a = pool_a.draw_team(n)?;
        let team_b = match pool_b.draw_team(n) {
            Ok(team) => team,
            Err(err) => {
                for combatant in team_a {
                    pool_a.return_combatant(combatant);
                }
                return Err(err);
            }
        };

        self.log.log_start(team_a.len(), team_b.len());
        info!(
            "Battle started: {} vs {} combatants (team size {})",
            team_a.len(),
            team_b.len(),
            n
        );

        let mut corners = [Corner::new(pool_a, team_a), Corner::new(pool_b, team_b)];
        for corner in corners.iter_mut() {
            corner.park_fainted_front();
        }
        let fielded = (!corners[0].team.is_empty(), !corners[1].team.is_empty());
        self.corners = Some(corners);
        self.turn = Side::A;
        self.status = BattleStatus::Running;
        self.last_action_ms = now_ms;

        match fielded {
            (true, true) => {}
            (true, false) => self.finish(BattleResult::AWins),
            (false, true) => self.finish(BattleResult::BWins),
            (false, false) => self.finish(BattleResult::Aborted),
        }
        Ok(())
    }

    /// Resolves at most one attack, and only once more than `hit_delay_ms`
    /// has passed since the previous one. Never blocks.
    pub fn update(&mut self, now_ms: u64) -> Option<Action> {
        if self.status != BattleStatus::Running {
            return None;
        }
        if now_ms.saturating_sub(self.last_action_ms) <= self.config.hit_delay_ms {
            return None;
        }
        self.last_action_ms = now_ms;

        let side = self.turn;
        let (attacking, defending) = self.corners_mut(side)?;
        let striker = attacking.team.front()?;
        let target = defending.team.front_mut()?;

        let damage = striker.attack(target);
        let striker_id = combatant_ident(side, striker);
        let target_id = combatant_ident(side.opponent(), target);
        let (hp, max_hp) = (target.hp(), target.max_hp());
        let defender_fainted = target.is_fainted();
        if defender_fainted {
            defending.park_fainted_front();
        }
        let exhausted = defending.team.is_empty();

        self.turns_resolved += 1;
        self.log.log_turn(self.turns_resolved);
        self.log.log_attack(&striker_id, &target_id, damage);
        self.log.log_damage(&target_id, hp, max_hp);
        debug!(
            "Turn {}: {} hits {} for {} ({}/{})",
            self.turns_resolved, striker_id, target_id, damage, hp, max_hp
        );
        if defender_fainted {
            self.log.log_faint(&target_id);
            debug!("{} fainted", target_id);
        }

        let result = if exhausted {
            let result = side.victory();
            self.finish(result);
            Some(result)
        } else {
            self.turn = side.opponent();
            None
        };

        Some(Action {
            attacker: side,
            damage,
            defender_fainted,
            result,
        })
    }

    /// Ends a running battle: every combatant goes back to the pool it came
    /// from and a decisive result credits exactly one win. Later calls do
    /// nothing.
    pub fn finish(&mut self, result: BattleResult) {
        if self.status != BattleStatus::Running {
            return;
        }
        self.status = BattleStatus::Finished(result);

        if let Some(corners) = self.corners.as_mut() {
            for corner in corners.iter_mut() {
                corner.return_all();
            }
            if let Some(winner) = result.winner() {
                *corners[winner.index()].pool.wins_mut() += 1;
            }
        }
        self.log.log_result(result);
        info!(
            "Battle finished after {} turns: {:?}",
            self.turns_resolved, result
        );
    }

    /// `(attacker, defender)` for the pending turn, for presentation only.
    pub fn current_pair(&self) -> Option<(&Combatant, &Combatant)> {
        if self.status != BattleStatus::Running {
            return None;
        }
        let attacker = self.corner(self.turn)?.team.front()?;
        let defender = self.corner(self.turn.opponent())?.team.front()?;
        Some((attacker, defender))
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == BattleStatus::Running
    }

    pub fn result(&self) -> Option<BattleResult> {
        match self.status {
            BattleStatus::Finished(result) => Some(result),
            _ => None,
        }
    }

    /// Side to move next. Meaningless once the battle has finished.
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn team(&self, side: Side) -> impl Iterator<Item = &Combatant> + '_ {
        self.corner(side).map(|corner| &corner.team).into_iter().flatten()
    }

    pub fn team_len(&self, side: Side) -> usize {
        self.corner(side).map_or(0, |corner| corner.team.len())
    }

    pub fn fallen(&self, side: Side) -> &[Combatant] {
        self.corner(side)
            .map(|corner| corner.fallen.as_slice())
            .unwrap_or(&[])
    }

    /// Win counter of the pool bound to `side`, once started.
    pub fn wins(&self, side: Side) -> Option<u32> {
        self.corner(side).map(|corner| corner.pool.wins())
    }

    pub fn turns_resolved(&self) -> u32 {
        self.turns_resolved
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn take_log(&mut self) -> BattleLog {
        std::mem::take(&mut self.log)
    }

    fn corner(&self, side: Side) -> Option<&Corner<'p>> {
        self.corners.as_ref().map(|corners| &corners[side.index()])
    }

    fn corners_mut(&mut self, side: Side) -> Option<(&mut Corner<'p>, &mut Corner<'p>)> {
        let [a, b] = self.corners.as_mut()?;
        Some(match side {
            Side::A => (a, b),
            Side::B => (b, a),
        })
    }
}
