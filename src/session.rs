use crate::battle::{Battle, BattleResult};
use crate::battle_log::BattleLog;
use crate::clock::Clock;
use crate::config::{BattleConfig, StatRanges};
use crate::error::RosterError;
use crate::roster::{Pool, Trainer};
use rand::Rng;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Standings {
    pub a_wins: u32,
    pub b_wins: u32,
    pub battles_played: u32,
}

#[derive(Clone, Debug)]
pub struct BattleReport {
    pub result: BattleResult,
    pub turns: u32,
    pub log: BattleLog,
}

/// Two pools that meet repeatedly. Win counters live on the pools and
/// survive across battles.
pub struct Session<A: Pool, B: Pool> {
    pool_a: A,
    pool_b: B,
    config: BattleConfig,
    battles_played: u32,
}

impl<A: Pool, B: Pool> Session<A, B> {
    pub fn new(pool_a: A, pool_b: B, config: BattleConfig) -> Self {
        Session {
            pool_a,
            pool_b,
            config,
            battles_played: 0,
        }
    }

    pub fn standings(&self) -> Standings {
        Standings {
            a_wins: self.pool_a.wins(),
            b_wins: self.pool_b.wins(),
            battles_played: self.battles_played,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn pool_a(&self) -> &A {
        &self.pool_a
    }

    pub fn pool_b(&self) -> &B {
        &self.pool_b
    }

    pub fn pool_a_mut(&mut self) -> &mut A {
        &mut self.pool_a
    }

    pub fn pool_b_mut(&mut self) -> &mut B {
        &mut self.pool_b
    }

    pub fn into_pools(self) -> (A, B) {
        (self.pool_a, self.pool_b)
    }

    /// Runs one battle to completion, waiting `frame_ms` on `clock` between
    /// polls the way a render loop would.
    pub fn play<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
        frame_ms: u64,
    ) -> Result<BattleReport, RosterError> {
        self.play_capped(clock, frame_ms, None)
    }

    /// Like [`Session::play`], but aborts the battle (no win credited) once
    /// `max_turns` attacks have resolved without a decision. A clock that
    /// saturates before the next action is due also aborts the battle.
    pub fn play_capped<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
        frame_ms: u64,
        max_turns: Option<u32>,
    ) -> Result<BattleReport, RosterError> {
        let frame_ms = frame_ms.max(1);
        let mut battle = Battle::new(self.config);
        battle.start(&mut self.pool_a, &mut self.pool_b, clock.now_ms())?;

        while battle.is_running() {
            if max_turns.is_some_and(|cap| battle.turns_resolved() >= cap) {
                battle.finish(BattleResult::Aborted);
                break;
            }
            let now = clock.wait_ms(frame_ms);
            if battle.update(now).is_none() && now == u64::MAX {
                warn!("Clock saturated with the battle undecided; aborting");
                battle.finish(BattleResult::Aborted);
            }
        }

        let result = battle.result().unwrap_or(BattleResult::Aborted);
        let turns = battle.turns_resolved();
        let log = battle.take_log();
        drop(battle);

        self.battles_played += 1;
        debug!(
            "Battle {} ended {:?} after {} turns",
            self.battles_played, result, turns
        );
        Ok(BattleReport { result, turns, log })
    }
}

impl Session<Trainer, Trainer> {
    /// Pre-battle housekeeping: defeated combatants leave both boxes and the
    /// bot box is refilled to a full team. Returns how many bots were added.
    pub fn prepare<R: Rng + ?Sized>(&mut self, ranges: &StatRanges, rng: &mut R) -> usize {
        self.pool_a.release_fainted();
        self.pool_b.release_fainted();
        self.pool_b.replenish(self.config.team_size, ranges, rng)
    }
}
