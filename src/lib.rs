pub mod battle;
pub mod battle_log;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod roster;
pub mod session;
pub mod tournament;
pub mod types;

use crate::clock::{Clock, ManualClock, MonotonicClock};
use crate::config::{GameConfig, StatRanges};
use crate::model::{Combatant, RosterFile};
use crate::roster::{SelectionPolicy, Trainer};
use crate::session::{Session, Standings};
use crate::tournament::{compute_policy_matrix, write_csv, MatrixOptions};
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::path::{Path, PathBuf};

pub use crate::battle::{compute_damage, Action, Battle, BattleResult, BattleStatus, Side};
pub use crate::error::RosterError;
pub use crate::roster::Pool;
pub use crate::types::Species;

#[derive(Debug, Clone)]
pub enum Command {
    Duel(DuelOptions),
    Matrix(MatrixCommand),
}

#[derive(Debug, Clone)]
pub struct DuelOptions {
    pub config_path: Option<PathBuf>,
    pub roster_path: Option<PathBuf>,
    pub matches: usize,
    pub seed: u64,
    /// Overrides the policy stored in the roster file.
    pub policy: Option<SelectionPolicy>,
    pub bot_policy: SelectionPolicy,
    pub log_path: Option<PathBuf>,
    /// Paces battles on the wall clock instead of simulated frames.
    pub realtime: bool,
}

impl Default for DuelOptions {
    fn default() -> Self {
        DuelOptions {
            config_path: None,
            roster_path: None,
            matches: 1,
            seed: 0,
            policy: None,
            bot_policy: SelectionPolicy::Arbitrary,
            log_path: None,
            realtime: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatrixCommand {
    pub config_path: Option<PathBuf>,
    pub sims_per_cell: usize,
    /// Defaults to twice the team size.
    pub roster_size: Option<usize>,
    pub seed: u64,
    pub output_path: PathBuf,
}

impl Default for MatrixCommand {
    fn default() -> Self {
        MatrixCommand {
            config_path: None,
            sims_per_cell: 100,
            roster_size: None,
            seed: 0,
            output_path: PathBuf::from("policy_matrix.csv"),
        }
    }
}

pub fn load_roster<R: Rng + ?Sized>(
    path: &Path,
    ranges: &StatRanges,
    rng: &mut R,
) -> anyhow::Result<Trainer> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
    let parsed: RosterFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(parsed.into_trainer(ranges, rng))
}

fn random_player(config: &GameConfig, rng: &mut SmallRng) -> Trainer {
    let roster = (0..config.battle.team_size)
        .map(|i| Combatant::random_any(format!("Mon {}", i + 1), &config.stats, false, rng))
        .collect();
    Trainer::new(SelectionPolicy::Arbitrary).with_roster(roster)
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Duel(opts) => run_duel(&opts).map(|_| ()),
        Command::Matrix(opts) => run_matrix(&opts),
    }
}

/// Player roster against a bot that is refilled before every battle.
pub fn run_duel(opts: &DuelOptions) -> anyhow::Result<Standings> {
    if opts.matches == 0 {
        anyhow::bail!("--matches must be > 0");
    }
    let config = GameConfig::load_or_default(opts.config_path.as_deref())?;
    let mut rng = SmallRng::seed_from_u64(opts.seed);
    let mut player = match &opts.roster_path {
        Some(path) => load_roster(path, &config.stats, &mut rng)?,
        None => random_player(&config, &mut rng),
    };
    if let Some(policy) = opts.policy {
        player.set_policy(policy);
    }
    let bot = Trainer::new(opts.bot_policy);

    let mut session = Session::new(player, bot, config.battle);
    let manual = ManualClock::new(0);
    let wall = MonotonicClock::new();
    let clock: &dyn Clock = if opts.realtime { &wall } else { &manual };
    let mut logs = Vec::new();
    for idx in 0..opts.matches {
        session.prepare(&config.stats, &mut rng);
        if session.pool_a().is_empty() {
            println!("Player box is empty; stopping after {idx} battles");
            break;
        }
        let report = session.play(clock, config.frame_ms)?;
        println!(
            "Battle {}: {:?} after {} turns",
            idx + 1,
            report.result,
            report.turns
        );
        logs.push(json!({
            "battle": idx + 1,
            "result": format!("{:?}", report.result),
            "log": report.log.log_lines(),
        }));
    }

    let standings = session.standings();
    println!(
        "T1 wins: {}     T2 wins: {}     ({} battles)",
        standings.a_wins, standings.b_wins, standings.battles_played
    );
    if let Some(path) = &opts.log_path {
        std::fs::write(path, serde_json::to_string_pretty(&logs)? + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(standings)
}

pub fn run_matrix(opts: &MatrixCommand) -> anyhow::Result<()> {
    if opts.sims_per_cell == 0 {
        anyhow::bail!("--sims-per-cell must be > 0");
    }
    let config = GameConfig::load_or_default(opts.config_path.as_deref())?;
    let roster_size = opts.roster_size.unwrap_or(config.battle.team_size * 2);
    if roster_size < config.battle.team_size {
        anyhow::bail!(
            "--roster-size {roster_size} is smaller than team size {}",
            config.battle.team_size
        );
    }
    let matrix_opts = MatrixOptions {
        sims_per_cell: opts.sims_per_cell,
        roster_size,
        seed: opts.seed,
    };
    let matrix = compute_policy_matrix(&config, &matrix_opts)?;
    write_csv(&matrix, &opts.output_path)?;
    println!(
        "Wrote {}x{} policy matrix to {}",
        matrix.len(),
        matrix.first().map(|r| r.len()).unwrap_or(0),
        opts.output_path.display()
    );
    Ok(())
}
