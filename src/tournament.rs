use crate::battle::BattleResult;
use crate::clock::ManualClock;
use crate::config::GameConfig;
use crate::error::RosterError;
use crate::model::Combatant;
use crate::roster::{SelectionPolicy, Trainer};
use crate::session::Session;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Clone, Debug)]
pub struct MatrixOptions {
    pub sims_per_cell: usize,
    /// Combatants rolled into each pool before the battle.
    pub roster_size: usize,
    pub seed: u64,
}

struct CellResult {
    a_idx: usize,
    b_idx: usize,
    win_rate: f64,
}

fn rolled_trainer(
    policy: SelectionPolicy,
    roster_size: usize,
    is_bot: bool,
    config: &GameConfig,
    rng: &mut SmallRng,
) -> Trainer {
    let prefix = if is_bot { "Bot" } else { "Mon" };
    let roster = (0..roster_size)
        .map(|i| Combatant::random_any(format!("{prefix} {}", i + 1), &config.stats, is_bot, rng))
        .collect();
    Trainer::new(policy).with_roster(roster)
}

/// Plays one battle between freshly rolled pools. Side A rolls player
/// stats, side B bot stats.
pub fn simulate_match(
    policy_a: SelectionPolicy,
    policy_b: SelectionPolicy,
    config: &GameConfig,
    roster_size: usize,
    seed: u64,
) -> Result<BattleResult, RosterError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let pool_a = rolled_trainer(policy_a, roster_size, false, config, &mut rng);
    let pool_b = rolled_trainer(policy_b, roster_size, true, config, &mut rng);
    let mut session = Session::new(pool_a, pool_b, config.battle);
    let clock = ManualClock::new(0);
    Ok(session.play(&clock, config.frame_ms)?.result)
}

/// Win rate of side A for every (policy A, policy B) pairing, indexed as
/// `SelectionPolicy::ALL`. Aborted battles count as half a win; a pool that
/// cannot field a team fails the whole matrix.
pub fn compute_policy_matrix(
    config: &GameConfig,
    opts: &MatrixOptions,
) -> Result<Vec<Vec<f64>>, RosterError> {
    let policies = SelectionPolicy::ALL;
    let tasks: Vec<(usize, usize)> = (0..policies.len())
        .flat_map(|a| (0..policies.len()).map(move |b| (a, b)))
        .collect();
    let cell_results: Vec<CellResult> = tasks
        .par_iter()
        .map(|(a_idx, b_idx)| {
            let mut cell_rng =
                SmallRng::seed_from_u64(opts.seed ^ ((*a_idx as u64) << 32) ^ (*b_idx as u64));
            let mut a_wins = 0u64;
            let mut aborted = 0u64;
            for _ in 0..opts.sims_per_cell {
                let battle_seed = cell_rng.gen();
                match simulate_match(
                    policies[*a_idx],
                    policies[*b_idx],
                    config,
                    opts.roster_size,
                    battle_seed,
                )? {
                    BattleResult::AWins => a_wins += 1,
                    BattleResult::BWins => {}
                    BattleResult::Aborted => aborted += 1,
                }
            }
            let total = opts.sims_per_cell.max(1) as f64;
            Ok(CellResult {
                a_idx: *a_idx,
                b_idx: *b_idx,
                win_rate: (a_wins as f64 + 0.5 * aborted as f64) / total,
            })
        })
        .collect::<Result<_, RosterError>>()?;

    let mut matrix = vec![vec![0.0; policies.len()]; policies.len()];
    for cell in cell_results {
        matrix[cell.a_idx][cell.b_idx] = cell.win_rate;
    }
    Ok(matrix)
}

pub fn write_csv(matrix: &[Vec<f64>], path: &std::path::Path) -> anyhow::Result<()> {
    let mut out = String::from("policy");
    for policy in SelectionPolicy::ALL {
        out.push(',');
        out.push_str(policy.label());
    }
    out.push('\n');
    for (row_idx, row) in matrix.iter().enumerate() {
        let label = SelectionPolicy::ALL
            .get(row_idx)
            .map(|p| p.label())
            .unwrap_or("?");
        out.push_str(label);
        for value in row {
            out.push(',');
            out.push_str(&format!("{value:.4}"));
        }
        if row_idx + 1 < matrix.len() {
            out.push('\n');
        }
    }
    std::fs::write(path, out)?;
    Ok(())
}
