use pokemoneus_battle::battle::BattleResult;
use pokemoneus_battle::clock::{Clock, ManualClock, MonotonicClock};
use pokemoneus_battle::config::{BattleConfig, StatRanges};
use pokemoneus_battle::model::Combatant;
use pokemoneus_battle::roster::{Pool, SelectionPolicy, Trainer};
use pokemoneus_battle::session::Session;
use pokemoneus_battle::types::Species;
use pokemoneus_battle::RosterError;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn config(team_size: usize) -> BattleConfig {
    BattleConfig {
        team_size,
        hit_delay_ms: 200,
    }
}

fn strong_player() -> Trainer {
    Trainer::new(SelectionPolicy::GreedyByPower).with_roster(vec![
        Combatant::new("Tide", Species::Water, 100, 50, 50),
        Combatant::new("Surf", Species::Water, 100, 50, 50),
    ])
}

fn weak_bot() -> Trainer {
    Trainer::new(SelectionPolicy::Arbitrary).with_roster(vec![
        Combatant::new("Spark", Species::Fire, 10, 1, 1),
        Combatant::new("Cinder", Species::Fire, 10, 1, 1),
    ])
}

#[test]
fn wins_accumulate_across_battles() {
    let mut session = Session::new(strong_player(), weak_bot(), config(2));
    let clock = ManualClock::new(0);

    let report = session.play(&clock, 16).unwrap();
    assert_eq!(report.result, BattleResult::AWins);
    assert_eq!(report.turns, 3);
    assert!(clock.now_ms() > 600);
    assert_eq!(session.pool_a().len(), 2);
    assert_eq!(session.pool_b().len(), 2);

    // The bot's box now only holds fainted combatants, so it cannot field a team.
    let report = session.play(&clock, 16).unwrap();
    assert_eq!(report.result, BattleResult::AWins);
    assert_eq!(report.turns, 0);

    let standings = session.standings();
    assert_eq!(standings.a_wins, 2);
    assert_eq!(standings.b_wins, 0);
    assert_eq!(standings.battles_played, 2);
}

#[test]
fn prepare_clears_fallen_and_refills_the_bot() {
    let mut session = Session::new(strong_player(), weak_bot(), config(2));
    let clock = ManualClock::new(0);
    session.play(&clock, 16).unwrap();

    let mut rng = SmallRng::seed_from_u64(11);
    let added = session.prepare(&StatRanges::default(), &mut rng);
    assert_eq!(added, 2);
    assert_eq!(session.pool_b().len(), 2);
    assert!(session.pool_b().roster().iter().all(|c| !c.is_fainted()));
    assert_eq!(session.pool_a().len(), 2);
}

#[test]
fn capped_play_aborts_without_credit() {
    let tank = |name: &str| Combatant::new(name, Species::Fire, 100_000, 1, 5);
    let pool_a = Trainer::new(SelectionPolicy::Arbitrary).with_roster(vec![tank("A")]);
    let pool_b = Trainer::new(SelectionPolicy::Arbitrary).with_roster(vec![tank("B")]);
    let mut session = Session::new(pool_a, pool_b, config(1));
    let clock = ManualClock::new(0);

    let report = session.play_capped(&clock, 50, Some(10)).unwrap();
    assert_eq!(report.result, BattleResult::Aborted);
    assert_eq!(report.turns, 10);
    assert_eq!(report.log.log_lines().last().map(String::as_str), Some("|abort|"));
    let standings = session.standings();
    assert_eq!((standings.a_wins, standings.b_wins), (0, 0));
    assert_eq!(standings.battles_played, 1);

    let (pool_a, pool_b) = session.into_pools();
    assert_eq!(pool_a.roster()[0].hp(), 100_000 - 5);
    assert_eq!(pool_b.roster()[0].hp(), 100_000 - 5);
}

#[test]
fn session_can_borrow_pools() {
    let mut player = strong_player();
    let mut bot = weak_bot();
    {
        let mut session = Session::new(&mut player, &mut bot, config(2));
        let clock = ManualClock::new(0);
        session.play(&clock, 16).unwrap();
    }
    assert_eq!(player.wins(), 1);
    assert_eq!(bot.wins(), 0);
}

#[test]
fn roster_errors_propagate() {
    let bot = Trainer::new(SelectionPolicy::SpeciesConstrained)
        .with_roster(vec![Combatant::new("Lonely", Species::Grass, 10, 1, 1)]);
    let mut session = Session::new(strong_player(), bot, config(2));
    let clock = ManualClock::new(0);
    let err = session.play(&clock, 16).unwrap_err();
    assert_eq!(
        err,
        RosterError::InsufficientRoster {
            requested: 2,
            available: 1
        }
    );
    assert_eq!(session.pool_a().len(), 2);
    assert_eq!(session.standings().battles_played, 0);
}

#[test]
fn wall_clock_drives_a_battle_to_completion() {
    let fast = BattleConfig {
        team_size: 2,
        hit_delay_ms: 0,
    };
    let mut session = Session::new(strong_player(), weak_bot(), fast);
    let clock = MonotonicClock::new();
    let report = session.play(&clock, 1).unwrap();
    assert_eq!(report.result, BattleResult::AWins);
    assert_eq!(report.turns, 3);
    assert!(clock.now_ms() >= 3);
}

#[test]
fn saturated_clock_aborts_an_undecided_battle() {
    let stalled = BattleConfig {
        team_size: 2,
        hit_delay_ms: u64::MAX,
    };
    let mut session = Session::new(strong_player(), weak_bot(), stalled);
    let clock = ManualClock::new(u64::MAX - 100);
    let report = session.play(&clock, 16).unwrap();
    assert_eq!(report.result, BattleResult::Aborted);
    assert_eq!(report.turns, 0);
    assert_eq!(clock.now_ms(), u64::MAX);
    let standings = session.standings();
    assert_eq!((standings.a_wins, standings.b_wins), (0, 0));
    assert_eq!(session.pool_a().len(), 2);
    assert_eq!(session.pool_b().len(), 2);
}
