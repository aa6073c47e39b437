//! End-to-end planning scenarios on small synthetic instances.
//!
//! Every solve here runs the real HiGHS backend; instances are kept to a
//! couple of dozen players so the whole suite stays fast.

use fpl_model::test_utils::{set_flat_xp, squad_of_first_15, synthetic_pool};
use fpl_model::{solve_plan, GameweekPlan, PlanError, Solution, SolverError};
use fpl_core::{Chip, ChipsAvailable, Config, ConfigError, Player, PlayerId, Position};
use std::collections::BTreeSet;

/// A config that disables filtering and planning frictions so scenarios
/// control exactly what matters.
fn scenario_config(horizon: u8) -> Config {
    let mut config = Config::default();
    config.horizon = horizon;
    config.no_transfer_last_gws = 0;
    config.xmin_lb = 0.0;
    config.ev_per_price_cutoff = 0.0;
    config.keep_top_ev_percent = 100.0;
    config.time_limit_secs = 60.0;
    config
}

/// The §8 invariants every returned gameweek plan must satisfy.
fn assert_plan_invariants(plan: &GameweekPlan, pool: &[Player]) {
    let bb = plan
        .chip
        .map(|c| c.chip == Chip::BenchBoost)
        .unwrap_or(false);

    // 15 distinct players.
    let ids: BTreeSet<PlayerId> = plan.picks.iter().map(|p| p.id).collect();
    assert_eq!(plan.picks.len(), 15, "GW{}: squad size", plan.gw);
    assert_eq!(ids.len(), 15, "GW{}: duplicate picks", plan.gw);

    // Position quota.
    for position in Position::ALL {
        let count = plan
            .picks
            .iter()
            .filter(|p| p.position == position)
            .count() as u8;
        assert_eq!(count, position.squad_quota(), "GW{}: {} quota", plan.gw, position);
    }

    // Team cap.
    for pick in &plan.picks {
        let player = pool.iter().find(|p| p.id == pick.id).unwrap();
        let same_team = plan
            .picks
            .iter()
            .filter(|other| {
                pool.iter().find(|p| p.id == other.id).unwrap().team == player.team
            })
            .count();
        assert!(same_team <= 3, "GW{}: team cap", plan.gw);
    }

    // Lineup size and formation.
    let expected_lineup = if bb { 15 } else { 11 };
    assert_eq!(plan.lineup_count(), expected_lineup, "GW{}: lineup size", plan.gw);
    if !bb {
        let starters = |position: Position| {
            plan.picks
                .iter()
                .filter(|p| p.lineup && p.position == position)
                .count() as u8
        };
        for position in Position::ALL {
            assert!(
                (position.min_play()..=position.max_play()).contains(&starters(position)),
                "GW{}: {} formation bounds",
                plan.gw,
                position
            );
        }
        // Bench slot 0 is the reserve goalkeeper.
        let slot0 = plan
            .picks
            .iter()
            .find(|p| p.bench_slot == Some(0))
            .expect("bench slot 0 filled");
        assert_eq!(slot0.position, Position::Gk, "GW{}: bench slot 0", plan.gw);
    }

    // Exactly one captain and one vice, distinct, both starting.
    let captains: Vec<_> = plan.picks.iter().filter(|p| p.captain).collect();
    let vices: Vec<_> = plan.picks.iter().filter(|p| p.vice_captain).collect();
    assert_eq!(captains.len(), 1, "GW{}: captain count", plan.gw);
    assert_eq!(vices.len(), 1, "GW{}: vice count", plan.gw);
    assert_ne!(captains[0].id, vices[0].id, "GW{}: armbands distinct", plan.gw);
    assert!(captains[0].lineup && vices[0].lineup, "GW{}: armbands start", plan.gw);

    // Hit accounting is non-negative and FT-bounded values are in range.
    assert!((1..=5).contains(&plan.free_transfers), "GW{}: FT range", plan.gw);
}

fn assert_all_invariants(solution: &Solution, pool: &[Player]) {
    for plan in &solution.plans {
        assert_plan_invariants(plan, pool);
    }
}

/// §8 scenario 1: one free gameweek, one standout player.
#[test]
fn single_gameweek_free_selection_captains_the_standout() {
    let gameweeks = vec![1];
    let mut pool = synthetic_pool(30, &gameweeks);
    for i in 1..=30 {
        set_flat_xp(&mut pool, i, 1.0);
    }
    set_flat_xp(&mut pool, 17, 10.0);
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable::none();
    state.bank = 1000;
    let config = scenario_config(1);

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    assert_eq!(solutions.len(), 1);
    let solution = &solutions[0];
    assert_all_invariants(solution, &pool);

    let plan = &solution.plans[0];
    assert_eq!(plan.captain().unwrap().id, PlayerId::new(17));
    assert_eq!(plan.captain().unwrap().multiplier, 2);
    assert!(plan.chip.is_none());
    assert!(
        plan.expected_points >= 21.0,
        "expected at least 21 points, got {}",
        plan.expected_points
    );
}

/// §8 scenario 2: Triple Captain forced in the only week.
#[test]
fn forced_triple_captain_boosts_the_standout() {
    let gameweeks = vec![1];
    let mut pool = synthetic_pool(30, &gameweeks);
    for i in 1..=30 {
        set_flat_xp(&mut pool, i, 1.0);
    }
    set_flat_xp(&mut pool, 17, 10.0);
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable {
        triple_captain: true,
        ..ChipsAvailable::none()
    };
    state.bank = 1000;
    let mut config = scenario_config(1);
    config.use_tc = vec![1];

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let plan = &solutions[0].plans[0];
    assert_all_invariants(&solutions[0], &pool);

    let chip = plan.chip.expect("triple captain active");
    assert_eq!(chip.chip, Chip::TripleCaptain);
    assert_eq!(chip.player, Some(PlayerId::new(17)));
    assert_eq!(plan.captain().unwrap().id, PlayerId::new(17));
    assert_eq!(plan.captain().unwrap().multiplier, 3);
    assert!(plan.expected_points >= 31.0);
}

/// §8 scenario 3: a clearly profitable like-for-like swap uses the free
/// transfer, no hits.
#[test]
fn positive_swap_uses_the_free_transfer() {
    let gameweeks = vec![1, 2];
    let mut pool = synthetic_pool(20, &gameweeks);
    for i in 1..=20 {
        set_flat_xp(&mut pool, i, 2.0);
    }
    // Owned midfielder 8 projects 1.5/gw; free agent 18 (also MID) 4.0/gw.
    set_flat_xp(&mut pool, 8, 1.5);
    set_flat_xp(&mut pool, 18, 4.0);
    pool[7].price = 50;
    pool[17].price = 50;
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable::none();
    let config = scenario_config(2);

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let solution = &solutions[0];
    assert_all_invariants(solution, &pool);

    let first = &solution.plans[0];
    assert_eq!(first.transfers_in, vec![PlayerId::new(18)]);
    assert_eq!(first.transfers_out, vec![PlayerId::new(8)]);
    assert_eq!(first.hits, 0);
    assert_eq!(solution.plans[1].hits, 0);
    // Like-for-like prices leave the bank untouched.
    assert_eq!(first.bank, state.bank);
}

/// §8 scenario 4: a marginal second swap is declined rather than paid for
/// with a hit.
#[test]
fn marginal_swap_declines_the_hit() {
    let gameweeks = vec![1, 2];
    let mut pool = synthetic_pool(25, &gameweeks);
    for i in 1..=25 {
        set_flat_xp(&mut pool, i, 2.0);
    }
    set_flat_xp(&mut pool, 8, 1.5);
    // Strong candidate 18 and marginal candidate 22, both midfielders.
    set_flat_xp(&mut pool, 18, 4.0);
    set_flat_xp(&mut pool, 22, 2.6);
    pool[7].price = 50;
    pool[17].price = 50;
    pool[21].price = 50;
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable::none();
    let config = scenario_config(2);

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let solution = &solutions[0];
    assert_all_invariants(solution, &pool);

    // Only the strong swap happens in the first week; nothing is worth a
    // -4 hit.
    assert_eq!(solution.plans[0].transfers_in, vec![PlayerId::new(18)]);
    for plan in &solution.plans {
        assert_eq!(plan.hits, 0);
    }
}

/// §8 scenario 5: Bench Boost forced on the week the bench actually scores.
#[test]
fn forced_bench_boost_relaxes_the_lineup() {
    let gameweeks = vec![1, 2, 3];
    let mut pool = synthetic_pool(20, &gameweeks);
    // Eleven regulars at 3.0 every week; four fringe players (the natural
    // bench: second keeper, two defenders, a forward) score only in GW2.
    // Free agents are worthless, so the squad stands pat.
    let fringe = [2u32, 5, 6, 13];
    for i in 1..=20 {
        set_flat_xp(&mut pool, i, if i <= 15 { 3.0 } else { 0.0 });
    }
    for &id in &fringe {
        let player = pool.iter_mut().find(|p| p.id == PlayerId::new(id)).unwrap();
        for (&gw, proj) in player.projections.iter_mut() {
            proj.xp = if gw == 2 { 5.0 } else { 0.0 };
        }
    }
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable {
        bench_boost: true,
        ..ChipsAvailable::none()
    };
    let mut config = scenario_config(3);
    config.use_bb = vec![2];

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let solution = &solutions[0];
    assert_all_invariants(solution, &pool);

    assert!(solution.plans[0].chip.is_none());
    let boosted = &solution.plans[1];
    assert_eq!(boosted.chip.unwrap().chip, Chip::BenchBoost);
    assert_eq!(boosted.lineup_count(), 15);
    // All fifteen score: 11 * 3 + 4 * 5 plus the captain's double.
    assert!(boosted.expected_points >= 53.0 - 1e-6);
    assert!(boosted.expected_points > solution.plans[0].expected_points);
    assert!(solution.plans[2].chip.is_none());
    assert_eq!(solution.plans[2].lineup_count(), 11);
}

/// §8 scenario 6: the iteration cut produces a distinct runner-up.
#[test]
fn iteration_cut_yields_a_different_alternative() {
    let gameweeks = vec![1, 2];
    let mut pool = synthetic_pool(25, &gameweeks);
    for i in 1..=25 {
        set_flat_xp(&mut pool, i, 2.0);
    }
    set_flat_xp(&mut pool, 8, 1.5);
    set_flat_xp(&mut pool, 18, 4.0);
    set_flat_xp(&mut pool, 22, 3.9);
    pool[7].price = 50;
    pool[17].price = 50;
    pool[21].price = 50;
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable::none();
    let mut config = scenario_config(2);
    config.num_iterations = 2;

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    assert_eq!(solutions.len(), 2);
    for solution in &solutions {
        assert_all_invariants(solution, &pool);
    }
    assert_ne!(
        solutions[0].plans[0].transfers_in, solutions[1].plans[0].transfers_in,
        "alternative must change the first-week transfer-in set"
    );
    assert!(solutions[1].score <= solutions[0].score + 1e-6);
    assert_eq!(solutions[1].iteration, 1);
}

/// Boundary: all chips forced into one week dies as a config error before
/// any model exists.
#[test]
fn all_chips_in_one_week_is_rejected_pre_build() {
    let gameweeks = vec![1];
    let pool = synthetic_pool(20, &gameweeks);
    let state = squad_of_first_15(&pool);
    let mut config = scenario_config(1);
    config.use_wc = vec![1];
    config.use_fh = vec![1];
    config.use_bb = vec![1];
    config.use_tc = vec![1];

    let err = solve_plan(&pool, &state, &config, 1).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Config(ConfigError::ConflictingChips { gw: 1 })
    ));
}

/// Boundary: a full stock with no transfers stays at the cap.
#[test]
fn full_free_transfer_stock_is_preserved() {
    let gameweeks = vec![1, 2];
    let mut pool = synthetic_pool(20, &gameweeks);
    for i in 1..=20 {
        set_flat_xp(&mut pool, i, 2.0);
    }
    let mut state = squad_of_first_15(&pool);
    state.free_transfers = 5;
    state.chips_available = ChipsAvailable::none();
    let config = scenario_config(2);

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let solution = &solutions[0];
    assert_eq!(solution.plans[0].free_transfers, 5);
    assert_eq!(solution.plans[1].free_transfers, 5);
}

/// The stock accrues one per idle week and the transition matches the
/// piecewise rule.
#[test]
fn free_transfers_accrue_when_idle() {
    let gameweeks = vec![1, 2, 3];
    let pool = synthetic_pool(20, &gameweeks);
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable::none();
    let mut config = scenario_config(3);
    // Whatever transfers the solver makes, the stock must follow the
    // piecewise rule; capping hits keeps the count within the allowance.
    config.hit_limit = Some(0);

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let solution = &solutions[0];
    let fts: Vec<u8> = solution.plans.iter().map(|p| p.free_transfers).collect();
    assert_eq!(fts[0], 1);
    for w in 1..fts.len() {
        let made = solution.plans[w - 1].transfers_made() as i64;
        let expected = ((fts[w - 1] as i64 - made + 1).clamp(1, 5)) as u8;
        assert_eq!(fts[w], expected, "transition into week {}", w);
    }
}

/// A Wildcard week carries the stock unchanged.
#[test]
fn wildcard_preserves_the_free_transfer_stock() {
    let gameweeks = vec![1, 2, 3];
    let mut pool = synthetic_pool(20, &gameweeks);
    for i in 1..=20 {
        set_flat_xp(&mut pool, i, 2.0);
    }
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable {
        wildcard: true,
        ..ChipsAvailable::none()
    };
    state.free_transfers = 2;
    let mut config = scenario_config(3);
    config.use_wc = vec![2];

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    let solution = &solutions[0];
    assert_eq!(solution.plans[1].chip.unwrap().chip, Chip::Wildcard);
    // Entering the wildcard week the stock accrued to 3; it must still be
    // 3 entering the week after.
    assert_eq!(solution.plans[1].free_transfers, 3);
    assert_eq!(solution.plans[2].free_transfers, 3);
}

/// Boundary: a booked purchase with no funds and nothing sellable enough is
/// infeasible.
#[test]
fn unaffordable_booked_purchase_is_infeasible() {
    let gameweeks = vec![1];
    let mut pool = synthetic_pool(20, &gameweeks);
    pool[15].price = 900;
    let mut state = squad_of_first_15(&pool);
    state.bank = 0;
    let mut config = scenario_config(1);
    config.booked_transfers = vec![fpl_core::BookedTransfer {
        player: PlayerId::new(16),
        gw: 1,
        direction: fpl_core::TransferDirection::In,
    }];

    let err = solve_plan(&pool, &state, &config, 1).unwrap_err();
    assert!(matches!(err, PlanError::Solver(SolverError::Infeasible)));
}

/// Locked players are in every week's squad; banned players in none.
#[test]
fn locks_and_bans_shape_every_week() {
    let gameweeks = vec![1, 2];
    let mut pool = synthetic_pool(25, &gameweeks);
    // Make the banned player tempting and the locked one worthless.
    set_flat_xp(&mut pool, 18, 9.0);
    set_flat_xp(&mut pool, 22, 0.0);
    pool[21].price = 45;
    let mut state = squad_of_first_15(&pool);
    state.chips_available = ChipsAvailable::none();
    let mut config = scenario_config(2);
    config.banned = vec![PlayerId::new(18)];
    config.locked = vec![PlayerId::new(22)];

    let solutions = solve_plan(&pool, &state, &config, 1).unwrap();
    for plan in &solutions[0].plans {
        let ids: Vec<PlayerId> = plan.picks.iter().map(|p| p.id).collect();
        assert!(!ids.contains(&PlayerId::new(18)), "banned player selected");
        assert!(ids.contains(&PlayerId::new(22)), "locked player missing");
    }
}
