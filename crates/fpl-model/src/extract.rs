//! Materialise a [`Solution`] from a primal vector.
//!
//! Binary values are rounded with a tolerance; the plan for a Free Hit week
//! reads from the Free Hit squad, since that is what scores.

use crate::backend::SolveOutcome;
use crate::builder::BuiltModel;
use crate::plan::{ChipPlay, GameweekPlan, Pick, Solution};
use crate::variables::BENCH_SLOTS;
use fpl_core::{Chip, Config, PlayerId};

const ROUND_TOL: f64 = 1e-6;

fn on(value: f64) -> bool {
    debug_assert!(
        (value - value.round()).abs() < ROUND_TOL * 1e3 || value.abs() < 0.5,
        "binary came back fractional: {}",
        value
    );
    value > 0.5
}

fn int(value: f64) -> i64 {
    value.round() as i64
}

/// Read each gameweek's roles, transfers, chip, and resources out of the
/// primal vector.
pub fn extract_solution(
    model: &BuiltModel,
    outcome: &SolveOutcome,
    config: &Config,
    fingerprint: &str,
    iteration: u32,
) -> Solution {
    let x = &outcome.columns;
    let vars = &model.vars;
    let n_p = vars.n_players;

    let mut plans = Vec::with_capacity(vars.n_gws);
    for w in 0..vars.n_gws {
        let gw = model.gameweeks[w];
        let fh_active = on(x[vars.use_fh(w)]);
        let bb_active = on(x[vars.use_bb(w)]);
        let wc_active = on(x[vars.use_wc(w)]);
        let tc_player = (0..n_p).find(|&p| on(x[vars.use_tc(p, w)]));

        let chip = if wc_active {
            Some(ChipPlay {
                chip: Chip::Wildcard,
                player: None,
            })
        } else if fh_active {
            Some(ChipPlay {
                chip: Chip::FreeHit,
                player: None,
            })
        } else if bb_active {
            Some(ChipPlay {
                chip: Chip::BenchBoost,
                player: None,
            })
        } else {
            tc_player.map(|p| ChipPlay {
                chip: Chip::TripleCaptain,
                player: Some(model.players[p].id),
            })
        };

        let mut picks = Vec::with_capacity(15);
        let mut expected_points = 0.0;
        for p in 0..n_p {
            let in_squad = if fh_active {
                on(x[vars.squad_fh(p, w)])
            } else {
                on(x[vars.squad(p, w)])
            };
            if !in_squad {
                continue;
            }
            let player = &model.players[p];
            let lineup = on(x[vars.lineup(p, w)]);
            let captain = on(x[vars.captain(p, w)]);
            let vice_captain = on(x[vars.vicecap(p, w)]);
            let bench_slot =
                (0..BENCH_SLOTS).find(|&slot| on(x[vars.bench(p, w, slot)])).map(|s| s as u8);
            let boosted = tc_player == Some(p);
            let multiplier = if captain {
                if boosted {
                    3
                } else {
                    2
                }
            } else {
                u8::from(lineup)
            };

            let xp = player.projection(gw).xp;
            if lineup {
                expected_points += xp;
            }
            if captain {
                expected_points += xp;
            }
            if boosted {
                expected_points += xp;
            }
            if vice_captain {
                expected_points += config.vcap_weight * xp;
            }
            if let Some(slot) = bench_slot {
                expected_points += config.bench_weights[slot as usize] * xp;
            }

            picks.push(Pick {
                id: player.id,
                name: player.name.clone(),
                position: player.position,
                lineup,
                bench_slot,
                captain,
                vice_captain,
                transfer_in: on(x[vars.transfer_in(p, w)]),
                multiplier,
            });
        }
        picks.sort_by_key(|pick| (pick.position.rank(), pick.id));

        let mut transfers_in: Vec<PlayerId> = (0..n_p)
            .filter(|&p| on(x[vars.transfer_in(p, w)]))
            .map(|p| model.players[p].id)
            .collect();
        let mut transfers_out: Vec<PlayerId> = (0..n_p)
            .filter(|&p| on(x[vars.transfer_out(p, w)]))
            .map(|p| model.players[p].id)
            .collect();
        transfers_in.sort_unstable();
        transfers_out.sort_unstable();

        plans.push(GameweekPlan {
            gw,
            picks,
            chip,
            free_transfers: int(x[vars.fts(w)]) as u8,
            transfers_in,
            transfers_out,
            hits: int(x[vars.penalised(w)]) as u32,
            bank: int(x[vars.itb(w)]).max(0) as u32,
            expected_points,
        });
    }

    Solution {
        score: outcome.objective,
        status: outcome.status,
        optimality_gap: outcome.gap,
        fingerprint: fingerprint.to_string(),
        iteration,
        plans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SolveOutcome;
    use crate::builder::build_model;
    use crate::plan::SolveStatus;
    use crate::test_utils::{squad_of_first_15, synthetic_pool};
    use fpl_core::Config;

    /// Hand-craft a primal vector for a one-week model: the initial squad
    /// stays, players 1..11 by model order start, player 0 is captain,
    /// player 1 vice.
    #[test]
    fn extracts_roles_from_a_hand_built_vector() {
        let gameweeks = vec![5];
        let pool = synthetic_pool(15, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = Config::default();
        config.horizon = 1;
        config.no_transfer_last_gws = 0;
        let model = build_model(&pool, &state, &config, 5).unwrap();
        let vars = &model.vars;

        let mut x = vec![0.0; model.problem.num_cols()];
        // Everyone stays in the squad.
        for p in 0..15 {
            x[vars.squad(p, 0)] = 1.0;
        }
        // Start everyone except the second goalkeeper (index 1) and the
        // last three defenders; bench them in order.
        let benched = [1usize, 4, 5, 6];
        for p in 0..15 {
            if !benched.contains(&p) {
                x[vars.lineup(p, 0)] = 1.0;
            }
        }
        x[vars.bench(1, 0, 0)] = 1.0;
        x[vars.bench(4, 0, 1)] = 1.0;
        x[vars.bench(5, 0, 2)] = 1.0;
        x[vars.bench(6, 0, 3)] = 1.0;
        x[vars.captain(0, 0)] = 1.0;
        x[vars.vicecap(2, 0)] = 1.0;
        x[vars.fts(0)] = 1.0;
        x[vars.itb(0)] = state.bank as f64;

        let outcome = SolveOutcome {
            status: SolveStatus::Optimal,
            columns: x,
            objective: 42.0,
            gap: Some(0.0),
            solve_time_ms: 1,
        };
        let solution = extract_solution(&model, &outcome, &config, "fp", 0);

        assert_eq!(solution.score, 42.0);
        assert_eq!(solution.plans.len(), 1);
        let plan = &solution.plans[0];
        assert_eq!(plan.picks.len(), 15);
        assert_eq!(plan.lineup_count(), 11);
        assert_eq!(plan.captain().unwrap().id, model.players[0].id);
        assert_eq!(plan.captain().unwrap().multiplier, 2);
        let bench_gk = plan.picks.iter().find(|p| p.bench_slot == Some(0)).unwrap();
        assert_eq!(bench_gk.id, model.players[1].id);
        assert_eq!(plan.free_transfers, 1);
        assert_eq!(plan.bank, state.bank);
        assert!(plan.chip.is_none());
        assert_eq!(plan.hits, 0);
    }

    #[test]
    fn free_hit_week_reads_the_free_hit_squad() {
        let gameweeks = vec![5];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = Config::default();
        config.horizon = 1;
        config.no_transfer_last_gws = 0;
        let model = build_model(&pool, &state, &config, 5).unwrap();
        let vars = &model.vars;

        let mut x = vec![0.0; model.problem.num_cols()];
        x[vars.use_fh(0)] = 1.0;
        // Regular squad parked; FH squad swaps player 14 for player 15.
        for p in 0..15 {
            x[vars.squad(p, 0)] = 1.0;
        }
        for p in (0..14).chain([15]) {
            x[vars.squad_fh(p, 0)] = 1.0;
        }
        x[vars.fts(0)] = 2.0;

        let outcome = SolveOutcome {
            status: SolveStatus::Optimal,
            columns: x,
            objective: 0.0,
            gap: Some(0.0),
            solve_time_ms: 1,
        };
        let solution = extract_solution(&model, &outcome, &config, "fp", 0);
        let plan = &solution.plans[0];
        assert_eq!(plan.chip.unwrap().chip, Chip::FreeHit);
        let ids: Vec<u32> = plan.picks.iter().map(|p| p.id.value()).collect();
        assert!(ids.contains(&16));
        assert!(!ids.contains(&15));
    }
}
