//! Perturbed solves on a Rayon pool.
//!
//! Each run owns a private copy of the player set with noise applied to the
//! expected-points projections, solves independently, and contributes to
//! commutative aggregates. Runs share only the read-only base pool and
//! config.

use crate::manifest::{SimManifest, SimRunRecord};
use fpl_core::{Config, Gameweek, Player, PlayerId, SquadState};
use fpl_model::{solve_plan_cancellable, PlanError, Solution, SolverError};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

/// Batch controls on top of the planner config.
#[derive(Debug, Clone)]
pub struct SimulationsConfig {
    pub runs: u32,
    /// Worker threads; 0 auto-detects the CPU count.
    pub workers: usize,
    pub base_seed: u64,
}

impl Default for SimulationsConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            workers: 0,
            base_seed: 0,
        }
    }
}

/// Aggregates over the successful runs.
#[derive(Debug, Clone, Default)]
pub struct SimAggregates {
    /// How often each player sat in the first planned gameweek's squad.
    pub squad_appearances: HashMap<PlayerId, u32>,
    /// How often each player was bought in the first planned gameweek.
    pub buy_appearances: HashMap<PlayerId, u32>,
    pub scores: Vec<f64>,
}

impl SimAggregates {
    fn absorb(&mut self, solution: &Solution) {
        if let Some(first) = solution.plans.first() {
            for pick in &first.picks {
                *self.squad_appearances.entry(pick.id).or_default() += 1;
            }
            for id in &first.transfers_in {
                *self.buy_appearances.entry(*id).or_default() += 1;
            }
        }
        self.scores.push(solution.score);
    }

    fn merge(mut self, other: SimAggregates) -> SimAggregates {
        for (id, count) in other.squad_appearances {
            *self.squad_appearances.entry(id).or_default() += count;
        }
        for (id, count) in other.buy_appearances {
            *self.buy_appearances.entry(id).or_default() += count;
        }
        self.scores.extend(other.scores);
        self
    }

    pub fn mean_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            None
        } else {
            Some(self.scores.iter().sum::<f64>() / self.scores.len() as f64)
        }
    }
}

/// Everything a finished batch reports.
#[derive(Debug)]
pub struct SimulationOutcome {
    pub manifest: SimManifest,
    pub aggregates: SimAggregates,
}

/// Apply zero-mean multiplicative Gaussian noise to every expected-points
/// entry. Minutes are left alone; they drive filtering, not scoring.
pub fn perturb_projections(players: &[Player], magnitude: f64, rng: &mut StdRng) -> Vec<Player> {
    let Ok(normal) = Normal::new(0.0, magnitude.max(0.0)) else {
        return players.to_vec();
    };
    players
        .iter()
        .map(|player| {
            let mut player = player.clone();
            for proj in player.projections.values_mut() {
                let factor: f64 = 1.0 + normal.sample(rng);
                proj.xp = (proj.xp * factor).max(0.0);
            }
            player
        })
        .collect()
}

/// Short alphanumeric run label.
pub fn random_run_id(rng: &mut StdRng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Run `sim.runs` perturbed solves in parallel and fold the results.
///
/// Infeasible runs are recorded, not fatal; the cancel flag stops the batch
/// between runs.
pub fn run_simulations(
    players: &[Player],
    state: &SquadState,
    config: &Config,
    first_gw: Gameweek,
    sim: &SimulationsConfig,
    cancel: &AtomicBool,
) -> anyhow::Result<SimulationOutcome> {
    let workers = if sim.workers == 0 {
        num_cpus::get()
    } else {
        sim.workers
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| anyhow::anyhow!("building simulation thread pool: {err}"))?;

    tracing::info!(runs = sim.runs, workers, "starting simulation batch");

    let results: Vec<(SimRunRecord, Option<Solution>)> = pool.install(|| {
        (0..sim.runs)
            .into_par_iter()
            .map(|run_no| run_one(players, state, config, first_gw, sim, run_no, cancel))
            .collect()
    });

    let mut aggregates = SimAggregates::default();
    let mut records = Vec::with_capacity(results.len());
    for (record, solution) in results {
        if let Some(solution) = solution {
            aggregates = aggregates.merge({
                let mut one = SimAggregates::default();
                one.absorb(&solution);
                one
            });
        }
        records.push(record);
    }

    let success = records.iter().filter(|r| r.status == "ok").count();
    let manifest = SimManifest {
        created_at: Utc::now(),
        runs: records.len(),
        success,
        failure: records.len() - success,
        noise_magnitude: config.noise_magnitude,
        records,
    };
    Ok(SimulationOutcome {
        manifest,
        aggregates,
    })
}

fn run_one(
    players: &[Player],
    state: &SquadState,
    config: &Config,
    first_gw: Gameweek,
    sim: &SimulationsConfig,
    run_no: u32,
    cancel: &AtomicBool,
) -> (SimRunRecord, Option<Solution>) {
    let seed = sim.base_seed.wrapping_add(run_no as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let run_id = random_run_id(&mut rng, 8);

    if cancel.load(std::sync::atomic::Ordering::Relaxed) {
        return (
            SimRunRecord {
                run_id,
                run_no: run_no + 1,
                seed,
                status: "cancelled".into(),
                score: None,
                error: None,
            },
            None,
        );
    }

    let perturbed = perturb_projections(players, config.noise_magnitude, &mut rng);
    // One solution per run; alternatives are a foreground concern.
    let mut run_config = config.clone();
    run_config.num_iterations = 1;
    run_config.random_seed = Some(seed);

    match solve_plan_cancellable(&perturbed, state, &run_config, first_gw, cancel) {
        Ok(mut solutions) if !solutions.is_empty() => {
            let solution = solutions.remove(0);
            let record = SimRunRecord {
                run_id,
                run_no: run_no + 1,
                seed,
                status: "ok".into(),
                score: Some(solution.score),
                error: None,
            };
            (record, Some(solution))
        }
        Ok(_) => (
            SimRunRecord {
                run_id,
                run_no: run_no + 1,
                seed,
                status: "cancelled".into(),
                score: None,
                error: None,
            },
            None,
        ),
        Err(PlanError::Solver(SolverError::Infeasible)) => (
            SimRunRecord {
                run_id,
                run_no: run_no + 1,
                seed,
                status: "infeasible".into(),
                score: None,
                error: Some(SolverError::Infeasible.to_string()),
            },
            None,
        ),
        Err(err) => {
            tracing::warn!(run_no, %err, "simulation run failed");
            (
                SimRunRecord {
                    run_id,
                    run_no: run_no + 1,
                    seed,
                    status: "error".into(),
                    score: None,
                    error: Some(err.to_string()),
                },
                None,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perturbation_is_deterministic_per_seed() {
        let players = fpl_model::test_utils::synthetic_pool(10, &[1, 2]);
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let a = perturb_projections(&players, 0.2, &mut rng_a);
        let b = perturb_projections(&players, 0.2, &mut rng_b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.projections, y.projections);
        }
    }

    #[test]
    fn zero_noise_is_identity() {
        let players = fpl_model::test_utils::synthetic_pool(10, &[1]);
        let mut rng = StdRng::seed_from_u64(1);
        let perturbed = perturb_projections(&players, 0.0, &mut rng);
        for (original, copy) in players.iter().zip(&perturbed) {
            assert_eq!(original.projections, copy.projections);
        }
    }

    #[test]
    fn perturbed_points_never_go_negative() {
        let players = fpl_model::test_utils::synthetic_pool(30, &[1, 2, 3]);
        let mut rng = StdRng::seed_from_u64(99);
        let perturbed = perturb_projections(&players, 3.0, &mut rng);
        for player in &perturbed {
            for proj in player.projections.values() {
                assert!(proj.xp >= 0.0);
            }
        }
    }

    #[test]
    fn run_ids_are_alphanumeric() {
        let mut rng = StdRng::seed_from_u64(5);
        let id = random_run_id(&mut rng, 8);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn aggregates_merge_commutatively() {
        let mut a = SimAggregates::default();
        let mut b = SimAggregates::default();
        a.squad_appearances.insert(PlayerId::new(1), 2);
        a.scores.push(10.0);
        b.squad_appearances.insert(PlayerId::new(1), 1);
        b.squad_appearances.insert(PlayerId::new(2), 4);
        b.scores.push(20.0);

        let merged = a.clone().merge(b.clone());
        assert_eq!(merged.squad_appearances[&PlayerId::new(1)], 3);
        assert_eq!(merged.squad_appearances[&PlayerId::new(2)], 4);
        assert_eq!(merged.mean_score(), Some(15.0));

        let swapped = b.merge(a);
        assert_eq!(swapped.squad_appearances[&PlayerId::new(1)], 3);
        assert_eq!(swapped.mean_score(), Some(15.0));
    }
}
