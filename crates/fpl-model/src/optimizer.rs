//! Top-level planning driver: filter, build, solve, extract, and the
//! alternative-solution loop.

use crate::backend::{backend_for, SolveOptions, SolveOutcome};
use crate::builder::{build_model, BuiltModel};
use crate::error::{PlanError, SolverError};
use crate::extract::extract_solution;
use crate::filter::filter_players;
use crate::lp::LinearProblem;
use crate::plan::Solution;
use fpl_core::{Config, DataError, Gameweek, Player, PlayerId, SquadState};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Plan the next `config.horizon` gameweeks starting at `first_gw`.
///
/// Returns one solution per requested iteration; later entries are
/// alternatives whose first-gameweek transfer set differs from every earlier
/// one. The first iteration's failure is fatal; a later iteration failing
/// ends the loop and returns what was collected.
pub fn solve_plan(
    players: &[Player],
    state: &SquadState,
    config: &Config,
    first_gw: Gameweek,
) -> Result<Vec<Solution>, PlanError> {
    let cancel = AtomicBool::new(false);
    solve_plan_cancellable(players, state, config, first_gw, &cancel)
}

/// [`solve_plan`] with a cooperative stop flag, checked between iterations.
/// An in-flight solve is bounded by the configured time limit rather than
/// preempted.
pub fn solve_plan_cancellable(
    players: &[Player],
    state: &SquadState,
    config: &Config,
    first_gw: Gameweek,
    cancel: &AtomicBool,
) -> Result<Vec<Solution>, PlanError> {
    config.validate()?;
    validate_references(players, config)?;

    let gameweeks: Vec<Gameweek> = (0..config.horizon).map(|i| first_gw + i).collect();
    let filtered = filter_players(players, state, config, &gameweeks);
    let backend = backend_for(&config.solver)?;
    let model = build_model(&filtered, state, config, first_gw)?;
    let fingerprint = config.fingerprint();

    let options = SolveOptions {
        time_limit_secs: config.time_limit_secs,
        mip_gap: config.optimality_gap,
        random_seed: config.random_seed,
        verbose: false,
    };

    let mut problem = model.problem.clone();
    let mut solutions: Vec<Solution> = Vec::new();
    let mut first_score: Option<f64> = None;

    for iteration in 0..config.num_iterations {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(iteration, "cancellation requested, stopping");
            break;
        }
        let outcome = match backend.solve(&problem, &options) {
            Ok(outcome) => outcome,
            Err(SolverError::Infeasible) if iteration > 0 => {
                tracing::info!(iteration, "no further alternative solutions");
                break;
            }
            Err(err) if iteration > 0 => {
                tracing::warn!(iteration, %err, "alternative-solution iteration failed");
                break;
            }
            Err(err) => return Err(err.into()),
        };

        let solution = extract_solution(&model, &outcome, config, &fingerprint, iteration);
        if let (Some(first), Some(tolerance)) = (first_score, config.iteration_tolerance) {
            if first - solution.score > tolerance {
                tracing::info!(
                    iteration,
                    degradation = first - solution.score,
                    "objective degraded past the tolerance, stopping"
                );
                break;
            }
        }
        first_score.get_or_insert(solution.score);

        tracing::info!(
            iteration,
            score = solution.score,
            status = ?solution.status,
            "solution extracted"
        );

        add_iteration_cut(&mut problem, &model, &outcome);
        solutions.push(solution);
    }

    Ok(solutions)
}

/// Every id the config points at must exist in the (unfiltered) pool.
fn validate_references(players: &[Player], config: &Config) -> Result<(), DataError> {
    let known: HashSet<PlayerId> = players.iter().map(|p| p.id).collect();
    let check = |ids: &[PlayerId], context: &'static str| -> Result<(), DataError> {
        for id in ids {
            if !known.contains(id) {
                return Err(DataError::MissingPlayer { id: *id, context });
            }
        }
        Ok(())
    };
    check(&config.locked, "locked")?;
    check(&config.banned, "banned")?;
    let booked: Vec<PlayerId> = config.booked_transfers.iter().map(|b| b.player).collect();
    check(&booked, "booked transfer")?;
    Ok(())
}

/// Forbid the previous first-gameweek transfer-in profile: at least one
/// member of the set must flip.
fn add_iteration_cut(problem: &mut LinearProblem, model: &BuiltModel, outcome: &SolveOutcome) {
    let vars = &model.vars;
    let mut coeffs = Vec::with_capacity(vars.n_players);
    let mut chosen = 0i64;
    for p in 0..vars.n_players {
        let col = vars.transfer_in(p, 0);
        if outcome.columns[col] > 0.5 {
            chosen += 1;
            coeffs.push((col, -1.0));
        } else {
            coeffs.push((col, 1.0));
        }
    }
    problem.add_ge(1.0 - chosen as f64, coeffs);
}
