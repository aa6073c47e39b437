//! Solver backends.
//!
//! The contract is deliberately narrow: a backend accepts a
//! [`LinearProblem`] and returns a primal vector plus a status. Swapping the
//! MILP engine never touches the model builder or the extractor.

use crate::error::SolverError;
use crate::lp::{ColKind, LinearProblem};
use crate::plan::SolveStatus;
use fpl_core::ConfigError;
use highs::{HighsModelStatus, RowProblem, Sense};
use std::ops::Bound;
use std::time::Instant;

/// Knobs forwarded to the engine.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub time_limit_secs: f64,
    /// Relative MIP gap tolerance.
    pub mip_gap: f64,
    pub random_seed: Option<u64>,
    pub verbose: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit_secs: 600.0,
            mip_gap: 0.0,
            random_seed: None,
            verbose: false,
        }
    }
}

/// A finished solve: primal values in column order plus bookkeeping.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Primal value per column, in emission order.
    pub columns: Vec<f64>,
    /// Objective under the problem's own coefficients.
    pub objective: f64,
    /// Relative optimality gap when the engine reports one.
    pub gap: Option<f64>,
    pub solve_time_ms: u128,
}

/// "Accept a model, return a primal vector and status."
pub trait MilpBackend: Send + Sync {
    fn id(&self) -> &'static str;

    fn solve(
        &self,
        problem: &LinearProblem,
        options: &SolveOptions,
    ) -> Result<SolveOutcome, SolverError>;
}

/// Look up a backend by its config name.
pub fn backend_for(name: &str) -> Result<Box<dyn MilpBackend>, ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "highs" => Ok(Box::new(HighsBackend)),
        other => Err(ConfigError::UnknownSolver(other.to_string())),
    }
}

/// HiGHS branch-and-cut.
pub struct HighsBackend;

impl MilpBackend for HighsBackend {
    fn id(&self) -> &'static str {
        "highs"
    }

    fn solve(
        &self,
        problem: &LinearProblem,
        options: &SolveOptions,
    ) -> Result<SolveOutcome, SolverError> {
        let start = Instant::now();

        let mut pb = RowProblem::default();
        let mut cols = Vec::with_capacity(problem.num_cols());
        for col in problem.cols() {
            let bounds = (Bound::Included(col.lower), Bound::Included(col.upper));
            let handle = match col.kind {
                ColKind::Continuous => pb.add_column(col.objective, bounds),
                ColKind::Integer | ColKind::Binary => {
                    pb.add_integer_column(col.objective, bounds)
                }
            };
            cols.push(handle);
        }
        for row in problem.rows() {
            let bounds = (Bound::Included(row.lower), Bound::Included(row.upper));
            pb.add_row(
                bounds,
                row.coeffs.iter().map(|&(col, coeff)| (cols[col], coeff)),
            );
        }

        let sense = if problem.maximise {
            Sense::Maximise
        } else {
            Sense::Minimise
        };
        let mut model = pb.optimise(sense);
        model.set_option("time_limit", options.time_limit_secs);
        model.set_option("mip_rel_gap", options.mip_gap);
        if let Some(seed) = options.random_seed {
            model.set_option("random_seed", seed as i32);
        }
        if !options.verbose {
            model.make_quiet();
        }

        let solved = model.solve();
        let status = solved.status();
        let elapsed = start.elapsed().as_millis();

        match status {
            HighsModelStatus::Optimal => {
                let columns = solved.get_solution().columns().to_vec();
                let objective = problem.objective_value(&columns);
                Ok(SolveOutcome {
                    status: SolveStatus::Optimal,
                    columns,
                    objective,
                    gap: Some(0.0),
                    solve_time_ms: elapsed,
                })
            }
            HighsModelStatus::Infeasible => Err(SolverError::Infeasible),
            HighsModelStatus::ReachedTimeLimit => {
                let columns = solved.get_solution().columns().to_vec();
                let usable = columns.len() == problem.num_cols()
                    && columns.iter().all(|v| v.is_finite());
                if !usable {
                    return Err(SolverError::NoSolution);
                }
                let objective = problem.objective_value(&columns);
                tracing::warn!(elapsed_ms = elapsed, "time limit reached, returning incumbent");
                Ok(SolveOutcome {
                    status: SolveStatus::TimeLimit,
                    columns,
                    objective,
                    // The binding does not expose the incumbent's dual bound.
                    gap: None,
                    solve_time_ms: elapsed,
                })
            }
            other => Err(SolverError::Backend(format!("{:?}", other))),
        }
    }
}
