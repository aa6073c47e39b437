//! Model- and solver-side errors, plus the unified error the planning API
//! returns.

use fpl_core::{ConfigError, DataError, PlayerId, Position, TeamId};
use thiserror::Error;

/// Structural problems detected while building the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("initial squad must have exactly 15 players, found {0}")]
    SquadSize(usize),

    #[error("player {id} appears more than once in the initial squad")]
    DuplicatePlayer { id: PlayerId },

    #[error("initial squad holds {found} {position} players (quota {expected})")]
    QuotaViolation {
        position: Position,
        found: usize,
        expected: usize,
    },

    #[error("initial squad holds {count} players from team {team} (max 3)")]
    TeamCapViolation { team: TeamId, count: usize },

    #[error("free transfers {0} outside 1..=5")]
    FreeTransfers(u8),

    #[error("variable table would need {columns} columns, over the {limit} limit")]
    VariableOverflow { columns: usize, limit: usize },
}

/// Solver-side failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("model is infeasible")]
    Infeasible,

    #[error("time limit reached with no incumbent solution")]
    NoSolution,

    #[error("solver backend failure: {0}")]
    Backend(String),
}

/// Everything `solve_plan` can fail with.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}
