//! Multi-period FPL squad planning as a mixed-integer linear program.
//!
//! The pipeline: [`filter::filter_players`] prunes the pool,
//! [`builder::build_model`] emits the constraint set and objective into a
//! [`lp::LinearProblem`], a [`backend::MilpBackend`] produces a primal
//! vector, and [`extract::extract_solution`] materialises per-gameweek
//! plans. [`optimizer::solve_plan`] strings these together and runs the
//! iteration-cut loop for alternative solutions.

pub mod backend;
pub mod builder;
pub mod error;
pub mod extract;
pub mod filter;
pub mod lp;
pub mod mps;
pub mod optimizer;
pub mod plan;
pub mod test_utils;
pub mod variables;

pub use backend::{backend_for, HighsBackend, MilpBackend, SolveOptions, SolveOutcome};
pub use builder::{build_model, BuiltModel};
pub use error::{ModelError, PlanError, SolverError};
pub use extract::extract_solution;
pub use filter::filter_players;
pub use lp::{ColKind, Column, LinearProblem, Row};
pub use mps::write_mps;
pub use optimizer::{solve_plan, solve_plan_cancellable};
pub use plan::{ChipPlay, GameweekPlan, Pick, Solution, SolveStatus};
pub use variables::{VarKind, VariableMap, BENCH_SLOTS, FT_STATES};
