//! Error types raised before a model exists.
//!
//! Configuration and input-data problems are fatal and surfaced pre-build;
//! model- and solver-side errors live in `fpl-model` next to the code that
//! raises them.

use crate::types::{Chip, Gameweek, PlayerId};
use thiserror::Error;

/// Configuration problems, surfaced before any model is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("conflicting chips forced in gameweek {gw}")]
    ConflictingChips { gw: Gameweek },

    #[error("chip {chip} forced in gameweek {gw} but unavailable")]
    ChipUnavailable { chip: Chip, gw: Gameweek },

    #[error("chip {chip} forced in gameweek {gw}, outside the planning window")]
    ChipOutsideHorizon { chip: Chip, gw: Gameweek },

    #[error("unknown solver backend '{0}'")]
    UnknownSolver(String),

    #[error("config layer '{path}': {message}")]
    Layer { path: String, message: String },
}

/// Input-data problems from projection sources and state feeds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("projection source '{source_name}' is missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("projection source '{source_name}' line {line}: {message}")]
    MalformedRow {
        source_name: String,
        line: u64,
        message: String,
    },

    #[error("player {id} referenced by {context} is not in the player pool")]
    MissingPlayer { id: PlayerId, context: &'static str },

    #[error("reading '{source_name}': {message}")]
    Read { source_name: String, message: String },
}
