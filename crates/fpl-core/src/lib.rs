//! Core domain types and configuration for the FPL multi-period planner.
//!
//! This crate holds everything the other planner crates agree on: the player
//! and squad model, the typed configuration with overlay semantics and its
//! fingerprint, the free-transfer reconstruction rules, and the pre-build
//! error taxonomy.

pub mod config;
pub mod error;
pub mod transfers;
pub mod types;

pub use config::{BookedTransfer, ChipLimits, Config, ConfigOverlay, TransferDirection};
pub use error::{ConfigError, DataError};
pub use transfers::{reconstruct_free_transfers, FT_MAX, FT_MIN};
pub use types::{
    selling_price, Chip, ChipsAvailable, Gameweek, GwProjection, OwnedPlayer, Player, PlayerId,
    Position, SquadState, TeamId, UsedChip,
};
