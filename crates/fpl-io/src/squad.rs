//! Squad-state ingest from the JSON wire format.
//!
//! The wire format mirrors what the game's entry endpoints report; it is
//! converted here into the crate-internal [`SquadState`].

use anyhow::{Context, Result};
use fpl_core::{ChipsAvailable, Gameweek, OwnedPlayer, PlayerId, SquadState, UsedChip};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SquadFile {
    players: Vec<SquadFilePlayer>,
    bank_tenths: u32,
    free_transfers: u8,
    chips_available: ChipsAvailable,
    #[serde(default)]
    chips_used: Vec<UsedChipFile>,
}

#[derive(Debug, Deserialize)]
struct SquadFilePlayer {
    id: PlayerId,
    purchase_tenths: u16,
    sell_tenths: u16,
}

#[derive(Debug, Deserialize)]
struct UsedChipFile {
    chip: fpl_core::Chip,
    gw: Gameweek,
}

/// Load a squad state from a JSON file.
pub fn load_squad_state(path: &Path) -> Result<SquadState> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading squad state '{}'", path.display()))?;
    let file: SquadFile = serde_json::from_str(&data)
        .with_context(|| format!("parsing squad state '{}'", path.display()))?;
    Ok(SquadState {
        players: file
            .players
            .into_iter()
            .map(|p| OwnedPlayer {
                id: p.id,
                purchase_price: p.purchase_tenths,
                selling_price: p.sell_tenths,
            })
            .collect(),
        bank: file.bank_tenths,
        free_transfers: file.free_transfers,
        chips_available: file.chips_available,
        chips_used: file
            .chips_used
            .into_iter()
            .map(|c| UsedChip { chip: c.chip, gw: c.gw })
            .collect(),
    })
}
