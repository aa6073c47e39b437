//! Free-transfer state reconstruction from transfer history.
//!
//! The game grants one extra free transfer per gameweek, caps the stock at
//! five, never lets it fall below one, and freezes it across Wildcard and
//! Free Hit weeks.

use crate::types::Gameweek;
use std::collections::{BTreeMap, BTreeSet};

pub const FT_MIN: u8 = 1;
pub const FT_MAX: u8 = 5;

/// Reconstruct the free-transfer count available for `current_gw + 1`.
///
/// `transfers_by_gw` maps each played gameweek to the number of transfers
/// made in it; `chip_gws` holds the gameweeks in which a Wildcard or Free
/// Hit was active (those weeks neither consume nor accrue free transfers).
/// `override_next_gw`, when set, replaces the computed value, clamped to the
/// legal range.
pub fn reconstruct_free_transfers(
    transfers_by_gw: &BTreeMap<Gameweek, u32>,
    first_gw: Gameweek,
    current_gw: Gameweek,
    chip_gws: &BTreeSet<Gameweek>,
    override_next_gw: Option<u8>,
) -> u8 {
    if let Some(forced) = override_next_gw {
        return forced.clamp(FT_MIN, FT_MAX);
    }

    let mut fts: u32 = 1;
    let mut gw = first_gw.saturating_add(2);
    while gw <= current_gw.saturating_add(1) {
        let prev = gw - 1;
        if chip_gws.contains(&prev) {
            // Chip week: the stock carries unchanged.
        } else {
            let made = transfers_by_gw.get(&prev).copied().unwrap_or(0);
            fts = (fts.saturating_sub(made) + 1).clamp(FT_MIN as u32, FT_MAX as u32);
        }
        gw += 1;
    }
    fts as u8
}
