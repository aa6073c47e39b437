//! Authoritative player list ingest.

use crate::merge::AuthoritativePlayer;
use anyhow::{Context, Result};
use std::path::Path;

/// Load the authoritative player list from a JSON array of
/// `{id, name, position, team, price}` records.
pub fn load_player_list(path: &Path) -> Result<Vec<AuthoritativePlayer>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading player list '{}'", path.display()))?;
    let players: Vec<AuthoritativePlayer> = serde_json::from_str(&data)
        .with_context(|| format!("parsing player list '{}'", path.display()))?;
    Ok(players)
}
