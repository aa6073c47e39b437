pub mod export_mps;
pub mod simulate;
pub mod solve;

use crate::cli::{parse_projection_arg, InputArgs};
use anyhow::{Context, Result};
use fpl_core::{Config, Gameweek, Player, SquadState};
use fpl_io::{load_player_list, load_squad_state, merge_projections, read_projection_csv};
use std::path::PathBuf;

/// Everything a command needs after ingest: the merged pool, the squad
/// state, the resolved config, and the first planned gameweek.
pub struct LoadedInputs {
    pub players: Vec<Player>,
    pub state: SquadState,
    pub config: Config,
    pub first_gw: Gameweek,
}

/// Load config layers, the player list, the squad state, and the projection
/// sources, then merge projections over the planning window.
pub fn load_inputs(input: &InputArgs, config: Config) -> Result<LoadedInputs> {
    let authoritative = load_player_list(&input.players)?;
    let state = load_squad_state(&input.team)?;

    let mut sources = Vec::new();
    for arg in &input.projections {
        let (path, weight) = parse_projection_arg(arg)?;
        let source = read_projection_csv(&path, weight)
            .with_context(|| format!("loading projections '{}'", path.display()))?;
        sources.push(source);
    }

    let first_gw = match input.gw {
        Some(gw) => gw,
        None => sources
            .iter()
            .flat_map(|s| s.gameweeks())
            .min()
            .context("projection sources cover no gameweeks; pass --gw")?,
    };

    let gameweeks: Vec<Gameweek> = (0..config.horizon).map(|i| first_gw + i).collect();
    let players = merge_projections(&authoritative, &sources, &gameweeks);

    tracing::info!(
        players = players.len(),
        sources = sources.len(),
        first_gw,
        horizon = config.horizon,
        "inputs loaded"
    );

    Ok(LoadedInputs {
        players,
        state,
        config,
        first_gw,
    })
}

/// Resolve the layered config from `--config a.json;b.json`.
pub fn resolve_config(config_arg: &Option<String>) -> Result<Config> {
    let paths: Vec<PathBuf> = config_arg
        .as_deref()
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();
    Ok(Config::from_files(&paths)?)
}
