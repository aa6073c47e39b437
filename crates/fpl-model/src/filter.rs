//! Pre-solve player filtering.
//!
//! The MILP scales with the player count, so the pool is pruned before the
//! model builds. Pruning never removes a player the model is obliged to
//! admit: owned and locked players survive every step, and the output always
//! admits the initial squad.

use fpl_core::{Config, Gameweek, Player, PlayerId, SquadState};
use std::collections::BTreeSet;

/// Prune the player pool for tractability.
///
/// Ordered steps:
/// 1. retain owned, locked, `keep`, and the top `keep_top_ev_percent`% by
///    total expected points;
/// 2. drop players under the `xmin_lb` total-minutes floor;
/// 3. drop players under the `ev_per_price_cutoff` percentile of
///    points-per-price;
/// 4. drop banned players — a ban on an owned or locked player is ignored
///    with a warning.
pub fn filter_players(
    players: &[Player],
    state: &SquadState,
    config: &Config,
    gameweeks: &[Gameweek],
) -> Vec<Player> {
    let owned: BTreeSet<PlayerId> = state.players.iter().map(|p| p.id).collect();
    let locked: BTreeSet<PlayerId> = config.locked.iter().copied().collect();
    let keep: BTreeSet<PlayerId> = config.keep.iter().copied().collect();

    // Top slice by total expected points, ties broken by id for determinism.
    let mut by_xp: Vec<(PlayerId, f64)> = players
        .iter()
        .map(|p| (p.id, p.total_xp(gameweeks)))
        .collect();
    by_xp.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    let top_count =
        ((players.len() as f64) * config.keep_top_ev_percent / 100.0).ceil() as usize;
    let top_ev: BTreeSet<PlayerId> = by_xp.iter().take(top_count).map(|&(id, _)| id).collect();

    let retained: BTreeSet<PlayerId> = owned
        .iter()
        .chain(locked.iter())
        .chain(keep.iter())
        .chain(top_ev.iter())
        .copied()
        .collect();

    // Step 2: total-minutes floor.
    let mut pool: Vec<&Player> = players
        .iter()
        .filter(|p| retained.contains(&p.id) || p.total_xmin(gameweeks) >= config.xmin_lb)
        .collect();

    // Step 3: points-per-price percentile cutoff over the survivors.
    if config.ev_per_price_cutoff > 0.0 {
        let mut ratios: Vec<f64> = pool
            .iter()
            .filter(|p| !retained.contains(&p.id))
            .map(|p| ev_per_price(p, gameweeks))
            .collect();
        if !ratios.is_empty() {
            ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let idx = ((config.ev_per_price_cutoff / 100.0) * ratios.len() as f64) as usize;
            let cutoff = ratios[idx.min(ratios.len() - 1)];
            pool.retain(|p| retained.contains(&p.id) || ev_per_price(p, gameweeks) >= cutoff);
        }
    }

    // Step 4: bans, with owned/locked overriding.
    let banned: BTreeSet<PlayerId> = config.banned.iter().copied().collect();
    for id in banned.iter() {
        if owned.contains(id) || locked.contains(id) {
            tracing::warn!(player = %id, "ban ignored for an owned or locked player");
        }
    }
    pool.retain(|p| {
        !banned.contains(&p.id) || owned.contains(&p.id) || locked.contains(&p.id)
    });

    tracing::info!(
        total = players.len(),
        kept = pool.len(),
        "pre-solve filter pruned the player pool"
    );

    pool.into_iter().cloned().collect()
}

fn ev_per_price(player: &Player, gameweeks: &[Gameweek]) -> f64 {
    let price = player.price.max(1) as f64;
    player.total_xp(gameweeks) / price
}
