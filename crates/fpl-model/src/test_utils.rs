//! Synthetic instances for tests.
//!
//! The pool is laid out so its first fifteen players form a legal squad:
//! two goalkeepers, five defenders, five midfielders, three forwards, all on
//! distinct teams. Players past the fifteenth cycle through the positions.

use fpl_core::{
    ChipsAvailable, Gameweek, GwProjection, OwnedPlayer, Player, PlayerId, Position, SquadState,
    TeamId,
};
use std::collections::BTreeMap;

/// Position of the i-th synthetic player (0-based).
pub fn synthetic_position(i: usize) -> Position {
    match i {
        0..=1 => Position::Gk,
        2..=6 => Position::Def,
        7..=11 => Position::Mid,
        12..=14 => Position::Fwd,
        _ => match (i - 15) % 4 {
            0 => Position::Gk,
            1 => Position::Def,
            2 => Position::Mid,
            _ => Position::Fwd,
        },
    }
}

/// Build `n` players with ids 1..=n, spread over teams, with modest
/// projections for every listed gameweek.
pub fn synthetic_pool(n: usize, gameweeks: &[Gameweek]) -> Vec<Player> {
    (0..n)
        .map(|i| {
            let mut projections = BTreeMap::new();
            for &gw in gameweeks {
                projections.insert(
                    gw,
                    GwProjection {
                        xp: 1.0 + (i % 7) as f64 * 0.5,
                        xmin: 90.0,
                    },
                );
            }
            Player {
                id: PlayerId::new(i as u32 + 1),
                name: format!("Player {}", i + 1),
                position: synthetic_position(i),
                team: TeamId::new((i % 20) as u8 + 1),
                price: 40 + (i % 8) as u16 * 5,
                projections,
            }
        })
        .collect()
}

/// Own the pool's first fifteen players at face value, with a roomy bank
/// and every chip in hand.
pub fn squad_of_first_15(pool: &[Player]) -> SquadState {
    SquadState {
        players: pool
            .iter()
            .take(15)
            .map(|p| OwnedPlayer {
                id: p.id,
                purchase_price: p.price,
                selling_price: p.price,
            })
            .collect(),
        bank: 100,
        free_transfers: 1,
        chips_available: ChipsAvailable::all(),
        chips_used: Vec::new(),
    }
}

/// Set one player's projection to a flat value across all gameweeks.
pub fn set_flat_xp(pool: &mut [Player], id: u32, xp: f64) {
    let player = pool
        .iter_mut()
        .find(|p| p.id == PlayerId::new(id))
        .unwrap_or_else(|| panic!("player {} not in pool", id));
    for proj in player.projections.values_mut() {
        proj.xp = xp;
    }
}
