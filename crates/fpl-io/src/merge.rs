//! Weighted merge of projection sources onto the authoritative player list.

use crate::projections::ProjectionSource;
use fpl_core::{Gameweek, GwProjection, Player, PlayerId, Position, TeamId};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// A player as reported by the authoritative list (the game's bootstrap
/// feed), before projections are attached.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthoritativePlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team: TeamId,
    /// Current price in tenths.
    pub price: u16,
}

/// Join projection sources onto the authoritative list.
///
/// Every authoritative player yields exactly one [`Player`], with an entry
/// for every gameweek in `gameweeks` (zero when no source covers it). When
/// several sources are supplied, values merge as `Σ wᵢ·vᵢ / Σ wᵢ`, per
/// (player, gameweek, field); a source without an entry contributes zero.
/// Projection rows for ids not on the authoritative list are dropped with a
/// diagnostic.
pub fn merge_projections(
    authoritative: &[AuthoritativePlayer],
    sources: &[ProjectionSource],
    gameweeks: &[Gameweek],
) -> Vec<Player> {
    let total_weight: f64 = sources.iter().map(|s| s.weight).sum();
    let known: HashSet<PlayerId> = authoritative.iter().map(|p| p.id).collect();

    for source in sources {
        let unknown: Vec<PlayerId> = source
            .rows
            .keys()
            .filter(|id| !known.contains(id))
            .copied()
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(
                source = %source.name,
                dropped = unknown.len(),
                ids = ?unknown.iter().take(8).collect::<Vec<_>>(),
                "projection rows for unknown player ids dropped"
            );
        }
    }

    authoritative
        .iter()
        .map(|auth| {
            let mut projections: BTreeMap<Gameweek, GwProjection> = BTreeMap::new();
            for &gw in gameweeks {
                let mut merged = GwProjection::default();
                if total_weight > 0.0 {
                    for source in sources {
                        let value = source
                            .rows
                            .get(&auth.id)
                            .and_then(|per_gw| per_gw.get(&gw))
                            .copied()
                            .unwrap_or_default();
                        merged.xp += source.weight * value.xp;
                        merged.xmin += source.weight * value.xmin;
                    }
                    merged.xp /= total_weight;
                    merged.xmin /= total_weight;
                }
                projections.insert(gw, merged);
            }
            Player {
                id: auth.id,
                name: auth.name.clone(),
                position: auth.position,
                team: auth.team,
                price: auth.price,
                projections,
            }
        })
        .collect()
}
