//! Domain types shared across the planner.
//!
//! Prices are carried as integer tenths of a million throughout, exactly as
//! the game reports them; conversion to display units happens at the edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a player (the FPL element id).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        PlayerId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Premier League team id (1..20).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TeamId(pub u8);

impl TeamId {
    pub fn new(id: u8) -> Self {
        TeamId(id)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A scoring round. Gameweeks are 1-based and never exceed 38 in a season.
pub type Gameweek = u8;

/// Player position, in the game's element-type order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    #[serde(alias = "G", alias = "GKP")]
    Gk,
    #[serde(alias = "D")]
    Def,
    #[serde(alias = "M")]
    Mid,
    #[serde(alias = "F")]
    Fwd,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::Gk, Position::Def, Position::Mid, Position::Fwd];

    /// Element-type rank (1..4).
    pub fn rank(self) -> u8 {
        match self {
            Position::Gk => 1,
            Position::Def => 2,
            Position::Mid => 3,
            Position::Fwd => 4,
        }
    }

    /// Number of players of this position a squad must hold.
    pub fn squad_quota(self) -> u8 {
        match self {
            Position::Gk => 2,
            Position::Def => 5,
            Position::Mid => 5,
            Position::Fwd => 3,
        }
    }

    /// Minimum starters of this position in a legal formation.
    pub fn min_play(self) -> u8 {
        match self {
            Position::Gk => 1,
            Position::Def => 3,
            Position::Mid => 2,
            Position::Fwd => 1,
        }
    }

    /// Maximum starters of this position in a legal formation.
    pub fn max_play(self) -> u8 {
        match self {
            Position::Gk => 1,
            Position::Def => 5,
            Position::Mid => 5,
            Position::Fwd => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::Gk => "GK",
            Position::Def => "DEF",
            Position::Mid => "MID",
            Position::Fwd => "FWD",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "G" | "GK" | "GKP" => Ok(Position::Gk),
            "D" | "DEF" => Ok(Position::Def),
            "M" | "MID" => Ok(Position::Mid),
            "F" | "FWD" => Ok(Position::Fwd),
            _ => Err(format!("unknown position '{}'", s)),
        }
    }
}

/// Per-gameweek projection for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GwProjection {
    /// Expected points.
    pub xp: f64,
    /// Expected minutes.
    pub xmin: f64,
}

/// A player with merged projections. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team: TeamId,
    /// Current price in tenths of a million.
    pub price: u16,
    /// Projection per gameweek. Every gameweek of the horizon has an entry
    /// (zeros are materialised before the model builds).
    pub projections: BTreeMap<Gameweek, GwProjection>,
}

impl Player {
    /// Projection for a gameweek, zero when absent.
    pub fn projection(&self, gw: Gameweek) -> GwProjection {
        self.projections.get(&gw).copied().unwrap_or_default()
    }

    /// Total expected points over the given gameweeks.
    pub fn total_xp(&self, gameweeks: &[Gameweek]) -> f64 {
        gameweeks.iter().map(|gw| self.projection(*gw).xp).sum()
    }

    /// Total expected minutes over the given gameweeks.
    pub fn total_xmin(&self, gameweeks: &[Gameweek]) -> f64 {
        gameweeks.iter().map(|gw| self.projection(*gw).xmin).sum()
    }
}

/// The four single-use chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chip {
    #[serde(alias = "wc")]
    Wildcard,
    #[serde(alias = "fh")]
    FreeHit,
    #[serde(alias = "bb")]
    BenchBoost,
    #[serde(alias = "tc")]
    TripleCaptain,
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Chip::Wildcard => "WC",
            Chip::FreeHit => "FH",
            Chip::BenchBoost => "BB",
            Chip::TripleCaptain => "TC",
        };
        write!(f, "{}", s)
    }
}

/// Selling price under the half-profit rule: sell-on value rises by half of
/// any price gain (rounded down per tenth), and tracks the full price on a
/// loss.
pub fn selling_price(purchase: u16, current: u16) -> u16 {
    if current > purchase {
        purchase + (current - purchase) / 2
    } else {
        current
    }
}

/// A currently-held player with its purchase bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedPlayer {
    pub id: PlayerId,
    /// Price paid, in tenths.
    pub purchase_price: u16,
    /// Current sell-on value, in tenths.
    pub selling_price: u16,
}

/// Which chips the manager can still play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipsAvailable {
    #[serde(rename = "wc")]
    pub wildcard: bool,
    #[serde(rename = "fh")]
    pub free_hit: bool,
    #[serde(rename = "bb")]
    pub bench_boost: bool,
    #[serde(rename = "tc")]
    pub triple_captain: bool,
}

impl ChipsAvailable {
    pub fn all() -> Self {
        Self {
            wildcard: true,
            free_hit: true,
            bench_boost: true,
            triple_captain: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn has(&self, chip: Chip) -> bool {
        match chip {
            Chip::Wildcard => self.wildcard,
            Chip::FreeHit => self.free_hit,
            Chip::BenchBoost => self.bench_boost,
            Chip::TripleCaptain => self.triple_captain,
        }
    }
}

/// A chip played in a past gameweek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedChip {
    pub chip: Chip,
    pub gw: Gameweek,
}

/// Initial conditions for a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadState {
    /// Exactly 15 owned players satisfying the position quota and team cap.
    pub players: Vec<OwnedPlayer>,
    /// Money in the bank, in tenths.
    pub bank: u32,
    /// Free transfers available for the first planned gameweek (1..5).
    pub free_transfers: u8,
    pub chips_available: ChipsAvailable,
    #[serde(default)]
    pub chips_used: Vec<UsedChip>,
}

impl SquadState {
    pub fn owns(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn owned(&self, id: PlayerId) -> Option<&OwnedPlayer> {
        self.players.iter().find(|p| p.id == id)
    }
}
