//! Solution structures handed back to callers.

use fpl_core::{Chip, Gameweek, PlayerId, Position};
use serde::Serialize;

/// How the solver finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// Time limit reached; the incumbent is returned.
    TimeLimit,
}

/// One squad member's role in a gameweek.
#[derive(Debug, Clone, Serialize)]
pub struct Pick {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub lineup: bool,
    /// Ordered bench slot (0 is the reserve goalkeeper), when benched.
    pub bench_slot: Option<u8>,
    pub captain: bool,
    pub vice_captain: bool,
    /// Joined the squad this gameweek.
    pub transfer_in: bool,
    /// Scoring multiplier: 0 benched, 1 starting, 2 captain, 3 triple
    /// captain.
    pub multiplier: u8,
}

/// A chip activation, with the boosted player for Triple Captain.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChipPlay {
    pub chip: Chip,
    pub player: Option<PlayerId>,
}

/// The plan for one gameweek.
#[derive(Debug, Clone, Serialize)]
pub struct GameweekPlan {
    pub gw: Gameweek,
    /// The fifteen scoring squad members (the Free Hit squad in a Free Hit
    /// week).
    pub picks: Vec<Pick>,
    pub chip: Option<ChipPlay>,
    /// Free transfers available entering the gameweek.
    pub free_transfers: u8,
    pub transfers_in: Vec<PlayerId>,
    pub transfers_out: Vec<PlayerId>,
    /// Transfers charged beyond the free allowance.
    pub hits: u32,
    /// Bank after this gameweek's transfers, in tenths.
    pub bank: u32,
    /// Undiscounted expected points contribution of this gameweek.
    pub expected_points: f64,
}

impl GameweekPlan {
    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.captain)
    }

    pub fn lineup_count(&self) -> usize {
        self.picks.iter().filter(|p| p.lineup).count()
    }

    pub fn transfers_made(&self) -> usize {
        self.transfers_out.len()
    }
}

/// A complete multi-period plan.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    /// Objective value: decay-weighted expected points net of penalties and
    /// resource valuations.
    pub score: f64,
    pub status: SolveStatus,
    /// Relative optimality gap when the backend reports one; `0` for proven
    /// optima, `None` when unavailable.
    pub optimality_gap: Option<f64>,
    /// Fingerprint of the config that produced this plan.
    pub fingerprint: String,
    /// Which iteration of the alternative-solution loop produced this.
    pub iteration: u32,
    pub plans: Vec<GameweekPlan>,
}

impl Solution {
    /// Human-readable per-gameweek summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Plan score: {:.2}\n", self.score));
        s.push_str(&format!(
            "Status: {}\n",
            match self.status {
                SolveStatus::Optimal => "optimal".to_string(),
                SolveStatus::TimeLimit => match self.optimality_gap {
                    Some(gap) => format!("time limit (gap {:.2}%)", gap * 100.0),
                    None => "time limit (gap unknown)".to_string(),
                },
            }
        ));
        for plan in &self.plans {
            s.push_str(&format!(
                "\nGW{} | xPts {:.2} | FT {} | hits {} | bank {:.1}\n",
                plan.gw,
                plan.expected_points,
                plan.free_transfers,
                plan.hits,
                plan.bank as f64 / 10.0,
            ));
            if let Some(chip) = &plan.chip {
                match chip.player {
                    Some(player) => s.push_str(&format!("  chip: {} on {}\n", chip.chip, player)),
                    None => s.push_str(&format!("  chip: {}\n", chip.chip)),
                }
            }
            if !plan.transfers_in.is_empty() || !plan.transfers_out.is_empty() {
                let ins: Vec<String> =
                    plan.transfers_in.iter().map(|id| id.to_string()).collect();
                let outs: Vec<String> =
                    plan.transfers_out.iter().map(|id| id.to_string()).collect();
                s.push_str(&format!(
                    "  transfers: in [{}] out [{}]\n",
                    ins.join(", "),
                    outs.join(", ")
                ));
            }
            let mut starters: Vec<&Pick> = plan.picks.iter().filter(|p| p.lineup).collect();
            starters.sort_by_key(|p| p.position.rank());
            for pick in starters {
                let badge = if pick.captain {
                    if pick.multiplier == 3 {
                        " (TC)"
                    } else {
                        " (C)"
                    }
                } else if pick.vice_captain {
                    " (V)"
                } else {
                    ""
                };
                s.push_str(&format!("  {} {}{}\n", pick.position, pick.name, badge));
            }
            let mut benched: Vec<&Pick> =
                plan.picks.iter().filter(|p| p.bench_slot.is_some()).collect();
            benched.sort_by_key(|p| p.bench_slot);
            for pick in benched {
                s.push_str(&format!(
                    "  bench{} {} {}\n",
                    pick.bench_slot.unwrap_or(0),
                    pick.position,
                    pick.name
                ));
            }
        }
        s
    }
}
