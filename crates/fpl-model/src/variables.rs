//! Decision-variable layout.
//!
//! Variables live in contiguous blocks indexed by
//! `(player_index, gameweek_index[, slot])`; the map stores only block
//! offsets and does the stride arithmetic, so lookups in the builder's hot
//! loops are adds and multiplies, not hashing. Player ids and the first
//! gameweek are kept as a side table to map columns back to names for MPS
//! export and diagnostics.

use fpl_core::{Gameweek, PlayerId};

pub const BENCH_SLOTS: usize = 4;
pub const FT_STATES: usize = 5;

/// Variable families in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// In the regular squad.
    Squad,
    /// In the Free Hit squad.
    FreeHitSquad,
    /// Starting.
    Lineup,
    Captain,
    ViceCaptain,
    /// On the bench in an ordered slot.
    Bench,
    TransferIn,
    TransferOut,
    UseWildcard,
    UseBenchBoost,
    UseFreeHit,
    /// Triple Captain on a specific player.
    UseTripleCaptain,
    /// Money in the bank after the gameweek's transfers.
    Itb,
    /// Free-transfer stock entering the gameweek.
    Fts,
    /// Transfers charged as hits.
    PenalisedTransfers,
    /// Indicator: the FT stock sits at a given state.
    FtState,
    /// FT transition underflow flag (stock would clamp at the floor).
    FtUnderflow,
    /// FT transition overflow flag (stock would clamp at the cap).
    FtOverflow,
}

/// Offset table over a [`crate::lp::LinearProblem`]'s columns.
#[derive(Debug, Clone)]
pub struct VariableMap {
    pub n_players: usize,
    pub n_gws: usize,
    /// Side table: model player index -> id.
    pub player_ids: Vec<PlayerId>,
    pub first_gw: Gameweek,

    squad: usize,
    squad_fh: usize,
    lineup: usize,
    captain: usize,
    vicecap: usize,
    bench: usize,
    transfer_in: usize,
    transfer_out: usize,
    use_tc: usize,
    use_wc: usize,
    use_bb: usize,
    use_fh: usize,
    itb: usize,
    fts: usize,
    penalised: usize,
    ft_state: usize,
    ft_underflow: usize,
    ft_overflow: usize,
    total: usize,
}

impl VariableMap {
    /// Lay out the offsets for `n_players` x `n_gws`. Transition aux
    /// binaries exist only between consecutive gameweeks.
    pub fn layout(player_ids: Vec<PlayerId>, first_gw: Gameweek, n_gws: usize) -> Self {
        let n_players = player_ids.len();
        let pw = n_players * n_gws;
        let transitions = n_gws.saturating_sub(1);

        let squad = 0;
        let squad_fh = squad + pw;
        let lineup = squad_fh + pw;
        let captain = lineup + pw;
        let vicecap = captain + pw;
        let bench = vicecap + pw;
        let transfer_in = bench + pw * BENCH_SLOTS;
        let transfer_out = transfer_in + pw;
        let use_tc = transfer_out + pw;
        let use_wc = use_tc + pw;
        let use_bb = use_wc + n_gws;
        let use_fh = use_bb + n_gws;
        let itb = use_fh + n_gws;
        let fts = itb + n_gws;
        let penalised = fts + n_gws;
        let ft_state = penalised + n_gws;
        let ft_underflow = ft_state + n_gws * FT_STATES;
        let ft_overflow = ft_underflow + transitions;
        let total = ft_overflow + transitions;

        Self {
            n_players,
            n_gws,
            player_ids,
            first_gw,
            squad,
            squad_fh,
            lineup,
            captain,
            vicecap,
            bench,
            transfer_in,
            transfer_out,
            use_tc,
            use_wc,
            use_bb,
            use_fh,
            itb,
            fts,
            penalised,
            ft_state,
            ft_underflow,
            ft_overflow,
            total,
        }
    }

    pub fn num_cols(&self) -> usize {
        self.total
    }

    #[inline]
    fn pw(&self, p: usize, w: usize) -> usize {
        debug_assert!(p < self.n_players && w < self.n_gws);
        p * self.n_gws + w
    }

    #[inline]
    pub fn squad(&self, p: usize, w: usize) -> usize {
        self.squad + self.pw(p, w)
    }

    #[inline]
    pub fn squad_fh(&self, p: usize, w: usize) -> usize {
        self.squad_fh + self.pw(p, w)
    }

    #[inline]
    pub fn lineup(&self, p: usize, w: usize) -> usize {
        self.lineup + self.pw(p, w)
    }

    #[inline]
    pub fn captain(&self, p: usize, w: usize) -> usize {
        self.captain + self.pw(p, w)
    }

    #[inline]
    pub fn vicecap(&self, p: usize, w: usize) -> usize {
        self.vicecap + self.pw(p, w)
    }

    #[inline]
    pub fn bench(&self, p: usize, w: usize, slot: usize) -> usize {
        debug_assert!(slot < BENCH_SLOTS);
        self.bench + self.pw(p, w) * BENCH_SLOTS + slot
    }

    #[inline]
    pub fn transfer_in(&self, p: usize, w: usize) -> usize {
        self.transfer_in + self.pw(p, w)
    }

    #[inline]
    pub fn transfer_out(&self, p: usize, w: usize) -> usize {
        self.transfer_out + self.pw(p, w)
    }

    #[inline]
    pub fn use_tc(&self, p: usize, w: usize) -> usize {
        self.use_tc + self.pw(p, w)
    }

    #[inline]
    pub fn use_wc(&self, w: usize) -> usize {
        self.use_wc + w
    }

    #[inline]
    pub fn use_bb(&self, w: usize) -> usize {
        self.use_bb + w
    }

    #[inline]
    pub fn use_fh(&self, w: usize) -> usize {
        self.use_fh + w
    }

    #[inline]
    pub fn itb(&self, w: usize) -> usize {
        self.itb + w
    }

    #[inline]
    pub fn fts(&self, w: usize) -> usize {
        self.fts + w
    }

    #[inline]
    pub fn penalised(&self, w: usize) -> usize {
        self.penalised + w
    }

    /// FT-state indicator for `state` in 1..=5.
    #[inline]
    pub fn ft_state(&self, w: usize, state: usize) -> usize {
        debug_assert!((1..=FT_STATES).contains(&state));
        self.ft_state + w * FT_STATES + (state - 1)
    }

    /// Underflow flag on the transition from `w` to `w + 1`.
    #[inline]
    pub fn ft_underflow(&self, w: usize) -> usize {
        debug_assert!(w + 1 < self.n_gws);
        self.ft_underflow + w
    }

    /// Overflow flag on the transition from `w` to `w + 1`.
    #[inline]
    pub fn ft_overflow(&self, w: usize) -> usize {
        debug_assert!(w + 1 < self.n_gws);
        self.ft_overflow + w
    }

    /// Decode a column index back to `(kind, player, gameweek, slot)`.
    pub fn describe(&self, col: usize) -> (VarKind, Option<usize>, Option<usize>, Option<usize>) {
        let split_pw = |base: usize| {
            let off = col - base;
            (Some(off / self.n_gws), Some(off % self.n_gws))
        };
        if col < self.squad_fh {
            let (p, w) = split_pw(self.squad);
            (VarKind::Squad, p, w, None)
        } else if col < self.lineup {
            let (p, w) = split_pw(self.squad_fh);
            (VarKind::FreeHitSquad, p, w, None)
        } else if col < self.captain {
            let (p, w) = split_pw(self.lineup);
            (VarKind::Lineup, p, w, None)
        } else if col < self.vicecap {
            let (p, w) = split_pw(self.captain);
            (VarKind::Captain, p, w, None)
        } else if col < self.bench {
            let (p, w) = split_pw(self.vicecap);
            (VarKind::ViceCaptain, p, w, None)
        } else if col < self.transfer_in {
            let off = col - self.bench;
            let slot = off % BENCH_SLOTS;
            let pw_off = off / BENCH_SLOTS;
            (
                VarKind::Bench,
                Some(pw_off / self.n_gws),
                Some(pw_off % self.n_gws),
                Some(slot),
            )
        } else if col < self.transfer_out {
            let (p, w) = split_pw(self.transfer_in);
            (VarKind::TransferIn, p, w, None)
        } else if col < self.use_tc {
            let (p, w) = split_pw(self.transfer_out);
            (VarKind::TransferOut, p, w, None)
        } else if col < self.use_wc {
            let (p, w) = split_pw(self.use_tc);
            (VarKind::UseTripleCaptain, p, w, None)
        } else if col < self.use_bb {
            (VarKind::UseWildcard, None, Some(col - self.use_wc), None)
        } else if col < self.use_fh {
            (VarKind::UseBenchBoost, None, Some(col - self.use_bb), None)
        } else if col < self.itb {
            (VarKind::UseFreeHit, None, Some(col - self.use_fh), None)
        } else if col < self.fts {
            (VarKind::Itb, None, Some(col - self.itb), None)
        } else if col < self.penalised {
            (VarKind::Fts, None, Some(col - self.fts), None)
        } else if col < self.ft_state {
            (VarKind::PenalisedTransfers, None, Some(col - self.penalised), None)
        } else if col < self.ft_underflow {
            let off = col - self.ft_state;
            (
                VarKind::FtState,
                None,
                Some(off / FT_STATES),
                Some(off % FT_STATES + 1),
            )
        } else if col < self.ft_overflow {
            (VarKind::FtUnderflow, None, Some(col - self.ft_underflow), None)
        } else {
            (VarKind::FtOverflow, None, Some(col - self.ft_overflow), None)
        }
    }

    /// Human-readable column name for MPS export and logs.
    pub fn col_name(&self, col: usize) -> String {
        let (kind, p, w, slot) = self.describe(col);
        let gw = |w: Option<usize>| w.map(|w| self.first_gw as usize + w).unwrap_or(0);
        let pid = |p: Option<usize>| p.map(|p| self.player_ids[p].value()).unwrap_or(0);
        match kind {
            VarKind::Squad => format!("squad_p{}_w{}", pid(p), gw(w)),
            VarKind::FreeHitSquad => format!("fhsquad_p{}_w{}", pid(p), gw(w)),
            VarKind::Lineup => format!("lineup_p{}_w{}", pid(p), gw(w)),
            VarKind::Captain => format!("cap_p{}_w{}", pid(p), gw(w)),
            VarKind::ViceCaptain => format!("vcap_p{}_w{}", pid(p), gw(w)),
            VarKind::Bench => format!("bench_p{}_w{}_s{}", pid(p), gw(w), slot.unwrap_or(0)),
            VarKind::TransferIn => format!("tin_p{}_w{}", pid(p), gw(w)),
            VarKind::TransferOut => format!("tout_p{}_w{}", pid(p), gw(w)),
            VarKind::UseWildcard => format!("usewc_w{}", gw(w)),
            VarKind::UseBenchBoost => format!("usebb_w{}", gw(w)),
            VarKind::UseFreeHit => format!("usefh_w{}", gw(w)),
            VarKind::UseTripleCaptain => format!("usetc_p{}_w{}", pid(p), gw(w)),
            VarKind::Itb => format!("itb_w{}", gw(w)),
            VarKind::Fts => format!("fts_w{}", gw(w)),
            VarKind::PenalisedTransfers => format!("hits_w{}", gw(w)),
            VarKind::FtState => format!("ftstate_w{}_s{}", gw(w), slot.unwrap_or(0)),
            VarKind::FtUnderflow => format!("ftlo_w{}", gw(w)),
            VarKind::FtOverflow => format!("fthi_w{}", gw(w)),
        }
    }
}
