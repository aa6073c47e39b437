//! MILP model construction.
//!
//! Turns the filtered player pool, the initial squad state, and the config
//! into a [`LinearProblem`]. Constraint families follow the game's rules:
//! squad composition, lineup legality, chip semantics, transfer accounting,
//! and the free-transfer state machine. The objective is decay-weighted
//! expected points net of hit penalties plus a valuation of unspent
//! resources.

use crate::error::{ModelError, PlanError};
use crate::lp::{ColKind, LinearProblem};
use crate::variables::{VariableMap, BENCH_SLOTS, FT_STATES};
use fpl_core::{
    Chip, Config, ConfigError, DataError, Gameweek, Player, PlayerId, Position, SquadState,
    TransferDirection, FT_MAX, FT_MIN,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Hard cap on model size; hit only by a runaway configuration.
const MAX_COLUMNS: usize = 5_000_000;

/// Big-M releasing the hit count under a Wildcard: no week moves more than
/// the squad size.
const HIT_M: f64 = 15.0;

/// A built model plus the side tables extraction needs.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub problem: LinearProblem,
    pub vars: VariableMap,
    /// Filtered players in model order.
    pub players: Vec<Player>,
    pub gameweeks: Vec<Gameweek>,
    /// Purchase cost per model player, in tenths.
    pub buy_price: Vec<f64>,
    /// Sale proceeds per model player, in tenths. Owned players use their
    /// tracked selling price; everyone else trades at current price.
    pub sell_price: Vec<f64>,
    pub initial_squad: Vec<bool>,
}

/// Build the full multi-period model.
pub fn build_model(
    players: &[Player],
    state: &SquadState,
    config: &Config,
    first_gw: Gameweek,
) -> Result<BuiltModel, PlanError> {
    let n_players = players.len();
    let n_gws = config.horizon as usize;
    let gameweeks: Vec<Gameweek> = (0..config.horizon).map(|i| first_gw + i).collect();

    let index: HashMap<PlayerId, usize> =
        players.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

    let initial_squad = validate_initial_squad(players, state, &index)?;
    if !(FT_MIN..=FT_MAX).contains(&state.free_transfers) {
        return Err(ModelError::FreeTransfers(state.free_transfers).into());
    }

    let chip_caps = resolve_chip_schedule(state, config, &gameweeks)?;

    let vars = VariableMap::layout(players.iter().map(|p| p.id).collect(), first_gw, n_gws);
    if vars.num_cols() > MAX_COLUMNS {
        return Err(ModelError::VariableOverflow {
            columns: vars.num_cols(),
            limit: MAX_COLUMNS,
        }
        .into());
    }

    let mut lp = LinearProblem::maximisation();
    add_columns(&mut lp, &vars, state, config);
    debug_assert_eq!(lp.num_cols(), vars.num_cols());

    let buy_price: Vec<f64> = players.iter().map(|p| p.price as f64).collect();
    let sell_price: Vec<f64> = players
        .iter()
        .map(|p| {
            state
                .owned(p.id)
                .map(|o| o.selling_price as f64)
                .unwrap_or(p.price as f64)
        })
        .collect();

    apply_bound_fixes(&mut lp, &vars, players, state, config, &chip_caps);

    let mut builder = RowBuilder {
        lp: &mut lp,
        vars: &vars,
        players,
        config,
        state,
        buy_price: &buy_price,
        sell_price: &sell_price,
        initial_squad: &initial_squad,
    };
    builder.squad_composition();
    builder.lineup_and_armbands();
    builder.bench_slots();
    builder.role_disjointness();
    builder.chip_rows(&chip_caps);
    builder.transfer_rows(&index)?;
    builder.budget_rows();
    builder.hit_rows();
    builder.ft_state_rows();
    builder.ft_transition_rows();

    set_objective(&mut lp, &vars, players, config, &gameweeks);

    tracing::debug!(
        players = n_players,
        gameweeks = n_gws,
        columns = lp.num_cols(),
        rows = lp.num_rows(),
        "model built"
    );

    Ok(BuiltModel {
        problem: lp,
        vars,
        players: players.to_vec(),
        gameweeks,
        buy_price,
        sell_price,
        initial_squad,
    })
}

/// Check the initial squad against the quota and team cap, returning the
/// membership mask in model order.
fn validate_initial_squad(
    players: &[Player],
    state: &SquadState,
    index: &HashMap<PlayerId, usize>,
) -> Result<Vec<bool>, PlanError> {
    if state.players.len() != 15 {
        return Err(ModelError::SquadSize(state.players.len()).into());
    }

    let mut mask = vec![false; players.len()];
    let mut quota: BTreeMap<Position, usize> = BTreeMap::new();
    let mut per_team: BTreeMap<fpl_core::TeamId, usize> = BTreeMap::new();
    for owned in &state.players {
        let p = *index.get(&owned.id).ok_or(DataError::MissingPlayer {
            id: owned.id,
            context: "initial squad",
        })?;
        if mask[p] {
            return Err(ModelError::DuplicatePlayer { id: owned.id }.into());
        }
        mask[p] = true;
        *quota.entry(players[p].position).or_default() += 1;
        *per_team.entry(players[p].team).or_default() += 1;
    }

    for position in Position::ALL {
        let found = quota.get(&position).copied().unwrap_or(0);
        let expected = position.squad_quota() as usize;
        if found != expected {
            return Err(ModelError::QuotaViolation {
                position,
                found,
                expected,
            }
            .into());
        }
    }
    for (&team, &count) in &per_team {
        if count > 3 {
            return Err(ModelError::TeamCapViolation { team, count }.into());
        }
    }
    Ok(mask)
}

/// Effective activation caps per chip after availability and forced weeks.
pub(crate) struct ChipCaps {
    pub wildcard: u8,
    pub free_hit: u8,
    pub bench_boost: u8,
    pub triple_captain: u8,
}

fn resolve_chip_schedule(
    state: &SquadState,
    config: &Config,
    gameweeks: &[Gameweek],
) -> Result<ChipCaps, ConfigError> {
    let cap = |chip: Chip| -> Result<u8, ConfigError> {
        let available = state.chips_available.has(chip);
        let limit = if available { config.chip_limits.limit(chip) } else { 0 };
        let forced = config.forced_chip_gws(chip);
        for &gw in forced {
            if !gameweeks.contains(&gw) {
                return Err(ConfigError::ChipOutsideHorizon { chip, gw });
            }
        }
        if forced.len() as u8 > limit {
            return Err(ConfigError::ChipUnavailable {
                chip,
                gw: forced.first().copied().unwrap_or(gameweeks[0]),
            });
        }
        Ok(limit)
    };
    Ok(ChipCaps {
        wildcard: cap(Chip::Wildcard)?,
        free_hit: cap(Chip::FreeHit)?,
        bench_boost: cap(Chip::BenchBoost)?,
        triple_captain: cap(Chip::TripleCaptain)?,
    })
}

/// Emit every column in the layout's order.
fn add_columns(lp: &mut LinearProblem, vars: &VariableMap, state: &SquadState, config: &Config) {
    let (n_p, n_w) = (vars.n_players, vars.n_gws);
    // squad, squad_fh, lineup, captain, vicecap
    for _ in 0..5 * n_p * n_w {
        lp.add_binary();
    }
    // bench
    for _ in 0..n_p * n_w * BENCH_SLOTS {
        lp.add_binary();
    }
    // transfer_in, transfer_out, use_tc
    for _ in 0..3 * n_p * n_w {
        lp.add_binary();
    }
    // use_wc, use_bb, use_fh
    for _ in 0..3 * n_w {
        lp.add_binary();
    }
    // itb
    for _ in 0..n_w {
        lp.add_col(ColKind::Continuous, 0.0, f64::INFINITY);
    }
    // fts
    for _ in 0..n_w {
        lp.add_col(ColKind::Integer, FT_MIN as f64, FT_MAX as f64);
    }
    lp.fix_col(vars.fts(0), state.free_transfers as f64);
    // penalised transfers
    let pen_ub = if config.weekly_hit_limit > 0 {
        config.weekly_hit_limit as f64
    } else {
        HIT_M
    };
    for _ in 0..n_w {
        lp.add_col(ColKind::Integer, 0.0, pen_ub);
    }
    // ft state indicators
    for _ in 0..n_w * FT_STATES {
        lp.add_binary();
    }
    // transition flags
    for _ in 0..2 * n_w.saturating_sub(1) {
        lp.add_binary();
    }
}

/// Column-bound surgery: bans, locks, the goalkeeper bench slot, forced
/// chips, unavailable chips, and the no-transfer tail.
fn apply_bound_fixes(
    lp: &mut LinearProblem,
    vars: &VariableMap,
    players: &[Player],
    state: &SquadState,
    config: &Config,
    caps: &ChipCaps,
) {
    let n_w = vars.n_gws;
    let owned: BTreeSet<PlayerId> = state.players.iter().map(|p| p.id).collect();
    let locked: BTreeSet<PlayerId> = config.locked.iter().copied().collect();
    let banned: BTreeSet<PlayerId> = config
        .banned
        .iter()
        .filter(|id| !owned.contains(id) && !locked.contains(id))
        .copied()
        .collect();

    for (p, player) in players.iter().enumerate() {
        let is_banned = banned.contains(&player.id);
        let is_locked = locked.contains(&player.id);
        for w in 0..n_w {
            if is_banned {
                lp.set_col_upper(vars.squad(p, w), 0.0);
                lp.set_col_upper(vars.squad_fh(p, w), 0.0);
            }
            if is_locked {
                lp.set_col_lower(vars.squad(p, w), 1.0);
            }
            // Bench slot 0 is reserved for a goalkeeper.
            if player.position != Position::Gk {
                lp.set_col_upper(vars.bench(p, w, 0), 0.0);
            }
        }
    }

    // Forced chip weeks pin the activation column; a zero cap pins the
    // whole family off so presolve can drop it.
    let first_gw = vars.first_gw;
    for w in 0..n_w {
        let gw = first_gw + w as Gameweek;
        if config.use_wc.contains(&gw) {
            lp.fix_col(vars.use_wc(w), 1.0);
        }
        if config.use_bb.contains(&gw) {
            lp.fix_col(vars.use_bb(w), 1.0);
        }
        if config.use_fh.contains(&gw) {
            lp.fix_col(vars.use_fh(w), 1.0);
        }
        if caps.wildcard == 0 {
            lp.set_col_upper(vars.use_wc(w), 0.0);
        }
        if caps.bench_boost == 0 {
            lp.set_col_upper(vars.use_bb(w), 0.0);
        }
        if caps.free_hit == 0 {
            lp.set_col_upper(vars.use_fh(w), 0.0);
        }
        if caps.triple_captain == 0 {
            for p in 0..vars.n_players {
                lp.set_col_upper(vars.use_tc(p, w), 0.0);
            }
        }
    }

    // Transfer freeze over the tail of the window.
    let tail = (config.no_transfer_last_gws as usize).min(n_w);
    for w in n_w - tail..n_w {
        for p in 0..vars.n_players {
            lp.set_col_upper(vars.transfer_in(p, w), 0.0);
            lp.set_col_upper(vars.transfer_out(p, w), 0.0);
        }
    }
}

struct RowBuilder<'a> {
    lp: &'a mut LinearProblem,
    vars: &'a VariableMap,
    players: &'a [Player],
    config: &'a Config,
    state: &'a SquadState,
    buy_price: &'a [f64],
    sell_price: &'a [f64],
    initial_squad: &'a [bool],
}

impl RowBuilder<'_> {
    fn n_players(&self) -> usize {
        self.vars.n_players
    }

    fn n_gws(&self) -> usize {
        self.vars.n_gws
    }

    /// Squad size, position quota, and team cap, for both the regular and
    /// the Free Hit squad (the latter scaled by its activation).
    fn squad_composition(&mut self) {
        let teams: BTreeSet<fpl_core::TeamId> = self.players.iter().map(|p| p.team).collect();
        for w in 0..self.n_gws() {
            let all_squad: Vec<(usize, f64)> =
                (0..self.n_players()).map(|p| (self.vars.squad(p, w), 1.0)).collect();
            self.lp.add_eq(15.0, all_squad);

            let mut fh_squad: Vec<(usize, f64)> =
                (0..self.n_players()).map(|p| (self.vars.squad_fh(p, w), 1.0)).collect();
            fh_squad.push((self.vars.use_fh(w), -15.0));
            self.lp.add_eq(0.0, fh_squad);

            for position in Position::ALL {
                let quota = position.squad_quota() as f64;
                let members: Vec<usize> = (0..self.n_players())
                    .filter(|&p| self.players[p].position == position)
                    .collect();
                self.lp.add_eq(
                    quota,
                    members.iter().map(|&p| (self.vars.squad(p, w), 1.0)).collect(),
                );
                let mut fh: Vec<(usize, f64)> =
                    members.iter().map(|&p| (self.vars.squad_fh(p, w), 1.0)).collect();
                fh.push((self.vars.use_fh(w), -quota));
                self.lp.add_eq(0.0, fh);
            }

            for &team in &teams {
                let members: Vec<usize> = (0..self.n_players())
                    .filter(|&p| self.players[p].team == team)
                    .collect();
                if members.len() <= 3 {
                    continue;
                }
                self.lp.add_le(
                    3.0,
                    members.iter().map(|&p| (self.vars.squad(p, w), 1.0)).collect(),
                );
                let mut fh: Vec<(usize, f64)> =
                    members.iter().map(|&p| (self.vars.squad_fh(p, w), 1.0)).collect();
                fh.push((self.vars.use_fh(w), -3.0));
                self.lp.add_le(0.0, fh);
            }
        }
    }

    /// Lineup size, formation bounds, and the armbands.
    fn lineup_and_armbands(&mut self) {
        for w in 0..self.n_gws() {
            let mut lineup: Vec<(usize, f64)> =
                (0..self.n_players()).map(|p| (self.vars.lineup(p, w), 1.0)).collect();
            lineup.push((self.vars.use_bb(w), -4.0));
            self.lp.add_eq(11.0, lineup);

            for position in Position::ALL {
                let members: Vec<usize> = (0..self.n_players())
                    .filter(|&p| self.players[p].position == position)
                    .collect();
                let coeffs: Vec<(usize, f64)> =
                    members.iter().map(|&p| (self.vars.lineup(p, w), 1.0)).collect();
                self.lp.add_ge(position.min_play() as f64, coeffs.clone());

                let slack = (position.squad_quota() - position.max_play()) as f64;
                let mut upper = coeffs;
                upper.push((self.vars.use_bb(w), -slack));
                self.lp.add_le(position.max_play() as f64, upper);
            }

            self.lp.add_eq(
                1.0,
                (0..self.n_players()).map(|p| (self.vars.captain(p, w), 1.0)).collect(),
            );
            self.lp.add_eq(
                1.0,
                (0..self.n_players()).map(|p| (self.vars.vicecap(p, w), 1.0)).collect(),
            );
            for p in 0..self.n_players() {
                self.lp.add_le(
                    0.0,
                    vec![(self.vars.captain(p, w), 1.0), (self.vars.lineup(p, w), -1.0)],
                );
                self.lp.add_le(
                    0.0,
                    vec![(self.vars.vicecap(p, w), 1.0), (self.vars.lineup(p, w), -1.0)],
                );
                self.lp.add_le(
                    1.0,
                    vec![(self.vars.captain(p, w), 1.0), (self.vars.vicecap(p, w), 1.0)],
                );
            }
        }
    }

    /// One player per ordered bench slot, except under Bench Boost. The
    /// goalkeeper restriction on slot 0 is a bound fix.
    fn bench_slots(&mut self) {
        for w in 0..self.n_gws() {
            for slot in 0..BENCH_SLOTS {
                let mut coeffs: Vec<(usize, f64)> = (0..self.n_players())
                    .map(|p| (self.vars.bench(p, w, slot), 1.0))
                    .collect();
                coeffs.push((self.vars.use_bb(w), 1.0));
                self.lp.add_eq(1.0, coeffs);
            }
        }
    }

    /// A player fills at most one role, drawn from the active squad. Under
    /// a Free Hit the active squad is the Free Hit squad alone.
    fn role_disjointness(&mut self) {
        for w in 0..self.n_gws() {
            for p in 0..self.n_players() {
                let mut roles: Vec<(usize, f64)> = vec![(self.vars.lineup(p, w), 1.0)];
                for slot in 0..BENCH_SLOTS {
                    roles.push((self.vars.bench(p, w, slot), 1.0));
                }

                let mut either = roles.clone();
                either.push((self.vars.squad(p, w), -1.0));
                either.push((self.vars.squad_fh(p, w), -1.0));
                self.lp.add_le(0.0, either);

                let mut fh_only = roles;
                fh_only.push((self.vars.squad_fh(p, w), -1.0));
                fh_only.push((self.vars.use_fh(w), 1.0));
                self.lp.add_le(1.0, fh_only);
            }
        }
    }

    /// Triple Captain coupling, the one-chip-per-week rule, horizon caps,
    /// and forced Triple Captain weeks.
    fn chip_rows(&mut self, caps: &ChipCaps) {
        for w in 0..self.n_gws() {
            for p in 0..self.n_players() {
                self.lp.add_le(
                    0.0,
                    vec![(self.vars.use_tc(p, w), 1.0), (self.vars.captain(p, w), -1.0)],
                );
            }
            let mut single: Vec<(usize, f64)> = vec![
                (self.vars.use_wc(w), 1.0),
                (self.vars.use_fh(w), 1.0),
                (self.vars.use_bb(w), 1.0),
            ];
            for p in 0..self.n_players() {
                single.push((self.vars.use_tc(p, w), 1.0));
            }
            self.lp.add_le(1.0, single);
        }

        self.lp.add_le(
            caps.wildcard as f64,
            (0..self.n_gws()).map(|w| (self.vars.use_wc(w), 1.0)).collect(),
        );
        self.lp.add_le(
            caps.free_hit as f64,
            (0..self.n_gws()).map(|w| (self.vars.use_fh(w), 1.0)).collect(),
        );
        self.lp.add_le(
            caps.bench_boost as f64,
            (0..self.n_gws()).map(|w| (self.vars.use_bb(w), 1.0)).collect(),
        );
        let mut tc_total = Vec::with_capacity(self.n_players() * self.n_gws());
        for p in 0..self.n_players() {
            for w in 0..self.n_gws() {
                tc_total.push((self.vars.use_tc(p, w), 1.0));
            }
        }
        self.lp.add_le(caps.triple_captain as f64, tc_total);

        for w in 0..self.n_gws() {
            let gw = self.vars.first_gw + w as Gameweek;
            if self.config.use_tc.contains(&gw) {
                self.lp.add_eq(
                    1.0,
                    (0..self.n_players()).map(|p| (self.vars.use_tc(p, w), 1.0)).collect(),
                );
            }
        }
    }

    /// Squad evolution, in/out exclusivity, the Free Hit transfer freeze,
    /// and booked transfers.
    fn transfer_rows(&mut self, index: &HashMap<PlayerId, usize>) -> Result<(), PlanError> {
        for w in 0..self.n_gws() {
            for p in 0..self.n_players() {
                let evolution = vec![
                    (self.vars.squad(p, w), 1.0),
                    (self.vars.transfer_in(p, w), -1.0),
                    (self.vars.transfer_out(p, w), 1.0),
                ];
                if w == 0 {
                    let rhs = if self.initial_squad[p] { 1.0 } else { 0.0 };
                    self.lp.add_eq(rhs, evolution);
                } else {
                    let mut evolution = evolution;
                    evolution.push((self.vars.squad(p, w - 1), -1.0));
                    self.lp.add_eq(0.0, evolution);
                }

                self.lp.add_le(
                    1.0,
                    vec![
                        (self.vars.transfer_in(p, w), 1.0),
                        (self.vars.transfer_out(p, w), 1.0),
                    ],
                );
                self.lp.add_le(
                    1.0,
                    vec![(self.vars.transfer_in(p, w), 1.0), (self.vars.use_fh(w), 1.0)],
                );
                self.lp.add_le(
                    1.0,
                    vec![(self.vars.transfer_out(p, w), 1.0), (self.vars.use_fh(w), 1.0)],
                );
            }
        }

        for booking in &self.config.booked_transfers {
            let p = *index.get(&booking.player).ok_or(DataError::MissingPlayer {
                id: booking.player,
                context: "booked transfer",
            })?;
            let Some(w) = booking.gw.checked_sub(self.vars.first_gw).map(|w| w as usize) else {
                tracing::warn!(gw = booking.gw, "booked transfer before the window, ignored");
                continue;
            };
            if w >= self.n_gws() {
                tracing::warn!(gw = booking.gw, "booked transfer beyond the window, ignored");
                continue;
            }
            let col = match booking.direction {
                TransferDirection::In => self.vars.transfer_in(p, w),
                TransferDirection::Out => self.vars.transfer_out(p, w),
            };
            self.lp.add_eq(1.0, vec![(col, 1.0)]);
        }
        Ok(())
    }

    /// Bank evolution and the Free Hit week's affordability.
    fn budget_rows(&mut self) {
        for w in 0..self.n_gws() {
            let mut flow: Vec<(usize, f64)> = vec![(self.vars.itb(w), 1.0)];
            for p in 0..self.n_players() {
                flow.push((self.vars.transfer_out(p, w), -self.sell_price[p]));
                flow.push((self.vars.transfer_in(p, w), self.buy_price[p]));
            }
            if w == 0 {
                self.lp.add_eq(self.state.bank as f64, flow);
            } else {
                flow.push((self.vars.itb(w - 1), -1.0));
                self.lp.add_eq(0.0, flow);
            }

            // The Free Hit squad spends at most the week's total funds:
            // bank plus the sale value of the parked squad.
            let mut fh_budget: Vec<(usize, f64)> = vec![(self.vars.itb(w), -1.0)];
            for p in 0..self.n_players() {
                fh_budget.push((self.vars.squad_fh(p, w), self.buy_price[p]));
                fh_budget.push((self.vars.squad(p, w), -self.sell_price[p]));
            }
            self.lp.add_le(0.0, fh_budget);
        }
    }

    /// Transfers beyond the free allowance are charged, except under a
    /// Wildcard.
    fn hit_rows(&mut self) {
        for w in 0..self.n_gws() {
            let mut coeffs: Vec<(usize, f64)> = vec![
                (self.vars.penalised(w), 1.0),
                (self.vars.fts(w), 1.0),
                (self.vars.use_wc(w), HIT_M),
            ];
            for p in 0..self.n_players() {
                coeffs.push((self.vars.transfer_out(p, w), -1.0));
            }
            self.lp.add_ge(0.0, coeffs);
        }
        if let Some(limit) = self.config.hit_limit {
            self.lp.add_le(
                limit as f64,
                (0..self.n_gws()).map(|w| (self.vars.penalised(w), 1.0)).collect(),
            );
        }
    }

    /// Exactly one FT-state indicator per week, tied to the integer stock.
    fn ft_state_rows(&mut self) {
        for w in 0..self.n_gws() {
            self.lp.add_eq(
                1.0,
                (1..=FT_STATES).map(|s| (self.vars.ft_state(w, s), 1.0)).collect(),
            );
            let mut link: Vec<(usize, f64)> = vec![(self.vars.fts(w), 1.0)];
            for s in 1..=FT_STATES {
                link.push((self.vars.ft_state(w, s), -(s as f64)));
            }
            self.lp.add_eq(0.0, link);
        }
    }

    /// The clamped accumulation rule `fts' = clamp(fts - n + 1, 1, 5)`,
    /// frozen across Wildcard and Free Hit weeks.
    ///
    /// `underflow`/`overflow` flag the clamp at either end; every row is
    /// relaxed by big-M multiples of the chip activations so the carry case
    /// reduces to `fts' = fts`.
    fn ft_transition_rows(&mut self) {
        for w in 0..self.n_gws().saturating_sub(1) {
            let f = self.vars.fts(w);
            let fp = self.vars.fts(w + 1);
            let lo = self.vars.ft_underflow(w);
            let hi = self.vars.ft_overflow(w);
            let wc = self.vars.use_wc(w);
            let fh = self.vars.use_fh(w);
            let outs: Vec<usize> =
                (0..self.n_players()).map(|p| self.vars.transfer_out(p, w)).collect();

            let with_outs = |mut base: Vec<(usize, f64)>, sign: f64| -> Vec<(usize, f64)> {
                for &col in &outs {
                    base.push((col, sign));
                }
                base
            };

            // Chip week: the stock carries unchanged.
            self.lp
                .add_le(4.0, vec![(fp, 1.0), (f, -1.0), (wc, 4.0), (fh, 4.0)]);
            self.lp
                .add_le(4.0, vec![(f, 1.0), (fp, -1.0), (wc, 4.0), (fh, 4.0)]);

            // underflow <=> f - n + 1 < 1.
            self.lp.add_ge(
                0.0,
                with_outs(vec![(f, 1.0), (lo, 14.0), (wc, 14.0), (fh, 14.0)], -1.0),
            );
            self.lp.add_le(
                5.0,
                with_outs(vec![(f, 1.0), (lo, 6.0), (wc, -6.0), (fh, -6.0)], -1.0),
            );

            // overflow <=> f - n + 1 > 5.
            self.lp.add_le(
                4.0,
                with_outs(vec![(f, 1.0), (hi, -1.0), (wc, -6.0), (fh, -6.0)], -1.0),
            );
            self.lp.add_ge(
                -14.0,
                with_outs(vec![(f, 1.0), (hi, -19.0), (wc, 19.0), (fh, 19.0)], -1.0),
            );

            // In range: fts' tracks f - n + 1 exactly.
            self.lp.add_le(
                1.0,
                with_outs(
                    vec![(fp, 1.0), (f, -1.0), (lo, -18.0), (wc, -18.0), (fh, -18.0)],
                    1.0,
                ),
            );
            self.lp.add_ge(
                1.0,
                with_outs(
                    vec![(fp, 1.0), (f, -1.0), (hi, 5.0), (wc, 5.0), (fh, 5.0)],
                    1.0,
                ),
            );

            // Clamped ends.
            self.lp
                .add_le(5.0, vec![(fp, 1.0), (lo, 4.0), (wc, -4.0), (fh, -4.0)]);
            self.lp
                .add_ge(1.0, vec![(fp, 1.0), (hi, -4.0), (wc, 4.0), (fh, 4.0)]);

            // Flags are exclusive and idle across chip weeks.
            self.lp.add_le(1.0, vec![(lo, 1.0), (hi, 1.0)]);
            self.lp.add_le(1.0, vec![(lo, 1.0), (wc, 1.0), (fh, 1.0)]);
            self.lp.add_le(1.0, vec![(hi, 1.0), (wc, 1.0), (fh, 1.0)]);
        }
    }
}

/// Decay-weighted objective: expected points of the lineup, armbands, and
/// weighted bench, minus hit costs, plus the valuations of banked funds and
/// stocked free transfers.
fn set_objective(
    lp: &mut LinearProblem,
    vars: &VariableMap,
    players: &[Player],
    config: &Config,
    gameweeks: &[Gameweek],
) {
    let n_w = vars.n_gws;
    let decay: Vec<f64> = (0..n_w).map(|w| config.decay_base.powi(w as i32)).collect();

    for w in 0..n_w {
        let gw = gameweeks[w];
        for (p, player) in players.iter().enumerate() {
            let xp = player.projection(gw).xp;
            if xp == 0.0 {
                continue;
            }
            lp.add_objective(vars.lineup(p, w), xp * decay[w]);
            lp.add_objective(vars.captain(p, w), xp * decay[w]);
            lp.add_objective(vars.vicecap(p, w), config.vcap_weight * xp * decay[w]);
            lp.add_objective(vars.use_tc(p, w), xp * decay[w]);
            for slot in 0..BENCH_SLOTS {
                lp.add_objective(vars.bench(p, w, slot), config.bench_weights[slot] * xp * decay[w]);
            }
        }

        lp.add_objective(vars.penalised(w), -config.hit_cost * decay[w]);
        lp.add_objective(vars.itb(w), config.itb_value * decay[w]);

        // FT-stock valuation enters as a per-week delta; the first week's
        // terms are constants (the initial stock is fixed) and are omitted.
        for s in 1..=FT_STATES {
            let value = config.ft_state_value(s as u8);
            let mut coeff = 0.0;
            if w >= 1 {
                coeff += value * decay[w];
            }
            if w + 1 < n_w {
                coeff -= value * decay[w + 1];
            }
            if coeff != 0.0 {
                lp.add_objective(vars.ft_state(w, s), coeff);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{squad_of_first_15, synthetic_pool};
    use fpl_core::PlayerId;

    fn base_config() -> Config {
        let mut config = Config::default();
        config.horizon = 2;
        config.no_transfer_last_gws = 0;
        config
    }

    #[test]
    fn builds_with_expected_dimensions() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let model = build_model(&pool, &state, &base_config(), 1).unwrap();
        assert_eq!(model.problem.num_cols(), model.vars.num_cols());
        assert!(model.problem.num_rows() > 0);
        assert_eq!(model.gameweeks, vec![1, 2]);
    }

    #[test]
    fn initial_fts_column_is_fixed() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let mut state = squad_of_first_15(&pool);
        state.free_transfers = 3;
        let model = build_model(&pool, &state, &base_config(), 1).unwrap();
        let col = &model.problem.cols()[model.vars.fts(0)];
        assert_eq!(col.lower, 3.0);
        assert_eq!(col.upper, 3.0);
    }

    #[test]
    fn short_squad_is_rejected() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let mut state = squad_of_first_15(&pool);
        state.players.pop();
        let err = build_model(&pool, &state, &base_config(), 1).unwrap_err();
        assert!(matches!(err, PlanError::Model(ModelError::SquadSize(14))));
    }

    #[test]
    fn quota_violation_names_the_position() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let mut state = squad_of_first_15(&pool);
        // Swap a forward for a third goalkeeper (id 16 is a GK in the pool).
        state.players.pop();
        state.players.push(fpl_core::OwnedPlayer {
            id: PlayerId::new(16),
            purchase_price: 50,
            selling_price: 50,
        });
        let err = build_model(&pool, &state, &base_config(), 1).unwrap_err();
        assert!(matches!(err, PlanError::Model(ModelError::QuotaViolation { .. })));
    }

    #[test]
    fn banned_player_columns_are_pinned_off() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = base_config();
        config.banned = vec![PlayerId::new(18)];
        let model = build_model(&pool, &state, &config, 1).unwrap();
        let p = model.players.iter().position(|pl| pl.id == PlayerId::new(18)).unwrap();
        assert_eq!(model.problem.cols()[model.vars.squad(p, 0)].upper, 0.0);
        assert_eq!(model.problem.cols()[model.vars.squad_fh(p, 1)].upper, 0.0);
    }

    #[test]
    fn ban_on_owned_player_is_ignored() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = base_config();
        config.banned = vec![state.players[0].id];
        let model = build_model(&pool, &state, &config, 1).unwrap();
        let p = model
            .players
            .iter()
            .position(|pl| pl.id == state.players[0].id)
            .unwrap();
        assert_eq!(model.problem.cols()[model.vars.squad(p, 0)].upper, 1.0);
    }

    #[test]
    fn locked_player_columns_are_pinned_on() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = base_config();
        config.locked = vec![state.players[3].id];
        let model = build_model(&pool, &state, &config, 1).unwrap();
        let p = model
            .players
            .iter()
            .position(|pl| pl.id == state.players[3].id)
            .unwrap();
        assert_eq!(model.problem.cols()[model.vars.squad(p, 1)].lower, 1.0);
    }

    #[test]
    fn non_goalkeepers_cannot_take_bench_slot_zero() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let model = build_model(&pool, &state, &base_config(), 1).unwrap();
        let mid = model
            .players
            .iter()
            .position(|p| p.position == Position::Mid)
            .unwrap();
        let gk = model
            .players
            .iter()
            .position(|p| p.position == Position::Gk)
            .unwrap();
        assert_eq!(model.problem.cols()[model.vars.bench(mid, 0, 0)].upper, 0.0);
        assert_eq!(model.problem.cols()[model.vars.bench(gk, 0, 0)].upper, 1.0);
    }

    #[test]
    fn transfer_tail_freezes_the_last_weeks() {
        let gameweeks = vec![1, 2, 3];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = base_config();
        config.horizon = 3;
        config.no_transfer_last_gws = 2;
        let model = build_model(&pool, &state, &config, 1).unwrap();
        assert_eq!(model.problem.cols()[model.vars.transfer_in(0, 0)].upper, 1.0);
        assert_eq!(model.problem.cols()[model.vars.transfer_in(0, 1)].upper, 0.0);
        assert_eq!(model.problem.cols()[model.vars.transfer_out(0, 2)].upper, 0.0);
    }

    #[test]
    fn forcing_an_unavailable_chip_is_a_config_error() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let mut state = squad_of_first_15(&pool);
        state.chips_available.bench_boost = false;
        let mut config = base_config();
        config.use_bb = vec![1];
        let err = build_model(&pool, &state, &config, 1).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Config(ConfigError::ChipUnavailable { chip: Chip::BenchBoost, .. })
        ));
    }

    #[test]
    fn forcing_a_chip_outside_the_window_is_a_config_error() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = base_config();
        config.use_wc = vec![9];
        let err = build_model(&pool, &state, &config, 1).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Config(ConfigError::ChipOutsideHorizon { .. })
        ));
    }

    #[test]
    fn missing_owned_player_is_a_data_error() {
        let gameweeks = vec![1, 2];
        let pool = synthetic_pool(20, &gameweeks);
        let mut state = squad_of_first_15(&pool);
        state.players[0].id = PlayerId::new(999);
        let err = build_model(&pool, &state, &base_config(), 1).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Data(DataError::MissingPlayer { context: "initial squad", .. })
        ));
    }

    #[test]
    fn objective_rewards_the_captain_twice() {
        let gameweeks = vec![1];
        let pool = synthetic_pool(20, &gameweeks);
        let state = squad_of_first_15(&pool);
        let mut config = base_config();
        config.horizon = 1;
        config.no_transfer_last_gws = 0;
        let model = build_model(&pool, &state, &config, 1).unwrap();
        let p = 0;
        let xp = model.players[p].projection(1).xp;
        let cols = model.problem.cols();
        assert!((cols[model.vars.lineup(p, 0)].objective - xp).abs() < 1e-9);
        assert!((cols[model.vars.captain(p, 0)].objective - xp).abs() < 1e-9);
        assert!(
            (cols[model.vars.vicecap(p, 0)].objective - 0.1 * xp).abs() < 1e-9
        );
    }
}
