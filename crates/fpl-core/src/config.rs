//! Planner configuration.
//!
//! A [`Config`] starts from the documented defaults and is refined by
//! [`ConfigOverlay`] layers merged left-to-right: base settings file, user
//! settings file, then command-line flags. Every layer is a partial config;
//! fields it leaves out keep the value from the layer below.

use crate::error::ConfigError;
use crate::types::{Chip, Gameweek, PlayerId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Direction of a booked transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    In,
    Out,
}

/// A transfer the user has committed to in advance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookedTransfer {
    pub player: PlayerId,
    pub gw: Gameweek,
    pub direction: TransferDirection,
}

/// Per-chip activation limits over the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipLimits {
    #[serde(default = "default_chip_limit")]
    pub wildcard: u8,
    #[serde(default = "default_chip_limit")]
    pub free_hit: u8,
    #[serde(default = "default_chip_limit")]
    pub bench_boost: u8,
    #[serde(default = "default_chip_limit")]
    pub triple_captain: u8,
}

impl ChipLimits {
    pub fn limit(&self, chip: Chip) -> u8 {
        match chip {
            Chip::Wildcard => self.wildcard,
            Chip::FreeHit => self.free_hit,
            Chip::BenchBoost => self.bench_boost,
            Chip::TripleCaptain => self.triple_captain,
        }
    }
}

impl Default for ChipLimits {
    fn default() -> Self {
        Self {
            wildcard: 1,
            free_hit: 1,
            bench_boost: 1,
            triple_captain: 1,
        }
    }
}

fn default_chip_limit() -> u8 {
    1
}

/// Full planner configuration. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of gameweeks to plan.
    #[serde(default = "default_horizon")]
    pub horizon: u8,
    /// Per-gameweek discount applied to future value.
    #[serde(default = "default_decay_base")]
    pub decay_base: f64,

    /// Objective weight of each ordered bench slot.
    #[serde(default = "default_bench_weights")]
    pub bench_weights: [f64; 4],
    /// Objective weight of the vice-captain armband.
    #[serde(default = "default_vcap_weight")]
    pub vcap_weight: f64,
    /// Marginal value of the s-th stocked free transfer, keyed by state.
    #[serde(default = "default_ft_value_list")]
    pub ft_value_list: BTreeMap<u8, f64>,
    /// Value per tenth left in the bank.
    #[serde(default = "default_itb_value")]
    pub itb_value: f64,
    /// Points cost of each transfer beyond the free allowance.
    #[serde(default = "default_hit_cost")]
    pub hit_cost: f64,

    #[serde(default)]
    pub banned: Vec<PlayerId>,
    #[serde(default)]
    pub locked: Vec<PlayerId>,
    #[serde(default)]
    pub keep: Vec<PlayerId>,

    /// Freeze transfers in the final N gameweeks of the planning window.
    #[serde(default = "default_no_transfer_last_gws")]
    pub no_transfer_last_gws: u8,
    /// Cap on total penalised transfers over the horizon.
    #[serde(default)]
    pub hit_limit: Option<u32>,
    /// Cap on penalised transfers per gameweek; 0 disables the cap.
    #[serde(default)]
    pub weekly_hit_limit: u32,
    #[serde(default)]
    pub booked_transfers: Vec<BookedTransfer>,

    /// Gameweeks in which each chip must be played.
    #[serde(default)]
    pub use_wc: Vec<Gameweek>,
    #[serde(default)]
    pub use_bb: Vec<Gameweek>,
    #[serde(default)]
    pub use_fh: Vec<Gameweek>,
    #[serde(default)]
    pub use_tc: Vec<Gameweek>,
    #[serde(default)]
    pub chip_limits: ChipLimits,

    /// Pre-solve filter: minimum total expected minutes over the horizon.
    #[serde(default = "default_xmin_lb")]
    pub xmin_lb: f64,
    /// Pre-solve filter: percentile cutoff on xPts-per-price; 0 disables.
    #[serde(default = "default_ev_per_price_cutoff")]
    pub ev_per_price_cutoff: f64,
    /// Pre-solve filter: always keep this top share by total xPts.
    #[serde(default = "default_keep_top_ev_percent")]
    pub keep_top_ev_percent: f64,

    #[serde(default = "default_solver")]
    pub solver: String,
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,
    /// Relative MIP gap tolerance.
    #[serde(default)]
    pub optimality_gap: f64,
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Number of alternative solutions to produce via iteration cuts.
    #[serde(default = "default_num_iterations")]
    pub num_iterations: u32,
    /// Stop iterating once the objective drops this far below the first
    /// solution. `None` keeps iterating to the requested count.
    #[serde(default)]
    pub iteration_tolerance: Option<f64>,

    /// Multiplicative noise applied to projections in sensitivity mode.
    #[serde(default = "default_noise_magnitude")]
    pub noise_magnitude: f64,
}

fn default_horizon() -> u8 {
    8
}
fn default_decay_base() -> f64 {
    0.9
}
fn default_bench_weights() -> [f64; 4] {
    [0.03, 0.21, 0.06, 0.002]
}
fn default_vcap_weight() -> f64 {
    0.1
}
fn default_ft_value_list() -> BTreeMap<u8, f64> {
    BTreeMap::from([(2, 2.0), (3, 1.6), (4, 1.3), (5, 1.1)])
}
fn default_itb_value() -> f64 {
    0.08
}
fn default_hit_cost() -> f64 {
    4.0
}
fn default_no_transfer_last_gws() -> u8 {
    2
}
fn default_xmin_lb() -> f64 {
    300.0
}
fn default_ev_per_price_cutoff() -> f64 {
    30.0
}
fn default_keep_top_ev_percent() -> f64 {
    5.0
}
fn default_solver() -> String {
    "highs".to_string()
}
fn default_time_limit_secs() -> f64 {
    600.0
}
fn default_num_iterations() -> u32 {
    1
}
fn default_noise_magnitude() -> f64 {
    0.1
}

impl Default for Config {
    fn default() -> Self {
        serde_json::from_str("{}").expect("defaults deserialise from the empty object")
    }
}

impl Config {
    /// Resolve a config from overlay layers applied onto the defaults.
    pub fn from_layers(layers: &[ConfigOverlay]) -> Self {
        let mut config = Config::default();
        for layer in layers {
            layer.apply(&mut config);
        }
        config
    }

    /// Load overlay layers from JSON files and resolve them left-to-right.
    ///
    /// A missing file is skipped with a warning; malformed JSON in a named
    /// layer is an error.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let data = match std::fs::read_to_string(path) {
                Ok(data) => data,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "config layer not readable, skipping");
                    continue;
                }
            };
            let layer: ConfigOverlay =
                serde_json::from_str(&data).map_err(|err| ConfigError::Layer {
                    path: path.display().to_string(),
                    message: err.to_string(),
                })?;
            layers.push(layer);
        }
        Ok(Self::from_layers(&layers))
    }

    /// Cumulative value of sitting on `state` free transfers, materialised
    /// from the marginal `ft_value_list` entries.
    pub fn ft_state_value(&self, state: u8) -> f64 {
        (2..=state)
            .map(|s| self.ft_value_list.get(&s).copied().unwrap_or(0.0))
            .sum()
    }

    /// The forced-activation gameweeks for a chip.
    pub fn forced_chip_gws(&self, chip: Chip) -> &[Gameweek] {
        match chip {
            Chip::Wildcard => &self.use_wc,
            Chip::FreeHit => &self.use_fh,
            Chip::BenchBoost => &self.use_bb,
            Chip::TripleCaptain => &self.use_tc,
        }
    }

    /// Pre-build validation of ranges and the forced-chip schedule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon == 0 || self.horizon > 38 {
            return Err(ConfigError::OutOfRange {
                field: "horizon",
                value: self.horizon.to_string(),
                expected: "1..=38",
            });
        }
        if !(self.decay_base > 0.0 && self.decay_base <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "decay_base",
                value: self.decay_base.to_string(),
                expected: "(0, 1]",
            });
        }
        if self.hit_cost < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "hit_cost",
                value: self.hit_cost.to_string(),
                expected: ">= 0",
            });
        }
        if self.num_iterations == 0 {
            return Err(ConfigError::OutOfRange {
                field: "num_iterations",
                value: "0".to_string(),
                expected: ">= 1",
            });
        }
        if self.time_limit_secs <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "time_limit_secs",
                value: self.time_limit_secs.to_string(),
                expected: "> 0",
            });
        }

        // No two chips may be forced into the same gameweek.
        let mut seen: BTreeSet<Gameweek> = BTreeSet::new();
        for chip in [Chip::Wildcard, Chip::FreeHit, Chip::BenchBoost, Chip::TripleCaptain] {
            for &gw in self.forced_chip_gws(chip) {
                if !seen.insert(gw) {
                    return Err(ConfigError::ConflictingChips { gw });
                }
            }
        }
        Ok(())
    }

    /// Stable SHA-256 fingerprint of the canonical JSON serialisation.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).expect("config serialises");
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// A partial configuration layer. Fields left as `None` inherit from the
/// layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub horizon: Option<u8>,
    pub decay_base: Option<f64>,
    pub bench_weights: Option<[f64; 4]>,
    pub vcap_weight: Option<f64>,
    pub ft_value_list: Option<BTreeMap<u8, f64>>,
    pub itb_value: Option<f64>,
    pub hit_cost: Option<f64>,
    pub banned: Option<Vec<PlayerId>>,
    pub locked: Option<Vec<PlayerId>>,
    pub keep: Option<Vec<PlayerId>>,
    pub no_transfer_last_gws: Option<u8>,
    pub hit_limit: Option<Option<u32>>,
    pub weekly_hit_limit: Option<u32>,
    pub booked_transfers: Option<Vec<BookedTransfer>>,
    pub use_wc: Option<Vec<Gameweek>>,
    pub use_bb: Option<Vec<Gameweek>>,
    pub use_fh: Option<Vec<Gameweek>>,
    pub use_tc: Option<Vec<Gameweek>>,
    pub chip_limits: Option<ChipLimits>,
    pub xmin_lb: Option<f64>,
    pub ev_per_price_cutoff: Option<f64>,
    pub keep_top_ev_percent: Option<f64>,
    pub solver: Option<String>,
    pub time_limit_secs: Option<f64>,
    pub optimality_gap: Option<f64>,
    pub random_seed: Option<Option<u64>>,
    pub num_iterations: Option<u32>,
    pub iteration_tolerance: Option<Option<f64>>,
    pub noise_magnitude: Option<f64>,
}

macro_rules! overlay_field {
    ($self:ident, $config:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$self.$field {
                $config.$field = value.clone();
            }
        )+
    };
}

impl ConfigOverlay {
    /// Merge this layer into `config`, overriding only the fields it sets.
    pub fn apply(&self, config: &mut Config) {
        overlay_field!(
            self, config, horizon, decay_base, bench_weights, vcap_weight, ft_value_list,
            itb_value, hit_cost, banned, locked, keep, no_transfer_last_gws, hit_limit,
            weekly_hit_limit, booked_transfers, use_wc, use_bb, use_fh, use_tc, chip_limits,
            xmin_lb, ev_per_price_cutoff, keep_top_ev_percent, solver, time_limit_secs,
            optimality_gap, random_seed, num_iterations, iteration_tolerance, noise_magnitude,
        );
    }
}
