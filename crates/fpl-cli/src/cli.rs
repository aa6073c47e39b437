//! Flag surface. Config-shaped flags are folded into the layered
//! [`fpl_core::Config`] after the file layers.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fplan", version, about = "Multi-period FPL squad planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve the multi-period plan.
    Solve(SolveArgs),
    /// Run perturbed-projection simulations.
    Simulate(SimulateArgs),
    /// Write the model as free-format MPS without solving.
    ExportMps(ExportMpsArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Semicolon-separated config layers, merged left-to-right.
    #[arg(long)]
    pub config: Option<String>,

    /// Authoritative player list (JSON array).
    #[arg(long)]
    pub players: PathBuf,

    /// Squad state (JSON).
    #[arg(long)]
    pub team: PathBuf,

    /// Projection CSVs as `path` or `path:weight`. Repeatable.
    #[arg(long = "projections", required = true)]
    pub projections: Vec<String>,

    /// First gameweek to plan; defaults to the earliest gameweek the
    /// projection sources cover.
    #[arg(long)]
    pub gw: Option<u8>,
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Planning horizon override.
    #[arg(long)]
    pub horizon: Option<u8>,

    /// Alternative-solution count override.
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Solver time limit override, seconds.
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Directory for the solution JSON files.
    #[arg(long, default_value = "results")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of simulation runs.
    #[arg(long, default_value_t = 10)]
    pub runs: u32,

    /// Worker threads; 0 auto-detects.
    #[arg(long, default_value_t = 0)]
    pub workers: usize,

    /// Base RNG seed; run seeds derive from it.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Directory for the simulation manifest.
    #[arg(long, default_value = "results")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct ExportMpsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output MPS path.
    #[arg(long)]
    pub out: PathBuf,
}

/// Split `path` or `path:weight` into its parts; the weight defaults to 1.
pub fn parse_projection_arg(arg: &str) -> anyhow::Result<(PathBuf, f64)> {
    if let Some((path, suffix)) = arg.rsplit_once(':') {
        if let Ok(weight) = suffix.parse::<f64>() {
            if weight <= 0.0 {
                anyhow::bail!("projection weight must be positive in '{}'", arg);
            }
            return Ok((PathBuf::from(path), weight));
        }
    }
    Ok((PathBuf::from(arg), 1.0))
}
