//! Sensitivity mode: many independent solves over perturbed projections.
//!
//! Embarrassingly parallel at the run level; each run owns its model and
//! shares only the read-only base player set and config.

pub mod combinations;
pub mod manifest;
pub mod runner;

pub use combinations::chip_combinations;
pub use manifest::{write_manifest, SimManifest, SimRunRecord};
pub use runner::{
    perturb_projections, random_run_id, run_simulations, SimAggregates, SimulationOutcome,
    SimulationsConfig,
};
