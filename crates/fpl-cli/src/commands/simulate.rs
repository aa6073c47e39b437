use super::{load_inputs, resolve_config};
use crate::cli::SimulateArgs;
use anyhow::{Context, Result};
use fpl_sim::{run_simulations, write_manifest, SimulationsConfig};
use std::fs;
use std::sync::atomic::AtomicBool;

pub fn run(args: &SimulateArgs) -> Result<()> {
    let config = resolve_config(&args.input.config)?;
    let inputs = load_inputs(&args.input, config)?;

    let sim = SimulationsConfig {
        runs: args.runs,
        workers: args.workers,
        base_seed: args.seed,
    };
    let cancel = AtomicBool::new(false);
    let outcome = run_simulations(
        &inputs.players,
        &inputs.state,
        &inputs.config,
        inputs.first_gw,
        &sim,
        &cancel,
    )?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory '{}'", args.out.display()))?;
    let manifest_path = args.out.join("sim_manifest.json");
    write_manifest(&manifest_path, &outcome.manifest)?;

    println!(
        "{}/{} runs succeeded; manifest at {}",
        outcome.manifest.success,
        outcome.manifest.runs,
        manifest_path.display()
    );
    if let Some(mean) = outcome.aggregates.mean_score() {
        println!("mean score {:.2}", mean);
    }

    // Most-picked players for the first planned gameweek.
    let mut appearances: Vec<_> = outcome.aggregates.squad_appearances.iter().collect();
    appearances.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    let successes = outcome.manifest.success.max(1) as f64;
    for (id, count) in appearances.iter().take(20) {
        let name = inputs
            .players
            .iter()
            .find(|p| p.id == **id)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        println!("{:>5.1}% {}", 100.0 * **count as f64 / successes, name);
    }
    Ok(())
}
