use super::{load_inputs, resolve_config};
use crate::cli::SolveArgs;
use anyhow::{Context, Result};
use fpl_model::solve_plan;
use std::fs;

pub fn run(args: &SolveArgs) -> Result<()> {
    let mut config = resolve_config(&args.input.config)?;
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(iterations) = args.iterations {
        config.num_iterations = iterations;
    }
    if let Some(time_limit) = args.time_limit {
        config.time_limit_secs = time_limit;
    }

    let inputs = load_inputs(&args.input, config)?;
    let solutions = solve_plan(
        &inputs.players,
        &inputs.state,
        &inputs.config,
        inputs.first_gw,
    )?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory '{}'", args.out.display()))?;

    for solution in &solutions {
        println!("{}", solution.summary());
        let short = &solution.fingerprint[..8.min(solution.fingerprint.len())];
        let path = args
            .out
            .join(format!("plan_{}_{}.json", short, solution.iteration));
        let json = serde_json::to_string_pretty(solution).context("serialising solution")?;
        fs::write(&path, json)
            .with_context(|| format!("writing solution '{}'", path.display()))?;
        tracing::info!(path = %path.display(), score = solution.score, "solution written");
    }
    Ok(())
}
