use super::{load_inputs, resolve_config};
use crate::cli::ExportMpsArgs;
use anyhow::{Context, Result};
use fpl_model::{build_model, filter_players, write_mps};
use std::fs::File;
use std::io::BufWriter;

pub fn run(args: &ExportMpsArgs) -> Result<()> {
    let config = resolve_config(&args.input.config)?;
    let inputs = load_inputs(&args.input, config)?;
    inputs.config.validate()?;

    let gameweeks: Vec<u8> = (0..inputs.config.horizon)
        .map(|i| inputs.first_gw + i)
        .collect();
    let filtered = filter_players(&inputs.players, &inputs.state, &inputs.config, &gameweeks);
    let model = build_model(&filtered, &inputs.state, &inputs.config, inputs.first_gw)
        .map_err(|err| anyhow::anyhow!("building model: {err}"))?;

    let file = File::create(&args.out)
        .with_context(|| format!("creating '{}'", args.out.display()))?;
    let mut writer = BufWriter::new(file);
    let vars = model.vars.clone();
    write_mps(&model.problem, &move |col| vars.col_name(col), &mut writer)
        .with_context(|| format!("writing '{}'", args.out.display()))?;

    tracing::info!(
        path = %args.out.display(),
        columns = model.problem.num_cols(),
        rows = model.problem.num_rows(),
        "model exported"
    );
    Ok(())
}
