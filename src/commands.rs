use anyhow::{bail, Context, Result};

use crate::cli::{Cli, Mode};
use crate::output;
use crate::pipeline::analysis::analyze;
use crate::pipeline::image::ImagePipeline;
use crate::pipeline::signal::SignalPipeline;

/// Run the mode selected on the command line.
pub fn execute(cli: &Cli) -> Result<()> {
    match cli.mode {
        Mode::Image => run_image(cli),
        Mode::Signal => run_signal(cli),
    }
}

fn run_image(cli: &Cli) -> Result<()> {
    let pipeline = ImagePipeline::new(&cli.input, cli.is_verbose())
        .context("loading image corpus")?;

    if cli.analysis {
        let analysis = analyze(pipeline.corpus());
        if cli.json {
            output::print_json(&analysis)?;
        } else {
            println!("{analysis}");
        }
    }

    let params = cli.image_params();
    match cli.sweep_grid() {
        Some((blurs, contrasts)) => {
            let cells = pipeline
                .sweep(&cli.output, &blurs, &contrasts, &params)
                .context("parameter sweep")?;
            if cli.json {
                output::print_json(&cells)?;
            }
            let failed = cells.iter().filter(|c| c.summary.is_none()).count();
            if failed == cells.len() {
                bail!("all {failed} sweep cells failed");
            }
            if failed > 0 {
                log::warn!("{failed} of {} sweep cells failed", cells.len());
            }
        }
        None => {
            let summary = pipeline
                .process_all(&cli.output, &params)
                .context("processing images")?;
            if cli.json {
                output::print_json(&summary)?;
            }
        }
    }
    Ok(())
}

fn run_signal(cli: &Cli) -> Result<()> {
    if !cli.sweep_blur.is_empty() || !cli.sweep_contrast.is_empty() {
        log::warn!("Sweep options only apply in image mode; ignoring them");
    }
    if cli.analysis {
        log::warn!("--analysis only applies in image mode; ignoring it");
    }

    let pipeline = SignalPipeline::new(&cli.input, cli.is_verbose())
        .context("loading signal corpus")?;
    let summary = pipeline
        .process_all(&cli.output, &cli.signal_params())
        .context("processing signals")?;
    if cli.json {
        output::print_json(&summary)?;
    }
    Ok(())
}
