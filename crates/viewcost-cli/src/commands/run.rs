use anyhow::{bail, Result};
use clap::Args;
use tracing::info;
use viewcost_core::pipeline::run_batch;

use super::{ClipArgs, KeyArgs};
use crate::progress::BarReporter;
use crate::summary::{print_clip_report, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub clips: ClipArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    /// Build summed-area table rows
    #[arg(short = 'a', long = "tables")]
    pub tables: bool,

    /// Build cost matrices (requires table rows)
    #[arg(short = 'm', long = "matrices")]
    pub matrices: bool,

    /// Remove prior tables and matrices for these parameters first
    #[arg(short = 'c', long = "clean")]
    pub clean: bool,

    /// Worker threads (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = args.keys.to_config()?;
    config.stages.tables |= args.tables;
    config.stages.matrices |= args.matrices;
    config.stages.clean |= args.clean;
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config.validate()?;

    let clips = args.clips.clips()?;
    print_run_summary(&config, &clips);
    info!(clips = clips.len(), stages = %config.stages, "Starting run");

    let reporter = BarReporter::new()?;
    let results = run_batch(&clips, &config, &reporter);
    reporter.finish();

    let mut failed = Vec::new();
    for (name, result) in results {
        match result {
            Ok(report) => {
                print_clip_report(&report);
                if !report.is_success() {
                    failed.push(name);
                }
            }
            Err(e) => {
                eprintln!("{name}: {e}");
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} clip(s) had failures: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}
