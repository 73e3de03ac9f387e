use anyhow::Result;
use clap::Args;
use viewcost_core::pipeline::clip_status;

use super::{ClipArgs, KeyArgs};

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub clips: ClipArgs,

    #[command(flatten)]
    pub keys: KeyArgs,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let config = args.keys.to_config()?;

    println!(
        "{:<24}  {:>7}  {:>11}  {:>9}",
        "Clip", "Frames", "Table rows", "Matrices"
    );
    println!("{}", "-".repeat(58));

    for clip in args.clips.clips()? {
        match clip_status(&clip, &config) {
            Ok(status) => println!(
                "{:<24}  {:>7}  {:>5}/{:<5}  {:>4}/{:<4}",
                status.clip,
                status.frame_count,
                status.table_rows,
                status.frame_count,
                status.cost_matrices,
                status.expected_matrices
            ),
            Err(e) => println!("{:<24}  error: {}", clip.name, e),
        }
    }

    Ok(())
}
