pub mod config;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use viewcost_core::io::sequence::{discover_clips, ClipSource};
use viewcost_core::pipeline::config::PreprocessConfig;

/// Clip selection shared by every command.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ClipArgs {
    /// Clip directory containing frames/ and edges/
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Directory of clip directories; every subdirectory with frames/ is processed
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,
}

impl ClipArgs {
    pub fn clips(&self) -> Result<Vec<ClipSource>> {
        if let Some(ref input) = self.input {
            let clip = ClipSource::open(input)
                .with_context(|| format!("Cannot open clip {}", input.display()))?;
            return Ok(vec![clip]);
        }
        if let Some(ref dir) = self.dir {
            let clips = discover_clips(dir)
                .with_context(|| format!("Cannot scan {}", dir.display()))?;
            if clips.is_empty() {
                bail!("No clip directories with frames/ under {}", dir.display());
            }
            return Ok(clips);
        }
        bail!("Need either -i or -d")
    }
}

/// Parameters that determine cache keys, shared by `run` and `status`.
#[derive(Args)]
pub struct KeyArgs {
    /// Difference threshold tau; pixel differences below it are ignored.
    /// Around 0.015 for static scenes, 0.2 with large moving foliage.
    #[arg(short = 't', long = "threshold")]
    pub threshold: f64,

    /// Working resolution (width height)
    #[arg(short = 's', long = "size", num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub size: Option<Vec<usize>>,

    /// Horizontal field of view in degrees
    #[arg(long)]
    pub hfov: Option<f64>,

    /// Vertical field of view in degrees
    #[arg(long)]
    pub vfov: Option<f64>,

    /// Vertical viewing center row (default: height / 2)
    #[arg(long)]
    pub center_y: Option<usize>,

    /// Pipeline config file (TOML); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl KeyArgs {
    pub fn to_config(&self) -> Result<PreprocessConfig> {
        let mut config = match self.config {
            Some(ref path) => load_config(path)?,
            None => PreprocessConfig::default(),
        };

        config.threshold = self.threshold;
        if let Some(ref size) = self.size {
            if let [width, height] = size.as_slice() {
                config.resolution.width = *width;
                config.resolution.height = *height;
            }
        }
        if let Some(hfov) = self.hfov {
            config.viewport.fov.horizontal_deg = hfov;
        }
        if let Some(vfov) = self.vfov {
            config.viewport.fov.vertical_deg = vfov;
        }
        if self.center_y.is_some() {
            config.viewport.center_y = self.center_y;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<PreprocessConfig> {
    PreprocessConfig::from_toml_file(path)
        .with_context(|| format!("Failed to read config {}", path.display()))
}
