use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CENTER_STEPS, DEFAULT_THRESHOLD, LATITUDE_SPAN_DEG, LONGITUDE_SPAN_DEG};
use crate::diff::validate_threshold;
use crate::error::{Result, ViewCostError};
use crate::frame::Resolution;
use crate::viewport::FieldOfView;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    #[serde(default)]
    pub resolution: Resolution,
    /// Per-pixel difference threshold τ. Differences below it are ignored.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub stages: StageSelection,
    /// Worker threads; `None` uses the global rayon pool.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Overrides `<clip>/preprocess` as the cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            threshold: DEFAULT_THRESHOLD,
            viewport: ViewportConfig::default(),
            stages: StageSelection::default(),
            threads: None,
            cache_dir: None,
        }
    }
}

impl PreprocessConfig {
    /// Read a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ViewCostError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ViewCostError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        Resolution::new(self.resolution.width, self.resolution.height)?;
        validate_threshold(self.threshold)?;

        let fov = &self.viewport.fov;
        if !(fov.horizontal_deg > 0.0 && fov.horizontal_deg <= LONGITUDE_SPAN_DEG) {
            return Err(ViewCostError::Config(format!(
                "horizontal field of view {} must be in (0, 360]",
                fov.horizontal_deg
            )));
        }
        if !(fov.vertical_deg > 0.0 && fov.vertical_deg <= LATITUDE_SPAN_DEG) {
            return Err(ViewCostError::Config(format!(
                "vertical field of view {} must be in (0, 180]",
                fov.vertical_deg
            )));
        }
        if self.viewport.center_steps == 0 {
            return Err(ViewCostError::Config("center_steps must be at least 1".into()));
        }
        if let Some(cy) = self.viewport.center_y {
            if cy >= self.resolution.height {
                return Err(ViewCostError::Config(format!(
                    "vertical center {} outside height {}",
                    cy, self.resolution.height
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(ViewCostError::Config("threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Fixed vertical viewing center, defaulting to the equator row.
    pub fn center_y(&self) -> usize {
        self.viewport
            .center_y
            .unwrap_or(self.resolution.height / 2)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default)]
    pub fov: FieldOfView,
    /// Vertical center row; `None` means `height / 2`.
    #[serde(default)]
    pub center_y: Option<usize>,
    /// Number of horizontal centers swept across the width.
    #[serde(default = "default_center_steps")]
    pub center_steps: usize,
}

fn default_center_steps() -> usize {
    DEFAULT_CENTER_STEPS
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fov: FieldOfView::default(),
            center_y: None,
            center_steps: DEFAULT_CENTER_STEPS,
        }
    }
}

/// Which stages a run performs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSelection {
    /// Build summed-area table rows.
    #[serde(default)]
    pub tables: bool,
    /// Build cost matrices from existing rows.
    #[serde(default)]
    pub matrices: bool,
    /// Remove prior tables and matrices before running.
    #[serde(default)]
    pub clean: bool,
}

impl std::fmt::Display for StageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = Vec::new();
        if self.clean {
            names.push("clean");
        }
        if self.tables {
            names.push("tables");
        }
        if self.matrices {
            names.push("matrices");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(" + "))
        }
    }
}
