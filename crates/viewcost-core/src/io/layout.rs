use std::path::PathBuf;

use crate::consts::{CENTER_PATH_DECIMALS, COSTS_DIR_NAME};
use crate::frame::Resolution;
use crate::io::store::ArtifactKey;
use crate::viewport::Viewport;

/// Render a threshold the way it appears in cache file names
/// (shortest round-trip form: `0.015`, `0.2`, `1.0`).
pub fn format_threshold(threshold: f64) -> String {
    format!("{threshold:?}")
}

/// Render a viewing-center coordinate for cache paths.
pub fn format_center(value: usize) -> String {
    format!("{:.*}", CENTER_PATH_DECIMALS, value as f64)
}

/// Key of the persisted row tensor holding every table `(row, j ≥ row)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRowKey {
    pub clip: String,
    pub resolution: Resolution,
    pub threshold: f64,
    pub row: usize,
}

impl ArtifactKey for TableRowKey {
    fn relative_path(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}_{}_{}_thres_{}_row_{}.npy",
            self.clip,
            self.resolution.width,
            self.resolution.height,
            format_threshold(self.threshold),
            self.row
        ))
    }
}

/// Key of one persisted cost matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CostMatrixKey {
    pub clip: String,
    pub resolution: Resolution,
    pub threshold: f64,
    /// Nominal viewport size in pixels `(width, height)`.
    pub viewport_size: (usize, usize),
    pub center_x: usize,
    pub center_y: usize,
}

impl ArtifactKey for CostMatrixKey {
    fn relative_path(&self) -> PathBuf {
        let center_y = format_center(self.center_y);
        PathBuf::from(COSTS_DIR_NAME)
            .join(format!(
                "size_{}_{}_fov_{}_{}",
                self.resolution.width,
                self.resolution.height,
                self.viewport_size.0,
                self.viewport_size.1
            ))
            .join(&center_y)
            .join(format!(
                "{}_thres_{}_center_{}_{}.npy",
                self.clip,
                format_threshold(self.threshold),
                format_center(self.center_x),
                center_y
            ))
    }
}

/// Builds artifact keys for one clip at one resolution and threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheLayout {
    pub clip: String,
    pub resolution: Resolution,
    pub threshold: f64,
}

impl CacheLayout {
    pub fn new(clip: impl Into<String>, resolution: Resolution, threshold: f64) -> Self {
        Self {
            clip: clip.into(),
            resolution,
            threshold,
        }
    }

    pub fn table_row(&self, row: usize) -> TableRowKey {
        TableRowKey {
            clip: self.clip.clone(),
            resolution: self.resolution,
            threshold: self.threshold,
            row,
        }
    }

    pub fn cost_matrix(&self, viewport: &Viewport) -> CostMatrixKey {
        CostMatrixKey {
            clip: self.clip.clone(),
            resolution: self.resolution,
            threshold: self.threshold,
            viewport_size: viewport.pixel_size(),
            center_x: viewport.center_x,
            center_y: viewport.center_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_rendering() {
        assert_eq!(format_threshold(0.015), "0.015");
        assert_eq!(format_threshold(1.0), "1.0");
    }

    #[test]
    fn test_cost_matrix_path() {
        let key = CostMatrixKey {
            clip: "beach".into(),
            resolution: Resolution::new(640, 320).unwrap(),
            threshold: 0.2,
            viewport_size: (144, 320),
            center_x: 16,
            center_y: 160,
        };
        assert_eq!(
            key.relative_path(),
            PathBuf::from("costs/size_640_320_fov_144_320/160.000/beach_thres_0.2_center_16.000_160.000.npy")
        );
    }
}
