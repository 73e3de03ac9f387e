use std::io::Write;

use ndarray::Array2;
use tracing::info;

use crate::diff::DifferenceScorer;
use crate::error::{Result, ViewCostError};
use crate::frame::{validate_sequences, EdgeMask, Frame, Resolution};
use crate::io::npy::{self, NpyDtype};
use crate::io::{ArtifactStore, Outcome, TableRowKey};

use super::table::summed_area_table;

/// Builds and persists rows of summed-area tables for one clip.
///
/// Row `i` holds the tables of pairs `(i, j)` for `j` in `[i, N)`, stacked
/// into one `(N − i, H, W)` tensor of `f32`.
pub struct TableRowBuilder<'a> {
    frames: &'a [Frame],
    masks: &'a [EdgeMask],
    scorer: &'a DifferenceScorer,
    resolution: Resolution,
}

impl<'a> TableRowBuilder<'a> {
    /// Validates sequence lengths and shapes before any computation.
    pub fn new(
        frames: &'a [Frame],
        masks: &'a [EdgeMask],
        scorer: &'a DifferenceScorer,
    ) -> Result<Self> {
        let resolution = validate_sequences(frames, masks)?;
        if resolution != scorer.resolution() {
            return Err(ViewCostError::ShapeMismatch {
                expected: vec![scorer.resolution().height, scorer.resolution().width],
                actual: vec![resolution.height, resolution.width],
                context: "frames vs. weight map".into(),
            });
        }
        Ok(Self {
            frames,
            masks,
            scorer,
            resolution,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Double-precision table of pair `(i, j)`.
    pub fn compute_table(&self, i: usize, j: usize) -> Result<Array2<f64>> {
        let total = self.frame_count();
        for index in [i, j] {
            if index >= total {
                return Err(ViewCostError::FrameIndexOutOfRange { index, total });
            }
        }
        let diff = self.scorer.score(
            &self.frames[i],
            &self.masks[i],
            &self.frames[j],
            &self.masks[j],
        )?;
        Ok(summed_area_table(&diff))
    }

    /// Stream row `i` as an `.npy` tensor into `out`, one table at a time.
    pub fn write_row<W: Write + ?Sized>(&self, i: usize, out: &mut W) -> Result<()> {
        let total = self.frame_count();
        if i >= total {
            return Err(ViewCostError::FrameIndexOutOfRange { index: i, total });
        }

        let (h, w) = self.resolution.shape();
        npy::write_header(out, NpyDtype::F32, &[total - i, h, w])?;
        for j in i..total {
            let table = self.compute_table(i, j)?.mapv(|v| v as f32);
            npy::write_elements(out, &table)?;
        }
        Ok(())
    }

    /// Persist row `i` under `key`, skipping it if it already exists.
    pub fn build_row(&self, i: usize, store: &ArtifactStore, key: &TableRowKey) -> Result<Outcome> {
        let outcome = store.get_or_compute(key, |out| self.write_row(i, out))?;
        if outcome == Outcome::Computed {
            info!(
                row = i,
                tables = self.frame_count() - i,
                path = %store.path_for(key).display(),
                "Table row written"
            );
        }
        Ok(outcome)
    }
}
