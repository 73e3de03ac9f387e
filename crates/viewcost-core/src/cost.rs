use std::path::PathBuf;

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, ViewCostError};
use crate::io::npy::{self, NpyTensor};
use crate::io::{ArtifactStore, CacheLayout, Outcome};
use crate::sat::{window_sum, TableLookup, WindowBounds};
use crate::viewport::Viewport;

/// Cost of one frame pair: square root of its windowed difference sum.
///
/// Single-precision tables can yield a sum a few ulps below zero; that is
/// clamped to 0 before the root.
pub fn pair_cost<T: TableLookup + ?Sized>(table: &T, bounds: &WindowBounds) -> f32 {
    let sum = window_sum(table, bounds);
    if sum < 0.0 {
        debug!(sum, "Negative windowed sum from f32 table, clamping to 0");
        return 0.0;
    }
    sum.sqrt() as f32
}

/// Copy the upper triangle onto the lower one: `m[i, j] = m[j, i]` for `j < i`.
pub fn mirror_upper_triangle(matrix: &mut Array2<f32>) {
    let n = matrix.nrows();
    for i in 0..n {
        for j in 0..i {
            matrix[[i, j]] = matrix[[j, i]];
        }
    }
}

/// Builds cost matrices from persisted table rows.
pub struct CostMatrixGenerator<'a> {
    store: &'a ArtifactStore,
    layout: &'a CacheLayout,
    frame_count: usize,
}

impl<'a> CostMatrixGenerator<'a> {
    pub fn new(store: &'a ArtifactStore, layout: &'a CacheLayout, frame_count: usize) -> Result<Self> {
        if frame_count == 0 {
            return Err(ViewCostError::EmptySequence("no frames to compare".into()));
        }
        Ok(Self {
            store,
            layout,
            frame_count,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn matrix_path(&self, viewport: &Viewport) -> PathBuf {
        self.store.path_for(&self.layout.cost_matrix(viewport))
    }

    /// Map row `i`, failing if the table-building stage has not produced it.
    pub fn open_row(&self, i: usize) -> Result<NpyTensor> {
        let path = self.store.path_for(&self.layout.table_row(i));
        if !path.is_file() {
            return Err(ViewCostError::MissingTableRow { row: i, path });
        }

        let tensor = NpyTensor::open(&path)?;
        let (h, w) = self.layout.resolution.shape();
        let expected = [self.frame_count - i, h, w];
        if tensor.shape() != expected {
            return Err(ViewCostError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: tensor.shape().to_vec(),
                context: format!("table row {i}"),
            });
        }
        Ok(tensor)
    }

    /// Costs `(i, j)` for `j ≥ i`, one vector per window.
    fn upper_row(&self, i: usize, windows: &[WindowBounds]) -> Result<Vec<Vec<f32>>> {
        let tensor = self.open_row(i)?;
        let mut per_window = vec![Vec::with_capacity(self.frame_count - i); windows.len()];
        for k in 0..tensor.table_count() {
            let table = tensor.table(k)?;
            for (costs, bounds) in per_window.iter_mut().zip(windows) {
                costs.push(pair_cost(&table, bounds));
            }
        }
        Ok(per_window)
    }

    /// Compute one matrix per window in a single pass over the table rows.
    ///
    /// Rows are evaluated in parallel. Each matrix is filled upper triangle
    /// first, row-major, then mirrored.
    pub fn compute_matrices(&self, windows: &[WindowBounds]) -> Result<Vec<Array2<f32>>> {
        let n = self.frame_count;
        let rows: Vec<Vec<Vec<f32>>> = (0..n)
            .into_par_iter()
            .map(|i| self.upper_row(i, windows))
            .collect::<Result<_>>()?;

        let mut matrices = vec![Array2::<f32>::zeros((n, n)); windows.len()];
        for (i, row) in rows.iter().enumerate() {
            for (matrix, costs) in matrices.iter_mut().zip(row) {
                for (offset, &cost) in costs.iter().enumerate() {
                    matrix[[i, i + offset]] = cost;
                }
            }
        }
        for matrix in &mut matrices {
            mirror_upper_triangle(matrix);
        }
        Ok(matrices)
    }

    /// Compute a single matrix for one window.
    pub fn compute_matrix(&self, bounds: &WindowBounds) -> Result<Array2<f32>> {
        let mut matrices = self.compute_matrices(std::slice::from_ref(bounds))?;
        Ok(matrices.remove(0))
    }

    /// Persist a matrix for every viewport whose matrix is not on disk yet.
    ///
    /// Existing matrices are neither recomputed nor rewritten.
    pub fn generate(&self, viewports: &[Viewport]) -> Result<Vec<(Viewport, Outcome)>> {
        let resolution = self.layout.resolution;
        let (pending, present): (Vec<Viewport>, Vec<Viewport>) = viewports
            .iter()
            .copied()
            .partition(|vp| !self.store.contains(&self.layout.cost_matrix(vp)));

        for vp in &present {
            debug!(
                center_x = vp.center_x,
                center_y = vp.center_y,
                "Cost matrix already exists"
            );
        }
        let mut outcomes: Vec<(Viewport, Outcome)> =
            present.into_iter().map(|vp| (vp, Outcome::Cached)).collect();
        if pending.is_empty() {
            return Ok(outcomes);
        }

        let windows: Vec<WindowBounds> = pending.iter().map(|vp| vp.bounds(resolution)).collect();
        info!(
            matrices = pending.len(),
            frames = self.frame_count,
            "Building cost matrices"
        );
        let matrices = self.compute_matrices(&windows)?;

        for (vp, matrix) in pending.into_iter().zip(matrices) {
            let key = self.layout.cost_matrix(&vp);
            let outcome = self
                .store
                .get_or_compute(&key, |out| npy::write_array(out, &matrix))?;
            info!(
                center_x = vp.center_x,
                center_y = vp.center_y,
                path = %self.store.path_for(&key).display(),
                "Cost matrix written"
            );
            outcomes.push((vp, outcome));
        }
        outcomes.sort_by_key(|(vp, _)| vp.center_x);
        Ok(outcomes)
    }
}
