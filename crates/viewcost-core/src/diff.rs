use ndarray::{Array2, Axis, Zip};

use crate::consts::MAX_SAMPLE_VALUE;
use crate::error::{Result, ViewCostError};
use crate::frame::{EdgeMask, Frame, Resolution};
use crate::sphere::WeightMap;

/// Reject thresholds that are negative, NaN or infinite.
pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(threshold)
    } else {
        Err(ViewCostError::InvalidThreshold(threshold))
    }
}

/// Produces spherically weighted, masked, thresholded squared-difference maps.
///
/// Holds the squared weight grid so it is computed once per resolution.
#[derive(Clone, Debug)]
pub struct DifferenceScorer {
    weights_squared: Array2<f64>,
    threshold: f64,
}

impl DifferenceScorer {
    pub fn new(weights: &WeightMap, threshold: f64) -> Result<Self> {
        Ok(Self {
            weights_squared: weights.squared(),
            threshold: validate_threshold(threshold)?,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.weights_squared.ncols(),
            height: self.weights_squared.nrows(),
        }
    }

    /// Difference map for one frame pair, shape = (height, width).
    ///
    /// Squared distance of the normalized samples summed over channels, zeroed
    /// outside the union of both edge masks, zeroed below the threshold, then
    /// scaled by the squared weight.
    pub fn score(&self, f1: &Frame, m1: &EdgeMask, f2: &Frame, m2: &EdgeMask) -> Result<Array2<f64>> {
        self.check_shapes(f1, m1, f2, m2)?;

        let mut diff = Array2::<f64>::zeros(self.weights_squared.dim());
        for (c1, c2) in f1
            .data
            .axis_iter(Axis(2))
            .zip(f2.data.axis_iter(Axis(2)))
        {
            Zip::from(&mut diff).and(&c1).and(&c2).for_each(|d, &a, &b| {
                let delta = a as f64 / MAX_SAMPLE_VALUE - b as f64 / MAX_SAMPLE_VALUE;
                *d += delta * delta;
            });
        }

        let threshold = self.threshold;
        Zip::from(&mut diff)
            .and(&m1.data)
            .and(&m2.data)
            .and(&self.weights_squared)
            .for_each(|d, &a, &b, &w2| {
                if a.max(b) == 0 || *d < threshold {
                    *d = 0.0;
                } else {
                    *d *= w2;
                }
            });

        Ok(diff)
    }

    fn check_shapes(&self, f1: &Frame, m1: &EdgeMask, f2: &Frame, m2: &EdgeMask) -> Result<()> {
        let (h, w) = self.weights_squared.dim();
        for (name, frame) in [("first frame", f1), ("second frame", f2)] {
            if frame.height() != h || frame.width() != w {
                return Err(ViewCostError::ShapeMismatch {
                    expected: vec![h, w],
                    actual: vec![frame.height(), frame.width()],
                    context: name.into(),
                });
            }
        }
        if f1.channels() != f2.channels() {
            return Err(ViewCostError::ShapeMismatch {
                expected: vec![h, w, f1.channels()],
                actual: vec![h, w, f2.channels()],
                context: "channel count".into(),
            });
        }
        for (name, mask) in [("first mask", m1), ("second mask", m2)] {
            if mask.data.dim() != (h, w) {
                return Err(ViewCostError::ShapeMismatch {
                    expected: vec![h, w],
                    actual: vec![mask.height(), mask.width()],
                    context: name.into(),
                });
            }
        }
        Ok(())
    }
}
