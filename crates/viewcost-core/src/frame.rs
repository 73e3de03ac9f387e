use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, EDGE_MASK_ON};
use crate::error::{Result, ViewCostError};

/// Working resolution of an equirectangular frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ViewCostError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Shape in ndarray order `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single decoded equirectangular frame.
/// Samples are 8-bit, shape = (height, width, channels).
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Array3<u8>,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// Wrap a single-channel grid as a grayscale frame.
    pub fn from_gray(data: Array2<u8>) -> Self {
        Self {
            data: data.insert_axis(ndarray::Axis(2)),
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }
}

/// Binary edge mask for one frame. Values are 0 or 255.
#[derive(Clone, Debug)]
pub struct EdgeMask {
    pub data: Array2<u8>,
}

impl EdgeMask {
    pub fn new(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// A mask with every pixel set.
    pub fn full(resolution: Resolution) -> Self {
        Self {
            data: Array2::from_elem(resolution.shape(), EDGE_MASK_ON),
        }
    }

    /// A mask with no pixel set.
    pub fn empty(resolution: Resolution) -> Self {
        Self {
            data: Array2::zeros(resolution.shape()),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Check that every frame and mask shares one resolution and that the two
/// sequences have equal length. Returns the common resolution.
pub fn validate_sequences(frames: &[Frame], masks: &[EdgeMask]) -> Result<Resolution> {
    if frames.is_empty() {
        return Err(ViewCostError::EmptySequence("no frames".into()));
    }
    if frames.len() != masks.len() {
        return Err(ViewCostError::SequenceMismatch {
            frames: frames.len(),
            masks: masks.len(),
        });
    }

    let first = &frames[0];
    let resolution = Resolution::new(first.width(), first.height())?;
    let channels = first.channels();

    for (index, frame) in frames.iter().enumerate() {
        if frame.data.dim() != (resolution.height, resolution.width, channels) {
            let (h, w, c) = frame.data.dim();
            return Err(ViewCostError::ShapeMismatch {
                expected: vec![resolution.height, resolution.width, channels],
                actual: vec![h, w, c],
                context: format!("frame {index}"),
            });
        }
    }
    for (index, mask) in masks.iter().enumerate() {
        if mask.data.dim() != resolution.shape() {
            return Err(ViewCostError::ShapeMismatch {
                expected: vec![resolution.height, resolution.width],
                actual: vec![mask.height(), mask.width()],
                context: format!("edge mask {index}"),
            });
        }
    }

    Ok(resolution)
}
