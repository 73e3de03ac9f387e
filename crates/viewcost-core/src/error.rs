use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewCostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Empty sequence: {0}")]
    EmptySequence(String),

    #[error("Sequence length mismatch: {frames} frames but {masks} edge masks")]
    SequenceMismatch { frames: usize, masks: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} ({context})")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    #[error("Invalid edge mask {path}: value {value} is not 0 or 255")]
    InvalidMask { path: PathBuf, value: u8 },

    #[error("Invalid threshold {0}: must be finite and >= 0")]
    InvalidThreshold(f64),

    #[error("Invalid NPY file: {0}")]
    InvalidNpy(String),

    #[error("Missing summed-area table row {row} at {path}; build the tables first")]
    MissingTableRow { row: usize, path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ViewCostError>;
