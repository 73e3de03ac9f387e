use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use ndarray::{Array2, Array3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::consts::{CACHE_DIR_NAME, EDGES_DIR_NAME, EDGE_MASK_ON, FRAMES_DIR_NAME};
use crate::error::{Result, ViewCostError};
use crate::frame::{EdgeMask, Frame, Resolution};

/// One clip on disk: extracted frames plus precomputed edge masks.
///
/// ```text
/// <root>/frames/0.png, 1.png, ...
/// <root>/edges/0.png, 1.png, ...
/// <root>/preprocess/            (tables and cost matrices)
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipSource {
    pub root: PathBuf,
    pub name: String,
}

impl ClipSource {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(ViewCostError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("clip directory {} does not exist", root.display()),
            )));
        }
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".into());
        Ok(Self {
            root: root.to_path_buf(),
            name,
        })
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join(FRAMES_DIR_NAME)
    }

    pub fn edges_dir(&self) -> PathBuf {
        self.root.join(EDGES_DIR_NAME)
    }

    pub fn default_cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR_NAME)
    }

    /// Number of edge masks, which defines the frame count N.
    pub fn frame_count(&self) -> Result<usize> {
        let masks = list_indexed_images(&self.edges_dir())?;
        if masks.is_empty() {
            return Err(ViewCostError::EmptySequence(format!(
                "no edge masks in {}; compute edge masks first",
                self.edges_dir().display()
            )));
        }
        Ok(masks.len())
    }
}

/// Every immediate subdirectory of `dir` that contains a `frames/` directory,
/// sorted by path.
pub fn discover_clips(dir: &Path) -> Result<Vec<ClipSource>> {
    let mut clips = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && path.join(FRAMES_DIR_NAME).is_dir() {
            clips.push(ClipSource::open(&path)?);
        }
    }
    clips.sort_by(|a, b| a.root.cmp(&b.root));
    Ok(clips)
}

/// Image files named `<index>.<ext>` in `dir`, ordered by index.
/// Hidden files and non-numeric names are ignored.
pub fn list_indexed_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut indexed: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('.') {
            continue;
        }
        if let Ok(index) = stem.parse::<usize>() {
            indexed.push((index, path));
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, path)| path).collect())
}

fn is_grayscale(img: &DynamicImage) -> bool {
    matches!(
        img.color(),
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16
    )
}

/// Load one frame, resized with nearest-neighbour sampling to `resolution`.
///
/// Grayscale sources become single-channel frames; everything else RGB.
pub fn load_frame(path: &Path, resolution: Resolution) -> Result<Frame> {
    let mut img = image::open(path)?;
    let (w, h) = (resolution.width as u32, resolution.height as u32);
    if img.width() != w || img.height() != h {
        img = img.resize_exact(w, h, FilterType::Nearest);
    }

    let (rows, cols) = resolution.shape();
    let frame = if is_grayscale(&img) {
        let gray = img.to_luma8();
        let data = Array2::from_shape_vec((rows, cols), gray.into_raw())
            .map_err(|e| ViewCostError::Io(std::io::Error::other(e.to_string())))?;
        Frame::from_gray(data)
    } else {
        let rgb = img.to_rgb8();
        let data = Array3::from_shape_vec((rows, cols, 3), rgb.into_raw())
            .map_err(|e| ViewCostError::Io(std::io::Error::other(e.to_string())))?;
        Frame::new(data)
    };
    Ok(frame)
}

/// Load one binary edge mask. It must already be at `resolution` and
/// contain only 0 and 255.
pub fn load_edge_mask(path: &Path, resolution: Resolution) -> Result<EdgeMask> {
    let gray = image::open(path)?.to_luma8();
    let (w, h) = gray.dimensions();
    if w as usize != resolution.width || h as usize != resolution.height {
        return Err(ViewCostError::ShapeMismatch {
            expected: vec![resolution.height, resolution.width],
            actual: vec![h as usize, w as usize],
            context: format!("edge mask {}", path.display()),
        });
    }

    if let Some(&value) = gray.as_raw().iter().find(|&&v| v != 0 && v != EDGE_MASK_ON) {
        return Err(ViewCostError::InvalidMask {
            path: path.to_path_buf(),
            value,
        });
    }

    let data = Array2::from_shape_vec(resolution.shape(), gray.into_raw())
        .map_err(|e| ViewCostError::Io(std::io::Error::other(e.to_string())))?;
    Ok(EdgeMask::new(data))
}

/// Load every frame of a clip, in index order.
pub fn load_frames(clip: &ClipSource, resolution: Resolution) -> Result<Vec<Frame>> {
    let paths = list_indexed_images(&clip.frames_dir())?;
    if paths.is_empty() {
        return Err(ViewCostError::EmptySequence(format!(
            "no frames in {}",
            clip.frames_dir().display()
        )));
    }
    debug!(count = paths.len(), clip = %clip.name, "Loading frames");
    let frames = paths
        .par_iter()
        .map(|p| load_frame(p, resolution))
        .collect::<Result<Vec<_>>>()?;
    info!(count = frames.len(), resolution = %resolution, "Frames loaded");
    Ok(frames)
}

/// Load every edge mask of a clip, in index order.
pub fn load_edge_masks(clip: &ClipSource, resolution: Resolution) -> Result<Vec<EdgeMask>> {
    let paths = list_indexed_images(&clip.edges_dir())?;
    if paths.is_empty() {
        return Err(ViewCostError::EmptySequence(format!(
            "no edge masks in {}; compute edge masks first",
            clip.edges_dir().display()
        )));
    }
    let masks = paths
        .par_iter()
        .map(|p| load_edge_mask(p, resolution))
        .collect::<Result<Vec<_>>>()?;
    info!(count = masks.len(), "Edge masks loaded");
    Ok(masks)
}
