use std::path::Path;

use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3};

use viewcost_core::diff::DifferenceScorer;
use viewcost_core::frame::{EdgeMask, Frame, Resolution};
use viewcost_core::io::{ArtifactStore, CacheLayout};
use viewcost_core::sat::TableRowBuilder;
use viewcost_core::sphere::weight_map;

/// Grayscale frame filled with `value`.
pub fn gray_frame(width: usize, height: usize, value: u8) -> Frame {
    Frame::from_gray(Array2::from_elem((height, width), value))
}

/// Grayscale frame filled with `background` except one pixel.
pub fn gray_frame_with_pixel(
    width: usize,
    height: usize,
    background: u8,
    row: usize,
    col: usize,
    value: u8,
) -> Frame {
    let mut data = Array2::from_elem((height, width), background);
    data[[row, col]] = value;
    Frame::from_gray(data)
}

/// RGB frame filled with one color.
pub fn rgb_frame(width: usize, height: usize, rgb: [u8; 3]) -> Frame {
    Frame::new(Array3::from_shape_fn((height, width, 3), |(_, _, c)| rgb[c]))
}

pub fn full_masks(resolution: Resolution, count: usize) -> Vec<EdgeMask> {
    (0..count).map(|_| EdgeMask::full(resolution)).collect()
}

pub fn scorer(resolution: Resolution, threshold: f64) -> DifferenceScorer {
    let weights = weight_map(resolution).expect("weight map");
    DifferenceScorer::new(&weights, threshold).expect("scorer")
}

/// Build and persist every table row for `frames` under `store`.
pub fn build_all_rows(
    frames: &[Frame],
    masks: &[EdgeMask],
    threshold: f64,
    store: &ArtifactStore,
    layout: &CacheLayout,
) {
    let scorer = scorer(layout.resolution, threshold);
    let builder = TableRowBuilder::new(frames, masks, &scorer).expect("builder");
    for i in 0..frames.len() {
        builder
            .build_row(i, store, &layout.table_row(i))
            .expect("build row");
    }
}

/// Write a frame as a PNG (gray or RGB depending on channel count).
pub fn save_frame_png(frame: &Frame, path: &Path) {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let raw: Vec<u8> = frame.data.iter().copied().collect();
    if frame.channels() == 1 {
        GrayImage::from_raw(w, h, raw)
            .expect("buffer size matches dimensions")
            .save(path)
            .expect("save gray png");
    } else {
        RgbImage::from_raw(w, h, raw)
            .expect("buffer size matches dimensions")
            .save(path)
            .expect("save rgb png");
    }
}

pub fn save_mask_png(mask: &EdgeMask, path: &Path) {
    let raw: Vec<u8> = mask.data.iter().copied().collect();
    GrayImage::from_raw(mask.width() as u32, mask.height() as u32, raw)
        .expect("buffer size matches dimensions")
        .save(path)
        .expect("save mask png");
}

/// Lay out a clip directory: `<root>/frames/<i>.png` and `<root>/edges/<i>.png`.
pub fn write_clip(root: &Path, frames: &[Frame], masks: &[EdgeMask]) {
    let frames_dir = root.join("frames");
    let edges_dir = root.join("edges");
    std::fs::create_dir_all(&frames_dir).expect("create frames dir");
    std::fs::create_dir_all(&edges_dir).expect("create edges dir");
    for (i, frame) in frames.iter().enumerate() {
        save_frame_png(frame, &frames_dir.join(format!("{i}.png")));
    }
    for (i, mask) in masks.iter().enumerate() {
        save_mask_png(mask, &edges_dir.join(format!("{i}.png")));
    }
}
