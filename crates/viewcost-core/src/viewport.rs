use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HFOV_DEG, DEFAULT_VFOV_DEG, LATITUDE_SPAN_DEG, LONGITUDE_SPAN_DEG};
use crate::frame::Resolution;
use crate::sat::{Corner, WindowBounds};

/// Angular size of the viewing window, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub horizontal_deg: f64,
    pub vertical_deg: f64,
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self {
            horizontal_deg: DEFAULT_HFOV_DEG,
            vertical_deg: DEFAULT_VFOV_DEG,
        }
    }
}

impl FieldOfView {
    /// Pixel half-extents `(half_width, half_height)` at `resolution`.
    ///
    /// `half = ceil(fov / 2 / span * dimension)`.
    pub fn half_extents(&self, resolution: Resolution) -> (usize, usize) {
        let half_width =
            (self.horizontal_deg / 2.0 / LONGITUDE_SPAN_DEG * resolution.width as f64).ceil();
        let half_height =
            (self.vertical_deg / 2.0 / LATITUDE_SPAN_DEG * resolution.height as f64).ceil();
        (half_width as usize, half_height as usize)
    }
}

/// A rectangular viewing window centered on one pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub center_x: usize,
    pub center_y: usize,
    pub half_width: usize,
    pub half_height: usize,
}

impl Viewport {
    pub fn new(center_x: usize, center_y: usize, fov: &FieldOfView, resolution: Resolution) -> Self {
        let (half_width, half_height) = fov.half_extents(resolution);
        Self {
            center_x,
            center_y,
            half_width,
            half_height,
        }
    }

    /// Nominal window size in pixels, `(2·half_width, 2·half_height)`.
    pub fn pixel_size(&self) -> (usize, usize) {
        (2 * self.half_width, 2 * self.half_height)
    }

    /// Window corners reduced modulo the resolution.
    ///
    /// The far-side extent is capped at `dimension − 1 − half` so a window
    /// spanning a full axis covers each pixel exactly once instead of making
    /// the two edges coincide.
    pub fn bounds(&self, resolution: Resolution) -> WindowBounds {
        let width = resolution.width as i64;
        let height = resolution.height as i64;
        let cx = self.center_x as i64;
        let cy = self.center_y as i64;
        let hw = self.half_width as i64;
        let hh = self.half_height as i64;

        let far_hw = hw.min((width - 1 - hw).max(0));
        let far_hh = hh.min((height - 1 - hh).max(0));

        WindowBounds {
            top_left: Corner::new((cx - hw).rem_euclid(width), (cy - hh).rem_euclid(height)),
            bot_right: Corner::new(
                (cx + far_hw).rem_euclid(width),
                (cy + far_hh).rem_euclid(height),
            ),
        }
    }
}

/// Horizontal viewing centers `0, step, 2·step, … < width`, `step = width / steps`.
pub fn horizontal_centers(width: usize, steps: usize) -> Vec<usize> {
    let step = (width / steps.max(1)).max(1);
    (0..width).step_by(step).collect()
}

/// One viewport per horizontal center at a fixed vertical center.
pub fn sweep(
    center_y: usize,
    fov: &FieldOfView,
    resolution: Resolution,
    steps: usize,
) -> Vec<Viewport> {
    horizontal_centers(resolution.width, steps)
        .into_iter()
        .map(|x| Viewport::new(x, center_y, fov, resolution))
        .collect()
}
