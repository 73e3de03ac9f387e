use std::f64::consts::PI;

use ndarray::Array2;

use crate::consts::{LATITUDE_SPAN_DEG, LONGITUDE_SPAN_DEG};
use crate::error::Result;
use crate::frame::Resolution;

/// Longitude/latitude bounds of one equirectangular pixel, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelBounds {
    pub lon1: f64,
    pub lat1: f64,
    pub lon2: f64,
    pub lat2: f64,
}

/// Area of a lon/lat quadrangle on the unit sphere, up to a constant factor.
///
/// `(π/180) · |sin(lat1) − sin(lat2)| · |lon1 − lon2|` with latitudes in
/// degrees (converted inside the sine) and longitudes left in degrees.
pub fn area_quad(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    (PI / 180.0) * (lat1.to_radians().sin() - lat2.to_radians().sin()).abs() * (lon1 - lon2).abs()
}

/// Corner coordinates of pixel `(x, y)`.
///
/// Longitude spans [−180°, 180°) across the width; row 0 sits at +90°.
pub fn pixel_bounds(x: usize, y: usize, resolution: Resolution) -> PixelBounds {
    let width = resolution.width as f64;
    let height = resolution.height as f64;

    let xx = x as f64 - width / 2.0;
    let yy = height / 2.0 - y as f64;
    let lon_per_pixel = LONGITUDE_SPAN_DEG / width;
    let lat_per_pixel = LATITUDE_SPAN_DEG / height;

    let (left, right) = (xx, xx + 1.0);
    let (top, bottom) = (yy, yy - 1.0);

    PixelBounds {
        lon1: lon_per_pixel * left,
        lat1: lat_per_pixel * bottom,
        lon2: lon_per_pixel * right,
        lat2: lat_per_pixel * top,
    }
}

/// Per-pixel solid-angle weights for one resolution.
///
/// Normalized so the smallest weight (the pole rows) is exactly 1.
#[derive(Clone, Debug)]
pub struct WeightMap {
    /// shape = (height, width)
    pub data: Array2<f64>,
}

impl WeightMap {
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.data.ncols(),
            height: self.data.nrows(),
        }
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Elementwise square, the factor applied to squared differences.
    pub fn squared(&self) -> Array2<f64> {
        self.data.mapv(|w| w * w)
    }
}

/// Unnormalized pixel areas.
pub fn area_map(resolution: Resolution) -> Result<Array2<f64>> {
    let resolution = Resolution::new(resolution.width, resolution.height)?;
    Ok(Array2::from_shape_fn(resolution.shape(), |(y, x)| {
        let b = pixel_bounds(x, y, resolution);
        area_quad(b.lon1, b.lat1, b.lon2, b.lat2)
    }))
}

/// Compute the normalized weight map for a resolution.
pub fn weight_map(resolution: Resolution) -> Result<WeightMap> {
    let mut data = area_map(resolution)?;
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    data.mapv_inplace(|a| a / min);
    Ok(WeightMap { data })
}
