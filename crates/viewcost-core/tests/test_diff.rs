#[allow(dead_code)]
mod common;

use approx::assert_relative_eq;
use ndarray::Array2;

use common::{gray_frame, gray_frame_with_pixel, rgb_frame, scorer};
use viewcost_core::diff::{validate_threshold, DifferenceScorer};
use viewcost_core::error::ViewCostError;
use viewcost_core::frame::{EdgeMask, Resolution};
use viewcost_core::sphere::weight_map;

fn res(w: usize, h: usize) -> Resolution {
    Resolution::new(w, h).unwrap()
}

// ---------------------------------------------------------------------------
// Basic differences
// ---------------------------------------------------------------------------

#[test]
fn test_identical_frames_score_zero() {
    let r = res(8, 4);
    let s = scorer(r, 0.0);
    let f = gray_frame(8, 4, 120);
    let m = EdgeMask::full(r);
    let diff = s.score(&f, &m, &f, &m).unwrap();
    assert!(diff.iter().all(|&v| v == 0.0));
}

#[test]
fn test_gray_black_white_is_one_per_pixel() {
    // 4x2 has uniform weights, so no scaling applies.
    let r = res(4, 2);
    let s = scorer(r, 0.0);
    let white = gray_frame(4, 2, 255);
    let black = gray_frame(4, 2, 0);
    let m = EdgeMask::full(r);
    let diff = s.score(&white, &m, &black, &m).unwrap();
    for &v in diff.iter() {
        assert_relative_eq!(v, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_rgb_sums_over_channels() {
    let r = res(4, 2);
    let s = scorer(r, 0.0);
    let white = rgb_frame(4, 2, [255, 255, 255]);
    let black = rgb_frame(4, 2, [0, 0, 0]);
    let m = EdgeMask::full(r);
    let diff = s.score(&white, &m, &black, &m).unwrap();
    for &v in diff.iter() {
        assert_relative_eq!(v, 3.0, epsilon = 1e-12);
    }

    let red = rgb_frame(4, 2, [255, 0, 0]);
    let diff = s.score(&red, &m, &black, &m).unwrap();
    assert_relative_eq!(diff[[1, 2]], 1.0, epsilon = 1e-12);
}

#[test]
fn test_scaled_by_squared_weight() {
    let r = res(8, 4);
    let s = scorer(r, 0.0);
    let weights = weight_map(r).unwrap();
    let white = gray_frame(8, 4, 255);
    let black = gray_frame(8, 4, 0);
    let m = EdgeMask::full(r);
    let diff = s.score(&white, &m, &black, &m).unwrap();
    for ((row, col), &v) in diff.indexed_iter() {
        let w = weights.data[[row, col]];
        assert_relative_eq!(v, w * w, epsilon = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Masking
// ---------------------------------------------------------------------------

#[test]
fn test_empty_masks_suppress_everything() {
    let r = res(8, 4);
    let s = scorer(r, 0.0);
    let m = EdgeMask::empty(r);
    let diff = s
        .score(&gray_frame(8, 4, 255), &m, &gray_frame(8, 4, 0), &m)
        .unwrap();
    assert!(diff.iter().all(|&v| v == 0.0));
}

#[test]
fn test_mask_is_union_of_both_frames() {
    let r = res(4, 2);
    let s = scorer(r, 0.0);
    let mut left = Array2::<u8>::zeros((2, 4));
    left[[0, 0]] = 255;
    let mut right = Array2::<u8>::zeros((2, 4));
    right[[1, 3]] = 255;

    let diff = s
        .score(
            &gray_frame(4, 2, 255),
            &EdgeMask::new(left),
            &gray_frame(4, 2, 0),
            &EdgeMask::new(right),
        )
        .unwrap();
    assert_relative_eq!(diff[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(diff[[1, 3]], 1.0, epsilon = 1e-12);
    assert_eq!(diff.iter().filter(|&&v| v != 0.0).count(), 2);
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

#[test]
fn test_threshold_is_inclusive() {
    let r = res(4, 2);
    let delta = 0.0 - 51.0 / 255.0;
    let d = delta * delta;
    let a = gray_frame(4, 2, 0);
    let b = gray_frame_with_pixel(4, 2, 0, 1, 1, 51);
    let m = EdgeMask::full(r);

    let kept = scorer(r, d).score(&a, &m, &b, &m).unwrap();
    assert_relative_eq!(kept[[1, 1]], d, epsilon = 1e-15);

    let dropped = scorer(r, d + 1e-9).score(&a, &m, &b, &m).unwrap();
    assert_eq!(dropped[[1, 1]], 0.0);
}

#[test]
fn test_high_threshold_zeroes_small_changes() {
    let r = res(8, 4);
    let s = scorer(r, 0.5);
    let m = EdgeMask::full(r);
    // (100/255)^2 ≈ 0.154 < 0.5
    let diff = s
        .score(&gray_frame(8, 4, 100), &m, &gray_frame(8, 4, 0), &m)
        .unwrap();
    assert!(diff.iter().all(|&v| v == 0.0));
}

#[test]
fn test_invalid_threshold_rejected() {
    assert!(validate_threshold(0.0).is_ok());
    assert!(matches!(
        validate_threshold(-0.1),
        Err(ViewCostError::InvalidThreshold(_))
    ));
    assert!(validate_threshold(f64::NAN).is_err());
    assert!(validate_threshold(f64::INFINITY).is_err());

    let weights = weight_map(res(4, 2)).unwrap();
    assert!(DifferenceScorer::new(&weights, -1.0).is_err());
}

// ---------------------------------------------------------------------------
// Shape checks
// ---------------------------------------------------------------------------

#[test]
fn test_frame_shape_mismatch() {
    let r = res(8, 4);
    let s = scorer(r, 0.0);
    let m = EdgeMask::full(r);
    let err = s
        .score(&gray_frame(4, 2, 0), &m, &gray_frame(8, 4, 0), &m)
        .unwrap_err();
    assert!(matches!(err, ViewCostError::ShapeMismatch { .. }));
}

#[test]
fn test_channel_mismatch() {
    let r = res(4, 2);
    let s = scorer(r, 0.0);
    let m = EdgeMask::full(r);
    let err = s
        .score(&gray_frame(4, 2, 0), &m, &rgb_frame(4, 2, [0, 0, 0]), &m)
        .unwrap_err();
    assert!(matches!(err, ViewCostError::ShapeMismatch { .. }));
}

#[test]
fn test_mask_shape_mismatch() {
    let r = res(4, 2);
    let s = scorer(r, 0.0);
    let f = gray_frame(4, 2, 0);
    let err = s
        .score(&f, &EdgeMask::full(res(8, 4)), &f, &EdgeMask::full(r))
        .unwrap_err();
    assert!(matches!(err, ViewCostError::ShapeMismatch { .. }));
}
