use viewcost_core::frame::Resolution;
use viewcost_core::sat::Corner;
use viewcost_core::viewport::{horizontal_centers, sweep, FieldOfView, Viewport};

fn res(w: usize, h: usize) -> Resolution {
    Resolution::new(w, h).unwrap()
}

fn full_sphere() -> FieldOfView {
    FieldOfView {
        horizontal_deg: 360.0,
        vertical_deg: 180.0,
    }
}

/// Number of columns and rows a window covers, wrapping allowed.
fn covered(b: &viewcost_core::sat::WindowBounds, r: Resolution) -> (i64, i64) {
    let span = |lo: i64, hi: i64, len: i64| if hi >= lo { hi - lo + 1 } else { len - lo + hi + 1 };
    (
        span(b.top_left.x, b.bot_right.x, r.width as i64),
        span(b.top_left.y, b.bot_right.y, r.height as i64),
    )
}

#[test]
fn test_default_fov_half_extents() {
    let (hw, hh) = FieldOfView::default().half_extents(res(640, 320));
    assert_eq!(hw, 72);
    assert_eq!(hh, 160);
}

#[test]
fn test_default_viewport_pixel_size() {
    let vp = Viewport::new(16, 160, &FieldOfView::default(), res(640, 320));
    assert_eq!(vp.pixel_size(), (144, 320));
}

#[test]
fn test_bounds_wrap_at_left_edge() {
    let r = res(640, 320);
    let vp = Viewport::new(0, 160, &FieldOfView::default(), r);
    let b = vp.bounds(r);
    assert_eq!(b.top_left, Corner::new(568, 0));
    assert_eq!(b.bot_right, Corner::new(72, 319));
    assert!(b.wraps_horizontally());
    assert!(!b.wraps_vertically());
}

#[test]
fn test_bounds_interior() {
    let r = res(640, 320);
    let vp = Viewport::new(320, 160, &FieldOfView::default(), r);
    let b = vp.bounds(r);
    assert_eq!(b.top_left, Corner::new(248, 0));
    assert_eq!(b.bot_right, Corner::new(392, 319));
    assert!(!b.wraps_horizontally());
}

#[test]
fn test_full_sphere_covers_every_pixel_once() {
    for (w, h) in [(8, 4), (7, 5), (640, 320)] {
        let r = res(w, h);
        for cx in [0, 1, w / 2, w - 1] {
            let vp = Viewport::new(cx, h / 2, &full_sphere(), r);
            assert_eq!(covered(&vp.bounds(r), r), (w as i64, h as i64), "{w}x{h} cx={cx}");
        }
    }
}

#[test]
fn test_off_equator_center_wraps_vertically() {
    let r = res(8, 4);
    let fov = FieldOfView {
        horizontal_deg: 90.0,
        vertical_deg: 90.0,
    };
    let vp = Viewport::new(4, 0, &fov, r);
    let b = vp.bounds(r);
    // half_height = 1: rows 3 through 1, wrapping past row 0
    assert!(b.wraps_vertically());
    assert_eq!(b.top_left.y, 3);
    assert_eq!(b.bot_right.y, 1);
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

#[test]
fn test_default_sweep_has_forty_centers() {
    let centers = horizontal_centers(640, 40);
    assert_eq!(centers.len(), 40);
    assert_eq!(centers[0], 0);
    assert_eq!(centers[1], 16);
    assert_eq!(*centers.last().unwrap(), 624);
}

#[test]
fn test_sweep_on_narrow_frames() {
    assert_eq!(horizontal_centers(8, 4), vec![0, 2, 4, 6]);
    assert_eq!(horizontal_centers(8, 40), (0..8).collect::<Vec<_>>());
    assert_eq!(horizontal_centers(8, 1), vec![0]);
}

#[test]
fn test_sweep_fixes_vertical_center() {
    let r = res(64, 32);
    let viewports = sweep(16, &FieldOfView::default(), r, 8);
    assert_eq!(viewports.len(), 8);
    assert!(viewports.iter().all(|vp| vp.center_y == 16));
    let xs: Vec<usize> = viewports.iter().map(|vp| vp.center_x).collect();
    assert_eq!(xs, vec![0, 8, 16, 24, 32, 40, 48, 56]);
}
