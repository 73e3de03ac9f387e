use super::table::TableLookup;

/// Inclusive pixel corner `(x = column, y = row)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Corner {
    pub x: i64,
    pub y: i64,
}

impl Corner {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Viewport corners reduced into the table's coordinate range.
///
/// `bot_right` may be smaller than `top_left` on either axis, meaning the
/// window wraps across that edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowBounds {
    pub top_left: Corner,
    pub bot_right: Corner,
}

impl WindowBounds {
    pub fn wraps_horizontally(&self) -> bool {
        self.bot_right.x < self.top_left.x
    }

    pub fn wraps_vertically(&self) -> bool {
        self.bot_right.y < self.top_left.y
    }
}

fn lookup<T: TableLookup + ?Sized>(table: &T, row: i64, col: i64) -> f64 {
    if row < 0 || col < 0 {
        0.0
    } else {
        table.value(row as usize, col as usize)
    }
}

/// Sum of the source grid over the inclusive rectangle `[top_left, bot_right]`.
///
/// Requires `top_left <= bot_right` on both axes and `bot_right` inside the
/// table.
pub fn rect_sum<T: TableLookup + ?Sized>(table: &T, top_left: Corner, bot_right: Corner) -> f64 {
    let before_x = top_left.x - 1;
    let before_y = top_left.y - 1;

    lookup(table, bot_right.y, bot_right.x)
        - lookup(table, before_y, bot_right.x)
        - lookup(table, bot_right.y, before_x)
        + lookup(table, before_y, before_x)
}

/// Split `[lo, hi]` on an axis of length `len` into contiguous spans.
fn axis_spans(lo: i64, hi: i64, len: usize) -> Vec<(i64, i64)> {
    if hi >= lo {
        vec![(lo, hi)]
    } else {
        vec![(lo, len as i64 - 1), (0, hi)]
    }
}

/// Sum of the source grid inside a possibly wrapping window.
///
/// Each wrapping axis is split at the frame edge; the window sum is the total
/// over every resulting sub-rectangle. The result can be slightly negative
/// when the table was stored in single precision.
pub fn window_sum<T: TableLookup + ?Sized>(table: &T, bounds: &WindowBounds) -> f64 {
    let (h, w) = table.dims();
    let xs = axis_spans(bounds.top_left.x, bounds.bot_right.x, w);
    let ys = axis_spans(bounds.top_left.y, bounds.bot_right.y, h);

    let mut total = 0.0;
    for &(y0, y1) in &ys {
        for &(x0, x1) in &xs {
            total += rect_sum(table, Corner::new(x0, y0), Corner::new(x1, y1));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_spans_contiguous() {
        assert_eq!(axis_spans(1, 3, 5), vec![(1, 3)]);
    }

    #[test]
    fn test_axis_spans_wrapping() {
        assert_eq!(axis_spans(3, 1, 5), vec![(3, 4), (0, 1)]);
    }
}
