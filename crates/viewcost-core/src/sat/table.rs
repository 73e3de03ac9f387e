use ndarray::{Array2, ArrayBase, Data, Ix2};
use num_traits::{AsPrimitive, Float};

/// Read access to a summed-area table, independent of where it lives.
///
/// Implemented for in-memory `ndarray` tables of any float type and for
/// tables memory-mapped out of a persisted row tensor.
pub trait TableLookup {
    /// `(height, width)` of the table.
    fn dims(&self) -> (usize, usize);

    /// Table value at `(row, col)`. Callers guarantee the index is in range.
    fn value(&self, row: usize, col: usize) -> f64;
}

impl<A, S> TableLookup for ArrayBase<S, Ix2>
where
    S: Data<Elem = A>,
    A: AsPrimitive<f64>,
{
    fn dims(&self) -> (usize, usize) {
        self.dim()
    }

    fn value(&self, row: usize, col: usize) -> f64 {
        self[[row, col]].as_()
    }
}

/// Build the 2D prefix-sum table of `data`.
///
/// `S(r,c) = D(r,c) + S(r−1,c) + S(r,c−1) − S(r−1,c−1)`, out-of-bounds
/// predecessors are zero.
pub fn summed_area_table<A: Float>(data: &Array2<A>) -> Array2<A> {
    let (h, w) = data.dim();
    let mut table = Array2::<A>::zeros((h, w));

    for row in 0..h {
        for col in 0..w {
            let above = if row > 0 { table[[row - 1, col]] } else { A::zero() };
            let left = if col > 0 { table[[row, col - 1]] } else { A::zero() };
            let diagonal = if row > 0 && col > 0 {
                table[[row - 1, col - 1]]
            } else {
                A::zero()
            };
            table[[row, col]] = data[[row, col]] + above + left - diagonal;
        }
    }

    table
}

/// Recover the source grid of a prefix-sum table by second differences.
pub fn reconstruct_from_table<A: Float>(table: &Array2<A>) -> Array2<A> {
    let (h, w) = table.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        let above = if row > 0 { table[[row - 1, col]] } else { A::zero() };
        let left = if col > 0 { table[[row, col - 1]] } else { A::zero() };
        let diagonal = if row > 0 && col > 0 {
            table[[row - 1, col - 1]]
        } else {
            A::zero()
        };
        table[[row, col]] - above - left + diagonal
    })
}
