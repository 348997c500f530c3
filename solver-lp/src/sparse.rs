//! Sparse matrix helpers.

use sprs::{CsMat, TriMat};

/// Sparse matrix in CSC format.
pub type SparseCsc = CsMat<f64>;

/// Build a sparse CSC matrix from `(row, col, value)` triplets.
///
/// Duplicate entries are summed.
pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> SparseCsc
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    let mut tri = TriMat::new((nrows, ncols));
    for (i, j, v) in triplets {
        tri.add_triplet(i, j, v);
    }
    tri.to_csc()
}

/// Build a sparse CSC matrix from dense rows.
pub fn from_dense_rows(rows: &[Vec<f64>]) -> SparseCsc {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    let triplets = rows.iter().enumerate().flat_map(|(i, row)| {
        row.iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(move |(j, &v)| (i, j, v))
    });
    from_triplets(nrows, ncols, triplets)
}
