//! Mesh transposes between axis orders.
//!
//! All layouts share one index formula: for an order `[a, b, c]` the offset
//! of logical coordinate `p` is `p[a] + n[a] * (p[b] + n[b] * p[c])`.
//! Converting between two layouts visits every coordinate once and copies
//! from the source offset to the target offset.

use molt_compute::{ComputeError, RowExecutor};

use crate::types::{AxisOrder, Dims};

/// Linear offset of logical coordinate `coord` (`[x, y, z]`) under `order`.
#[inline]
pub fn linear_index(coord: [usize; 3], dims: Dims, order: AxisOrder) -> usize {
    let [a, b, c] = order.axes();
    let (a, b, c) = (a.index(), b.index(), c.index());
    coord[a] + dims[a] * (coord[b] + dims[b] * coord[c])
}

/// Rewrite an extent triple listed in `from` order so it is listed in `to`
/// order.
///
/// `permute_dims([nx, ny, nz], XYZ, YZX) == [ny, nz, nx]`.
pub fn permute_dims(extents: [usize; 3], from: AxisOrder, to: AxisOrder) -> [usize; 3] {
    let mut logical = [0; 3];
    for (k, axis) in from.axes().into_iter().enumerate() {
        logical[axis.index()] = extents[k];
    }
    to.axes().map(|axis| logical[axis.index()])
}

/// Copy `src` (laid out in `from`) into `dst` laid out in `to`.
///
/// `src` and `dst` are distinct borrows, so they can never alias.
pub fn transpose(src: &[f64], dst: &mut [f64], dims: Dims, from: AxisOrder, to: AxisOrder) {
    let total = dims[0] * dims[1] * dims[2];
    assert_eq!(src.len(), total, "source length must match mesh extents");
    assert_eq!(dst.len(), total, "destination length must match mesh extents");

    if from == to {
        dst.copy_from_slice(src);
        return;
    }
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let p = [x, y, z];
                dst[linear_index(p, dims, to)] = src[linear_index(p, dims, from)];
            }
        }
    }
}

/// Fill output row `row` of a `to`-ordered mesh from a `from`-ordered source.
///
/// Rows run along `to.fastest()`; this is the unit of parallel transpose work.
pub fn transpose_row(
    src: &[f64],
    dst_row: &mut [f64],
    row: usize,
    dims: Dims,
    from: AxisOrder,
    to: AxisOrder,
) {
    let [a, b, c] = to.axes().map(|axis| axis.index());
    debug_assert_eq!(dst_row.len(), dims[a]);

    let mut p = [0; 3];
    p[b] = row % dims[b];
    p[c] = row / dims[b];
    for (i, out) in dst_row.iter_mut().enumerate() {
        p[a] = i;
        *out = src[linear_index(p, dims, from)];
    }
}

/// Row-parallel transpose dispatched through `executor`.
///
/// Produces exactly the same buffer as [`transpose`].
pub fn transpose_with(
    executor: &dyn RowExecutor,
    src: &[f64],
    dst: &mut [f64],
    dims: Dims,
    from: AxisOrder,
    to: AxisOrder,
) -> Result<(), ComputeError> {
    let total = dims[0] * dims[1] * dims[2];
    assert_eq!(src.len(), total, "source length must match mesh extents");
    assert_eq!(dst.len(), total, "destination length must match mesh extents");

    if from == to {
        dst.copy_from_slice(src);
        return Ok(());
    }
    let row_len = dims[to.fastest().index()];
    executor.for_each_output_row(dst, row_len, &|row, out| {
        transpose_row(src, out, row, dims, from, to)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use molt_compute::SequentialExecutor;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|v| v as f64).collect()
    }

    #[test]
    fn test_linear_index_xyz() {
        let dims = [4, 3, 2];
        assert_eq!(linear_index([1, 0, 0], dims, AxisOrder::XYZ), 1);
        assert_eq!(linear_index([0, 1, 0], dims, AxisOrder::XYZ), 4);
        assert_eq!(linear_index([0, 0, 1], dims, AxisOrder::XYZ), 12);
        assert_eq!(linear_index([0, 0, 1], dims, AxisOrder::ZXY), 1);
        assert_eq!(linear_index([1, 0, 0], dims, AxisOrder::ZXY), 2);
    }

    #[test]
    fn test_permute_dims() {
        assert_eq!(permute_dims([4, 3, 2], AxisOrder::XYZ, AxisOrder::YZX), [3, 2, 4]);
        assert_eq!(permute_dims([3, 2, 4], AxisOrder::YZX, AxisOrder::ZXY), [2, 4, 3]);
        assert_eq!(permute_dims([2, 4, 3], AxisOrder::ZXY, AxisOrder::XYZ), [4, 3, 2]);
    }

    #[test]
    fn test_transpose_small() {
        // 2 x 3 x 1: x fastest -> y fastest is a plain matrix transpose.
        let dims = [2, 3, 1];
        let src = ramp(6);
        let mut dst = vec![0.0; 6];
        transpose(&src, &mut dst, dims, AxisOrder::XYZ, AxisOrder::YXZ);
        assert_eq!(dst, vec![0.0, 2.0, 4.0, 1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_row_transpose_matches_elementwise() {
        let dims = [5, 3, 4];
        let src = ramp(60);
        for to in AxisOrder::ALL {
            let mut a = vec![0.0; 60];
            let mut b = vec![0.0; 60];
            transpose(&src, &mut a, dims, AxisOrder::XYZ, to);
            transpose_with(&SequentialExecutor, &src, &mut b, dims, AxisOrder::XYZ, to).unwrap();
            assert_eq!(a, b, "mismatch for order {to}");
        }
    }
}
