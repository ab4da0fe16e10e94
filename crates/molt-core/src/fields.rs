//! Mesh construction and inspection helpers.
//!
//! Meshes handed to and returned by the solver are flat XYZ-ordered buffers.
//! These helpers seed them, compare them, and expose them as `ndarray` views
//! for slicing and output.

use ndarray::{Array2, ArrayView3, ShapeError};

use crate::config::GridConfig;
use crate::transpose::linear_index;
use crate::types::{AxisOrder, Dims};

/// Gaussian pulse $A e^{-|r - r_0|^2 / w^2}$ sampled on the grid nodes.
pub fn gaussian(config: &GridConfig, centre: [f64; 3], width: f64, amplitude: f64) -> Vec<f64> {
    let p = config.params();
    let [nx, ny, nz] = config.dims();
    let inv_w2 = 1.0 / (width * width);
    let mut mesh = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        let dz = p.z.node(k) - centre[2];
        for j in 0..ny {
            let dy = p.y.node(j) - centre[1];
            for i in 0..nx {
                let dx = p.x.node(i) - centre[0];
                mesh.push(amplitude * (-(dx * dx + dy * dy + dz * dz) * inv_w2).exp());
            }
        }
    }
    mesh
}

/// Element-wise `a - b` for two XYZ-ordered meshes of extents `dims`.
///
/// Each loop runs over its own axis extent, so non-cubic meshes are covered
/// completely.
pub fn mesh_difference(a: &[f64], b: &[f64], dims: Dims) -> Vec<f64> {
    let len = dims[0] * dims[1] * dims[2];
    assert_eq!(a.len(), len, "first mesh length must match extents");
    assert_eq!(b.len(), len, "second mesh length must match extents");

    let mut out = vec![0.0; len];
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let idx = linear_index([x, y, z], dims, AxisOrder::XYZ);
                out[idx] = a[idx] - b[idx];
            }
        }
    }
    out
}

/// Root-mean-square of a mesh.
pub fn rms(mesh: &[f64]) -> f64 {
    if mesh.is_empty() {
        return 0.0;
    }
    (mesh.iter().map(|v| v * v).sum::<f64>() / mesh.len() as f64).sqrt()
}

pub fn max_abs(mesh: &[f64]) -> f64 {
    mesh.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

/// View an XYZ-ordered mesh as a `(z, y, x)` array.
pub fn as_array3(mesh: &[f64], dims: Dims) -> Result<ArrayView3<'_, f64>, ShapeError> {
    ArrayView3::from_shape((dims[2], dims[1], dims[0]), mesh)
}

/// Copy of the `z = dims[2] / 2` plane, indexed `(y, x)`.
pub fn mid_plane(mesh: &[f64], dims: Dims) -> Result<Array2<f64>, ShapeError> {
    let view = as_array3(mesh, dims)?;
    Ok(view.index_axis(ndarray::Axis(0), dims[2] / 2).to_owned())
}
