//! One-dimensional Green's-function quadrature and boundary correction.
//!
//! [`quadrature`] evaluates the convolution of a row against
//! $\frac{\alpha}{2} e^{-\alpha|x-y|}$ in $O(L)$ by splitting it into a
//! left-going and a right-going recursive sum:
//!
//! $$
//! I^L_{i+1} = e^{-\nu_i} I^L_i + \sum_k w^L_{ik} u_{s(i)+k}, \qquad
//! I^R_i = e^{-\nu_i} I^R_{i+1} + \sum_k w^R_{ik} u_{s(i)+k}
//! $$
//!
//! [`make_l`] then adds the homogeneous solutions $v_L, v_R$ so that the row
//! takes prescribed values at both ends.

use super::weights::LineWeights;

/// Convolve `row` with the exponential Green's function, writing into `out`.
///
/// Both slices have [`LineWeights::points_inclusive`] entries. The operator is
/// linear in `row`.
pub fn quadrature(row: &[f64], out: &mut [f64], weights: &LineWeights) {
    let n = weights.intervals();
    assert_eq!(row.len(), n + 1, "row length must match the axis");
    assert_eq!(out.len(), n + 1, "output length must match the axis");

    let stencil = weights.stencil_len();
    let dnu = weights.dnu();
    out.fill(0.0);

    let mut il = 0.0;
    for i in 0..n {
        let s = weights.window(i);
        il = dnu[i] * il + dot(weights.w_left(i), &row[s..s + stencil]);
        out[i + 1] += il;
    }

    let mut ir = 0.0;
    for i in (0..n).rev() {
        let s = weights.window(i);
        ir = dnu[i] * ir + dot(weights.w_right(i), &row[s..s + stencil]);
        out[i] += ir;
    }
}

/// Enforce `row[0] = wa` and `row[last] = wb` using the axis boundary weights.
pub fn make_l(row: &mut [f64], weights: &LineWeights, wa: f64, wb: f64) {
    make_l_with(row, weights.v_left(), weights.v_right(), weights.d_n(), wa, wb);
}

/// Boundary correction with explicit weight vectors.
///
/// $$
/// r \mathrel{+}= \frac{(w_a - r_0)(v_L - d_N v_R) + (w_b - r_{n})(v_R - d_N v_L)}{1 - d_N^2}
/// $$
///
/// `d_n` must lie strictly inside (-1, 1); [`LineWeights::build`] guarantees
/// this for the weights it produces.
pub fn make_l_with(row: &mut [f64], v_left: &[f64], v_right: &[f64], d_n: f64, wa: f64, wb: f64) {
    assert_eq!(row.len(), v_left.len(), "row length must match v_left");
    assert_eq!(row.len(), v_right.len(), "row length must match v_right");

    let last = row.len() - 1;
    let ca = wa - row[0];
    let cb = wb - row[last];
    let inv = 1.0 / (1.0 - d_n * d_n);
    for ((r, &vl), &vr) in row.iter_mut().zip(v_left).zip(v_right) {
        *r += (ca * (vl - d_n * vr) + cb * (vr - d_n * vl)) * inv;
    }
}

/// The complete per-row line operator used by the sweeps.
///
/// Computes `out = row - quadrature(row)` and corrects it to the axis
/// Dirichlet targets. The complement annihilates constants (and, with zero
/// targets, everything in the span of the boundary weights), so a uniform
/// field sweeps to zero.
pub fn apply_line(row: &[f64], out: &mut [f64], weights: &LineWeights) {
    quadrature(row, out, weights);
    for (o, &u) in out.iter_mut().zip(row) {
        *o = u - *o;
    }
    let [wa, wb] = weights.targets();
    make_l(out, weights, wa, wb);
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
