//! Per-axis decay vectors, boundary weights and convolution kernels.
//!
//! The line operator approximates the symmetric Green's function
//! $\frac{\alpha}{2} e^{-\alpha |x - y|}$ by two one-sided recursive sums.
//! Over interval $[x_i, x_{i+1}]$ the data is replaced by its Lagrange
//! interpolant on `space_order + 1` nearby nodes, and the kernel tables hold
//! the exact integrals of each basis polynomial against the exponential:
//!
//! $$
//! w^L_{ik} = \tfrac12 \nu_i \int_0^1 e^{-\nu_i (1 - s)} \ell_k(s)\, ds, \qquad
//! w^R_{ik} = \tfrac12 \nu_i \int_0^1 e^{-\nu_i s} \ell_k(s)\, ds
//! $$
//!
//! with $\nu_i = \alpha \Delta x_i$. Since the basis sums to one, each kernel
//! row sums to $\tfrac12 (1 - e^{-\nu_i})$ and constants are reproduced
//! exactly.

use super::{try_filled, SolverError};
use crate::config::{AxisSpec, ConfigError, WeightProfile, MAX_SPACE_ORDER};

/// Below this decay rate the exponential moments are summed as a series to
/// avoid cancellation in the recursion.
const SERIES_THRESHOLD: f64 = 1.0;
const SERIES_TERMS: usize = 40;

/// Read-only line data for one axis.
#[derive(Debug, Clone)]
pub struct LineWeights {
    intervals: usize,
    order: usize,
    nu: Vec<f64>,
    dnu: Vec<f64>,
    v_left: Vec<f64>,
    v_right: Vec<f64>,
    w_left: Vec<f64>,
    w_right: Vec<f64>,
    window: Vec<usize>,
    d_n: f64,
    targets: [f64; 2],
}

impl LineWeights {
    /// Build the line data for one axis.
    ///
    /// `alpha` is the stability constant, `scale` the physical length of one
    /// grid unit, and `targets` the Dirichlet values `[left, right]`. Every
    /// table is reserved fallibly, so an axis too long for memory yields
    /// [`SolverError::Allocation`].
    pub fn build(
        axis: &'static str,
        spec: &AxisSpec,
        alpha: f64,
        scale: f64,
        order: usize,
        profile: WeightProfile,
        targets: [f64; 2],
    ) -> Result<Self, SolverError> {
        if !(1..=MAX_SPACE_ORDER).contains(&order) {
            return Err(ConfigError::UnsupportedSpaceOrder(order).into());
        }
        let intervals = spec.points();
        if intervals < order {
            return Err(ConfigError::TooFewPoints {
                axis,
                points: intervals,
                required: order,
            }
            .into());
        }
        let stencil = order + 1;

        let nu = try_filled(intervals, alpha * spec.step * scale)?;
        let mut dnu = try_filled(intervals, 0.0)?;
        for (d, v) in dnu.iter_mut().zip(&nu) {
            *d = (-v).exp();
        }

        // Distance from the left boundary in units of 1/alpha.
        let mut cumulative = try_filled(intervals + 1, 0.0)?;
        for (i, v) in nu.iter().enumerate() {
            cumulative[i + 1] = cumulative[i] + v;
        }
        let total = cumulative[intervals];

        let mut v_left = try_filled(intervals + 1, 0.0)?;
        for (v, c) in v_left.iter_mut().zip(&cumulative) {
            *v = (-c).exp();
        }
        let v_right = match profile {
            WeightProfile::DistanceDependent => {
                let mut v_right = cumulative;
                for c in v_right.iter_mut() {
                    *c = (-(total - *c)).exp();
                }
                v_right
            }
            WeightProfile::Uniform => {
                let mut v_right = cumulative;
                v_right.copy_from_slice(&v_left);
                v_right
            }
        };

        // GridConfig::new performs the same check; this guards direct callers.
        let d_n = v_left.iter().copied().fold(f64::INFINITY, f64::min);
        if !(d_n > -1.0 && d_n < 1.0) {
            return Err(ConfigError::BoundaryWeight { axis, d_n }.into());
        }

        let mut window = try_filled(intervals, 0usize)?;
        for (i, start) in window.iter_mut().enumerate() {
            *start = window_start(i, intervals, order);
        }
        let table_len = intervals
            .checked_mul(stencil)
            .ok_or(SolverError::Allocation { bytes: usize::MAX })?;
        let mut w_left = try_filled(table_len, 0.0)?;
        let mut w_right = try_filled(table_len, 0.0)?;
        for (i, &start) in window.iter().enumerate() {
            let left = forward_moments(nu[i]);
            let right = backward_moments(nu[i]);
            for k in 0..stencil {
                let basis = lagrange_basis(start, i, order, k);
                let mut wl = 0.0;
                let mut wr = 0.0;
                for (m, c) in basis.iter().enumerate().take(stencil) {
                    wl += c * left[m];
                    wr += c * right[m];
                }
                w_left[i * stencil + k] = 0.5 * wl;
                w_right[i * stencil + k] = 0.5 * wr;
            }
        }

        Ok(Self {
            intervals,
            order,
            nu,
            dnu,
            v_left,
            v_right,
            w_left,
            w_right,
            window,
            d_n,
            targets,
        })
    }

    /// Number of intervals along the axis.
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    /// Row length (number of nodes including both boundaries).
    pub fn points_inclusive(&self) -> usize {
        self.intervals + 1
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of samples each kernel row touches.
    pub fn stencil_len(&self) -> usize {
        self.order + 1
    }

    pub fn nu(&self) -> &[f64] {
        &self.nu
    }

    pub fn dnu(&self) -> &[f64] {
        &self.dnu
    }

    pub fn v_left(&self) -> &[f64] {
        &self.v_left
    }

    pub fn v_right(&self) -> &[f64] {
        &self.v_right
    }

    /// Left kernel row for interval `i`.
    pub fn w_left(&self, i: usize) -> &[f64] {
        let s = self.stencil_len();
        &self.w_left[i * s..(i + 1) * s]
    }

    /// Right kernel row for interval `i`.
    pub fn w_right(&self, i: usize) -> &[f64] {
        let s = self.stencil_len();
        &self.w_right[i * s..(i + 1) * s]
    }

    /// First node of the stencil window for interval `i`.
    pub fn window(&self, i: usize) -> usize {
        self.window[i]
    }

    /// Minimum of the left boundary-weight vector.
    pub fn d_n(&self) -> f64 {
        self.d_n
    }

    /// Dirichlet targets `[left, right]`.
    pub fn targets(&self) -> [f64; 2] {
        self.targets
    }
}

/// Window start for interval `i` of a line with `intervals` intervals.
///
/// Intervals within `order / 2` of the left edge use a window pinned to node
/// 0, intervals whose centred window would pass the right edge use a window
/// pinned to the last node, and the rest are centred. The three zones tile
/// `0..intervals` and no window reads outside `0..=intervals`.
pub fn window_start(i: usize, intervals: usize, order: usize) -> usize {
    let half = order / 2;
    if i < half {
        0
    } else if i - half > intervals - order {
        intervals - order
    } else {
        i - half
    }
}

/// Monomial coefficients (in the local coordinate `s`, with node `i` at
/// `s = 0`) of the `k`-th Lagrange basis polynomial of the window starting at
/// node `start`.
fn lagrange_basis(start: usize, i: usize, order: usize, k: usize) -> [f64; MAX_SPACE_ORDER + 1] {
    let node = |j: usize| start as f64 + j as f64 - i as f64;
    let mut coeffs = [0.0; MAX_SPACE_ORDER + 1];
    coeffs[0] = 1.0;
    let mut degree = 0;
    for j in (0..=order).filter(|&j| j != k) {
        let denom = node(k) - node(j);
        let root = node(j);
        // Multiply by (s - root) / denom.
        for m in (0..=degree + 1).rev() {
            let shifted = if m > 0 { coeffs[m - 1] } else { 0.0 };
            coeffs[m] = (shifted - root * coeffs[m]) / denom;
        }
        degree += 1;
    }
    coeffs
}

/// $M_m = \nu \int_0^1 e^{-\nu (1 - s)} s^m\, ds$ for `m = 0..=MAX_SPACE_ORDER`.
fn forward_moments(nu: f64) -> [f64; MAX_SPACE_ORDER + 1] {
    let mut out = [0.0; MAX_SPACE_ORDER + 1];
    if nu < SERIES_THRESHOLD {
        // M_m = nu * m! * sum_j (-nu)^j / (j + m + 1)!
        let mut factorial = 1.0;
        for (m, slot) in out.iter_mut().enumerate() {
            if m > 0 {
                factorial *= m as f64;
            }
            let mut term = 1.0 / (1..=m + 1).map(|v| v as f64).product::<f64>();
            let mut sum = 0.0;
            for j in 0..SERIES_TERMS {
                sum += term;
                term *= -nu / (j + m + 2) as f64;
            }
            *slot = nu * factorial * sum;
        }
    } else {
        out[0] = 1.0 - (-nu).exp();
        for m in 1..out.len() {
            out[m] = 1.0 - m as f64 / nu * out[m - 1];
        }
    }
    out
}

/// $N_m = \nu \int_0^1 e^{-\nu s} s^m\, ds$ for `m = 0..=MAX_SPACE_ORDER`.
fn backward_moments(nu: f64) -> [f64; MAX_SPACE_ORDER + 1] {
    let mut out = [0.0; MAX_SPACE_ORDER + 1];
    if nu < SERIES_THRESHOLD {
        // N_m = nu * sum_j (-nu)^j / (j! (j + m + 1))
        for (m, slot) in out.iter_mut().enumerate() {
            let mut a = 1.0;
            let mut sum = 0.0;
            for j in 0..SERIES_TERMS {
                sum += a / (j + m + 1) as f64;
                a *= -nu / (j + 1) as f64;
            }
            *slot = nu * sum;
        }
    } else {
        let decay = (-nu).exp();
        out[0] = 1.0 - decay;
        for m in 1..out.len() {
            out[m] = -decay + m as f64 / nu * out[m - 1];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Composite Simpson rule on [0, 1].
    fn simpson(f: impl Fn(f64) -> f64) -> f64 {
        let n = 2000;
        let h = 1.0 / n as f64;
        let mut sum = f(0.0) + f(1.0);
        for i in 1..n {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += w * f(i as f64 * h);
        }
        sum * h / 3.0
    }

    fn build(intervals: usize, order: usize, profile: WeightProfile) -> LineWeights {
        LineWeights::build(
            "x",
            &AxisSpec::unit(intervals),
            0.8,
            1.0,
            order,
            profile,
            [0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_moments_match_quadrature() {
        for &nu in &[0.05, 0.6, 0.999, 1.0, 1.7, 4.0] {
            let fwd = forward_moments(nu);
            let bwd = backward_moments(nu);
            for m in 0..=MAX_SPACE_ORDER {
                let f = simpson(|s| nu * (-nu * (1.0 - s)).exp() * s.powi(m as i32));
                let b = simpson(|s| nu * (-nu * s).exp() * s.powi(m as i32));
                assert_abs_diff_eq!(fwd[m], f, epsilon = 1e-10);
                assert_abs_diff_eq!(bwd[m], b, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_window_zones_cover_line() {
        for order in 1..=MAX_SPACE_ORDER {
            for intervals in order..12 {
                for i in 0..intervals {
                    let s = window_start(i, intervals, order);
                    assert!(s + order <= intervals, "window overruns at i={i}");
                    assert!(s <= i && i < s + order.max(1), "interval {i} outside window {s}");
                }
            }
        }
    }

    #[test]
    fn test_lagrange_basis_is_partition_of_unity() {
        for order in 1..=MAX_SPACE_ORDER {
            for (start, i) in [(0, 0), (2, 3), (4, 4)] {
                let mut total = [0.0; MAX_SPACE_ORDER + 1];
                for k in 0..=order {
                    let c = lagrange_basis(start, i, order, k);
                    for m in 0..total.len() {
                        total[m] += c[m];
                    }
                    // Cardinal property at its own node.
                    let s = start as f64 + k as f64 - i as f64;
                    let value: f64 = c.iter().enumerate().map(|(m, c)| c * s.powi(m as i32)).sum();
                    assert_abs_diff_eq!(value, 1.0, epsilon = 1e-12);
                }
                assert_abs_diff_eq!(total[0], 1.0, epsilon = 1e-12);
                for t in &total[1..] {
                    assert_abs_diff_eq!(*t, 0.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_kernel_rows_sum_to_half_decay_mass() {
        for order in 1..=MAX_SPACE_ORDER {
            let w = build(7, order, WeightProfile::DistanceDependent);
            for i in 0..w.intervals() {
                let expected = 0.5 * (1.0 - w.dnu()[i]);
                assert_abs_diff_eq!(w.w_left(i).iter().sum::<f64>(), expected, epsilon = 1e-13);
                assert_abs_diff_eq!(w.w_right(i).iter().sum::<f64>(), expected, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn test_distance_dependent_profile() {
        let w = build(5, 1, WeightProfile::DistanceDependent);
        let n = w.points_inclusive();
        assert_eq!(w.v_left().len(), n);
        assert_abs_diff_eq!(w.v_left()[0], 1.0);
        assert_abs_diff_eq!(w.v_right()[n - 1], 1.0);
        for j in 0..n {
            assert_abs_diff_eq!(w.v_left()[j], w.v_right()[n - 1 - j], epsilon = 1e-14);
        }
        assert_abs_diff_eq!(w.d_n(), (-0.8 * 5.0_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_uniform_profile_repeats_left_weights() {
        let w = build(5, 1, WeightProfile::Uniform);
        assert_eq!(w.v_left(), w.v_right());
        assert!(w.nu().iter().all(|&v| v == w.nu()[0]));
    }

    #[test]
    fn test_too_few_points_rejected() {
        let err = LineWeights::build(
            "y",
            &AxisSpec::unit(2),
            1.0,
            1.0,
            3,
            WeightProfile::default(),
            [0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::Config(ConfigError::TooFewPoints {
                axis: "y",
                points: 2,
                required: 3
            })
        ));
    }
}
