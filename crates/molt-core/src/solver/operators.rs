//! The C and D composite operators.
//!
//! Both are built from three sweep chains, one starting on each axis. A chain
//! starting on axis `a` sweeps `a`, then `a + 1`, then `a + 2` (cyclically),
//! transposing before each sweep so the swept axis is contiguous:
//!
//! ```text
//! S_a(u) = L_{a+2} L_{a+1} (L_a u - u)     C chains (differenced)
//! S_a(u) = L_{a+2} L_{a+1} L_a u           D chains
//! ```
//!
//! `C(u) = S_x + S_y + S_z` and `D(u) = (S_x + S_y + S_z) / 3 - u`.

use molt_compute::RowExecutor;

use super::weights::LineWeights;
use super::{sweep_rows, Solver, SolverError, Workspace};
use crate::transpose::transpose_with;
use crate::types::{Axis, AxisOrder, Dims};

impl Solver {
    /// Evaluate the C operator of `u` into `out`.
    pub fn apply_c(&mut self, u: &[f64], out: &mut [f64]) -> Result<(), SolverError> {
        self.check_len(u.len())?;
        self.check_len(out.len())?;
        self.run_chains(u, true)?;

        let [a, b, c] = &self.workspace.acc;
        for (((o, a), b), c) in out.iter_mut().zip(a).zip(b).zip(c) {
            *o = a + b + c;
        }
        Ok(())
    }

    /// Evaluate the D operator of `u` into `out`.
    pub fn apply_d(&mut self, u: &[f64], out: &mut [f64]) -> Result<(), SolverError> {
        self.check_len(u.len())?;
        self.check_len(out.len())?;
        self.run_chains(u, false)?;

        let [a, b, c] = &self.workspace.acc;
        for ((((o, a), b), c), u) in out.iter_mut().zip(a).zip(b).zip(c).zip(u) {
            *o = (a + b + c) / 3.0 - u;
        }
        Ok(())
    }

    fn run_chains(&mut self, u: &[f64], difference: bool) -> Result<(), SolverError> {
        let Solver {
            config,
            lines,
            executor,
            workspace,
        } = self;
        let Workspace { acc, swap, temp } = workspace;
        let dims = config.dims();

        for (first, out) in Axis::ALL.into_iter().zip(acc.iter_mut()) {
            chain(
                &**executor,
                lines,
                dims,
                first,
                difference,
                u,
                temp.as_mut_slice(),
                swap.as_mut_slice(),
                out.as_mut_slice(),
            )?;
        }
        Ok(())
    }
}

/// One three-axis sweep chain starting at `first`, written to `out` in XYZ
/// order.
#[allow(clippy::too_many_arguments)]
fn chain(
    executor: &dyn RowExecutor,
    lines: &[LineWeights; 3],
    dims: Dims,
    first: Axis,
    difference: bool,
    u: &[f64],
    temp: &mut [f64],
    swap: &mut [f64],
    out: &mut [f64],
) -> Result<(), SolverError> {
    let mut from = AxisOrder::XYZ;
    let mut axis = first;

    for stage in 0..3 {
        let layout = AxisOrder::cyclic_from(axis);
        let input: &[f64] = if stage == 0 && layout == from {
            u
        } else {
            let src: &[f64] = if stage == 0 { u } else { &*swap };
            transpose_with(executor, src, temp, dims, from, layout)?;
            &*temp
        };

        sweep_rows(executor, &lines[axis.index()], input, swap)?;

        if stage == 0 && difference {
            for (s, &v) in swap.iter_mut().zip(input) {
                *s -= v;
            }
        }

        from = layout;
        axis = axis.next();
    }

    transpose_with(executor, swap, out, dims, from, AxisOrder::XYZ)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, GridParams};
    use approx::assert_abs_diff_eq;

    fn solver() -> Solver {
        let mut params = GridParams::cube(4, 2, 0.5);
        params.y = crate::config::AxisSpec::unit(5);
        params.z = crate::config::AxisSpec::unit(3);
        Solver::sequential(GridConfig::new(params).unwrap()).unwrap()
    }

    #[test]
    fn test_operators_are_linear() {
        let mut s = solver();
        let n = s.config().mesh_len();
        let a: Vec<f64> = (0..n).map(|i| (i as f64 * 0.31).sin()).collect();
        let b: Vec<f64> = (0..n).map(|i| (i as f64 * 0.17).cos()).collect();
        let mix: Vec<f64> = a.iter().zip(&b).map(|(a, b)| 2.0 * a - 0.5 * b).collect();

        let (mut ca, mut cb, mut cm) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        s.apply_c(&a, &mut ca).unwrap();
        s.apply_c(&b, &mut cb).unwrap();
        s.apply_c(&mix, &mut cm).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(cm[i], 2.0 * ca[i] - 0.5 * cb[i], epsilon = 1e-12);
        }

        s.apply_d(&a, &mut ca).unwrap();
        s.apply_d(&b, &mut cb).unwrap();
        s.apply_d(&mix, &mut cm).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(cm[i], 2.0 * ca[i] - 0.5 * cb[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_repeated_calls_are_deterministic() {
        let mut s = solver();
        let n = s.config().mesh_len();
        let u: Vec<f64> = (0..n).map(|i| (i % 7) as f64).collect();
        let mut first = vec![0.0; n];
        let mut second = vec![0.0; n];
        s.apply_c(&u, &mut first).unwrap();
        s.apply_d(&u, &mut second).unwrap();
        s.apply_c(&u, &mut second).unwrap();
        assert_eq!(first, second);
    }
}
