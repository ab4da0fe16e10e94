//! C and D operators on a constant field.

use approx::assert_abs_diff_eq;

use molt_core::config::{AxisSpec, GridConfig, GridParams, WeightProfile};
use molt_core::Solver;

fn params(space_order: usize) -> GridParams {
    let mut params = GridParams::cube(6, 2, 0.5);
    params.x = AxisSpec::new(-1.0, 1.0, 0.25);
    params.y = AxisSpec::unit(5);
    params.z = AxisSpec::new(0.0, 2.0, 0.5);
    params.space_order = space_order;
    params
}

#[test]
fn constant_field_is_annihilated_by_c() {
    for order in 1..=3 {
        let mut solver = Solver::sequential(GridConfig::new(params(order)).unwrap()).unwrap();
        let n = solver.config().mesh_len();
        let u = vec![1.75; n];
        let mut out = vec![f64::NAN; n];
        solver.apply_c(&u, &mut out).unwrap();
        for v in out {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn d_of_constant_field_is_minus_field() {
    for order in 1..=3 {
        let mut solver = Solver::sequential(GridConfig::new(params(order)).unwrap()).unwrap();
        let n = solver.config().mesh_len();
        let u = vec![-0.6; n];
        let mut out = vec![f64::NAN; n];
        solver.apply_d(&u, &mut out).unwrap();
        for v in out {
            assert_abs_diff_eq!(v, 0.6, epsilon = 1e-9);
        }
    }
}

#[test]
fn uniform_profile_leaves_boundary_residue() {
    // The uniform profile reuses the left weights on the right, so the
    // right-hand boundary layer of a constant field is not removed.
    let mut p = params(1);
    p.weight_profile = WeightProfile::Uniform;
    let mut solver = Solver::sequential(GridConfig::new(p).unwrap()).unwrap();
    let n = solver.config().mesh_len();
    let u = vec![1.0; n];
    let mut out = vec![0.0; n];
    solver.apply_c(&u, &mut out).unwrap();
    assert!(out.iter().any(|v| v.abs() > 1e-6));
}

#[test]
fn fields_varying_along_one_axis_are_annihilated() {
    // Every chain sweeps the two other axes at some point, and rows that are
    // constant along a swept axis map to zero. So C(u) = 0 and D(u) = -u for
    // any field that depends on a single coordinate.
    let mut solver = Solver::sequential(GridConfig::new(params(2)).unwrap()).unwrap();
    let dims = solver.config().dims();
    let n = solver.config().mesh_len();

    for axis in 0..3 {
        let u: Vec<f64> = (0..n)
            .map(|i| {
                let coord = [i % dims[0], (i / dims[0]) % dims[1], i / (dims[0] * dims[1])];
                (coord[axis] as f64 * 0.9).sin() + 0.3
            })
            .collect();

        let mut c = vec![f64::NAN; n];
        solver.apply_c(&u, &mut c).unwrap();
        let mut d = vec![f64::NAN; n];
        solver.apply_d(&u, &mut d).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(c[i], 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(d[i], -u[i], epsilon = 1e-9);
        }
    }
}
