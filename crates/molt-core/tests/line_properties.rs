//! Properties of the one-dimensional line operator: boundary enforcement and
//! linearity of the quadrature.

use molt_core::config::{AxisSpec, WeightProfile};
use molt_core::solver::greens::{make_l, make_l_with, quadrature};
use molt_core::solver::weights::LineWeights;
use proptest::prelude::*;

fn weights(intervals: usize, nu: f64, order: usize) -> LineWeights {
    LineWeights::build(
        "x",
        &AxisSpec::unit(intervals),
        nu,
        1.0,
        order,
        WeightProfile::DistanceDependent,
        [0.0, 0.0],
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, .. ProptestConfig::default()
    })]

    /// make_l pins both endpoints for any d_N strictly inside (-1, 1).
    #[test]
    fn make_l_enforces_targets_for_any_d_n(
        row in prop::collection::vec(-10.0f64..10.0, 2..40),
        interior in prop::collection::vec(0.0f64..1.0, 40),
        d_n in -0.95f64..0.95,
        wa in -5.0f64..5.0,
        wb in -5.0f64..5.0,
    ) {
        let n = row.len();
        let mut v_left: Vec<f64> = interior[..n].to_vec();
        v_left[0] = 1.0;
        v_left[n - 1] = d_n;
        let v_right: Vec<f64> = v_left.iter().rev().copied().collect();

        let mut row = row;
        make_l_with(&mut row, &v_left, &v_right, d_n, wa, wb);
        prop_assert!((row[0] - wa).abs() < 1e-9, "left end {} != {}", row[0], wa);
        prop_assert!((row[n - 1] - wb).abs() < 1e-9, "right end {} != {}", row[n - 1], wb);
    }

    /// The same holds with weights built from a real axis.
    #[test]
    fn make_l_enforces_targets_with_axis_weights(
        intervals in 3usize..30,
        nu in 0.05f64..3.0,
        order in 1usize..=3,
        wa in -5.0f64..5.0,
        wb in -5.0f64..5.0,
        seed in 0u64..1000,
    ) {
        let w = weights(intervals, nu, order);
        let mut row: Vec<f64> = (0..=intervals)
            .map(|j| ((j as u64 * 31 + seed) % 17) as f64 - 8.0)
            .collect();
        make_l(&mut row, &w, wa, wb);
        prop_assert!((row[0] - wa).abs() < 1e-9);
        prop_assert!((row[intervals] - wb).abs() < 1e-9);
    }

    /// quad(a r1 + b r2) == a quad(r1) + b quad(r2)
    #[test]
    fn quadrature_is_linear(
        r1 in prop::collection::vec(-10.0f64..10.0, 16),
        r2 in prop::collection::vec(-10.0f64..10.0, 16),
        a in -5.0f64..5.0,
        b in -5.0f64..5.0,
        nu in 0.05f64..3.0,
        order in 1usize..=3,
    ) {
        let w = weights(15, nu, order);
        let mix: Vec<f64> = r1.iter().zip(&r2).map(|(x, y)| a * x + b * y).collect();

        let (mut q1, mut q2, mut qm) = (vec![0.0; 16], vec![0.0; 16], vec![0.0; 16]);
        quadrature(&r1, &mut q1, &w);
        quadrature(&r2, &mut q2, &w);
        quadrature(&mix, &mut qm, &w);

        for j in 0..16 {
            let expected = a * q1[j] + b * q2[j];
            prop_assert!((qm[j] - expected).abs() < 1e-9, "index {}: {} vs {}", j, qm[j], expected);
        }
    }
}
