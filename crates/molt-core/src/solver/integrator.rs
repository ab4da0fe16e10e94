//! Leapfrog-style time integrator.
//!
//! The first step starts from a field `u0` and its time derivative `v0`:
//!
//! $$
//! u^1 = \tfrac12 \left[ 2(u^0 + \Delta t\, v^0) + \beta^2 C(u^0) + \text{corr} \right]
//! $$
//!
//! Every later step uses the two most recent levels:
//!
//! $$
//! u^{n+1} = \beta^2 C(u^n) + \text{corr} + 2u^n - u^{n-1}
//! $$
//!
//! The correction is built from repeated D-operator passes and depends only on
//! the configured time order.

use serde::Serialize;

use super::{alloc_mesh, Solver, SolverError};
use crate::config::{GridConfig, TimeOrder};
use crate::fields::{max_abs, rms};

/// Which transition the next call to [`Integrator::step`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepState {
    /// Next step consumes the initial field and its velocity.
    FirstStep,
    /// Next step consumes the previous and current levels.
    SteadyStep,
}

/// Summary of the level produced by one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub time: f64,
    pub rms: f64,
    pub max_abs: f64,
}

/// Time-level storage and the two-state stepping machine.
///
/// While in [`StepState::FirstStep`] the `prev` buffer holds the initial
/// velocity; afterwards it holds the previous level.
pub struct Integrator {
    state: StepState,
    prev: Vec<f64>,
    curr: Vec<f64>,
    next: Vec<f64>,
    d1: Vec<f64>,
    d2: Vec<f64>,
    d3: Vec<f64>,
    step: usize,
    time: f64,
}

impl Integrator {
    /// Start from an initial field and its time derivative.
    pub fn new(config: &GridConfig, u0: Vec<f64>, v0: Vec<f64>) -> Result<Self, SolverError> {
        Self::with_state(config, StepState::FirstStep, v0, u0, 0)
    }

    /// Resume from two consecutive persisted levels, `prev` at step
    /// `step - 1` and `curr` at `step`.
    pub fn resume(
        config: &GridConfig,
        prev: Vec<f64>,
        curr: Vec<f64>,
        step: usize,
    ) -> Result<Self, SolverError> {
        Self::with_state(config, StepState::SteadyStep, prev, curr, step)
    }

    fn with_state(
        config: &GridConfig,
        state: StepState,
        prev: Vec<f64>,
        curr: Vec<f64>,
        step: usize,
    ) -> Result<Self, SolverError> {
        let len = config.mesh_len();
        for found in [prev.len(), curr.len()] {
            if found != len {
                return Err(SolverError::DimensionMismatch {
                    expected: len,
                    found,
                });
            }
        }
        Ok(Self {
            state,
            prev,
            curr,
            next: alloc_mesh(len)?,
            d1: alloc_mesh(len)?,
            d2: alloc_mesh(len)?,
            d3: alloc_mesh(len)?,
            step,
            time: config.params().t.start + step as f64 * config.dt(),
        })
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// Number of steps taken so far.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// The most recent level.
    pub fn current(&self) -> &[f64] {
        &self.curr
    }

    /// The level before [`current`](Self::current), once one exists.
    pub fn previous(&self) -> Option<&[f64]> {
        match self.state {
            StepState::FirstStep => None,
            StepState::SteadyStep => Some(&self.prev),
        }
    }

    /// Advance one time level.
    pub fn step(&mut self, solver: &mut Solver) -> Result<StepReport, SolverError> {
        solver.check_len(self.curr.len())?;
        let beta2 = solver.config().stability().beta2;

        match self.state {
            StepState::FirstStep => {
                let dt = solver.config().dt();
                for ((n, &u), &v) in self.next.iter_mut().zip(&self.curr).zip(&self.prev) {
                    *n = 2.0 * (u + dt * v);
                }
                solver.apply_c(&self.curr, &mut self.d1)?;
                axpy(beta2, &self.d1, &mut self.next);
                self.apply_corrections(solver)?;
                for n in &mut self.next {
                    *n *= 0.5;
                }
            }
            StepState::SteadyStep => {
                self.next.fill(0.0);
                solver.apply_c(&self.curr, &mut self.d1)?;
                axpy(beta2, &self.d1, &mut self.next);
                self.apply_corrections(solver)?;
                for ((n, &c), &p) in self.next.iter_mut().zip(&self.curr).zip(&self.prev) {
                    *n += 2.0 * c - p;
                }
            }
        }

        // prev <- curr, curr <- next; the old prev becomes scratch.
        std::mem::swap(&mut self.prev, &mut self.curr);
        std::mem::swap(&mut self.curr, &mut self.next);
        self.state = StepState::SteadyStep;
        self.step += 1;
        self.time += solver.config().dt();

        log::trace!("step {} done at t = {:.6}", self.step, self.time);
        Ok(StepReport {
            step: self.step,
            time: self.time,
            rms: rms(&self.curr),
            max_abs: max_abs(&self.curr),
        })
    }

    /// Order-dependent D-operator corrections, added to `next`.
    fn apply_corrections(&mut self, solver: &mut Solver) -> Result<(), SolverError> {
        let s = *solver.config().stability();
        match solver.config().time_order() {
            TimeOrder::First => {}
            TimeOrder::Second => {
                solver.apply_d(&self.d1, &mut self.d2)?;
                solver.apply_d(&self.d2, &mut self.d1)?;
                for ((n, &d2), &d1) in self.next.iter_mut().zip(&self.d2).zip(&self.d1) {
                    *n += -s.beta2 * d2 + s.beta4_12 * d1;
                }
            }
            TimeOrder::Third => {
                solver.apply_d(&self.d1, &mut self.d2)?;
                solver.apply_d(&self.d2, &mut self.d1)?;
                solver.apply_d(&self.d1, &mut self.d3)?;
                for (((n, &d3), &d2), &d1) in self
                    .next
                    .iter_mut()
                    .zip(&self.d3)
                    .zip(&self.d2)
                    .zip(&self.d1)
                {
                    *n += s.beta2 * d3 - s.beta4_12 * d2 + s.beta6_360 * d1;
                }
            }
        }
        Ok(())
    }
}

/// `y += a * x`
fn axpy(a: f64, x: &[f64], y: &mut [f64]) {
    for (y, &x) in y.iter_mut().zip(x) {
        *y += a * x;
    }
}
