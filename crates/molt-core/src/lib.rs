//! # MOLT Core
//!
//! The numerical backbone of the MOLT wave solver. A three-dimensional field
//! is advanced in time with an implicit method-of-lines-transpose scheme:
//! every time step is a handful of directional sweeps, each of which applies
//! an $O(N)$ recursive Green's-function quadrature along every grid line and
//! corrects the result to the Dirichlet boundary data.
//!
//! ## Architecture
//!
//! A [`solver::Solver`] owns the configuration, the per-axis line weights, a
//! preallocated workspace, and an injected
//! [`RowExecutor`](molt_compute::RowExecutor) that schedules per-row work
//! either sequentially or on a worker pool. The
//! [`solver::integrator::Integrator`] holds the time levels and drives the
//! solver's C and D operators.
//!
//! ## Modules
//!
//! - [`types`]: Axes, axis orders and mesh extents.
//! - [`config`]: Grid configuration and stability constants.
//! - [`transpose`]: Mesh transposes between axis orders.
//! - [`solver`]: Line weights, quadrature, sweeps, C/D operators, integrator.
//! - [`fields`]: Seeding, differencing and slicing of meshes.
//! - [`simulation`]: Several field components sharing one solver.

pub mod config;
pub mod fields;
pub mod simulation;
pub mod solver;
pub mod transpose;
pub mod types;

pub use config::{AxisSpec, ConfigError, GridConfig, GridParams, TimeOrder, WeightProfile};
pub use solver::integrator::{Integrator, StepReport, StepState};
pub use solver::{Solver, SolverError};
pub use types::{Axis, AxisOrder, Dims};
