//! The MOLT solver: line weights, directional sweeps, composite operators and
//! the time integrator.
//!
//! A [`Solver`] owns everything that is fixed for a run: the validated
//! configuration, the per-axis [`LineWeights`], the injected
//! [`RowExecutor`], and a preallocated [`Workspace`]. Operators borrow the
//! workspace mutably, so two solvers never share scratch memory and nothing
//! is allocated once a run has started.

pub mod greens;
pub mod integrator;
pub mod operators;
pub mod weights;

use std::sync::Arc;

use molt_compute::{ComputeError, DeviceInfo, RowExecutor, SequentialExecutor};
use thiserror::Error;

use crate::config::{ConfigError, GridConfig};
use crate::types::Axis;
use greens::apply_line;
use weights::LineWeights;

/// Errors that can occur while building or running a solver.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to allocate {bytes} bytes of working storage")]
    Allocation { bytes: usize },

    #[error("Mesh has {found} points, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Row executor error: {0}")]
    Compute(#[from] ComputeError),
}

/// Number of mesh-sized buffers held by [`Workspace`].
const WORKSPACE_MESHES: usize = 5;

/// Scratch buffers reused by every operator call.
pub(crate) struct Workspace {
    /// One accumulator per first axis of the C/D chains.
    pub(crate) acc: [Vec<f64>; 3],
    pub(crate) swap: Vec<f64>,
    pub(crate) temp: Vec<f64>,
}

impl Workspace {
    fn new(len: usize) -> Result<Self, SolverError> {
        Ok(Self {
            acc: [alloc_mesh(len)?, alloc_mesh(len)?, alloc_mesh(len)?],
            swap: alloc_mesh(len)?,
            temp: alloc_mesh(len)?,
        })
    }
}

/// Allocate a zeroed mesh, reporting allocation failure instead of aborting.
pub(crate) fn alloc_mesh(len: usize) -> Result<Vec<f64>, SolverError> {
    try_filled(len, 0.0)
}

/// `vec![value; len]` that reports allocation failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, SolverError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| SolverError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, value);
    Ok(buf)
}

/// Sweep solver for one grid configuration.
pub struct Solver {
    config: GridConfig,
    lines: [LineWeights; 3],
    executor: Arc<dyn RowExecutor>,
    workspace: Workspace,
}

impl Solver {
    /// Build the line weights and allocate the working storage.
    pub fn new(config: GridConfig, executor: Arc<dyn RowExecutor>) -> Result<Self, SolverError> {
        let alpha = config.stability().alpha;
        let params = config.params();
        let build = |axis: Axis| {
            LineWeights::build(
                axis.name(),
                config.axis(axis),
                alpha,
                params.scale,
                params.space_order,
                params.weight_profile,
                config.boundary(axis),
            )
        };
        let lines = [build(Axis::X)?, build(Axis::Y)?, build(Axis::Z)?];

        let len = config.mesh_len();
        let workspace = Workspace::new(len)?;
        log::debug!(
            "solver ready: dims {:?}, workspace {} x {} points ({:.1} MiB), executor {}",
            config.dims(),
            WORKSPACE_MESHES,
            len,
            (WORKSPACE_MESHES * std::mem::size_of::<f64>()) as f64 * len as f64 / (1024.0 * 1024.0),
            executor.device_info().name,
        );

        Ok(Self {
            config,
            lines,
            executor,
            workspace,
        })
    }

    /// Solver that processes rows on the calling thread.
    pub fn sequential(config: GridConfig) -> Result<Self, SolverError> {
        Self::new(config, Arc::new(SequentialExecutor))
    }

    /// Solver backed by a fixed pool of `threads` workers.
    #[cfg(feature = "pooled")]
    pub fn pooled(config: GridConfig, threads: usize) -> Result<Self, SolverError> {
        let executor = molt_compute::PooledExecutor::with_threads(threads)?;
        Self::new(config, Arc::new(executor))
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Line data for `axis`.
    pub fn weights(&self, axis: Axis) -> &LineWeights {
        &self.lines[axis.index()]
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.executor.device_info()
    }

    /// Bytes held by the solver's scratch buffers.
    pub fn workspace_bytes(&self) -> usize {
        (WORKSPACE_MESHES * std::mem::size_of::<f64>()).saturating_mul(self.config.mesh_len())
    }

    /// Apply the line operator to every row along `axis`.
    ///
    /// `src` and `dst` must be laid out with `axis` varying fastest (for
    /// instance [`AxisOrder::cyclic_from(axis)`](crate::types::AxisOrder::cyclic_from)),
    /// so that each contiguous run of `dims[axis]` values is one row.
    pub fn sweep(&self, axis: Axis, src: &[f64], dst: &mut [f64]) -> Result<(), SolverError> {
        self.check_len(src.len())?;
        self.check_len(dst.len())?;
        sweep_rows(self.executor.as_ref(), &self.lines[axis.index()], src, dst)
    }

    pub(crate) fn check_len(&self, found: usize) -> Result<(), SolverError> {
        let expected = self.config.mesh_len();
        if found != expected {
            return Err(SolverError::DimensionMismatch { expected, found });
        }
        Ok(())
    }
}

/// Row-sweep driver: one independent task per row.
pub(crate) fn sweep_rows(
    executor: &dyn RowExecutor,
    line: &LineWeights,
    src: &[f64],
    dst: &mut [f64],
) -> Result<(), SolverError> {
    executor.for_each_row(src, dst, line.points_inclusive(), &|_, s, d| {
        apply_line(s, d, line)
    })?;
    Ok(())
}
