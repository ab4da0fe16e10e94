//! Row executor trait and device abstraction.
//!
//! The [`RowExecutor`] trait abstracts over how independent rows of a mesh
//! are processed, so that the numerics in `molt-core` stay identical whether
//! they run on one thread or on a worker pool.

use thiserror::Error;

/// Errors originating from row executors.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Executor not available: {0}")]
    Unavailable(String),

    #[error("Row length must be non-zero")]
    EmptyRow,

    #[error("Buffer of length {len} is not a whole number of rows of length {row_len}")]
    RaggedRows { len: usize, row_len: usize },

    #[error("Source length {src} does not match destination length {dst}")]
    LengthMismatch { src: usize, dst: usize },
}

/// Describes an executor.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub workers: usize,
}

/// The type of row executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Sequential,
    Pooled,
}

/// Per-row kernel reading one source row and writing the matching output row.
///
/// Arguments are `(row_index, src_row, dst_row)`.
pub type RowFn<'a> = dyn Fn(usize, &[f64], &mut [f64]) + Send + Sync + 'a;

/// Per-row kernel that fills one output row from shared, read-only state.
///
/// Arguments are `(row_index, dst_row)`.
pub type OutputRowFn<'a> = dyn Fn(usize, &mut [f64]) + Send + Sync + 'a;

/// Abstraction over row schedulers.
///
/// Rows handed to a single call are mutually independent: each task reads
/// only its own source row (plus shared read-only data captured by the
/// closure) and writes only its own destination row. Implementations must not
/// return before every row has been processed.
pub trait RowExecutor: Send + Sync {
    /// Return information about the executor.
    fn device_info(&self) -> DeviceInfo;

    /// Apply `row_fn` to every row pair of `src` and `dst`.
    ///
    /// This is the unit of work of a directional sweep.
    fn for_each_row(
        &self,
        src: &[f64],
        dst: &mut [f64],
        row_len: usize,
        row_fn: &RowFn<'_>,
    ) -> Result<(), ComputeError>;

    /// Apply `row_fn` to every row of `dst`.
    ///
    /// This is the unit of work of a mesh transpose: each task gathers one
    /// output row from a source buffer captured by the closure.
    fn for_each_output_row(
        &self,
        dst: &mut [f64],
        row_len: usize,
        row_fn: &OutputRowFn<'_>,
    ) -> Result<(), ComputeError>;
}

/// Validate that `len` splits into whole rows of `row_len`.
pub(crate) fn check_rows(len: usize, row_len: usize) -> Result<(), ComputeError> {
    if row_len == 0 {
        return Err(ComputeError::EmptyRow);
    }
    if len % row_len != 0 {
        return Err(ComputeError::RaggedRows { len, row_len });
    }
    Ok(())
}

/// Validate a source/destination pair for [`RowExecutor::for_each_row`].
pub(crate) fn check_row_pair(src: usize, dst: usize, row_len: usize) -> Result<(), ComputeError> {
    if src != dst {
        return Err(ComputeError::LengthMismatch { src, dst });
    }
    check_rows(dst, row_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rows() {
        assert!(check_rows(12, 4).is_ok());
        assert!(matches!(check_rows(12, 0), Err(ComputeError::EmptyRow)));
        assert!(matches!(
            check_rows(13, 4),
            Err(ComputeError::RaggedRows { len: 13, row_len: 4 })
        ));
    }

    #[test]
    fn test_check_row_pair_length_mismatch() {
        assert!(matches!(
            check_row_pair(8, 12, 4),
            Err(ComputeError::LengthMismatch { src: 8, dst: 12 })
        ));
    }
}
