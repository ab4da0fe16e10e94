//! Single-threaded row executor.

use crate::backend::{
    check_row_pair, check_rows, BackendType, ComputeError, DeviceInfo, OutputRowFn, RowExecutor,
    RowFn,
};

/// Executor that processes rows one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl RowExecutor for SequentialExecutor {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Sequential (1 thread)".into(),
            backend_type: BackendType::Sequential,
            workers: 1,
        }
    }

    fn for_each_row(
        &self,
        src: &[f64],
        dst: &mut [f64],
        row_len: usize,
        row_fn: &RowFn<'_>,
    ) -> Result<(), ComputeError> {
        check_row_pair(src.len(), dst.len(), row_len)?;
        for (row, (s, d)) in src
            .chunks_exact(row_len)
            .zip(dst.chunks_exact_mut(row_len))
            .enumerate()
        {
            row_fn(row, s, d);
        }
        Ok(())
    }

    fn for_each_output_row(
        &self,
        dst: &mut [f64],
        row_len: usize,
        row_fn: &OutputRowFn<'_>,
    ) -> Result<(), ComputeError> {
        check_rows(dst.len(), row_len)?;
        for (row, d) in dst.chunks_exact_mut(row_len).enumerate() {
            row_fn(row, d);
        }
        Ok(())
    }
}
