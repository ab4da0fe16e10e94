//! Thread-pool row executor using Rayon.
//!
//! The pool is built once when the executor is created and lives until the
//! executor is dropped. Each call to the executor runs inside
//! [`rayon::ThreadPool::install`], which blocks the caller until every row
//! task has finished; that is the per-stage barrier the sweeps rely on.
//!
//! Rows are handed out as disjoint `chunks_mut` slices of buffers that the
//! solver preallocated, so there is no locking and no per-task allocation.

use rayon::prelude::*;

use crate::backend::{
    check_row_pair, check_rows, BackendType, ComputeError, DeviceInfo, OutputRowFn, RowExecutor,
    RowFn,
};

/// Executor that farms rows out to a fixed-size Rayon pool.
pub struct PooledExecutor {
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl PooledExecutor {
    /// Create a pool with one worker per available core.
    pub fn new() -> Result<Self, ComputeError> {
        Self::with_threads(rayon::current_num_threads())
    }

    /// Create a pool with exactly `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        if num_threads == 0 {
            return Err(ComputeError::Unavailable(
                "a worker pool needs at least one thread".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("molt-row-{i}"))
            .build()
            .map_err(|e| ComputeError::Unavailable(e.to_string()))?;
        log::debug!("row pool started with {num_threads} workers");
        Ok(Self { pool, num_threads })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl RowExecutor for PooledExecutor {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("Pooled ({} threads)", self.num_threads),
            backend_type: BackendType::Pooled,
            workers: self.num_threads,
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
        self.pool.install(|| {
            dst.par_chunks_mut(row_len)
                .zip(src.par_chunks(row_len))
                .enumerate()
                .for_each(|(row, (d, s))| row_fn(row, s, d));
        });
        Ok(())
    }

    fn for_each_output_row(
        &self,
        dst: &mut [f64],
        row_len: usize,
        row_fn: &OutputRowFn<'_>,
    ) -> Result<(), ComputeError> {
        check_rows(dst.len(), row_len)?;
        self.pool.install(|| {
            dst.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(row, d)| row_fn(row, d));
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialExecutor;

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            PooledExecutor::with_threads(0),
            Err(ComputeError::Unavailable(_))
        ));
    }

    #[test]
    fn test_pooled_matches_sequential() {
        let row_len = 17;
        let src: Vec<f64> = (0..row_len * 31).map(|v| (v as f64 * 0.37).sin()).collect();
        let kernel = |row: usize, s: &[f64], d: &mut [f64]| {
            let mut acc = row as f64;
            for (o, i) in d.iter_mut().zip(s) {
                acc = 0.5 * acc + i;
                *o = acc;
            }
        };

        let mut seq = vec![0.0; src.len()];
        SequentialExecutor
            .for_each_row(&src, &mut seq, row_len, &kernel)
            .unwrap();

        let pooled = PooledExecutor::with_threads(4).unwrap();
        let mut par = vec![0.0; src.len()];
        pooled.for_each_row(&src, &mut par, row_len, &kernel).unwrap();

        assert_eq!(seq, par);
        assert_eq!(pooled.device_info().workers, 4);
    }
}
