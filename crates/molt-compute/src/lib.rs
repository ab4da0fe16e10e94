//! # MOLT Compute
//!
//! Row-execution abstraction for the MOLT solver. The sweep and transpose
//! stages in `molt-core` are expressed as "one closure per row" and handed to
//! a [`RowExecutor`](backend::RowExecutor), which decides how the rows are
//! scheduled.
//!
//! ## Available executors
//!
//! | Executor | Feature flag | Scheduling |
//! |----------|-------------|------------|
//! | Sequential | always | Plain loop on the calling thread |
//! | Pooled (Rayon) | `pooled` (default) | Fixed-size worker pool |
//!
//! Every executor returns only once all rows of a batch have completed, so a
//! call is also the barrier between two sweep stages.

pub mod backend;
pub mod sequential;

#[cfg(feature = "pooled")]
pub mod pooled;

pub use backend::{BackendType, ComputeError, DeviceInfo, RowExecutor};
pub use sequential::SequentialExecutor;

#[cfg(feature = "pooled")]
pub use pooled::PooledExecutor;
