//! Shared infrastructure for the tokenweave placeholder engine
//!
//! Two building blocks with no domain knowledge of their own:
//! - [`BoundedCache`]: a fixed-capacity least-recently-used map behind a
//!   single lock, for retaining a bounded working set of recent results
//! - [`WorkerPool`]: a fixed-size thread pool with an unbounded queue whose
//!   task handles are futures; overload is logged, never rejected

pub mod cache;
pub mod error;
pub mod pool;

pub use cache::BoundedCache;
pub use error::{RuntimeError, RuntimeResult};
pub use pool::{PoolConfig, TaskHandle, WorkerPool};
