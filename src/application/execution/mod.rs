//! Two-leg execution: coordinator state machine, retries, abort handling,
//! and the concurrency-bounded pool that runs it.

pub mod abort;
pub mod coordinator;
pub mod pool;
pub mod retry;

pub use abort::AbortHandle;
pub use coordinator::{ExecutionCoordinator, ExecutionSettings};
pub use pool::{ExecutionPool, SymbolGuard};
pub use retry::{Backoff, BackoffKind, RetryPolicy};
