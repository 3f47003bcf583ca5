//! Generic bounded-concurrency executor.
//!
//! [`TaskPool`] owns no domain knowledge; the broker workers in
//! [`crate::mq`] build their delivery semantics on top of it.

mod pool;

pub use pool::{FnTask, PoolError, Task, TaskPool};
