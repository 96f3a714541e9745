//! Serialized shared access to a locked buffer.
//!
//! The core crate's state machine performs no synchronization of its own;
//! this crate supplies it for multi-threaded callers: a mutex-guarded
//! [`SharedBuffer`] with cheap cloneable [`BufferHandle`]s, operation
//! counters, and error-level logging of contract violations.

mod shared;

pub use shared::{BufferHandle, BufferMetricsSnapshot, SharedBuffer};
