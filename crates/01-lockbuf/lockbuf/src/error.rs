//! Error surface for the locked-buffer crate.
//!
//! Region allocation keeps a small hand-rolled error enum; everything the
//! access-control state machine rejects is a [`LockError`] naming the
//! operation that failed and what blocked it. Rejections never mutate
//! buffer state, so callers can treat every variant as a contract
//! violation rather than a transient condition.

use std::fmt;

use thiserror::Error;

use crate::view::{AccessMode, ViewId};

/// Convenience result alias for fallible locked-buffer operations.
pub type LockResult<T, E = LockError> = Result<T, E>;

/// Errors surfaced by the backing-region allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
    /// Requested region size is unusable.
    InvalidCapacity { requested: usize, minimum: usize },
    /// Allocation of a backing region failed for the given size/alignment pair.
    AllocationFailed { size: usize, alignment: usize },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionError::InvalidCapacity { requested, minimum } => {
                write!(
                    f,
                    "region capacity {requested} must be at least {minimum} bytes"
                )
            }
            RegionError::AllocationFailed { size, alignment } => {
                write!(
                    f,
                    "failed to allocate backing region of {size} bytes aligned to {alignment}"
                )
            }
        }
    }
}

impl std::error::Error for RegionError {}

/// Names whatever stands in the way of a rejected acquisition or transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocker {
    /// The exclusive write token is outstanding.
    Writer,
    /// One or more shared read tokens are outstanding.
    Readers { count: usize },
    /// The storage was already handed to a new owner.
    Transferred,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::Writer => write!(f, "write view outstanding"),
            Blocker::Readers { count } => write!(f, "{count} read view(s) outstanding"),
            Blocker::Transferred => write!(f, "storage already transferred"),
        }
    }
}

/// Rejections raised by the locked-buffer state machine.
#[derive(Debug, Error)]
pub enum LockError {
    /// `read()` or `write()` called while a conflicting token is outstanding.
    #[error("cannot acquire {mode} view: {blocked}")]
    Acquire { mode: AccessMode, blocked: Blocker },

    /// `unlock()` called with a token that is not currently outstanding on
    /// this buffer.
    #[error("cannot unlock {view}: not an outstanding token of this buffer")]
    UnlockMismatch { view: ViewId },

    /// Acquisition or unlock attempted after the storage was transferred.
    #[error("buffer storage was already transferred to a new owner")]
    AlreadyTransferred,

    /// `transfer()` called while tokens are outstanding, or repeated.
    #[error("cannot transfer storage: {blocked}")]
    Transfer { blocked: Blocker },

    /// Backing-region allocation failed during construction or relocation.
    #[error("region error: {0}")]
    Region(#[from] RegionError),
}
