//! Access-controlled ownership of one fixed-size byte buffer.
//!
//! This crate exposes the foundational pieces of the lockbuf workspace:
//! * [`LockedBuffer`] – reader/writer state machine owning the backing storage.
//! * [`SharedView`] – revocable tokens granting access to the storage.
//! * [`Region`] – aligned, fixed-size byte storage (mmap or heap backed).
//! * [`RegionMover`] / [`CopyMover`] – injectable relocation capability used
//!   to pay storage out on unlock and transfer.
//! * [`LockError`] – the access-legality error taxonomy.
//!
//! The state machine does no blocking and no atomics; callers on multiple
//! threads serialize access externally (the companion `lockbuf-sync` crate
//! provides that as a mutex-guarded shared handle).

mod buffer;
mod error;
mod mover;
mod region;
mod view;

pub use buffer::{LockState, LockedBuffer};
pub use error::{Blocker, LockError, LockResult, RegionError};
pub use mover::{CopyMover, RegionMover};
pub use region::{Region, RegionInit, REGION_ALIGNMENT};
pub use view::{AccessMode, BufferId, SharedView, ViewId};
