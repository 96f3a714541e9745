//! Reader/writer bookkeeping over one fixed-size backing region.
//!
//! A [`LockedBuffer`] owns the region and polices access to it through
//! revocable [`SharedView`] tokens: any number of read views, or exactly one
//! write view, never both. A one-way `transfer` hands the storage itself to
//! the caller and leaves the buffer permanently inert. Misuse (double-write,
//! write-while-read, use-after-transfer, wrong-token unlock) fails loudly
//! and mutates nothing.
//!
//! This layer performs no synchronization of its own. It assumes a single
//! logical actor drives a given instance at a time; multi-threaded callers
//! serialize access externally (see the companion sync crate).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{Blocker, LockError, LockResult};
use crate::mover::{CopyMover, RegionMover};
use crate::region::{Region, RegionInit, REGION_ALIGNMENT};
use crate::view::{AccessMode, BufferId, SharedView, ViewId};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(0);

/// Comparable snapshot of the access-control state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    /// No tokens outstanding; acquisition and transfer are both legal.
    Idle,
    /// At least one shared read token outstanding.
    Reading { readers: usize },
    /// The exclusive write token is outstanding.
    Writing,
    /// Storage was handed to a new owner; the buffer is permanently inert.
    Transferred,
}

/// Which outstanding token a successful unlock retires.
enum Retire {
    Writer,
    Reader(usize),
}

/// Owns one fixed-size backing region and polices access to it.
///
/// `read` and `write` issue [`SharedView`] tokens, `unlock` retires the
/// exact token it is given and pays the caller out with a relocated copy of
/// the storage, and `transfer` moves the storage out for good. Every
/// rejected operation returns a [`LockError`] and leaves the state machine
/// untouched.
pub struct LockedBuffer {
    id: BufferId,
    storage: Option<Arc<Region>>,
    readers: SmallVec<[ViewId; 4]>,
    writer: Option<ViewId>,
    transferred: bool,
    next_view: u64,
    mover: Box<dyn RegionMover>,
}

impl LockedBuffer {
    /// Allocates a zero-initialised backing region of `len` bytes, guarded
    /// by the default [`CopyMover`]. The size is immutable thereafter.
    pub fn new(len: usize) -> LockResult<Self> {
        Self::with_mover(len, Box::new(CopyMover))
    }

    /// Same as [`LockedBuffer::new`] with an injected relocation capability.
    pub fn with_mover(len: usize, mover: Box<dyn RegionMover>) -> LockResult<Self> {
        let region = Region::new_aligned(len, REGION_ALIGNMENT, RegionInit::Zeroed)?;
        Ok(Self {
            id: BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)),
            storage: Some(Arc::new(region)),
            readers: SmallVec::new(),
            writer: None,
            transferred: false,
            next_view: 0,
            mover,
        })
    }

    /// Acquires a shared read token over the live storage.
    ///
    /// Any number of read tokens may be outstanding at once. Fails while
    /// the write token is outstanding or after transfer.
    pub fn read(&mut self) -> LockResult<SharedView> {
        if self.transferred {
            return Err(LockError::AlreadyTransferred);
        }
        if self.writer.is_some() {
            return Err(LockError::Acquire {
                mode: AccessMode::Read,
                blocked: Blocker::Writer,
            });
        }
        let view = self.issue(AccessMode::Read)?;
        self.readers.push(view.id());
        Ok(view)
    }

    /// Acquires the exclusive write token.
    ///
    /// Fails while any token is outstanding or after transfer.
    pub fn write(&mut self) -> LockResult<SharedView> {
        if self.transferred {
            return Err(LockError::AlreadyTransferred);
        }
        if self.writer.is_some() {
            return Err(LockError::Acquire {
                mode: AccessMode::Write,
                blocked: Blocker::Writer,
            });
        }
        if !self.readers.is_empty() {
            return Err(LockError::Acquire {
                mode: AccessMode::Write,
                blocked: Blocker::Readers {
                    count: self.readers.len(),
                },
            });
        }
        let view = self.issue(AccessMode::Write)?;
        self.writer = Some(view.id());
        Ok(view)
    }

    /// Retires an outstanding token and pays the caller out with an
    /// independently owned, content-equal copy of the storage.
    ///
    /// The token must be the exact one this buffer issued and still counts
    /// as outstanding; identity is checked, never contents. On success the
    /// view is invalidated in place and the relocated region is returned.
    /// Read- and write-unlock relocate identically.
    pub fn unlock(&mut self, view: &mut SharedView) -> LockResult<Region> {
        if self.transferred {
            return Err(LockError::AlreadyTransferred);
        }
        let id = view.id();
        let retire = if view.buffer() != self.id {
            None
        } else if self.writer == Some(id) {
            Some(Retire::Writer)
        } else {
            self.readers
                .iter()
                .position(|&reader| reader == id)
                .map(Retire::Reader)
        };
        let Some(retire) = retire else {
            return Err(LockError::UnlockMismatch { view: id });
        };

        let relocated = self.relocate_shared()?;
        view.invalidate();
        match retire {
            Retire::Writer => self.writer = None,
            Retire::Reader(index) => {
                self.readers.remove(index);
            }
        }
        Ok(relocated)
    }

    /// Hands the backing storage to the caller and permanently disables the
    /// buffer.
    ///
    /// Legal only with zero outstanding tokens. The buffer then holds the
    /// last storage handle, so the mover moves the bytes out rather than
    /// copying them. Once this returns `Ok`, every later `read`, `write`,
    /// `unlock`, or `transfer` fails; a mover failure also commits the
    /// terminal state, since the storage handle is consumed either way.
    pub fn transfer(&mut self) -> LockResult<Region> {
        if self.transferred {
            return Err(LockError::Transfer {
                blocked: Blocker::Transferred,
            });
        }
        if self.writer.is_some() {
            return Err(LockError::Transfer {
                blocked: Blocker::Writer,
            });
        }
        if !self.readers.is_empty() {
            return Err(LockError::Transfer {
                blocked: Blocker::Readers {
                    count: self.readers.len(),
                },
            });
        }
        let Some(storage) = self.storage.take() else {
            return Err(LockError::AlreadyTransferred);
        };
        self.transferred = true;
        Ok(self.mover.relocate(storage)?)
    }

    /// Whether the storage was handed off. Never fails, never mutates.
    pub fn transferred(&self) -> bool {
        self.transferred
    }

    /// Size of the backing region in bytes, or 0 once transferred.
    pub fn byte_len(&self) -> usize {
        self.storage.as_ref().map_or(0, |region| region.len())
    }

    /// Number of outstanding read tokens.
    pub fn outstanding_readers(&self) -> usize {
        self.readers.len()
    }

    /// Whether the write token is outstanding.
    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// Process-unique identity of this buffer.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Current state of the machine.
    pub fn state(&self) -> LockState {
        if self.transferred {
            LockState::Transferred
        } else if self.writer.is_some() {
            LockState::Writing
        } else if self.readers.is_empty() {
            LockState::Idle
        } else {
            LockState::Reading {
                readers: self.readers.len(),
            }
        }
    }

    fn issue(&mut self, mode: AccessMode) -> LockResult<SharedView> {
        let Some(storage) = &self.storage else {
            return Err(LockError::AlreadyTransferred);
        };
        let shared = Arc::clone(storage);
        let id = ViewId(self.next_view);
        self.next_view += 1;
        Ok(SharedView::issue(shared, self.id, id, mode))
    }

    fn relocate_shared(&self) -> LockResult<Region> {
        let Some(storage) = &self.storage else {
            return Err(LockError::AlreadyTransferred);
        };
        let shared = Arc::clone(storage);
        Ok(self.mover.relocate(shared)?)
    }
}
