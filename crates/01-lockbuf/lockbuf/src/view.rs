//! Revocable view tokens over a locked buffer's storage.

use std::fmt;
use std::sync::Arc;

use crate::region::Region;

/// Access mode a view token was issued with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    /// Shared access; any number of read views may be outstanding.
    Read,
    /// Exclusive access; at most one write view may be outstanding.
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// Process-unique identity of a locked buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Per-buffer serial identity of an issued view token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(pub(crate) u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Revocable capability granting byte access to a buffer's backing storage.
///
/// Views are issued only by `read`/`write` on a locked buffer and retired by
/// `unlock` on the same buffer, which invalidates them in place. Identity is
/// carried by the `(buffer, id)` pair, never by storage contents, so a stale
/// or foreign token can never stand in for an outstanding one.
///
/// A view exposes read access only. The writable surface of this system is
/// the relocated [`Region`] a caller receives back from `unlock`/`transfer`.
pub struct SharedView {
    storage: Option<Arc<Region>>,
    buffer: BufferId,
    id: ViewId,
    mode: AccessMode,
}

impl SharedView {
    pub(crate) fn issue(
        storage: Arc<Region>,
        buffer: BufferId,
        id: ViewId,
        mode: AccessMode,
    ) -> Self {
        Self {
            storage: Some(storage),
            buffer,
            id,
            mode,
        }
    }

    fn storage(&self) -> &Arc<Region> {
        match &self.storage {
            Some(region) => region,
            None => panic!("{} no longer references storage", self.id),
        }
    }

    /// Size in bytes of the referenced storage.
    ///
    /// # Panics
    ///
    /// Panics if the view has been invalidated.
    pub fn byte_len(&self) -> usize {
        self.storage().len()
    }

    /// Byte at `index`, or `None` past the end of the storage.
    ///
    /// # Panics
    ///
    /// Panics if the view has been invalidated.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.storage().as_slice().get(index).copied()
    }

    /// The full referenced storage.
    ///
    /// # Panics
    ///
    /// Panics if the view has been invalidated.
    pub fn as_slice(&self) -> &[u8] {
        self.storage().as_slice()
    }

    /// Severs the storage reference. Idempotent.
    ///
    /// The issuing buffer calls this when it processes an `unlock`. Calling
    /// it earlier relinquishes byte access but does not retire the token:
    /// the buffer still counts it as outstanding until unlocked.
    pub fn invalidate(&mut self) {
        self.storage = None;
    }

    /// True while the view still references storage.
    pub fn is_live(&self) -> bool {
        self.storage.is_some()
    }

    /// Capability-discrimination probe. Always false for a plain byte view.
    pub fn is_view(&self) -> bool {
        false
    }

    /// Access mode the view was issued with.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Serial identity of this view within its issuing buffer.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Identity of the buffer that issued this view.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }
}

impl fmt::Debug for SharedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedView")
            .field("buffer", &self.buffer)
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("live", &self.is_live())
            .finish()
    }
}
