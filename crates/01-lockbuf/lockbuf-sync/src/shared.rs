use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use lockbuf::{
    AccessMode, LockError, LockResult, LockState, LockedBuffer, Region, RegionMover, SharedView,
};
use parking_lot::Mutex;

/// Mutex-guarded locked buffer with operation metrics.
///
/// The core state machine assumes one actor at a time; this type is that
/// serialization. The mutex is held for the duration of a single core call
/// and nothing else, so handles never deadlock against each other.
pub struct SharedBuffer {
    buffer: Mutex<LockedBuffer>,
    metrics: BufferMetrics,
}

impl SharedBuffer {
    /// Allocates a buffer of `len` bytes behind a mutex.
    pub fn new(len: usize) -> LockResult<Arc<Self>> {
        Ok(Arc::new(Self {
            buffer: Mutex::new(LockedBuffer::new(len)?),
            metrics: BufferMetrics::default(),
        }))
    }

    /// Same as [`SharedBuffer::new`] with an injected relocation capability.
    pub fn with_mover(len: usize, mover: Box<dyn RegionMover>) -> LockResult<Arc<Self>> {
        Ok(Arc::new(Self {
            buffer: Mutex::new(LockedBuffer::with_mover(len, mover)?),
            metrics: BufferMetrics::default(),
        }))
    }

    /// Cheap cloneable accessor to this buffer.
    pub fn handle(self: &Arc<Self>) -> BufferHandle {
        BufferHandle {
            inner: Arc::clone(self),
        }
    }

    /// Point-in-time copy of the operation counters.
    pub fn metrics(&self) -> BufferMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Cloneable handle forwarding operations through the shared mutex.
///
/// Grants and payouts are counted; every rejection is counted and logged at
/// error level, since a rejection in this model is a caller contract
/// violation rather than ordinary contention.
#[derive(Clone)]
pub struct BufferHandle {
    inner: Arc<SharedBuffer>,
}

impl BufferHandle {
    /// Acquires a shared read view.
    pub fn read(&self) -> LockResult<SharedView> {
        let result = self.inner.buffer.lock().read();
        match &result {
            Ok(_) => self.inner.metrics.granted(AccessMode::Read),
            Err(err) => self.reject("read", err),
        }
        result
    }

    /// Acquires the exclusive write view.
    pub fn write(&self) -> LockResult<SharedView> {
        let result = self.inner.buffer.lock().write();
        match &result {
            Ok(_) => self.inner.metrics.granted(AccessMode::Write),
            Err(err) => self.reject("write", err),
        }
        result
    }

    /// Retires an outstanding view and returns the relocated storage copy.
    pub fn unlock(&self, view: &mut SharedView) -> LockResult<Region> {
        let result = self.inner.buffer.lock().unlock(view);
        match &result {
            Ok(_) => self.inner.metrics.released(),
            Err(err) => self.reject("unlock", err),
        }
        result
    }

    /// Moves the storage out and permanently disables the buffer.
    pub fn transfer(&self) -> LockResult<Region> {
        let result = self.inner.buffer.lock().transfer();
        match &result {
            Ok(_) => self.inner.metrics.handed_off(),
            Err(err) => self.reject("transfer", err),
        }
        result
    }

    /// Terminal-flag query.
    pub fn transferred(&self) -> bool {
        self.inner.buffer.lock().transferred()
    }

    /// Size of the backing region in bytes, or 0 once transferred.
    pub fn byte_len(&self) -> usize {
        self.inner.buffer.lock().byte_len()
    }

    /// Snapshot of the state machine.
    pub fn state(&self) -> LockState {
        self.inner.buffer.lock().state()
    }

    /// Point-in-time copy of the operation counters.
    pub fn metrics(&self) -> BufferMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    fn reject(&self, op: &'static str, err: &LockError) {
        self.inner.metrics.rejected();
        tracing::error!("{op} rejected: {err}");
    }
}

#[derive(Default)]
struct BufferMetrics {
    reads_granted: AtomicU32,
    writes_granted: AtomicU32,
    unlocks: AtomicU32,
    transfers: AtomicU32,
    rejections: AtomicU32,
}

impl BufferMetrics {
    fn granted(&self, mode: AccessMode) {
        match mode {
            AccessMode::Read => self.reads_granted.fetch_add(1, Ordering::Relaxed),
            AccessMode::Write => self.writes_granted.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn released(&self) {
        self.unlocks.fetch_add(1, Ordering::Relaxed);
    }

    fn handed_off(&self) {
        self.transfers.fetch_add(1, Ordering::Relaxed);
    }

    fn rejected(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BufferMetricsSnapshot {
        BufferMetricsSnapshot {
            reads_granted: self.reads_granted.load(Ordering::Relaxed),
            writes_granted: self.writes_granted.load(Ordering::Relaxed),
            unlocks: self.unlocks.load(Ordering::Relaxed),
            transfers: self.transfers.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a shared buffer's operation counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BufferMetricsSnapshot {
    pub reads_granted: u32,
    pub writes_granted: u32,
    pub unlocks: u32,
    pub transfers: u32,
    pub rejections: u32,
}
