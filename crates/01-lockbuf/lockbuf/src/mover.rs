//! Relocation capability used to pay storage out of a locked buffer.
//!
//! Unlock and transfer both hand bytes to the caller through a mover: an
//! injected capability that consumes one handle to the shared storage and
//! produces an independently owned, content-equal [`Region`]. Injecting the
//! mover keeps the buffer testable in isolation and keeps the hand-off
//! mechanism out of the state machine itself.

use std::sync::Arc;

use crate::error::RegionError;
use crate::region::{Region, RegionInit};

/// Moves the bytes behind a storage handle into a caller-owned region.
///
/// Consuming `source` is the detach side effect: the presented handle is
/// gone once relocation completes. Implementations must return a region
/// whose contents equal the source bytes at the time of the call.
pub trait RegionMover: Send {
    fn relocate(&self, source: Arc<Region>) -> Result<Region, RegionError>;
}

/// Default mover: a true move when it holds the last handle, an aligned
/// byte copy otherwise.
///
/// During `transfer` the buffer passes its final handle, so the storage
/// itself moves out without copying. During `unlock` the buffer keeps its
/// own handle alive, so the caller receives a fresh copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct CopyMover;

impl RegionMover for CopyMover {
    fn relocate(&self, source: Arc<Region>) -> Result<Region, RegionError> {
        let shared = match Arc::try_unwrap(source) {
            Ok(region) => return Ok(region),
            Err(shared) => shared,
        };
        let mut fresh =
            Region::new_aligned(shared.len(), shared.alignment(), RegionInit::Uninitialized)?;
        fresh.as_mut_slice().copy_from_slice(shared.as_slice());
        Ok(fresh)
    }
}
