//! Backing storage for locked buffers.
//!
//! A [`Region`] is one contiguous, aligned, fixed-size block of bytes with a
//! single owner. Native builds prefer anonymous `mmap` pages and fall back to
//! aligned heap allocations; WebAssembly builds always use the heap. The
//! unsafe surface stays confined to this module.

use std::alloc::{alloc, alloc_zeroed, dealloc, Layout};
use std::ptr::{self, NonNull};

use crate::error::RegionError;

/// Alignment requested for every buffer's backing region.
pub const REGION_ALIGNMENT: usize = 64;

/// Specifies how memory in a [`Region`] should be initialised.
#[derive(Clone, Copy, Debug)]
pub enum RegionInit {
    /// Zero the entire region after allocation.
    Zeroed,
    /// Leave the region uninitialised.
    Uninitialized,
}

#[cfg(not(target_arch = "wasm32"))]
type NativeMap = memmap2::MmapMut;

#[derive(Debug)]
enum Backing {
    #[cfg(not(target_arch = "wasm32"))]
    Native(NativeMap),
    Owned {
        ptr: NonNull<u8>,
        layout: Layout,
    },
}

impl Backing {
    fn as_mut_ptr(&mut self) -> *mut u8 {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Backing::Native(map) => map.as_mut_ptr(),
            Backing::Owned { ptr, .. } => ptr.as_ptr(),
        }
    }

    fn as_ptr(&self) -> *const u8 {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Backing::Native(map) => map.as_ptr(),
            Backing::Owned { ptr, .. } => ptr.as_ptr(),
        }
    }
}

/// Exclusively owned byte storage behind a locked buffer.
#[derive(Debug)]
pub struct Region {
    len: usize,
    alignment: usize,
    backing: Backing,
}

impl Region {
    /// Allocates a new region of `len` bytes aligned to `alignment`.
    ///
    /// Zero-length regions are rejected: every locked buffer owns a real
    /// allocation. On native builds the request is first satisfied via
    /// `mmap`; if the returned pointer is not suitably aligned, allocation
    /// transparently falls back to the heap.
    pub fn new_aligned(len: usize, alignment: usize, init: RegionInit) -> Result<Self, RegionError> {
        if len == 0 {
            return Err(RegionError::InvalidCapacity {
                requested: 0,
                minimum: 1,
            });
        }
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(RegionError::AllocationFailed {
                size: len,
                alignment,
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(backing) = Self::mmap_backed(len, alignment, init)? {
                return Ok(Self {
                    len,
                    alignment,
                    backing,
                });
            }
        }

        Self::heap_backed(len, alignment, init)
    }

    fn heap_backed(len: usize, alignment: usize, init: RegionInit) -> Result<Self, RegionError> {
        let layout =
            Layout::from_size_align(len, alignment).map_err(|_| RegionError::AllocationFailed {
                size: len,
                alignment,
            })?;

        let ptr = unsafe {
            match init {
                RegionInit::Zeroed => alloc_zeroed(layout),
                RegionInit::Uninitialized => alloc(layout),
            }
        };

        let ptr = NonNull::new(ptr).ok_or(RegionError::AllocationFailed {
            size: len,
            alignment,
        })?;
        Ok(Self {
            len,
            alignment,
            backing: Backing::Owned { ptr, layout },
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn mmap_backed(
        len: usize,
        alignment: usize,
        init: RegionInit,
    ) -> Result<Option<Backing>, RegionError> {
        let mut map = memmap2::MmapOptions::new()
            .len(len)
            .map_anon()
            .map_err(|_| RegionError::AllocationFailed {
                size: len,
                alignment,
            })?;

        let ptr = map.as_mut_ptr();
        if ptr as usize % alignment != 0 {
            return Ok(None);
        }

        if matches!(init, RegionInit::Zeroed) {
            unsafe {
                // SAFETY: the anonymous mapping exposes `len` bytes that can be zeroed here.
                ptr::write_bytes(ptr, 0, len)
            };
        }

        Ok(Some(Backing::Native(map)))
    }

    /// Total number of bytes managed by this region.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the region has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the alignment the region was allocated with.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Borrow the region as a const pointer.
    pub fn as_ptr(&self) -> *const u8 {
        self.backing.as_ptr()
    }

    /// Borrow the region as a mut pointer.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.backing.as_mut_ptr()
    }

    /// View the full region as an immutable slice.
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// View the full region as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

// SAFETY: the region exclusively owns its allocation, and shared references
// expose immutable byte access only.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Drop for Region {
    fn drop(&mut self) {
        if let Backing::Owned { ptr, layout } = &self.backing {
            unsafe {
                dealloc(ptr.as_ptr(), *layout);
            }
        }
    }
}
