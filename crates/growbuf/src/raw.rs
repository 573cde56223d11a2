//! Raw allocation: uninitialized regions of `n` slots.
//!
//! [`RawAlloc`] is the seam between the buffers and the platform allocator.
//! [`RawRegion`] is the typed view the buffers hold: a start pointer and a
//! slot count, nothing about which slots are live.

use alloc::alloc as global;
use core::{alloc::Layout, ptr::NonNull};

use log::{debug, trace};

use crate::error::BufferError;

/// Source of untyped memory for buffer regions.
///
/// # Safety
///
/// A pointer returned by `allocate(layout)` must be valid for reads and
/// writes of `layout.size()` bytes, aligned to `layout.align()`, and stay
/// valid until passed to `deallocate` with the same layout. Implementations
/// are never called with a zero-sized layout.
pub unsafe trait RawAlloc {
    /// Obtain a region for `layout`.
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocFailed`] when no memory is available.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, BufferError>;

    /// Release a region.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same
    /// `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global allocator registered with `#[global_allocator]`, or the
/// system allocator by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: forwards to `alloc::alloc`, which upholds the contract for
// non-zero-sized layouts.
unsafe impl RawAlloc for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, BufferError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: callers never pass a zero-sized layout.
        let ptr = unsafe { global::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| {
            debug!("allocation of {} bytes failed", layout.size());
            BufferError::AllocFailed { layout }
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { global::dealloc(ptr.as_ptr(), layout) }
    }
}

/// An owned region of `capacity` uninitialized slots of `T`.
///
/// The region does not know which slots are live and does not release
/// itself on drop; the owning buffer calls [`RawRegion::release`] once it has
/// destroyed the live values.
#[derive(Debug)]
pub(crate) struct RawRegion<T> {
    ptr: NonNull<T>,
    capacity: usize,
}

impl<T> RawRegion<T> {
    /// Allocate room for `capacity` slots.
    ///
    /// Zero-sized requests (no slots, or a zero-sized `T`) get a dangling,
    /// well-aligned pointer and never reach the allocator.
    pub(crate) fn allocate<A: RawAlloc>(alloc: &A, capacity: usize) -> Result<Self, BufferError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| BufferError::CapacityOverflow)?;
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            alloc.allocate(layout)?.cast()
        };
        trace!(
            "allocated region of {capacity} x {} ({} bytes)",
            core::any::type_name::<T>(),
            layout.size()
        );
        Ok(Self { ptr, capacity })
    }

    pub(crate) fn ptr(&self) -> NonNull<T> {
        self.ptr
    }

    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Give the memory back to `alloc`.
    ///
    /// # Safety
    ///
    /// The region must have been allocated by `alloc`, every live value in
    /// it must already be destroyed or moved out, and `self` must not be used
    /// afterwards.
    pub(crate) unsafe fn release<A: RawAlloc>(&self, alloc: &A) {
        // Layout was valid when the region was allocated.
        let Ok(layout) = Layout::array::<T>(self.capacity) else {
            return;
        };
        if layout.size() != 0 {
            // SAFETY: forwarded caller contract.
            unsafe { alloc.deallocate(self.ptr.cast(), layout) }
        }
    }
}
