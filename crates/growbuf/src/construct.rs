//! Constructing and destroying values in place.
//!
//! Moves in Rust are bitwise, so "move-construct" and "move-assign" both
//! collapse to `ptr::copy`; only cloning and dropping run user code. Types
//! without drop glue skip destruction entirely.

use core::{mem, ptr};

/// Write `value` into an uninitialized slot.
///
/// # Safety
///
/// `slot` must be valid for writes and properly aligned. Whatever it held is
/// overwritten without being dropped.
#[inline]
pub(crate) unsafe fn construct<T>(slot: *mut T, value: T) {
    // SAFETY: forwarded caller contract.
    unsafe { slot.write(value) }
}

/// Drop `len` consecutive live values starting at `first`.
///
/// # Safety
///
/// Every slot in `first..first + len` must hold a live value that is not
/// used afterwards.
#[inline]
pub(crate) unsafe fn destroy_range<T>(first: *mut T, len: usize) {
    if mem::needs_drop::<T>() && len != 0 {
        // SAFETY: forwarded caller contract.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, len)) }
    }
}

/// Clone `value` into `count` uninitialized slots starting at `dst`.
///
/// If a clone panics, the copies already written are dropped before the
/// panic continues, so the range is left uninitialized either way.
///
/// # Safety
///
/// `dst..dst + count` must be valid for writes and uninitialized.
pub(crate) unsafe fn fill_clone<T: Clone>(dst: *mut T, count: usize, value: &T) {
    let mut guard = PartialRange { start: dst, len: 0 };
    while guard.len < count {
        // SAFETY: `guard.len < count`, inside the caller's range.
        unsafe { construct(dst.add(guard.len), value.clone()) };
        guard.len += 1;
    }
    mem::forget(guard);
}

/// Clone each element of `src` into consecutive slots starting at `dst`.
///
/// Same unwinding behavior as [`fill_clone`].
///
/// # Safety
///
/// `dst..dst + src.len()` must be valid for writes, uninitialized and
/// disjoint from `src`.
pub(crate) unsafe fn clone_into<T: Clone>(dst: *mut T, src: &[T]) {
    let mut guard = PartialRange { start: dst, len: 0 };
    for item in src {
        // SAFETY: at most `src.len()` writes, inside the caller's range.
        unsafe { construct(dst.add(guard.len), item.clone()) };
        guard.len += 1;
    }
    mem::forget(guard);
}

/// Values constructed so far into a range that is still being filled.
struct PartialRange<T> {
    start: *mut T,
    len: usize,
}

impl<T> Drop for PartialRange<T> {
    fn drop(&mut self) {
        // SAFETY: exactly `len` slots were constructed.
        unsafe { destroy_range(self.start, self.len) }
    }
}
