//! The capacity rule shared by [`Vector`](crate::Vector) and
//! [`CharBuffer`](crate::CharBuffer).
//!
//! Both buffers ask the same question when they run out of room: given the
//! current capacity `C` and a number `A` of slots that must additionally fit,
//! how large should the next region be? The answer is
//!
//! - `max(C + C/2, C + A)` in the common case, a 1.5× geometric step that
//!   still honors large requests;
//! - `max(A, M)` when nothing has been allocated yet (`M` is the minimum
//!   capacity);
//! - near the top of the addressable range, where `C + C/2` would exceed the
//!   maximum `X`, an additive step: `C + A + M` if that still fits under
//!   `X`, otherwise exactly `C + A`.
//!
//! The geometric step keeps the total number of moved slots over `N` pushes
//! bounded by a constant multiple of `N`.

use crate::error::BufferError;

/// Minimum number of slots in any freshly allocated region.
pub const DEFAULT_MIN_CAPACITY: usize = 16;

/// Compute the capacity of the next region.
///
/// `current` is the capacity of the region being replaced, `additional` the
/// number of slots that must fit beyond it, `minimum` the smallest region the
/// caller ever allocates and `maximum` the largest capacity the element type
/// can have.
///
/// # Errors
///
/// [`BufferError::CapacityOverflow`] if `current + additional` exceeds
/// `maximum` or overflows `usize`.
pub fn grow_capacity(
    current: usize,
    additional: usize,
    minimum: usize,
    maximum: usize,
) -> Result<usize, BufferError> {
    let required = current
        .checked_add(additional)
        .filter(|&required| required <= maximum)
        .ok_or(BufferError::CapacityOverflow)?;

    if current > maximum - current / 2 {
        return Ok(if required > maximum.saturating_sub(minimum) {
            required
        } else {
            required + minimum
        });
    }

    if current == 0 {
        return Ok(additional.max(minimum).min(maximum));
    }

    Ok((current + current / 2).max(required))
}

/// Largest capacity a region of `T` can have.
///
/// Zero-sized types never occupy memory, so every count is representable.
#[must_use]
pub const fn max_capacity<T>() -> usize {
    let size = size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

/// Growth configuration carried by every buffer.
///
/// # Examples
///
/// ```rust
/// use growbuf::{GrowthPolicy, Vector};
///
/// let v: Vector<u8> = Vector::with_options(GrowthPolicy { min_capacity: 4 });
/// assert_eq!(v.capacity(), 4);
/// ```
///
/// # Default
///
/// `min_capacity` defaults to [`DEFAULT_MIN_CAPACITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Number of slots allocated for an empty buffer, and the floor for every
    /// region allocated afterwards.
    ///
    /// # Default
    ///
    /// `16`
    pub min_capacity: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            min_capacity: DEFAULT_MIN_CAPACITY,
        }
    }
}

impl GrowthPolicy {
    /// Next capacity for a region of `T` currently holding `current` slots
    /// that must fit `additional` more.
    ///
    /// # Errors
    ///
    /// [`BufferError::CapacityOverflow`] when the request cannot be
    /// represented.
    pub fn next_capacity<T>(&self, current: usize, additional: usize) -> Result<usize, BufferError> {
        grow_capacity(current, additional, self.min_capacity, max_capacity::<T>())
    }

    /// Capacity for a fresh region that must hold at least `len` slots.
    pub(crate) fn initial_capacity(&self, len: usize) -> usize {
        len.max(self.min_capacity)
    }
}
