//! `Vector`: a contiguous growable array.
//!
//! A `Vector` owns one region of `capacity` slots; the first `len` hold live
//! values and the rest are uninitialized. When a push or insert finds no
//! spare slot, it allocates a new region sized by the [`GrowthPolicy`],
//! writes the new values into their final position there, moves the prefix
//! and suffix across, and releases the old region. Shrinking operations never
//! reallocate.
//!
//! Every growing operation exists in a `try_` form returning
//! [`BufferError`] and an infallible form that panics on capacity overflow
//! and calls [`handle_alloc_error`](alloc::alloc::handle_alloc_error) when the
//! allocator fails. A failed `try_` call leaves the vector unchanged.
//!
//! Positions obtained before a growing call refer to indices, not addresses;
//! borrows into the old region cannot outlive the `&mut` call that replaces
//! it.

use core::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Bound, Deref, DerefMut, Index, IndexMut, RangeBounds},
    ptr,
    slice::{self, SliceIndex},
};

use log::trace;

use crate::{
    construct::{clone_into, construct, destroy_range, fill_clone},
    error::{BufferError, infallible},
    growth::{GrowthPolicy, max_capacity},
    raw::{Global, RawAlloc, RawRegion},
};

/// A contiguous, heap-backed, growable array.
///
/// # Examples
///
/// ```rust
/// use growbuf::{Vector, vector};
///
/// let mut v: Vector<u32> = Vector::new();
/// assert_eq!(v.capacity(), 16);
/// for i in 0..17 {
///     v.push_back(i);
/// }
/// assert_eq!(v.len(), 17);
/// assert_eq!(v.capacity(), 24);
/// assert_eq!(v[16], 16);
///
/// let mut w = vector!['a', 'b', 'c', 'd', 'e'];
/// w.erase_range(1..3);
/// assert_eq!(w, ['a', 'd', 'e']);
/// ```
pub struct Vector<T, A: RawAlloc = Global> {
    region: RawRegion<T>,
    len: usize,
    policy: GrowthPolicy,
    alloc: A,
    _owns: PhantomData<T>,
}

// SAFETY: the region is uniquely owned, like `Vec<T>`.
unsafe impl<T: Send, A: RawAlloc + Send> Send for Vector<T, A> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for Vector<T, A> {}

impl<T> Vector<T> {
    /// An empty vector with the default minimum capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GrowthPolicy::default())
    }

    /// An empty vector holding `policy.min_capacity` slots.
    #[must_use]
    pub fn with_options(policy: GrowthPolicy) -> Self {
        Self::with_options_in(policy, Global)
    }

    /// An empty vector with room for at least `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        infallible(Self::try_with_capacity_in(capacity, GrowthPolicy::default(), Global))
    }

    /// A vector of `len` default values.
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut v = Self::with_capacity(len);
        v.resize_default(len);
        v
    }

    /// A vector of `len` clones of `value`.
    #[must_use]
    pub fn from_elem(value: T, len: usize) -> Self
    where
        T: Clone,
    {
        let mut v = Self::with_capacity(len);
        v.resize(len, value);
        v
    }

    /// A vector holding clones of `items`.
    #[must_use]
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        infallible(Self::try_from_slice_in(items, GrowthPolicy::default(), Global))
    }

    /// A vector taking ownership of the elements of `items`.
    #[must_use]
    pub fn from_array<const N: usize>(items: [T; N]) -> Self {
        let mut v = Self::with_capacity(N);
        let items = ManuallyDrop::new(items);
        // SAFETY: the region has at least `N` uninitialized slots and `items`
        // is never dropped, so ownership moves bitwise.
        unsafe { ptr::copy_nonoverlapping(items.as_ptr(), v.base(), N) };
        v.len = N;
        v
    }
}

impl<T, A: RawAlloc> Vector<T, A> {
    /// An empty vector using `alloc` for its regions.
    ///
    /// # Errors
    ///
    /// Fails when the initial region cannot be allocated.
    pub fn try_with_options_in(policy: GrowthPolicy, alloc: A) -> Result<Self, BufferError> {
        Self::try_with_capacity_in(0, policy, alloc)
    }

    /// Infallible form of [`Vector::try_with_options_in`].
    #[must_use]
    pub fn with_options_in(policy: GrowthPolicy, alloc: A) -> Self {
        infallible(Self::try_with_options_in(policy, alloc))
    }

    /// An empty vector with room for `max(capacity, policy.min_capacity)`
    /// elements.
    ///
    /// # Errors
    ///
    /// Fails when the region cannot be allocated.
    pub fn try_with_capacity_in(
        capacity: usize,
        policy: GrowthPolicy,
        alloc: A,
    ) -> Result<Self, BufferError> {
        let region: RawRegion<T> = RawRegion::allocate(&alloc, policy.initial_capacity(capacity))?;
        Ok(Self {
            region,
            len: 0,
            policy,
            alloc,
            _owns: PhantomData,
        })
    }

    /// A vector holding clones of `items`, allocated from `alloc`.
    ///
    /// # Errors
    ///
    /// Fails when the region cannot be allocated.
    pub fn try_from_slice_in(items: &[T], policy: GrowthPolicy, alloc: A) -> Result<Self, BufferError>
    where
        T: Clone,
    {
        let mut v = Self::try_with_capacity_in(items.len(), policy, alloc)?;
        // SAFETY: the region has at least `items.len()` free slots.
        unsafe { clone_into(v.base(), items) };
        v.len = items.len();
        Ok(v)
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current region.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Largest capacity a vector of `T` can reach.
    #[must_use]
    pub fn max_len(&self) -> usize {
        max_capacity::<T>()
    }

    /// The growth configuration this vector was built with.
    #[must_use]
    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// The allocator backing this vector.
    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to the first slot. Valid until the next growing call.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.region.as_ptr()
    }

    /// Mutable pointer to the first slot. Valid until the next growing call.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.region.as_ptr()
    }

    /// The live elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.region.ptr().as_ptr(), self.len) }
    }

    /// The live elements, mutably.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are live and we hold `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.region.ptr().as_ptr(), self.len) }
    }

    /// First element, if any.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Last element, if any.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Append `value`, growing by the policy when the region is full.
    ///
    /// # Errors
    ///
    /// On allocation failure `value` is dropped and the vector is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<(), BufferError> {
        if self.len == self.capacity() {
            return self.grow_and_insert(self.len, 1, |gap| {
                // SAFETY: the gap is one uninitialized slot.
                unsafe { construct(gap, value) }
            });
        }
        // SAFETY: `len < capacity`, so the slot is free.
        unsafe { construct(self.base().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Infallible form of [`Vector::try_push_back`].
    pub fn push_back(&mut self, value: T) {
        infallible(self.try_push_back(value));
    }

    /// Remove and return the last element. Never reallocates.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is now outside `len`.
        Some(unsafe { self.base().add(self.len).read() })
    }

    /// Insert `value` at `pos`, shifting later elements right. Returns `pos`.
    ///
    /// # Errors
    ///
    /// On allocation failure `value` is dropped and the vector is unchanged.
    ///
    /// # Panics
    ///
    /// If `pos > len`.
    #[track_caller]
    pub fn try_insert(&mut self, pos: usize, value: T) -> Result<usize, BufferError> {
        self.assert_insert_position(pos);
        if self.len == self.capacity() {
            self.grow_and_insert(pos, 1, |gap| {
                // SAFETY: the gap is one uninitialized slot.
                unsafe { construct(gap, value) }
            })?;
            return Ok(pos);
        }
        // SAFETY: one spare slot exists; the tail moves right by one and the
        // vacated slot at `pos` is written before `len` covers it again.
        unsafe {
            let at = self.base().add(pos);
            ptr::copy(at, at.add(1), self.len - pos);
            construct(at, value);
        }
        self.len += 1;
        Ok(pos)
    }

    /// Infallible form of [`Vector::try_insert`].
    ///
    /// # Panics
    ///
    /// If `pos > len`.
    #[track_caller]
    pub fn insert(&mut self, pos: usize, value: T) -> usize {
        infallible(self.try_insert(pos, value))
    }

    /// Insert `count` clones of `value` at `pos`. Returns `pos`.
    ///
    /// # Errors
    ///
    /// On allocation failure the vector is unchanged.
    ///
    /// # Panics
    ///
    /// If `pos > len`. If a clone panics, the elements from `pos` onwards
    /// are leaked and the vector is truncated to `pos`.
    #[track_caller]
    pub fn try_insert_n(&mut self, pos: usize, count: usize, value: T) -> Result<usize, BufferError>
    where
        T: Clone,
    {
        self.assert_insert_position(pos);
        if count == 0 {
            return Ok(pos);
        }
        if self.capacity() - self.len < count {
            self.grow_and_insert(pos, count, |gap| {
                // SAFETY: the gap is `count` uninitialized slots.
                unsafe { fill_clone(gap, count, &value) }
            })?;
            return Ok(pos);
        }
        let old_len = self.len;
        // Anything past `pos` is in flux until the clones are written.
        self.len = pos;
        // SAFETY: `count` spare slots exist, the tail moves right into them
        // and the gap is filled before `len` covers it.
        unsafe {
            let at = self.base().add(pos);
            ptr::copy(at, at.add(count), old_len - pos);
            fill_clone(at, count, &value);
        }
        self.len = old_len + count;
        Ok(pos)
    }

    /// Infallible form of [`Vector::try_insert_n`].
    ///
    /// # Panics
    ///
    /// If `pos > len`.
    #[track_caller]
    pub fn insert_n(&mut self, pos: usize, count: usize, value: T) -> usize
    where
        T: Clone,
    {
        infallible(self.try_insert_n(pos, count, value))
    }

    /// Remove and return the element at `pos`, shifting later elements left.
    /// Never reallocates.
    ///
    /// # Panics
    ///
    /// If `pos >= len`.
    #[track_caller]
    pub fn erase(&mut self, pos: usize) -> T {
        let len = self.len;
        assert!(pos < len, "erase index (is {pos}) should be < len (is {len})");
        // SAFETY: `pos` is live; after reading it out the tail closes the gap.
        unsafe {
            let at = self.base().add(pos);
            let value = at.read();
            ptr::copy(at.add(1), at, len - pos - 1);
            self.len = len - 1;
            value
        }
    }

    /// Drop the elements in `range` and shift the tail left over them.
    /// Returns the index of the first element after the removed range, which
    /// equals the range start. Never reallocates.
    ///
    /// # Panics
    ///
    /// If the range is inverted or extends past `len`.
    #[track_caller]
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        let len = self.len;
        let (start, end) = bounds(&range, len);
        assert!(start <= end, "erase range starts at {start} but ends at {end}");
        assert!(end <= len, "erase range end (is {end}) should be <= len (is {len})");

        let tail = len - end;
        // A panicking destructor leaks the tail rather than dropping it twice.
        self.len = start;
        // SAFETY: `start..end` is live and dropped exactly once; the tail is
        // then moved down over the freed slots.
        unsafe {
            let base = self.base();
            destroy_range(base.add(start), end - start);
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        start
    }

    /// Drop everything past the first `len` elements.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.erase_range(len..);
        }
    }

    /// Drop every element, keeping the region.
    pub fn clear(&mut self) {
        self.erase_range(..);
    }

    /// Make room for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// On allocation failure the vector is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let spare = self.capacity() - self.len;
        if spare >= additional {
            return Ok(());
        }
        self.reallocate(additional - spare)
    }

    /// Infallible form of [`Vector::try_reserve`].
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Shrink to `new_len` by erasing the tail, or grow by inserting clones of
    /// `value` at the end.
    ///
    /// # Errors
    ///
    /// On allocation failure the vector is unchanged.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), BufferError>
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.try_insert_n(self.len, new_len - self.len, value).map(|_| ())
    }

    /// Infallible form of [`Vector::try_resize`].
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        infallible(self.try_resize(new_len, value));
    }

    /// Shrink to `new_len`, or grow with values produced by `fill`.
    ///
    /// # Errors
    ///
    /// On allocation failure the vector is unchanged.
    pub fn try_resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut fill: F) -> Result<(), BufferError> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        // Sized like `try_insert_n` of the same count, not like `try_reserve`.
        let count = new_len - self.len;
        if self.capacity() - self.len < count {
            self.reallocate(count)?;
        }
        while self.len < new_len {
            // SAFETY: room for `count` was made above, so the slot is free.
            unsafe { construct(self.base().add(self.len), fill()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Infallible form of [`Vector::try_resize_with`].
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, fill: F) {
        infallible(self.try_resize_with(new_len, fill));
    }

    /// Shrink to `new_len`, or grow with default values.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Exchange contents with `other` without moving any element.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Assert the size/capacity invariant.
    ///
    /// # Panics
    ///
    /// If `len > capacity`.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn check_invariants(&self) {
        assert!(
            self.len <= self.capacity(),
            "len {} exceeds capacity {}",
            self.len,
            self.capacity()
        );
    }

    fn base(&self) -> *mut T {
        self.region.as_ptr()
    }

    #[track_caller]
    fn assert_insert_position(&self, pos: usize) {
        let len = self.len;
        assert!(pos <= len, "insertion index (is {pos}) should be <= len (is {len})");
    }

    /// Move into a region grown for `count` more elements, leaving a gap of
    /// `count` slots at `pos` that `write_gap` must fully initialize.
    ///
    /// The old region is only touched once the new region exists and the gap
    /// is written, so an error or a panic in `write_gap` leaves `self` as it
    /// was.
    fn grow_and_insert<F: FnOnce(*mut T)>(
        &mut self,
        pos: usize,
        count: usize,
        write_gap: F,
    ) -> Result<(), BufferError> {
        let old_capacity = self.capacity();
        let new_capacity = self.policy.next_capacity::<T>(old_capacity, count)?;
        let region: RawRegion<T> = RawRegion::allocate(&self.alloc, new_capacity)?;
        trace!(
            "growing Vector<{}>: capacity {old_capacity} -> {new_capacity}, len {} + {count}",
            core::any::type_name::<T>(),
            self.len,
        );

        let guard = ReleaseOnUnwind {
            region: &region,
            alloc: &self.alloc,
        };
        // SAFETY: `pos + count <= new_capacity` since `pos <= len <= capacity`.
        write_gap(unsafe { region.as_ptr().add(pos) });
        mem::forget(guard);

        // SAFETY: the two regions are distinct; every live value moves
        // exactly once and the old region is released without dropping them.
        unsafe {
            let old = self.base();
            let new = region.as_ptr();
            ptr::copy_nonoverlapping(old, new, pos);
            ptr::copy_nonoverlapping(old.add(pos), new.add(pos + count), self.len - pos);
            self.region.release(&self.alloc);
        }
        self.region = region;
        self.len += count;
        Ok(())
    }

    /// Grow so that `additional` more slots fit beyond the current capacity.
    fn reallocate(&mut self, additional: usize) -> Result<(), BufferError> {
        let old_capacity = self.capacity();
        let new_capacity = self.policy.next_capacity::<T>(old_capacity, additional)?;
        let region: RawRegion<T> = RawRegion::allocate(&self.alloc, new_capacity)?;
        trace!(
            "reserving Vector<{}>: capacity {old_capacity} -> {new_capacity}, len {}",
            core::any::type_name::<T>(),
            self.len,
        );
        // SAFETY: see `grow_and_insert`.
        unsafe {
            ptr::copy_nonoverlapping(self.base(), region.as_ptr(), self.len);
            self.region.release(&self.alloc);
        }
        self.region = region;
        Ok(())
    }
}

/// Resolve `range` against a sequence of `len` elements, without checking
/// that the result is in bounds.
#[track_caller]
fn bounds<R: RangeBounds<usize>>(range: &R, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    (start, end)
}

/// Releases a freshly allocated region if filling it panics.
struct ReleaseOnUnwind<'a, T, A: RawAlloc> {
    region: &'a RawRegion<T>,
    alloc: &'a A,
}

impl<T, A: RawAlloc> Drop for ReleaseOnUnwind<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: nothing in the region is live; the gap writer cleans up
        // after itself before unwinding.
        unsafe { self.region.release(self.alloc) }
    }
}

impl<T, A: RawAlloc> Drop for Vector<T, A> {
    fn drop(&mut self) {
        // SAFETY: the first `len` slots are live; nothing is used afterwards.
        unsafe {
            destroy_range(self.base(), self.len);
            self.region.release(&self.alloc);
        }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: RawAlloc + Clone> Clone for Vector<T, A> {
    fn clone(&self) -> Self {
        infallible(Self::try_from_slice_in(self, self.policy, self.alloc.clone()))
    }
}

impl<T, A: RawAlloc> Deref for Vector<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAlloc> DerefMut for Vector<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>, A: RawAlloc> Index<I> for Vector<T, A> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I: SliceIndex<[T]>, A: RawAlloc> IndexMut<I> for Vector<T, A> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: RawAlloc, B: RawAlloc> PartialEq<Vector<T, B>> for Vector<T, A> {
    fn eq(&self, other: &Vector<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: RawAlloc> Eq for Vector<T, A> {}

impl<T: PartialEq, A: RawAlloc> PartialEq<[T]> for Vector<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: RawAlloc> PartialEq<&[T]> for Vector<T, A> {
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq, A: RawAlloc, const N: usize> PartialEq<[T; N]> for Vector<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Hash, A: RawAlloc> Hash for Vector<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: RawAlloc> Extend<T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: RawAlloc> Extend<&'a T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new();
        v.extend(iter);
        v
    }
}

impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(items: &[T]) -> Self {
        Self::from_slice(items)
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(items: [T; N]) -> Self {
        Self::from_array(items)
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a Vector<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut Vector<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String, vec::Vec};
    use core::{cell::Cell, mem};

    use rstest::rstest;

    use super::Vector;
    use crate::{
        construct::tests::Tracked,
        error::BufferError,
        growth::{GrowthPolicy, grow_capacity},
        raw::tests::Budget,
    };

    fn filled(len: usize) -> Vector<u32> {
        (0..len).map(|i| u32::try_from(i).unwrap()).collect()
    }

    #[test]
    fn new_holds_minimum_region() {
        let v: Vector<u64> = Vector::new();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 16);
        assert!(!v.as_ptr().is_null());
        v.check_invariants();
    }

    #[test]
    fn seventeen_pushes_cross_one_boundary() {
        let mut v = Vector::new();
        for i in 0..17 {
            v.push_back(i);
        }
        assert_eq!(v.len(), 17);
        assert_eq!(v.capacity(), 24);
        assert_eq!(v[16], 16);
        assert!(v.iter().copied().eq(0..17));
    }

    #[rstest]
    #[case(4)]
    #[case(16)]
    #[case(24)]
    #[case(36)]
    fn full_push_follows_growth_formula(#[case] capacity: usize) {
        let mut v: Vector<u8> = Vector::with_options(GrowthPolicy { min_capacity: capacity });
        v.resize(capacity, 7);
        assert_eq!(v.capacity(), capacity);
        v.push_back(8);
        let expected = grow_capacity(capacity, 1, capacity, isize::MAX as usize).unwrap();
        assert_eq!(v.capacity(), expected);
        assert_eq!(v.len(), capacity + 1);
        assert_eq!(v.back(), Some(&8));
    }

    #[test]
    fn small_minimum_grows_geometrically() {
        let mut v = Vector::with_options(GrowthPolicy { min_capacity: 4 });
        let mut seen = Vec::new();
        for i in 0..10 {
            v.push_back(i);
            if seen.last() != Some(&v.capacity()) {
                seen.push(v.capacity());
            }
        }
        assert_eq!(seen, [4, 6, 9, 13]);
    }

    #[rstest]
    #[case::front(0)]
    #[case::middle(2)]
    #[case::end(5)]
    fn insert_with_spare_capacity(#[case] pos: usize) {
        let mut v = filled(5);
        let mut model: Vec<u32> = v.iter().copied().collect();
        assert_eq!(v.insert(pos, 99), pos);
        model.insert(pos, 99);
        assert_eq!(v, model.as_slice());
        assert_eq!(v.capacity(), 16);
    }

    #[rstest]
    #[case::front(0)]
    #[case::middle(7)]
    #[case::end(16)]
    fn insert_into_full_region(#[case] pos: usize) {
        let mut v = filled(16);
        let mut model: Vec<u32> = v.iter().copied().collect();
        assert_eq!(v.insert(pos, 99), pos);
        model.insert(pos, 99);
        assert_eq!(v, model.as_slice());
        assert_eq!(v.capacity(), 24);
    }

    #[test]
    fn insert_n_in_place_and_reallocating() {
        let mut v = filled(4);
        assert_eq!(v.insert_n(1, 3, 7), 1);
        assert_eq!(v, [0, 7, 7, 7, 1, 2, 3]);
        assert_eq!(v.capacity(), 16);

        // 7 + 20 does not fit in 16; the request beats the 1.5x step.
        v.insert_n(7, 20, 5);
        assert_eq!(v.len(), 27);
        assert_eq!(v.capacity(), 36);
        assert!(v[7..].iter().all(|&x| x == 5));

        assert_eq!(v.insert_n(3, 0, 1), 3);
        assert_eq!(v.len(), 27);
    }

    #[test]
    #[should_panic(expected = "insertion index (is 6) should be <= len (is 5)")]
    fn insert_past_end_panics() {
        filled(5).insert(6, 0);
    }

    #[test]
    fn erase_returns_the_removed_value() {
        let mut v = filled(5);
        assert_eq!(v.erase(1), 1);
        assert_eq!(v, [0, 2, 3, 4]);
        assert_eq!(v.erase(3), 4);
        assert_eq!(v, [0, 2, 3]);
    }

    #[test]
    fn erase_range_closes_the_gap() {
        let mut v = crate::vector!['a', 'b', 'c', 'd', 'e'];
        assert_eq!(v.erase_range(1..3), 1);
        assert_eq!(v, ['a', 'd', 'e']);
        assert_eq!(v.len(), 3);
        assert_eq!(v.erase_range(1..1), 1);
        assert_eq!(v.erase_range(..=1), 0);
        assert_eq!(v, ['e']);
    }

    #[test]
    #[should_panic(expected = "erase range end (is 6) should be <= len (is 5)")]
    fn erase_range_past_end_panics() {
        filled(5).erase_range(2..6);
    }

    #[test]
    fn pop_back_never_shrinks() {
        let mut v = filled(20);
        let capacity = v.capacity();
        while v.pop_back().is_some() {}
        assert_eq!(v.pop_back(), None);
        assert!(v.is_empty());
        assert_eq!(v.capacity(), capacity);
    }

    #[test]
    fn resize_both_ways() {
        let mut v = filled(3);
        v.resize(6, 9);
        assert_eq!(v, [0, 1, 2, 9, 9, 9]);
        v.resize(2, 0);
        assert_eq!(v, [0, 1]);
        v.resize_default(4);
        assert_eq!(v, [0, 1, 0, 0]);

        let mut n = 10;
        v.resize_with(6, || {
            n += 1;
            n
        });
        assert_eq!(v, [0, 1, 0, 0, 11, 12]);
    }

    // Every way of growing by the same count asks the policy the same
    // question: max(16 * 3 / 2, 16 + 20) for 20 more on len 10, cap 16.
    #[rstest]
    #[case::resize_value(|v: &mut Vector<u32>, n| v.resize(n, 7))]
    #[case::resize_default(|v: &mut Vector<u32>, n| v.resize_default(n))]
    #[case::resize_with(|v: &mut Vector<u32>, n| v.resize_with(n, || 7))]
    #[case::insert_n(|v: &mut Vector<u32>, n| {
        let len = v.len();
        v.insert_n(len, n - len, 7);
    })]
    fn resize_growth_matches_insert_n(#[case] grow: fn(&mut Vector<u32>, usize)) {
        let mut v = filled(10);
        assert_eq!(v.capacity(), 16);
        grow(&mut v, 30);
        assert_eq!(v.len(), 30);
        assert_eq!(v.capacity(), 36);
        assert_eq!(&v[..10], &filled(10)[..]);
        v.check_invariants();

        // Within the spare slots nothing moves.
        let mut w = filled(10);
        grow(&mut w, 16);
        assert_eq!(w.capacity(), 16);
    }

    #[test]
    fn swap_exchanges_regions() {
        let mut a = filled(3);
        let mut b = filled(30);
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        a.swap(&mut b);
        assert_eq!(a.len(), 30);
        assert_eq!(b, [0, 1, 2]);
        assert_eq!(a.as_ptr(), pb);
        assert_eq!(b.as_ptr(), pa);
    }

    #[test]
    fn take_leaves_a_fresh_default() {
        let mut a = filled(40);
        let moved = mem::take(&mut a);
        assert_eq!(moved.len(), 40);
        assert!(a.is_empty());
        assert_eq!(a.capacity(), 16);
    }

    #[test]
    fn clone_is_deep() {
        let mut a: Vector<String> = ["x", "y"].iter().map(|s| String::from(*s)).collect();
        let b = a.clone();
        a[0].push('!');
        assert_eq!(b[0], "x");
        assert_eq!(a[0], "x!");
        assert_eq!(b.capacity(), 16);
        assert_ne!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn with_len_and_from_elem() {
        let v: Vector<u16> = Vector::with_len(20);
        assert_eq!(v.len(), 20);
        assert_eq!(v.capacity(), 20);
        assert!(v.iter().all(|&x| x == 0));

        let w = crate::vector![String::from("ab"); 3];
        assert_eq!(w.len(), 3);
        assert_eq!(w[2], "ab");
    }

    #[test]
    fn reserve_uses_policy() {
        let mut v = filled(10);
        v.reserve(6);
        assert_eq!(v.capacity(), 16);
        v.reserve(7);
        // 16 + 1 needed, 1.5x wins.
        assert_eq!(v.capacity(), 24);
        assert!(v.iter().copied().eq(0..10));
    }

    #[test]
    fn drops_balance_across_mutations() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut v = Vector::new();
            for i in 0..20 {
                v.push_back(Tracked::new(i, &drops));
            }
            v.insert(3, Tracked::new(100, &drops));
            v.insert_n(0, 5, Tracked::new(200, &drops));
            // The prototype passed to `insert_n` is dropped after cloning.
            assert_eq!(drops.get(), 1);
            drop(v.erase(0));
            v.erase_range(2..6);
            assert_eq!(drops.get(), 6);
            v.truncate(10);
            assert_eq!(drops.get(), 6 + 11);
            drop(v.pop_back());
            assert_eq!(drops.get(), 18);
        }
        // 20 pushes + 1 insert + 5 clones + 1 prototype.
        assert_eq!(drops.get(), 27);
    }

    #[test]
    fn failed_growth_leaves_vector_unchanged() {
        let mut v = Vector::with_options_in(GrowthPolicy::default(), Budget::new(1));
        for i in 0..16u32 {
            v.try_push_back(i).unwrap();
        }
        let before = v.as_ptr();
        let err = v.try_push_back(16).unwrap_err();
        assert!(matches!(err, BufferError::AllocFailed { .. }));
        assert_eq!(v.try_insert(0, 99), Err(err));
        assert_eq!(v.try_insert_n(4, 2, 99), Err(err));
        assert_eq!(v.try_reserve(1), Err(err));
        assert_eq!(v.len(), 16);
        assert_eq!(v.capacity(), 16);
        assert_eq!(v.as_ptr(), before);
        assert!(v.iter().copied().eq(0..16));
        v.check_invariants();
    }

    #[test]
    fn panicking_clone_during_growth_keeps_old_contents() {
        let drops = Rc::new(Cell::new(0));
        let mut v = Vector::with_options(GrowthPolicy { min_capacity: 2 });
        v.push_back(Tracked::new(1, &drops));
        v.push_back(Tracked::new(2, &drops));
        let proto = Tracked::with_clone_limit(9, &drops, 1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            v.insert_n(1, 3, proto);
        }));
        assert!(result.is_err());
        // One clone was written and unwound, and the prototype was dropped.
        assert_eq!(drops.get(), 2);
        assert_eq!(v.len(), 2);
        assert_eq!(v.capacity(), 2);
        assert_eq!(v[1].value, 2);
    }

    #[test]
    fn zero_sized_elements() {
        let mut v = Vector::new();
        for _ in 0..100 {
            v.push_back(());
        }
        v.insert(50, ());
        assert_eq!(v.len(), 101);
        assert!(v.capacity() >= 101);
        v.erase_range(..50);
        assert_eq!(v.len(), 51);
    }

    #[test]
    fn capacity_overflow_is_reported() {
        let mut v: Vector<u64> = Vector::new();
        assert_eq!(v.try_reserve(usize::MAX), Err(BufferError::CapacityOverflow));
        assert_eq!(v.capacity(), 16);
    }
}
