//! `CharBuffer`: a terminated, growable sequence of fixed-width units.
//!
//! The region always has one slot more than the live units, and that slot
//! holds [`CharUnit::TERMINATOR`], so [`CharBuffer::as_ptr`] can be handed to
//! anything that scans for a terminator. Appends reallocate when
//! `len + count >= capacity`, which keeps the terminator slot reserved.

use core::{
    cmp::Ordering,
    ffi::CStr,
    fmt,
    hash::{Hash, Hasher},
    mem,
    ops::{Index, IndexMut},
    slice,
};

use log::trace;

use crate::{
    chars::CharUnit,
    error::{BufferError, infallible},
    growth::{GrowthPolicy, max_capacity},
    raw::{Global, RawAlloc, RawRegion},
};

/// Bytes, terminated by NUL.
pub type ByteString<A = Global> = CharBuffer<u8, A>;
/// UTF-16 code units, terminated by `0`.
pub type U16String<A = Global> = CharBuffer<u16, A>;
/// UTF-32 code units, terminated by `0`.
pub type U32String<A = Global> = CharBuffer<u32, A>;
/// Unicode scalar values, terminated by `'\0'`.
pub type WideString<A = Global> = CharBuffer<char, A>;

/// A growable sequence of `C` followed by a terminator.
///
/// # Examples
///
/// ```rust
/// use growbuf::ByteString;
///
/// let mut s = ByteString::from("hello");
/// assert_eq!(s.len(), 5);
/// assert_eq!(s.capacity(), 16);
/// assert_eq!(s[5], 0);
///
/// s.append(b", world");
/// s.append_fill(3, b'!');
/// assert_eq!(s.as_units(), b"hello, world!!!");
/// assert_eq!(s.to_string(), "hello, world!!!");
/// ```
pub struct CharBuffer<C: CharUnit, A: RawAlloc = Global> {
    region: RawRegion<C>,
    len: usize,
    policy: GrowthPolicy,
    alloc: A,
}

// SAFETY: the region is uniquely owned and units are plain data.
unsafe impl<C: CharUnit + Send, A: RawAlloc + Send> Send for CharBuffer<C, A> {}
// SAFETY: shared access only hands out `&C`.
unsafe impl<C: CharUnit + Sync, A: RawAlloc + Sync> Sync for CharBuffer<C, A> {}

impl<C: CharUnit> CharBuffer<C> {
    /// An empty buffer with the default minimum capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GrowthPolicy::default())
    }

    /// An empty buffer holding `max(policy.min_capacity, 1)` slots.
    #[must_use]
    pub fn with_options(policy: GrowthPolicy) -> Self {
        Self::with_options_in(policy, Global)
    }

    /// A buffer holding a copy of `units`.
    #[must_use]
    pub fn from_units(units: &[C]) -> Self {
        infallible(Self::try_from_units_in(units, GrowthPolicy::default(), Global))
    }

    /// A buffer holding a copy of the terminated sequence at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a readable sequence of `C` containing a
    /// terminator.
    #[must_use]
    pub unsafe fn from_raw_terminated(ptr: *const C) -> Self {
        // SAFETY: forwarded caller contract.
        let len = unsafe { C::length(ptr) };
        // SAFETY: the `len` units before the terminator are readable.
        Self::from_units(unsafe { slice::from_raw_parts(ptr, len) })
    }
}

impl<C: CharUnit, A: RawAlloc> CharBuffer<C, A> {
    /// An empty buffer using `alloc` for its regions.
    ///
    /// # Errors
    ///
    /// Fails when the initial region cannot be allocated.
    pub fn try_with_options_in(policy: GrowthPolicy, alloc: A) -> Result<Self, BufferError> {
        Self::try_from_units_in(&[], policy, alloc)
    }

    /// Infallible form of [`CharBuffer::try_with_options_in`].
    #[must_use]
    pub fn with_options_in(policy: GrowthPolicy, alloc: A) -> Self {
        infallible(Self::try_with_options_in(policy, alloc))
    }

    /// A buffer holding a copy of `units` in a region of
    /// `max(units.len() + 1, policy.min_capacity)` slots.
    ///
    /// # Errors
    ///
    /// Fails when the region cannot be allocated.
    pub fn try_from_units_in(units: &[C], policy: GrowthPolicy, alloc: A) -> Result<Self, BufferError> {
        let slots = units.len().checked_add(1).ok_or(BufferError::CapacityOverflow)?;
        let region: RawRegion<C> = RawRegion::allocate(&alloc, policy.initial_capacity(slots))?;
        // SAFETY: the fresh region has room for `units` and the terminator.
        unsafe { C::copy(region.as_ptr(), units.as_ptr(), units.len()) };
        let mut buffer = Self {
            region,
            len: units.len(),
            policy,
            alloc,
        };
        buffer.place_terminator();
        Ok(buffer)
    }

    /// Number of live units, not counting the terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current region, terminator slot included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Largest length a buffer of `C` can reach.
    #[must_use]
    pub fn max_len(&self) -> usize {
        max_capacity::<C>() - 1
    }

    /// The growth configuration this buffer was built with.
    #[must_use]
    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// The live units.
    #[must_use]
    pub fn as_units(&self) -> &[C] {
        // SAFETY: the first `len` slots are live.
        unsafe { slice::from_raw_parts(self.region.as_ptr(), self.len) }
    }

    /// The live units followed by the terminator.
    #[must_use]
    pub fn as_units_with_terminator(&self) -> &[C] {
        // SAFETY: slot `len` always holds the terminator.
        unsafe { slice::from_raw_parts(self.region.as_ptr(), self.len + 1) }
    }

    /// Pointer to a terminated sequence. Valid until the next growing call.
    #[must_use]
    pub fn as_ptr(&self) -> *const C {
        self.region.as_ptr()
    }

    /// First unit, if any.
    #[must_use]
    pub fn front(&self) -> Option<C> {
        self.as_units().first().copied()
    }

    /// Last unit, if any.
    #[must_use]
    pub fn back(&self) -> Option<C> {
        self.as_units().last().copied()
    }

    /// Iterate over the live units.
    pub fn iter(&self) -> slice::Iter<'_, C> {
        self.as_units().iter()
    }

    /// Append `count` copies of `unit`.
    ///
    /// # Errors
    ///
    /// On allocation failure the buffer is unchanged.
    pub fn try_append_fill(&mut self, count: usize, unit: C) -> Result<(), BufferError> {
        self.make_room(count)?;
        // SAFETY: `make_room` guarantees `len + count < capacity`.
        unsafe { C::fill(self.base().add(self.len), unit, count) };
        self.len += count;
        self.place_terminator();
        Ok(())
    }

    /// Infallible form of [`CharBuffer::try_append_fill`].
    pub fn append_fill(&mut self, count: usize, unit: C) {
        infallible(self.try_append_fill(count, unit));
    }

    /// Append a copy of `units`.
    ///
    /// # Errors
    ///
    /// On allocation failure the buffer is unchanged.
    pub fn try_append(&mut self, units: &[C]) -> Result<(), BufferError> {
        let count = units.len();
        self.make_room(count)?;
        // SAFETY: room was made above, and `units` is a shared borrow that
        // cannot alias the region we hold mutably.
        unsafe { C::copy(self.base().add(self.len), units.as_ptr(), count) };
        self.len += count;
        self.place_terminator();
        Ok(())
    }

    /// Infallible form of [`CharBuffer::try_append`].
    pub fn append(&mut self, units: &[C]) {
        infallible(self.try_append(units));
    }

    /// Append the terminated sequence at `ptr`, without its terminator.
    ///
    /// # Errors
    ///
    /// On allocation failure the buffer is unchanged.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a readable sequence of `C` containing a
    /// terminator.
    pub unsafe fn try_append_raw_terminated(&mut self, ptr: *const C) -> Result<(), BufferError> {
        // SAFETY: forwarded caller contract.
        let len = unsafe { C::length(ptr) };
        // SAFETY: the `len` units before the terminator are readable, and the
        // caller's sequence cannot be our region while we hold `&mut self`.
        self.try_append(unsafe { slice::from_raw_parts(ptr, len) })
    }

    /// Infallible form of [`CharBuffer::try_append_raw_terminated`].
    ///
    /// # Safety
    ///
    /// Same contract as [`CharBuffer::try_append_raw_terminated`].
    pub unsafe fn append_raw_terminated(&mut self, ptr: *const C) {
        // SAFETY: forwarded caller contract.
        infallible(unsafe { self.try_append_raw_terminated(ptr) });
    }

    /// Append one unit.
    ///
    /// # Errors
    ///
    /// On allocation failure the buffer is unchanged.
    pub fn try_push(&mut self, unit: C) -> Result<(), BufferError> {
        self.try_append_fill(1, unit)
    }

    /// Infallible form of [`CharBuffer::try_push`].
    pub fn push(&mut self, unit: C) {
        infallible(self.try_push(unit));
    }

    /// Make room for `additional` more units, terminator included.
    ///
    /// # Errors
    ///
    /// On allocation failure the buffer is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        self.make_room(additional)?;
        self.place_terminator();
        Ok(())
    }

    /// Infallible form of [`CharBuffer::try_reserve`].
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Drop every unit, keeping the region.
    pub fn clear(&mut self) {
        self.len = 0;
        self.place_terminator();
    }

    /// Exchange contents with `other` without copying any unit.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Assert the length/capacity/terminator invariant.
    ///
    /// # Panics
    ///
    /// If `len >= capacity` or slot `len` does not hold the terminator.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn check_invariants(&self) {
        assert!(
            self.len < self.capacity(),
            "len {} leaves no terminator slot in capacity {}",
            self.len,
            self.capacity()
        );
        assert_eq!(self[self.len], C::TERMINATOR, "terminator missing at {}", self.len);
    }

    fn base(&self) -> *mut C {
        self.region.as_ptr()
    }

    fn place_terminator(&mut self) {
        // SAFETY: `len < capacity` holds outside of mutating calls.
        unsafe { self.base().add(self.len).write(C::TERMINATOR) }
    }

    /// Reallocate if `count` more units would reach the terminator slot.
    fn make_room(&mut self, count: usize) -> Result<(), BufferError> {
        let needed = self.len.checked_add(count).ok_or(BufferError::CapacityOverflow)?;
        if needed >= self.capacity() {
            self.reallocate(count)?;
        }
        Ok(())
    }

    /// Move the live units into a region grown for `additional` slots. The
    /// terminator is left for the caller to place.
    fn reallocate(&mut self, additional: usize) -> Result<(), BufferError> {
        let old_capacity = self.capacity();
        let new_capacity = self.policy.next_capacity::<C>(old_capacity, additional)?;
        let region: RawRegion<C> = RawRegion::allocate(&self.alloc, new_capacity)?;
        trace!(
            "growing CharBuffer<{}>: capacity {old_capacity} -> {new_capacity}, len {}",
            core::any::type_name::<C>(),
            self.len,
        );
        // SAFETY: both regions hold at least `len` units; units are `Copy`
        // so the old region can be released without destroying anything.
        unsafe {
            C::move_units(region.as_ptr(), self.base(), self.len);
            self.region.release(&self.alloc);
        }
        self.region = region;
        Ok(())
    }
}

impl<C: CharUnit, A: RawAlloc> Drop for CharBuffer<C, A> {
    fn drop(&mut self) {
        // SAFETY: units need no destruction; the region is not used again.
        unsafe { self.region.release(&self.alloc) }
    }
}

impl<C: CharUnit> Default for CharBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CharUnit, A: RawAlloc + Clone> Clone for CharBuffer<C, A> {
    fn clone(&self) -> Self {
        infallible(Self::try_from_units_in(self.as_units(), self.policy, self.alloc.clone()))
    }
}

/// Reading index `len` yields the terminator.
impl<C: CharUnit, A: RawAlloc> Index<usize> for CharBuffer<C, A> {
    type Output = C;

    #[track_caller]
    fn index(&self, index: usize) -> &C {
        let len = self.len;
        assert!(index <= len, "index (is {index}) should be <= len (is {len})");
        &self.as_units_with_terminator()[index]
    }
}

/// Only live units are writable; the terminator slot is not.
impl<C: CharUnit, A: RawAlloc> IndexMut<usize> for CharBuffer<C, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut C {
        let len = self.len;
        assert!(index < len, "index (is {index}) should be < len (is {len})");
        // SAFETY: `index < len`, a live slot, and we hold `&mut self`.
        unsafe { &mut *self.base().add(index) }
    }
}

impl<C: CharUnit, A: RawAlloc> fmt::Debug for CharBuffer<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        C::fmt_debug(self.as_units(), f)
    }
}

impl<C: CharUnit, A: RawAlloc> fmt::Display for CharBuffer<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        C::fmt_display(self.as_units(), f)
    }
}

impl<C: CharUnit, A: RawAlloc, B: RawAlloc> PartialEq<CharBuffer<C, B>> for CharBuffer<C, A> {
    fn eq(&self, other: &CharBuffer<C, B>) -> bool {
        self.len == other.len && C::compare(self.as_units(), other.as_units()).is_eq()
    }
}

impl<C: CharUnit, A: RawAlloc> Eq for CharBuffer<C, A> {}

impl<C: CharUnit, A: RawAlloc> PartialEq<[C]> for CharBuffer<C, A> {
    fn eq(&self, other: &[C]) -> bool {
        self.len == other.len() && C::compare(self.as_units(), other).is_eq()
    }
}

impl<A: RawAlloc> PartialEq<str> for CharBuffer<u8, A> {
    fn eq(&self, other: &str) -> bool {
        self == other.as_bytes()
    }
}

impl<A: RawAlloc> PartialEq<&str> for CharBuffer<u8, A> {
    fn eq(&self, other: &&str) -> bool {
        self == other.as_bytes()
    }
}

impl<C: CharUnit, A: RawAlloc> PartialOrd for CharBuffer<C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic: the common prefix decides, then the shorter buffer sorts
/// first.
impl<C: CharUnit, A: RawAlloc> Ord for CharBuffer<C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        C::compare(self.as_units(), other.as_units()).then(self.len.cmp(&other.len))
    }
}

impl<C: CharUnit, A: RawAlloc> Hash for CharBuffer<C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_units().hash(state);
    }
}

impl<C: CharUnit, A: RawAlloc> Extend<C> for CharBuffer<C, A> {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for unit in iter {
            self.push(unit);
        }
    }
}

impl<'a, C: CharUnit, A: RawAlloc> Extend<&'a C> for CharBuffer<C, A> {
    fn extend<I: IntoIterator<Item = &'a C>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<C: CharUnit> FromIterator<C> for CharBuffer<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

impl<'a, C: CharUnit, A: RawAlloc> IntoIterator for &'a CharBuffer<C, A> {
    type Item = &'a C;
    type IntoIter = slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<C: CharUnit> From<&[C]> for CharBuffer<C> {
    fn from(units: &[C]) -> Self {
        Self::from_units(units)
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self::from_units(s.as_bytes())
    }
}

impl From<&CStr> for ByteString {
    fn from(s: &CStr) -> Self {
        // SAFETY: a `CStr` is NUL-terminated.
        unsafe { Self::from_raw_terminated(s.as_ptr().cast()) }
    }
}

impl From<&str> for U16String {
    fn from(s: &str) -> Self {
        s.encode_utf16().collect()
    }
}

impl From<&str> for U32String {
    fn from(s: &str) -> Self {
        s.chars().map(u32::from).collect()
    }
}

impl From<&str> for WideString {
    fn from(s: &str) -> Self {
        s.chars().collect()
    }
}
