//! Fixed-width character units and the primitives `CharBuffer` builds on.
//!
//! A [`CharUnit`] is one storage slot of a [`CharBuffer`](crate::CharBuffer):
//! a byte, a UTF-16 code unit, a UTF-32 code unit, or a `char`. Each unit type
//! names its terminator and provides the raw length/compare/copy/move/fill
//! operations. The provided methods are element-wise loops; implementations
//! override them where `core` has something faster.

use core::{cmp::Ordering, ffi::CStr, fmt, hash::Hash, ptr};

use bstr::BStr;

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for char {}
}

/// A fixed-width character type storable in a [`CharBuffer`](crate::CharBuffer).
///
/// Implemented for `u8`, `u16`, `u32` and `char` only. The buffer trusts
/// the raw primitives to stay inside the ranges it passes, so the trait is
/// sealed:
///
/// ```compile_fail
/// use core::fmt;
/// use growbuf::CharUnit;
///
/// #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
/// struct Unit(u8);
///
/// impl CharUnit for Unit {
///     const TERMINATOR: Self = Unit(0);
///
///     fn fmt_display(_: &[Self], _: &mut fmt::Formatter<'_>) -> fmt::Result {
///         Ok(())
///     }
///
///     fn fmt_debug(_: &[Self], _: &mut fmt::Formatter<'_>) -> fmt::Result {
///         Ok(())
///     }
/// }
/// ```
pub trait CharUnit: sealed::Sealed + Copy + Ord + Hash + fmt::Debug + 'static {
    /// Value stored one past the last live unit.
    const TERMINATOR: Self;

    /// Count units before the first terminator.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a readable sequence that contains a terminator.
    unsafe fn length(ptr: *const Self) -> usize {
        let mut len = 0;
        // SAFETY: the sequence is terminated, so every read up to and
        // including the terminator is in bounds.
        while unsafe { *ptr.add(len) } != Self::TERMINATOR {
            len += 1;
        }
        len
    }

    /// Lexicographically compare the first `min(a.len(), b.len())` units.
    fn compare(a: &[Self], b: &[Self]) -> Ordering {
        a.iter()
            .zip(b)
            .map(|(x, y)| x.cmp(y))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Copy `n` units from `src` to `dst`.
    ///
    /// # Safety
    ///
    /// Both ranges must be valid for `n` units and must not overlap; overlap
    /// is caught by a debug assertion. Use [`CharUnit::move_units`] when they
    /// may.
    unsafe fn copy(dst: *mut Self, src: *const Self, n: usize) {
        debug_assert!(
            src.wrapping_add(n) <= dst.cast_const() || dst.cast_const().wrapping_add(n) <= src,
            "overlapping ranges passed to CharUnit::copy"
        );
        // SAFETY: forwarded caller contract.
        unsafe { ptr::copy_nonoverlapping(src, dst, n) }
    }

    /// Copy `n` units from `src` to `dst`; the ranges may overlap.
    ///
    /// # Safety
    ///
    /// Both ranges must be valid for `n` units.
    unsafe fn move_units(dst: *mut Self, src: *const Self, n: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { ptr::copy(src, dst, n) }
    }

    /// Write `value` into `n` consecutive slots.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `n` units.
    unsafe fn fill(dst: *mut Self, value: Self, n: usize) {
        for i in 0..n {
            // SAFETY: `i < n`.
            unsafe { dst.add(i).write(value) }
        }
    }

    /// Render `units` as text for `Display`.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors.
    fn fmt_display(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Render `units` as a quoted, escaped literal for `Debug`.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors.
    fn fmt_debug(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl CharUnit for u8 {
    const TERMINATOR: Self = 0;

    unsafe fn length(ptr: *const Self) -> usize {
        // SAFETY: forwarded caller contract; `CStr` scans for the same NUL.
        unsafe { CStr::from_ptr(ptr.cast()) }.count_bytes()
    }

    fn compare(a: &[Self], b: &[Self]) -> Ordering {
        let n = a.len().min(b.len());
        a[..n].cmp(&b[..n])
    }

    unsafe fn fill(dst: *mut Self, value: Self, n: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { ptr::write_bytes(dst, value, n) }
    }

    fn fmt_display(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(BStr::new(units), f)
    }

    fn fmt_debug(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(BStr::new(units), f)
    }
}

impl CharUnit for u16 {
    const TERMINATOR: Self = 0;

    fn fmt_display(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_chars(decode_utf16(units), f)
    }

    fn fmt_debug(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_chars(decode_utf16(units), f)
    }
}

impl CharUnit for u32 {
    const TERMINATOR: Self = 0;

    fn fmt_display(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_chars(decode_utf32(units), f)
    }

    fn fmt_debug(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_chars(decode_utf32(units), f)
    }
}

impl CharUnit for char {
    const TERMINATOR: Self = '\0';

    fn fmt_display(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_chars(units.iter().copied(), f)
    }

    fn fmt_debug(units: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_chars(units.iter().copied(), f)
    }
}

fn decode_utf16(units: &[u16]) -> impl Iterator<Item = char> + '_ {
    char::decode_utf16(units.iter().copied()).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
}

fn decode_utf32(units: &[u32]) -> impl Iterator<Item = char> + '_ {
    units
        .iter()
        .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
}

fn display_chars(chars: impl Iterator<Item = char>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use fmt::Write;

    for c in chars {
        f.write_char(c)?;
    }
    Ok(())
}

fn debug_chars(chars: impl Iterator<Item = char>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use fmt::Write;

    f.write_char('"')?;
    for c in chars {
        for e in c.escape_debug() {
            f.write_char(e)?;
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;

    use rstest::rstest;

    use super::CharUnit;

    #[test]
    fn length_scans_to_terminator() {
        let bytes = b"hello\0world\0";
        let wide = [104u32, 105, 0, 33];
        let chars = ['o', 'k', '\0'];
        unsafe {
            assert_eq!(u8::length(bytes.as_ptr()), 5);
            assert_eq!(u32::length(wide.as_ptr()), 2);
            assert_eq!(char::length(chars.as_ptr()), 2);
        }
    }

    #[rstest]
    #[case(b"abc", b"abd", Ordering::Less)]
    #[case(b"abc", b"abc", Ordering::Equal)]
    #[case(b"b", b"abc", Ordering::Greater)]
    // Only the common prefix takes part.
    #[case(b"ab", b"abc", Ordering::Equal)]
    fn compare_bytes(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: Ordering) {
        assert_eq!(u8::compare(a, b), expected);
        let a16: alloc::vec::Vec<u16> = a.iter().map(|&u| u16::from(u)).collect();
        let b16: alloc::vec::Vec<u16> = b.iter().map(|&u| u16::from(u)).collect();
        assert_eq!(u16::compare(&a16, &b16), expected);
    }

    #[test]
    fn move_handles_overlap_both_ways() {
        let mut units = [1u16, 2, 3, 4, 5, 0];
        let base = units.as_mut_ptr();
        unsafe {
            // Shift right by one.
            u16::move_units(base.add(1), base, 4);
        }
        assert_eq!(units, [1, 1, 2, 3, 4, 0]);
        let base = units.as_mut_ptr();
        unsafe {
            // And back left.
            u16::move_units(base, base.add(1), 4);
        }
        assert_eq!(units, [1, 2, 3, 4, 4, 0]);
    }

    #[test]
    fn fill_and_copy() {
        let mut dst = [0u32; 5];
        unsafe {
            u32::fill(dst.as_mut_ptr(), 7, 3);
            u32::copy(dst.as_mut_ptr().add(3), [8u32, 9].as_ptr(), 2);
        }
        assert_eq!(dst, [7, 7, 7, 8, 9]);

        let mut bytes = [0u8; 4];
        unsafe { u8::fill(bytes.as_mut_ptr(), b'z', 4) };
        assert_eq!(&bytes, b"zzzz");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "overlapping ranges")]
    fn copy_rejects_overlap_in_debug() {
        let mut units = [1u8, 2, 3, 4];
        let base = units.as_mut_ptr();
        unsafe { u8::copy(base.add(1), base, 3) };
    }
}
