//! Growable buffers sharing one growth discipline.
//!
//! - [`Vector`] is a contiguous array of `T` with positional insert/erase and
//!   amortized constant-time `push_back`.
//! - [`CharBuffer`] is a sequence of fixed-width [`CharUnit`]s that always
//!   keeps a terminator after the last unit.
//!
//! Both pick their next capacity with [`grow_capacity`], allocate through a
//! [`RawAlloc`] and report allocation failure as [`BufferError`] from their
//! `try_` methods. Every buffer owns a heap region from construction on, even
//! when empty.
//!
//! Buffers are single-owner values: mutation needs `&mut`, so the compiler
//! rules out concurrent mutation, and they are `Send`/`Sync` exactly when
//! their contents and allocator are.

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod char_buffer;
mod chars;
mod construct;
mod error;
mod growth;
mod raw;
mod vector;

#[cfg(test)]
mod tests;

pub use char_buffer::{ByteString, CharBuffer, U16String, U32String, WideString};
pub use chars::CharUnit;
pub use error::BufferError;
pub use growth::{DEFAULT_MIN_CAPACITY, GrowthPolicy, grow_capacity, max_capacity};
pub use raw::{Global, RawAlloc};
pub use vector::Vector;

/// Build a [`Vector`] from a list of elements or from `value; count`.
///
/// ```rust
/// # use growbuf::{vector, Vector};
/// let v = vector![1, 2, 3];
/// assert_eq!(v, [1, 2, 3]);
///
/// let zeros: Vector<u8> = vector![0; 4];
/// assert_eq!(zeros.len(), 4);
///
/// let empty: Vector<String> = vector![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Vector::from_elem($elem, $n)
    };
    ( $( $elem:expr ),+ $(,)? ) => {
        $crate::Vector::from_array([$($elem),+])
    };
}
