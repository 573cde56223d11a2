use core::alloc::Layout;

use thiserror::Error;

/// Why a growing operation could not obtain the storage it needed.
///
/// Every `try_` method on [`Vector`](crate::Vector) and
/// [`CharBuffer`](crate::CharBuffer) reports one of these instead of
/// touching the existing region, so the buffer is unchanged after an `Err`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The requested capacity does not fit in the largest region a `Layout`
    /// can describe for the element type.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator returned no memory for the given layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocFailed {
        /// The layout that was requested.
        layout: Layout,
    },
}

impl BufferError {
    /// Turn an error from a `try_` method into the behavior of its
    /// infallible counterpart: panic on overflow, abort through the global
    /// allocation error handler on allocator failure.
    #[cold]
    #[track_caller]
    pub(crate) fn raise(self) -> ! {
        match self {
            BufferError::CapacityOverflow => panic!("capacity overflow"),
            BufferError::AllocFailed { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}

/// Unwrap the result of a `try_` method, escalating failures via
/// [`BufferError::raise`].
#[inline]
#[track_caller]
pub(crate) fn infallible<T>(result: Result<T, BufferError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => err.raise(),
    }
}
