use std::alloc::Layout;

use thiserror::Error;

/// The raw memory for a container could not be acquired.
///
/// Any operation that reports this error leaves the container exactly as it was before the call.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum AllocError {
    /// The requested number of slots does not fit in the address space of the platform.
    #[error("requested capacity overflows the maximum allocation size")]
    CapacityOverflow,

    /// The allocator was unable to provide a block for the requested layout.
    #[error("memory allocation of {} bytes (align {}) failed", layout.size(), layout.align())]
    Exhausted {
        /// The layout that was passed to the allocator.
        layout: Layout,
    },
}

/// Failure of an operation that both acquires memory and constructs elements.
///
/// The type parameter `E` is the error type returned by the caller-provided element constructor.
/// Whichever variant is returned, every element constructed during the failed call has already
/// been dropped and the container still holds its previous contents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error<E> {
    /// Raw memory could not be acquired.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// The element constructor reported a failure.
    #[error("element construction failed: {0}")]
    Element(E),
}

impl<E> Error<E> {
    /// Returns the element construction error, if that is what this is.
    #[must_use]
    pub fn into_element(self) -> Option<E> {
        match self {
            Self::Element(e) => Some(e),
            Self::Alloc(_) => None,
        }
    }
}

/// A specialized `Result` type for allocating operations, returning [`AllocError`] on failure.
pub(crate) type Result<T> = std::result::Result<T, AllocError>;
