//! Raw allocator trait definitions.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::AllocError;

/// Acquires and releases raw, untyped memory blocks.
///
/// An allocator handle is cheap to clone and all clones refer to the same underlying allocator:
/// a block acquired through one clone may be released through any other. Containers clone the
/// handle whenever they need a second block during reallocation.
///
/// Zero-sized layouts are never passed to an allocator; containers handle those without
/// allocating.
///
/// # Safety
///
/// Implementations must return blocks that are valid for reads and writes of `layout.size()`
/// bytes, aligned to `layout.align()`, and that stay valid until passed to
/// [`deallocate()`](Self::deallocate) of the same allocator.
pub unsafe trait RawAlloc: Clone {
    /// Acquires a block of memory fitting `layout`. The contents of the block are uninitialized.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Exhausted`] if the memory cannot be provided.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously returned by [`allocate()`](Self::allocate).
    ///
    /// # Safety
    ///
    /// The caller must ensure that `ptr` was returned by `allocate()` on this allocator (or a
    /// clone of it) with the same `layout`, and that the block has not already been released.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}
