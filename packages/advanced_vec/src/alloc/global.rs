use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::{AllocError, RawAlloc};

/// The process-wide allocator registered with `#[global_allocator]` (or the system allocator).
///
/// This is the default allocator of every container in this crate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(
    clippy::exhaustive_structs,
    reason = "unit marker type that callers construct by name"
)]
pub struct Global;

// SAFETY: We forward to the global allocator, which upholds the layout contract for
// non-zero-sized layouts. We are never handed zero-sized layouts (trait contract).
unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized layouts are never allocated");

        // SAFETY: The layout is not zero-sized, which is the only requirement of `alloc()`.
        let ptr = unsafe { alloc::alloc(layout) };

        NonNull::new(ptr).ok_or(AllocError::Exhausted { layout })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarding the caller's guarantee that the block came from `alloc()` with
        // the same layout.
        unsafe {
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}
