//! Fake allocator implementation for testing.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use crate::{AllocError, Global, RawAlloc};

/// Internal state for the fake allocator that is shared between clones.
#[derive(Debug, Default)]
struct FakeAllocState {
    allocations: usize,
    deallocations: usize,
    live_bytes: usize,

    /// Number of successful allocations still permitted before the next one fails.
    /// `None` means allocations never fail.
    remaining_before_failure: Option<usize>,
}

/// Instrumented allocator for testing.
///
/// Real memory comes from [`Global`]; the fake only keeps count and, when armed, refuses an
/// allocation. All clones of the same `FakeAlloc` share their counters, so a test can keep one
/// clone for inspection while a container owns another.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeAlloc {
    state: Arc<Mutex<FakeAllocState>>,
}

impl FakeAlloc {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes the allocation after the next `successes` allocations fail.
    ///
    /// `fail_after(0)` fails the very next allocation. The failure is one-shot: once it has
    /// happened, allocations succeed again.
    pub(crate) fn fail_after(&self, successes: usize) {
        self.state
            .lock()
            .expect("FakeAlloc state lock should not be poisoned")
            .remaining_before_failure = Some(successes);
    }

    /// Number of successful allocations so far.
    pub(crate) fn allocations(&self) -> usize {
        self.state
            .lock()
            .expect("FakeAlloc state lock should not be poisoned")
            .allocations
    }

    /// Number of blocks released so far.
    pub(crate) fn deallocations(&self) -> usize {
        self.state
            .lock()
            .expect("FakeAlloc state lock should not be poisoned")
            .deallocations
    }

    /// Total size of the blocks that have been allocated but not yet released.
    pub(crate) fn live_bytes(&self) -> usize {
        self.state
            .lock()
            .expect("FakeAlloc state lock should not be poisoned")
            .live_bytes
    }
}

// SAFETY: We forward to `Global` for the actual memory, so the layout contract holds.
unsafe impl RawAlloc for FakeAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let mut state = self
            .state
            .lock()
            .expect("FakeAlloc state lock should not be poisoned");

        match state.remaining_before_failure {
            Some(0) => {
                state.remaining_before_failure = None;
                return Err(AllocError::Exhausted { layout });
            }
            Some(n) => state.remaining_before_failure = Some(n.wrapping_sub(1)),
            None => {}
        }

        let ptr = Global.allocate(layout)?;

        state.allocations = state.allocations.wrapping_add(1);
        state.live_bytes = state.live_bytes.wrapping_add(layout.size());

        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let mut state = self
            .state
            .lock()
            .expect("FakeAlloc state lock should not be poisoned");

        state.deallocations = state.deallocations.wrapping_add(1);
        state.live_bytes = state
            .live_bytes
            .checked_sub(layout.size())
            .expect("released more bytes than were ever allocated");

        // SAFETY: Forwarding the caller's guarantee; every block we hand out came from `Global`.
        unsafe {
            Global.deallocate(ptr, layout);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn counts_allocations_and_releases() {
        let alloc = FakeAlloc::new();
        let layout = Layout::new::<u64>();

        let ptr = alloc.allocate(layout).unwrap();
        assert_eq!(alloc.allocations(), 1);
        assert_eq!(alloc.live_bytes(), 8);

        // SAFETY: Allocated above with the same layout and not yet released.
        unsafe {
            alloc.deallocate(ptr, layout);
        }

        assert_eq!(alloc.deallocations(), 1);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn fails_once_when_armed() {
        let alloc = FakeAlloc::new();
        let layout = Layout::new::<u32>();

        alloc.fail_after(1);

        let first = alloc.allocate(layout).unwrap();
        assert_eq!(
            alloc.allocate(layout),
            Err(AllocError::Exhausted { layout })
        );
        let third = alloc.allocate(layout).unwrap();

        assert_eq!(alloc.allocations(), 2);

        // SAFETY: Both allocated above with the same layout and not yet released.
        unsafe {
            alloc.deallocate(first, layout);
        }
        // SAFETY: As above.
        unsafe {
            alloc.deallocate(third, layout);
        }
    }

    #[test]
    fn shared_state_between_clones() {
        let alloc1 = FakeAlloc::new();
        let alloc2 = alloc1.clone();
        let layout = Layout::new::<u16>();

        let ptr = alloc2.allocate(layout).unwrap();
        assert_eq!(alloc1.allocations(), 1);

        alloc1.fail_after(0);
        assert!(alloc2.allocate(layout).is_err());

        // SAFETY: Allocated above through a clone of the same allocator.
        unsafe {
            alloc1.deallocate(ptr, layout);
        }
        assert_eq!(alloc2.live_bytes(), 0);
    }
}
