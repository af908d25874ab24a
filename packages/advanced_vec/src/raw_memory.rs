use std::alloc::Layout;
use std::any::type_name;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::error::Result;
use crate::{AllocError, Global, RawAlloc};

/// Owner of one raw memory block with room for a fixed number of `T` slots.
///
/// `RawMemory` knows how large its block is but nothing about what lives in it: it never
/// constructs, reads or drops a `T`. Tracking which slots hold live values is the job of the
/// container built on top (see [`Vector`][crate::Vector]), which must drop any live values
/// before the `RawMemory` itself is dropped.
///
/// Dropping a `RawMemory` releases the block back to its allocator.
///
/// # Not cloneable
///
/// Copying uninitialized bytes has no meaning at the element level, so a `RawMemory` can only
/// change hands by being moved or [swapped](Self::swap).
///
/// # Zero-sized types
///
/// For zero-sized `T` no memory is ever requested from the allocator, yet the requested capacity
/// is still recorded and reported.
///
/// # Examples
///
/// ```
/// use advanced_vec::RawMemory;
///
/// let memory = RawMemory::<u32>::with_capacity(4).unwrap();
/// assert_eq!(memory.capacity(), 4);
///
/// // The slots are raw memory; writing into them is up to the caller.
/// // SAFETY: Slot 0 is within capacity and u32 needs no drop.
/// unsafe { memory.address(0).write(42) };
///
/// // SAFETY: We just initialized slot 0.
/// assert_eq!(unsafe { memory.address(0).read() }, 42);
/// ```
#[derive(Debug)]
pub struct RawMemory<T, A: RawAlloc = Global> {
    /// First slot of the block. `None` if and only if the capacity is zero.
    slots: Option<NonNull<T>>,

    /// Number of addressable slots, none of which are necessarily live.
    capacity: usize,

    alloc: A,

    _owns: PhantomData<T>,
}

impl<T> RawMemory<T> {
    /// Creates an owner without a block. Does not allocate.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Acquires a block with room for `capacity` slots from the global allocator.
    ///
    /// A capacity of zero does not allocate.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the size of the block overflows or the allocator refuses.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, A: RawAlloc> RawMemory<T, A> {
    /// Creates an owner without a block that will use `alloc` once it needs one.
    #[must_use]
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            slots: None,
            capacity: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    /// Acquires a block with room for `capacity` slots from `alloc`.
    ///
    /// A capacity of zero does not allocate.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the size of the block overflows or the allocator refuses.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new_in(alloc));
        }

        let layout = Self::layout(capacity)?;

        let slots = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            alloc.allocate(layout)?.cast::<T>()
        };

        Ok(Self {
            slots: Some(slots),
            capacity,
            alloc,
            _owns: PhantomData,
        })
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_overflow| AllocError::CapacityOverflow)
    }

    /// Number of slots in the block.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a block is currently owned. This is the case exactly when the capacity is nonzero.
    #[must_use]
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.slots.is_some()
    }

    /// The allocator that provided (or will provide) the block.
    #[must_use]
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the address of slot `index`.
    ///
    /// The one-past-the-end address (`index == capacity`) may be requested for pointer
    /// arithmetic but must never be dereferenced. Whether the slot holds a live value is for the
    /// caller to know.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the capacity.
    #[must_use]
    #[inline]
    pub fn address(&self, index: usize) -> NonNull<T> {
        assert!(
            index <= self.capacity,
            "slot {index} out of bounds in raw memory of {} with capacity {}",
            type_name::<T>(),
            self.capacity
        );

        match self.slots {
            // SAFETY: Guarded by the bounds check above. The block spans `capacity` slots, so
            // offsets up to and including one-past-the-end stay within the same allocation.
            Some(first) => unsafe { first.add(index) },
            // Only index 0 passes the bounds check when there is no block.
            None => NonNull::dangling(),
        }
    }

    /// Returns a pointer to the first slot (dangling if there is no block).
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.address(0).as_ptr()
    }

    /// Exchanges blocks (together with their capacities and allocators) with another owner.
    ///
    /// Runs in constant time and never touches the slots themselves.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: RawAlloc> Drop for RawMemory<T, A> {
    fn drop(&mut self) {
        let Some(slots) = self.slots else {
            return;
        };

        let layout =
            Self::layout(self.capacity).expect("layout was already validated when allocating");

        if layout.size() == 0 {
            return;
        }

        // SAFETY: The block came from `self.alloc` with this exact layout (same capacity) and
        // is released only here, once.
        unsafe {
            self.alloc.deallocate(slots.cast(), layout);
        }
    }
}

// SAFETY: The raw pointer is uniquely owned, so the block moves between threads together with
// the owner. Whether that is fine for the slots is up to `T` and the allocator handle.
unsafe impl<T: Send, A: RawAlloc + Send> Send for RawMemory<T, A> {}

// SAFETY: Shared access only exposes addresses and the capacity; any reads through those
// addresses are the caller's responsibility under the usual `T: Sync` rules.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for RawMemory<T, A> {}
