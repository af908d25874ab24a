use std::cell::Cell;
use std::marker::PhantomData;

use crate::{AllocError, DropPolicy, Global, RawAlloc, RawMemory, Vector};

/// Builder for creating an instance of [`Vector`].
///
/// All settings are optional. Without any, the builder produces the same empty, unallocated
/// vector as [`Vector::new()`].
///
/// # Examples
///
/// ```
/// use advanced_vec::{DropPolicy, Vector};
///
/// let vector = Vector::<u64>::builder()
///     .capacity(100)
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// assert_eq!(vector.capacity(), 100);
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) but not thread-safe ([`Sync`]), as it contains
/// mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct VectorBuilder<T, A: RawAlloc = Global> {
    capacity: usize,
    drop_policy: DropPolicy,
    alloc: A,

    _element: PhantomData<fn() -> T>,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl<T> VectorBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            drop_policy: DropPolicy::default(),
            alloc: Global,
            _element: PhantomData,
            _not_sync: PhantomData,
        }
    }
}

impl<T, A: RawAlloc> VectorBuilder<T, A> {
    /// Sets the number of elements the vector can hold before it first needs to reallocate.
    ///
    /// A capacity of zero (the default) means the vector does not allocate until the first
    /// element is added.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the vector. This governs how to treat remaining
    /// elements when the vector is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use advanced_vec::{DropPolicy, Vector};
    ///
    /// let vector = Vector::<String>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    ///
    /// assert_eq!(vector.drop_policy(), DropPolicy::MustNotDropItems);
    /// ```
    #[inline]
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Sets the allocator the vector acquires its memory from.
    ///
    /// # Examples
    ///
    /// ```
    /// use advanced_vec::{Global, Vector};
    ///
    /// let vector = Vector::<u8>::builder().allocator(Global).capacity(4).build();
    ///
    /// assert_eq!(vector.allocator(), &Global);
    /// ```
    #[inline]
    pub fn allocator<B: RawAlloc>(self, alloc: B) -> VectorBuilder<T, B> {
        VectorBuilder {
            capacity: self.capacity,
            drop_policy: self.drop_policy,
            alloc,
            _element: PhantomData,
            _not_sync: PhantomData,
        }
    }

    /// Builds the vector with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity cannot be allocated.
    #[must_use]
    pub fn build(self) -> Vector<T, A> {
        self.try_build()
            .unwrap_or_else(|e| panic!("{e}; use try_build() to handle allocation failure"))
    }

    /// Builds the vector with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the requested capacity cannot be allocated.
    pub fn try_build(self) -> Result<Vector<T, A>, AllocError> {
        let data = RawMemory::with_capacity_in(self.capacity, self.alloc)?;

        Ok(Vector::from_parts(data, self.drop_policy))
    }
}
