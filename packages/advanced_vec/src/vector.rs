use std::any::type_name;
use std::borrow::{Borrow, BorrowMut};
use std::convert::Infallible;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice::{self, SliceIndex};
use std::{fmt, mem, ptr, thread};

use scopeguard::ScopeGuard;

use crate::{AllocError, DropPolicy, Error, Global, RawAlloc, RawMemory, VectorBuilder};

/// A contiguous, growable sequence of `T` values.
///
/// The vector owns one [`RawMemory`] block plus a count of the live elements at its front. Slots
/// `[0, len)` always hold live values and slots `[len, capacity)` are always raw memory; the
/// vector is the only code that moves values across that boundary.
///
/// # Growth
///
/// Appending to a full vector doubles its capacity (starting from 1), so a sequence of `N`
/// appends performs `O(log N)` reallocations. Capacity never shrinks on its own.
///
/// # Failure guarantees
///
/// Every operation that may allocate comes in two forms. The plain form panics if memory cannot be
/// acquired; the `try_` form returns the failure instead. Operations that construct elements via a
/// caller-provided closure also have a form that accepts a fallible closure.
///
/// When any of these fails, or when an element constructor panics, the elements constructed during
/// that call are dropped again before the failure propagates, and the vector keeps its previous
/// contents in its previous block. Relocating elements into a new block is a plain bitwise move,
/// which cannot fail.
///
/// # Positions
///
/// Positions are element indexes. Insertion accepts any position in `[0, len]` (the end position
/// appends) and removal any position in `[0, len)`. Out-of-range positions and indexes are
/// programming errors and panic.
///
/// # Examples
///
/// ```
/// use advanced_vec::Vector;
///
/// let mut numbers = Vector::new();
/// numbers.push_back(1);
/// numbers.push_back(2);
/// numbers.push_back(3);
///
/// assert_eq!(numbers, [1, 2, 3]);
/// assert_eq!(numbers.capacity(), 4);
///
/// numbers.insert(1, 10);
/// assert_eq!(numbers, [1, 10, 2, 3]);
///
/// numbers.erase(0);
/// assert_eq!(numbers, [10, 2, 3]);
/// ```
pub struct Vector<T, A: RawAlloc = Global> {
    data: RawMemory<T, A>,

    /// Number of live elements, all at the front of `data`.
    len: usize,

    drop_policy: DropPolicy,
}

impl<T> Vector<T> {
    /// Creates an empty vector. Does not allocate.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a builder that can be used to configure a vector before creating it.
    ///
    /// # Examples
    ///
    /// ```
    /// use advanced_vec::Vector;
    ///
    /// let vector = Vector::<String>::builder().capacity(16).build();
    ///
    /// assert!(vector.is_empty());
    /// assert_eq!(vector.capacity(), 16);
    /// ```
    #[inline]
    pub fn builder() -> VectorBuilder<T> {
        VectorBuilder::new()
    }

    /// Creates a vector of `len` default-valued elements with a capacity of exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::try_with_len(len).unwrap_or_else(|e| alloc_failed(e))
    }

    /// Creates a vector of `len` default-valued elements with a capacity of exactly `len`.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired.
    pub fn try_with_len(len: usize) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::try_with_len_in(len, Global)
    }

    /// Creates a vector of `len` elements produced by `f`, which receives the index of each
    /// element being constructed.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    pub fn with_len_with<F>(len: usize, mut f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        into_ok(Self::try_with_len_with_in(len, Global, |index| Ok(f(index))))
    }

    /// Creates a vector of `len` elements produced by the fallible constructor `f`, which
    /// receives the index of each element being constructed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the memory cannot be acquired and [`Error::Element`] if `f`
    /// fails. Elements already constructed are dropped before returning.
    ///
    /// # Examples
    ///
    /// ```
    /// use advanced_vec::{Error, Vector};
    ///
    /// let squares = Vector::try_with_len_with(4, |i| Ok::<_, String>(i * i)).unwrap();
    /// assert_eq!(squares, [0, 1, 4, 9]);
    ///
    /// let failed = Vector::try_with_len_with(4, |i| {
    ///     if i == 2 {
    ///         Err("no twos allowed")
    ///     } else {
    ///         Ok(i)
    ///     }
    /// });
    /// assert!(matches!(failed, Err(Error::Element("no twos allowed"))));
    /// ```
    pub fn try_with_len_with<E, F>(len: usize, f: F) -> Result<Self, Error<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_with_len_with_in(len, Global, f)
    }

    /// Creates an empty vector with room for at least `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity_in(capacity, Global).unwrap_or_else(|e| alloc_failed(e))
    }

    /// Creates an empty vector with room for at least `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::try_with_capacity_in(capacity, Global)
    }
}

impl<T, A: RawAlloc> Vector<T, A> {
    /// Creates an empty vector that will allocate from `alloc`. Does not allocate.
    #[must_use]
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self::from_parts(RawMemory::new_in(alloc), DropPolicy::MayDropItems)
    }

    /// Creates an empty vector with room for at least `capacity` elements allocated from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocError> {
        let data = RawMemory::with_capacity_in(capacity, alloc)?;

        Ok(Self::from_parts(data, DropPolicy::MayDropItems))
    }

    /// Creates a vector of `len` default-valued elements allocated from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired.
    pub fn try_with_len_in(len: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::try_with_len_with_in(len, alloc, |_| Ok::<T, Infallible>(T::default()))
            .map_err(alloc_only)
    }

    /// Creates a vector of `len` elements produced by the fallible constructor `f`, allocated
    /// from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the memory cannot be acquired and [`Error::Element`] if `f`
    /// fails. Elements already constructed are dropped before returning.
    pub fn try_with_len_with_in<E, F>(len: usize, alloc: A, f: F) -> Result<Self, Error<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let mut vector = Self::try_with_capacity_in(len, alloc)?;

        vector.try_construct_tail(len, f).map_err(Error::Element)?;

        Ok(vector)
    }

    pub(crate) const fn from_parts(data: RawMemory<T, A>, drop_policy: DropPolicy) -> Self {
        Self {
            data,
            len: 0,
            drop_policy,
        }
    }

    /// Number of live elements.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector holds no elements.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the vector can hold without reallocating.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The allocator the elements are stored in.
    #[must_use]
    #[inline]
    pub fn allocator(&self) -> &A {
        self.data.allocator()
    }

    /// The policy applied when the vector is dropped while it still holds elements.
    #[must_use]
    #[inline]
    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }

    /// Pointer to the first element. Dangling (but aligned) if nothing has been allocated.
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Mutable pointer to the first element. Dangling (but aligned) if nothing has been allocated.
    #[must_use]
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    /// The live elements as a slice.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` slots are live, the pointer is aligned and non-null even when
        // nothing is allocated, and shared access to `self` prevents mutation.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[must_use]
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: The first `len` slots are live, the pointer is aligned and non-null even when
        // nothing is allocated, and exclusive access to `self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    /// Ensures the capacity is at least `capacity`, relocating the elements into a new block of
    /// exactly that size if it is not.
    ///
    /// Unlike [`Vec::reserve`], the argument is the total capacity to reach, not the number of
    /// additional elements. Does nothing if the capacity is already sufficient.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    pub fn reserve(&mut self, capacity: usize) {
        self.try_reserve(capacity)
            .unwrap_or_else(|e| alloc_failed(e));
    }

    /// Ensures the capacity is at least `capacity`, relocating the elements into a new block of
    /// exactly that size if it is not.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired. The vector is unchanged in
    /// that case: same elements, same capacity, same element addresses.
    ///
    /// # Examples
    ///
    /// ```
    /// use advanced_vec::{AllocError, Vector};
    ///
    /// let mut vector = Vector::from([1, 2, 3]);
    ///
    /// assert!(matches!(
    ///     vector.try_reserve(usize::MAX),
    ///     Err(AllocError::CapacityOverflow)
    /// ));
    /// assert_eq!(vector, [1, 2, 3]);
    /// assert_eq!(vector.capacity(), 3);
    /// ```
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        let new_data = self.new_block(capacity)?;
        self.relocate(new_data, None);

        Ok(())
    }

    /// Resizes the vector to `new_len` elements, appending default values or dropping elements
    /// from the end as needed.
    ///
    /// Growing reserves exactly `new_len` slots if the capacity is insufficient. Shrinking never
    /// releases memory.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.try_resize(new_len).unwrap_or_else(|e| alloc_failed(e));
    }

    /// Resizes the vector to `new_len` elements, appending default values or dropping elements
    /// from the end as needed.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired. The vector is unchanged in
    /// that case.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), AllocError>
    where
        T: Default,
    {
        self.try_resize_with(new_len, || Ok::<T, Infallible>(T::default()))
            .map_err(alloc_only)
    }

    /// Resizes the vector to `new_len` elements, appending values produced by `f` or dropping
    /// elements from the end as needed.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        into_ok(self.try_resize_with(new_len, || Ok(f())));
    }

    /// Resizes the vector to `new_len` elements, appending values produced by the fallible
    /// constructor `f` or dropping elements from the end as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the memory cannot be acquired and [`Error::Element`] if `f`
    /// fails. The vector is unchanged in either case: same elements, same capacity, same element
    /// addresses.
    pub fn try_resize_with<E, F>(&mut self, new_len: usize, mut f: F) -> Result<(), Error<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        if new_len <= self.capacity() {
            return self
                .try_construct_tail(new_len, |_| f())
                .map_err(Error::Element);
        }

        let new_data = self.new_block(new_len)?;

        // The new tail is built in the new block first. If this fails or panics, the partial tail
        // is dropped and `new_data` returns its block to the allocator.
        Self::construct_slots(&new_data, self.len, new_len, |_| f()).map_err(Error::Element)?;

        self.relocate(new_data, None);
        self.len = new_len;

        Ok(())
    }

    /// Appends `value`, growing the capacity if needed, and returns a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    pub fn push_back(&mut self, value: T) -> &mut T {
        self.emplace_back(|| value)
    }

    /// Appends `value`, growing the capacity if needed, and returns a reference to it.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired. The vector is unchanged and
    /// `value` is dropped in that case.
    pub fn try_push_back(&mut self, value: T) -> Result<&mut T, AllocError> {
        self.try_emplace_back(|| Ok::<T, Infallible>(value))
            .map_err(alloc_only)
    }

    /// Appends the value produced by `f`, growing the capacity if needed, and returns a
    /// reference to it.
    ///
    /// When the vector is full, the new block is acquired and the value constructed in it before
    /// the existing elements are moved over.
    ///
    /// # Panics
    ///
    /// Panics if the memory cannot be acquired.
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        into_ok(self.try_emplace_back(|| Ok(f())))
    }

    /// Appends the value produced by the fallible constructor `f`, growing the capacity if
    /// needed, and returns a reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the memory cannot be acquired and [`Error::Element`] if `f`
    /// fails. The vector is unchanged in either case.
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.try_emplace(self.len, f)?;

        Ok(self
            .as_mut_slice()
            .last_mut()
            .expect("we just appended an element so the vector cannot be empty"))
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn pop_back(&mut self) {
        assert!(
            !self.is_empty(),
            "pop_back() called on an empty vector of {}",
            type_name::<T>()
        );

        drop(self.pop());
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    pub fn pop(&mut self) -> Option<T> {
        let new_len = self.len.checked_sub(1)?;

        self.len = new_len;

        // SAFETY: The slot at `new_len` was live until we shrank `len` above, so it holds a value
        // that nothing else will read or drop.
        Some(unsafe { self.data.address(new_len).read() })
    }

    /// Inserts `value` at `index`, shifting the elements from `index` onwards one position
    /// towards the end. Returns the index of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` or if the memory cannot be acquired.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        self.emplace(index, || value)
    }

    /// Inserts `value` at `index`, shifting the elements from `index` onwards one position
    /// towards the end. Returns the index of the inserted element.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired. The vector is unchanged and
    /// `value` is dropped in that case.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<usize, AllocError> {
        self.try_emplace(index, || Ok::<T, Infallible>(value))
            .map_err(alloc_only)
    }

    /// Inserts the value produced by `f` at `index`, shifting the elements from `index` onwards
    /// one position towards the end. Returns the index of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` or if the memory cannot be acquired.
    pub fn emplace<F>(&mut self, index: usize, f: F) -> usize
    where
        F: FnOnce() -> T,
    {
        into_ok(self.try_emplace(index, || Ok(f())))
    }

    /// Inserts the value produced by the fallible constructor `f` at `index`, shifting the
    /// elements from `index` onwards one position towards the end. Returns the index of the
    /// inserted element.
    ///
    /// The value is always constructed before any existing element is touched, so a failing
    /// `f` leaves the vector as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alloc`] if the memory cannot be acquired and [`Error::Element`] if `f`
    /// fails. The vector is unchanged in either case.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_emplace<E, F>(&mut self, index: usize, f: F) -> Result<usize, Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds in vector of {} with length {}",
            type_name::<T>(),
            self.len
        );

        if self.len == self.capacity() {
            self.emplace_into_new_block(index, f)?;
        } else {
            self.emplace_in_place(index, f)?;
        }

        self.len = self
            .len
            .checked_add(1)
            .expect("guarded by capacity, which cannot exceed usize::MAX");

        Ok(index)
    }

    /// Constructs the new element in a larger block, then moves the existing elements around it.
    fn emplace_into_new_block<E, F>(&mut self, index: usize, f: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let new_data = self.new_block(self.grown_capacity()?)?;

        // If this fails or panics, `new_data` is dropped and returns its block to the allocator.
        let value = f().map_err(Error::Element)?;

        // SAFETY: `index <= len < new capacity`, so the slot is within the new block and raw.
        unsafe {
            new_data.address(index).write(value);
        }

        self.relocate(new_data, Some(index));

        Ok(())
    }

    /// Opens a gap at `index` within the existing block and constructs the new element there.
    fn emplace_in_place<E, F>(&mut self, index: usize, f: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        debug_assert!(self.len < self.capacity());

        let value = f().map_err(Error::Element)?;

        // The old last element lands in the raw slot at `len` and everything from `index`
        // follows it one slot over, leaving `index` as raw memory.
        let shifted = self.len.wrapping_sub(index);

        // SAFETY: Both ranges lie within the block because `len < capacity`. The source range
        // `[index, len)` is live and the overlap is handled by `ptr::copy`.
        unsafe {
            ptr::copy(
                self.data.address(index).as_ptr(),
                self.data.address(index.wrapping_add(1)).as_ptr(),
                shifted,
            );
        }

        // SAFETY: The slot at `index` was vacated by the move above.
        unsafe {
            self.data.address(index).write(value);
        }

        Ok(())
    }

    /// Drops the element at `index`, shifting the following elements one position towards the
    /// front. Returns `index`, which now refers to the element that followed the erased one (or
    /// is the end position if the last element was erased).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Removes the element at `index` and returns it, shifting the following elements one
    /// position towards the front.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index {index} out of bounds in vector of {} with length {}",
            type_name::<T>(),
            self.len
        );

        let hole = self.data.address(index);

        // SAFETY: The slot is live (guarded by the bounds check). The value moves out and the
        // slot is overwritten or excluded from the live range below.
        let value = unsafe { hole.read() };

        // Cannot wrap: `index < len`.
        let following = self.len.wrapping_sub(index).wrapping_sub(1);

        // SAFETY: `[index + 1, len)` is live and within the block; the overlap with the
        // destination is handled by `ptr::copy`.
        unsafe {
            ptr::copy(
                self.data.address(index.wrapping_add(1)).as_ptr(),
                hole.as_ptr(),
                following,
            );
        }

        self.len = self.len.wrapping_sub(1);

        value
    }

    /// Drops the elements from `new_len` onwards. Does nothing if `new_len >= len`.
    ///
    /// The capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }

        let tail = ptr::slice_from_raw_parts_mut(
            self.data.address(new_len).as_ptr(),
            self.len.wrapping_sub(new_len),
        );

        // Shrink first, so a panicking destructor cannot lead to the same element being dropped
        // twice.
        self.len = new_len;

        // SAFETY: The tail was live and is no longer part of the live range.
        unsafe {
            ptr::drop_in_place(tail);
        }
    }

    /// Drops all elements. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges the contents (including allocator and drop policy) with another vector.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the contents out into a new vector, leaving this one empty with no capacity.
    ///
    /// The returned vector carries over the drop policy; this one keeps its own.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let empty = RawMemory::new_in(self.data.allocator().clone());
        let data = mem::replace(&mut self.data, empty);
        let len = mem::take(&mut self.len);

        let mut taken = Self::from_parts(data, self.drop_policy);
        taken.len = len;
        taken
    }

    /// Replaces the contents with those of `other`, leaving `other` empty with no capacity.
    ///
    /// The previous elements of this vector are dropped. Never allocates.
    pub fn move_from(&mut self, other: &mut Self) {
        let mut previous = other.take();
        self.swap_storage(&mut previous);

        // Replacing the contents is not dropping the vector, whatever the policy says.
        previous.drop_policy = DropPolicy::MayDropItems;
    }

    /// Creates an independent copy with exactly `len` capacity, allocated from the same
    /// allocator.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the memory cannot be acquired.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut copy = self.try_clone_in(self.data.allocator().clone())?;
        copy.drop_policy = self.drop_policy;
        Ok(copy)
    }

    fn try_clone_in(&self, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut source = self.iter();

        Self::try_with_len_with_in(self.len, alloc, |_| {
            Ok::<T, Infallible>(
                source
                    .next()
                    .expect("the source has exactly as many elements as we construct")
                    .clone(),
            )
        })
        .map_err(alloc_only)
    }

    /// Exchanges blocks and lengths, leaving the drop policies in place.
    fn swap_storage(&mut self, other: &mut Self) {
        self.data.swap(&mut other.data);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Capacity after one growth step: double the current one, or 1 for an empty block.
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    fn grown_capacity(&self) -> Result<usize, AllocError> {
        match self.capacity() {
            0 => Ok(1),
            capacity => capacity
                .checked_mul(2)
                .ok_or(AllocError::CapacityOverflow),
        }
    }

    fn new_block(&self, capacity: usize) -> Result<RawMemory<T, A>, AllocError> {
        RawMemory::with_capacity_in(capacity, self.data.allocator().clone())
    }

    /// Moves every live element into `new_data` and adopts it as our block. The old block is
    /// released without dropping anything, as its values now live in the new one.
    ///
    /// With a `gap`, the elements from that index onwards are placed one slot further on,
    /// leaving the gap slot untouched.
    fn relocate(&mut self, mut new_data: RawMemory<T, A>, gap: Option<usize>) {
        let extra = usize::from(gap.is_some());
        assert!(
            self.len.checked_add(extra).is_some_and(|needed| needed <= new_data.capacity()),
            "relocation target too small for vector of {}",
            type_name::<T>()
        );

        let head = gap.unwrap_or(self.len);
        let tail = self.len.wrapping_sub(head);

        // SAFETY: `[0, head)` is live in the old block and raw in the new one, which has room
        // for it (asserted above). The two blocks are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(self.data.as_ptr(), new_data.as_ptr(), head);
        }

        // SAFETY: `[head, len)` is live in the old block; its destination
        // `[head + extra, len + extra)` is within the new block (asserted above).
        unsafe {
            ptr::copy_nonoverlapping(
                self.data.address(head).as_ptr(),
                new_data.address(head.wrapping_add(extra)).as_ptr(),
                tail,
            );
        }

        self.data.swap(&mut new_data);

        // `new_data` now owns the old block, whose slots are all moved-from raw memory.
        drop(new_data);
    }

    /// Constructs elements into the raw slots `[len, new_len)` with `f`, which receives the
    /// index of each element.
    ///
    /// If `f` fails or panics, the elements constructed so far are dropped and the length is
    /// unchanged.
    fn try_construct_tail<E, F>(&mut self, new_len: usize, f: F) -> Result<(), E>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::construct_slots(&self.data, self.len, new_len, f)?;
        self.len = new_len;

        Ok(())
    }

    /// Constructs elements into the raw slots `[start, end)` of `data` with `f`, which receives
    /// the index of each element.
    ///
    /// If `f` fails or panics, the elements constructed so far are dropped again, leaving every
    /// slot in the range raw.
    fn construct_slots<E, F>(
        data: &RawMemory<T, A>,
        start: usize,
        end: usize,
        mut f: F,
    ) -> Result<(), E>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        assert!(
            end <= data.capacity(),
            "cannot construct up to slot {end} in raw memory of {} with capacity {}",
            type_name::<T>(),
            data.capacity()
        );

        let first = data.address(start).as_ptr();

        let mut constructed = scopeguard::guard(0_usize, |constructed| {
            let partial = ptr::slice_from_raw_parts_mut(first, constructed);

            // SAFETY: Exactly `constructed` slots starting at `first` were written by the loop
            // below and are not live from the point of view of any owner.
            unsafe {
                ptr::drop_in_place(partial);
            }
        });

        for index in start..end {
            let value = f(index)?;

            // SAFETY: `index < end <= capacity` and the slot is raw.
            unsafe {
                data.address(index).write(value);
            }

            *constructed = constructed
                .checked_add(1)
                .expect("guarded by capacity, which cannot exceed usize::MAX");
        }

        ScopeGuard::into_inner(constructed);

        Ok(())
    }
}

impl<T, A: RawAlloc> Drop for Vector<T, A> {
    fn drop(&mut self) {
        let was_empty = self.is_empty();

        self.clear();

        // The block itself is released when `data` is dropped after us, also if we panic here.
        //
        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                was_empty,
                "dropped a non-empty vector of {} with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: RawAlloc> Clone for Vector<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| alloc_failed(e))
    }

    /// Makes this vector a copy of `source`, reusing the existing block when it is large enough.
    ///
    /// Elements present in both are assigned with [`Clone::clone_from`], surplus elements are
    /// dropped and missing ones are cloned onto the end. Only if `source` has more elements than
    /// fit is a full copy built in a new block and swapped in, which leaves this vector untouched
    /// if any clone panics.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source
                .try_clone_in(self.data.allocator().clone())
                .unwrap_or_else(|e| alloc_failed(e));

            self.swap_storage(&mut copy);
            return;
        }

        for (target, item) in self.iter_mut().zip(source.iter()) {
            target.clone_from(item);
        }

        if source.len <= self.len {
            self.truncate(source.len);
            return;
        }

        let mut missing = source.iter().skip(self.len);

        let result = self.try_construct_tail(source.len, |_| {
            Ok::<T, Infallible>(
                missing
                    .next()
                    .expect("the source has exactly as many elements as we construct")
                    .clone(),
            )
        });

        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}

impl<T, A: RawAlloc> Deref for Vector<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAlloc> DerefMut for Vector<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: RawAlloc, I: SliceIndex<[T]>> Index<I> for Vector<T, A> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, A: RawAlloc, I: SliceIndex<[T]>> IndexMut<I> for Vector<T, A> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, A: RawAlloc> AsRef<[T]> for Vector<T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAlloc> AsMut<[T]> for Vector<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: RawAlloc> Borrow<[T]> for Vector<T, A> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAlloc> BorrowMut<[T]> for Vector<T, A> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U, A, B> PartialEq<Vector<U, B>> for Vector<T, A>
where
    T: PartialEq<U>,
    A: RawAlloc,
    B: RawAlloc,
{
    fn eq(&self, other: &Vector<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: RawAlloc> Eq for Vector<T, A> {}

impl<T, U, A: RawAlloc> PartialEq<[U]> for Vector<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: RawAlloc> PartialEq<&[U]> for Vector<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A: RawAlloc, const N: usize> PartialEq<[U; N]> for Vector<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Hash, A: RawAlloc> Hash for Vector<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: RawAlloc> Extend<T> for Vector<T, A> {
    #[cfg_attr(test, mutants::skip)] // Reserving up front is only an optimization.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        let (lower, _) = iter.size_hint();
        let needed = self.len.saturating_add(lower);

        if needed > self.capacity() {
            self.reserve(needed.max(self.capacity().saturating_mul(2)));
        }

        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(items: [T; N]) -> Self {
        let mut vector = Self::with_capacity(N);
        vector.extend(items);
        vector
    }
}

impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(items: &[T]) -> Self {
        let mut source = items.iter();

        Self::with_len_with(items.len(), |_| {
            source
                .next()
                .expect("the source has exactly as many elements as we construct")
                .clone()
        })
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a Vector<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut Vector<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: RawAlloc> Vector<T, A> {
    /// Hands the block and live range over to an owning iterator.
    pub(crate) fn into_raw_parts(mut self) -> (RawMemory<T, A>, usize) {
        let empty = RawMemory::new_in(self.data.allocator().clone());
        let data = mem::replace(&mut self.data, empty);
        let len = mem::take(&mut self.len);

        // `self` is now empty and can be dropped without side effects.
        (data, len)
    }
}

/// Reports an allocation failure from a method that has no way to return it.
#[cold]
#[track_caller]
fn alloc_failed(error: AllocError) -> ! {
    panic!("{error}; use the try_ variant of this method to handle allocation failure")
}

/// Narrows an error from an infallible element constructor to the allocation failure it must be.
fn alloc_only(error: Error<Infallible>) -> AllocError {
    match error {
        Error::Alloc(e) => e,
        Error::Element(never) => match never {},
    }
}

/// Unwraps a result whose only possible error is an allocation failure, panicking on it.
#[track_caller]
fn into_ok<R>(result: Result<R, Error<Infallible>>) -> R {
    result.unwrap_or_else(|e| alloc_failed(alloc_only(e)))
}
