use std::iter::FusedIterator;
use std::{fmt, ptr, slice};

use crate::{Global, RawAlloc, RawMemory, Vector};

/// An owning iterator over the elements of a [`Vector`].
///
/// Created by [`Vector::into_iter()`]. Elements not yet yielded are dropped together with the
/// iterator, after which the memory block is released.
///
/// # Examples
///
/// ```
/// use advanced_vec::Vector;
///
/// let vector = Vector::from(["a".to_string(), "b".to_string(), "c".to_string()]);
///
/// let mut iter = vector.into_iter();
/// assert_eq!(iter.next().as_deref(), Some("a"));
/// assert_eq!(iter.next_back().as_deref(), Some("c"));
/// assert_eq!(iter.len(), 1);
/// ```
pub struct IntoIter<T, A: RawAlloc = Global> {
    data: RawMemory<T, A>,

    /// Slots `[front, back)` hold the elements not yet yielded.
    front: usize,
    back: usize,
}

impl<T, A: RawAlloc> IntoIter<T, A> {
    /// The elements not yet yielded.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: Slots `[front, back)` are live and within the block.
        unsafe {
            slice::from_raw_parts(self.data.address(self.front).as_ptr(), self.remaining())
        }
    }

    fn remaining(&self) -> usize {
        // Cannot wrap: `front <= back` always.
        self.back.wrapping_sub(self.front)
    }
}

impl<T, A: RawAlloc> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        let slot = self.data.address(self.front);
        self.front = self.front.wrapping_add(1);

        // SAFETY: The slot was live and is now outside `[front, back)`, so it is read only once.
        Some(unsafe { slot.read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl<T, A: RawAlloc> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        self.back = self.back.wrapping_sub(1);

        // SAFETY: The slot was live and is now outside `[front, back)`, so it is read only once.
        Some(unsafe { self.data.address(self.back).read() })
    }
}

impl<T, A: RawAlloc> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: RawAlloc> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAlloc> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining =
            ptr::slice_from_raw_parts_mut(self.data.address(self.front).as_ptr(), self.remaining());

        self.front = self.back;

        // SAFETY: These slots were live and are no longer tracked by us, so nothing reads them
        // again. The block is released afterwards when `data` is dropped.
        unsafe {
            ptr::drop_in_place(remaining);
        }
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: RawAlloc> IntoIterator for Vector<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let (data, len) = self.into_raw_parts();

        IntoIter {
            data,
            front: 0,
            back: len,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{DropPolicy, FakeAlloc};

    assert_impl_all!(IntoIter<u32>: Send, Sync);
    assert_not_impl_any!(IntoIter<Rc<u32>>: Send, Sync);

    #[test]
    fn yields_in_order_from_both_ends() {
        let vector = Vector::from([1, 2, 3, 4]);

        let mut iter = vector.into_iter();

        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.as_slice(), [2, 3]);
        assert_eq!(iter.collect::<Vec<_>>(), [2, 3]);
    }

    #[test]
    fn exhausted_iterator_stays_exhausted() {
        let mut iter = Vector::from([1]).into_iter();

        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.len(), 0);
    }

    #[test]
    fn drop_releases_unyielded_elements_and_memory() {
        let live = Rc::new(Cell::new(0_usize));

        struct Counted(Rc<Cell<usize>>);

        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() - 1);
            }
        }

        let alloc = FakeAlloc::new();
        let mut vector = Vector::new_in(alloc.clone());
        for _ in 0..4 {
            live.set(live.get() + 1);
            vector.push_back(Counted(Rc::clone(&live)));
        }

        let mut iter = vector.into_iter();
        drop(iter.next());
        assert_eq!(live.get(), 3);

        drop(iter);
        assert_eq!(live.get(), 0);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn consuming_vector_with_forbidden_to_drop_policy_is_fine() {
        let mut vector = Vector::<u32>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();
        vector.push_back(1);
        vector.push_back(2);

        let total: u32 = vector.into_iter().sum();

        assert_eq!(total, 3);
    }

    #[test]
    fn abandoned_iterator_ignores_drop_policy() {
        let mut vector = Vector::<String>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();
        vector.push_back("first".to_string());
        vector.push_back("second".to_string());

        let mut iter = vector.into_iter();
        assert_eq!(iter.next().as_deref(), Some("first"));

        drop(iter);
    }

    #[test]
    fn debug_shows_remaining() {
        let mut iter = Vector::from([1, 2, 3]).into_iter();
        iter.next();

        assert_eq!(format!("{iter:?}"), "IntoIter([2, 3])");
    }
}
