//! Behavioral tests for `Vector` exercised only through the public API.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use advanced_vec::{DropPolicy, Vector};

/// Shared counters observed by `Sample` elements.
#[derive(Debug, Default)]
struct Counters {
    live: Cell<usize>,
    constructions: Cell<usize>,

    /// Number of clones that may still succeed; `None` for unlimited.
    clones_before_panic: Cell<Option<usize>>,
}

#[derive(Debug)]
struct Sample {
    value: i32,
    counters: Rc<Counters>,
}

impl Sample {
    fn new(value: i32, counters: &Rc<Counters>) -> Self {
        counters.live.set(counters.live.get() + 1);
        counters.constructions.set(counters.constructions.get() + 1);

        Self {
            value,
            counters: Rc::clone(counters),
        }
    }
}

impl Clone for Sample {
    fn clone(&self) -> Self {
        match self.counters.clones_before_panic.get() {
            Some(0) => panic!("simulated clone failure"),
            Some(n) => self.counters.clones_before_panic.set(Some(n - 1)),
            None => {}
        }

        Self::new(self.value, &self.counters)
    }
}

impl Drop for Sample {
    fn drop(&mut self) {
        self.counters.live.set(self.counters.live.get() - 1);
    }
}

fn values(vector: &Vector<Sample>) -> Vec<i32> {
    vector.iter().map(|sample| sample.value).collect()
}

#[test]
fn push_three_then_inspect() {
    let mut vector = Vector::new();
    let mut capacities = Vec::new();

    for value in [1, 2, 3] {
        vector.push_back(value);
        capacities.push(vector.capacity());
    }

    assert_eq!(vector.len(), 3);
    assert_eq!(vector, [1, 2, 3]);
    assert_eq!(capacities, [1, 2, 4]);
}

#[test]
fn resize_up_then_down() {
    let mut vector = Vector::from([1, 2, 3]);

    vector.resize(5);
    assert_eq!(vector, [1, 2, 3, 0, 0]);
    assert_eq!(vector.len(), 5);

    let capacity = vector.capacity();
    vector.resize(2);

    assert_eq!(vector, [1, 2]);
    assert_eq!(vector.len(), 2);
    assert_eq!(vector.capacity(), capacity);
    assert!(capacity >= 5);
}

#[test]
fn erase_middle_element() {
    let mut vector = Vector::from([1, 2, 3]);

    let position = vector.iter().position(|&value| value == 2).unwrap();
    vector.erase(position);

    assert_eq!(vector, [1, 3]);
}

#[test]
fn size_never_exceeds_capacity() {
    let mut vector = Vector::new();

    for step in 0..200_usize {
        match step % 7 {
            0 | 1 | 2 => {
                vector.push_back(step);
            }
            3 => {
                let position = vector.len() / 2;
                vector.insert(position, step);
            }
            4 if !vector.is_empty() => {
                vector.erase(0);
            }
            5 => vector.resize(step / 3),
            _ => {
                vector.pop();
            }
        }

        assert!(vector.len() <= vector.capacity());
    }
}

#[test]
fn appends_construct_each_element_exactly_once() {
    let counters = Rc::new(Counters::default());
    let mut vector = Vector::new();

    for value in 0..1000 {
        vector.push_back(Sample::new(value, &counters));
    }

    assert_eq!(counters.constructions.get(), 1000);
    assert_eq!(counters.live.get(), 1000);
    assert_eq!(vector.capacity(), 1024);

    drop(vector);
    assert_eq!(counters.live.get(), 0);
}

#[test]
fn move_leaves_source_empty() {
    let mut source = Vector::with_len_with(1000, |index| index);
    let mut target = Vector::from([7, 8, 9]);

    target.move_from(&mut source);

    assert_eq!(source.len(), 0);
    assert_eq!(source.capacity(), 0);
    assert_eq!(target.len(), 1000);
    assert!(target.iter().copied().eq(0..1000));

    let taken = target.take();
    assert_eq!(target.len(), 0);
    assert_eq!(target.capacity(), 0);
    assert_eq!(taken.len(), 1000);
}

#[test]
fn copies_are_independent() {
    let original = Vector::from(["a".to_string(), "b".to_string()]);
    let mut copy = original.clone();

    copy[0].push('!');
    copy.push_back("c".to_string());
    copy.erase(1);

    assert_eq!(original, ["a", "b"]);
    assert_eq!(copy, ["a!", "c"]);
}

#[test]
fn clone_from_follows_source() {
    let long = Vector::from([1, 2, 3, 4, 5, 6]);
    let short = Vector::from([9]);

    let mut target = Vector::from([0, 0, 0]);

    target.clone_from(&short);
    assert_eq!(target, [9]);
    assert_eq!(target.capacity(), 3);

    target.clone_from(&long);
    assert_eq!(target, long);
}

#[test]
fn insert_then_erase_at_every_position() {
    let original = Vector::from([10, 20, 30, 40]);

    for position in 0..=original.len() {
        let mut vector = original.clone();

        assert_eq!(vector.insert(position, -1), position);
        assert_eq!(vector.len(), original.len() + 1);
        assert_eq!(vector[..position], original[..position]);
        assert_eq!(vector[position], -1);
        assert_eq!(vector[position + 1..], original[position..]);

        vector.erase(position);
        assert_eq!(vector, original);
    }
}

#[test]
fn panicking_clone_during_copy_leaves_original_intact() {
    let counters = Rc::new(Counters::default());
    let original = Vector::with_len_with(5, |index| {
        Sample::new(i32::try_from(index).unwrap(), &counters)
    });

    counters.clones_before_panic.set(Some(3));
    let result = panic::catch_unwind(AssertUnwindSafe(|| original.clone()));
    counters.clones_before_panic.set(None);

    assert!(result.is_err());
    assert_eq!(counters.live.get(), 5);
    assert_eq!(values(&original), [0, 1, 2, 3, 4]);
}

#[test]
fn panicking_constructor_during_insert_leaves_vector_intact() {
    let counters = Rc::new(Counters::default());
    let mut vector = Vector::new();
    for value in 0..4 {
        vector.push_back(Sample::new(value, &counters));
    }

    let capacity = vector.capacity();
    let first = vector.as_ptr();

    // Full vector, so the insert would need to reallocate.
    assert_eq!(vector.len(), capacity);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        vector.emplace(2, || panic!("simulated constructor failure"));
    }));

    assert!(result.is_err());
    assert_eq!(values(&vector), [0, 1, 2, 3]);
    assert_eq!(vector.capacity(), capacity);
    assert_eq!(vector.as_ptr(), first);
    assert_eq!(counters.live.get(), 4);
}

#[test]
fn fallible_constructor_during_resize_rolls_back() {
    let counters = Rc::new(Counters::default());
    let mut vector = Vector::from([Sample::new(1, &counters)]);
    let capacity = vector.capacity();
    let first = vector.as_ptr();
    let mut budget = 3;

    let result = vector.try_resize_with(10, || {
        if budget == 0 {
            return Err("exhausted");
        }
        budget -= 1;
        Ok(Sample::new(0, &counters))
    });

    assert_eq!(result.unwrap_err().into_element(), Some("exhausted"));
    assert_eq!(values(&vector), [1]);
    assert_eq!(vector.capacity(), capacity);
    assert_eq!(vector.as_ptr(), first);
    assert_eq!(counters.live.get(), 1);
}

#[test]
fn drop_policy_allows_draining_before_drop() {
    let mut vector = Vector::<String>::builder()
        .capacity(2)
        .drop_policy(DropPolicy::MustNotDropItems)
        .build();

    vector.push_back("one".to_string());
    vector.push_back("two".to_string());

    let drained: Vec<String> = vector.take().into_iter().collect();

    assert_eq!(drained, ["one", "two"]);
    assert!(vector.is_empty());
}

#[test]
fn works_with_non_cloneable_elements() {
    struct MoveOnly(Box<u32>);

    let mut vector = Vector::new();
    for value in 0..10 {
        vector.push_back(MoveOnly(Box::new(value)));
    }
    vector.insert(0, MoveOnly(Box::new(100)));
    vector.reserve(64);

    let removed = vector.remove(0);

    assert_eq!(*removed.0, 100);
    assert_eq!(*vector[9].0, 9);
    assert_eq!(vector.capacity(), 64);
}

#[test]
fn vector_can_move_between_threads() {
    let vector = Vector::from([1_u64, 2, 3]);

    let sum = std::thread::spawn(move || vector.iter().sum::<u64>())
        .join()
        .unwrap();

    assert_eq!(sum, 6);
}
