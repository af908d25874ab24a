//! A contiguous growable sequence container built on an explicit raw memory owner.
//!
//! This crate provides [`Vector`], a dynamic array whose storage layer is a separate public type,
//! [`RawMemory`]. The split keeps the two concerns apart:
//!
//! - [`RawMemory`] owns one uninitialized block with room for a fixed number of slots. It acquires
//!   and releases memory and hands out slot addresses, but never creates, reads or drops a value.
//! - [`Vector`] tracks how many slots at the front of that block hold live values and is the only
//!   code that moves values into or out of slots.
//!
//! # Key Features
//!
//! - **Strong rollback**: if memory cannot be acquired or an element constructor fails or panics,
//!   every element constructed during the call is dropped again and the vector keeps its previous
//!   contents in its previous block
//! - **Fallible variants**: every allocating operation has a `try_` form that returns
//!   [`AllocError`] instead of panicking, and closure-based constructors accept fallible closures
//!   whose errors surface as [`Error::Element`]
//! - **Amortized growth**: capacity doubles when full, so `N` appends cost `O(log N)` reallocations
//! - **Pluggable allocation**: memory comes from a [`RawAlloc`] implementation, [`Global`] by
//!   default
//! - **Drop policies**: a vector can be configured to panic if it is dropped while still holding
//!   elements, see [`DropPolicy`]
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```rust
//! use advanced_vec::Vector;
//!
//! let mut names = Vector::new();
//! names.push_back("Alice".to_string());
//! names.push_back("Bob".to_string());
//!
//! let position = names.insert(1, "Carol".to_string());
//! assert_eq!(names[position], "Carol");
//! assert_eq!(names, ["Alice", "Carol", "Bob"]);
//!
//! names.erase(0);
//! assert_eq!(names.len(), 2);
//! ```
//!
//! ## Handling failure
//!
//! ```rust
//! use advanced_vec::{Error, Vector};
//!
//! let mut numbers = Vector::from([1, 2, 3]);
//!
//! // The constructor fails, so nothing changes.
//! let result = numbers.try_emplace_back(|| "x".parse::<i32>());
//! assert!(matches!(result, Err(Error::Element(_))));
//! assert_eq!(numbers, [1, 2, 3]);
//!
//! // The constructor succeeds.
//! let added = numbers.try_emplace_back(|| "4".parse::<i32>()).unwrap();
//! assert_eq!(*added, 4);
//! ```
//!
//! ## Working with the raw memory layer
//!
//! ```rust
//! use advanced_vec::RawMemory;
//!
//! let mut first = RawMemory::<u64>::with_capacity(8).unwrap();
//! let mut second = RawMemory::<u64>::new();
//!
//! first.swap(&mut second);
//!
//! assert_eq!(first.capacity(), 0);
//! assert_eq!(second.capacity(), 8);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod alloc;
mod builder;
mod drop_policy;
mod error;
mod into_iter;
mod raw_memory;
mod vector;

pub use alloc::{Global, RawAlloc};
#[cfg(test)]
pub(crate) use alloc::FakeAlloc;
pub use builder::*;
pub use drop_policy::*;
pub use error::{AllocError, Error};
pub use into_iter::IntoIter;
pub use raw_memory::RawMemory;
pub use vector::Vector;
