//! Raw memory acquisition capability.
//!
//! Containers in this crate never talk to the process allocator directly. Instead they go through
//! a [`RawAlloc`] implementation, which lets tests substitute an instrumented allocator that
//! counts calls or refuses to allocate on demand.

mod abstractions;
#[cfg(test)]
mod fake;
mod global;

pub use abstractions::RawAlloc;
#[cfg(test)]
pub(crate) use fake::FakeAlloc;
pub use global::Global;
