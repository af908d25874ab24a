//! Basic usage example for `Vector`.
//!
//! This example demonstrates how the capacity of a `Vector` grows as elements are added, how
//! insertion and erasure shift elements, and how a failed construction leaves the vector intact.

use advanced_vec::{Error, Vector};

fn main() {
    let mut vector = Vector::new();

    println!("Created Vector with capacity: {}", vector.capacity());

    for value in 1..=5_u32 {
        vector.push_back(value * 10);
        println!(
            "Pushed {}; length {} capacity {}",
            value * 10,
            vector.len(),
            vector.capacity()
        );
    }

    let position = vector.insert(2, 25);
    println!("Inserted 25 at position {position}: {vector:?}");

    let next = vector.erase(0);
    println!("Erased position 0, element now there is {}: {vector:?}", vector[next]);

    // A constructor that fails leaves the vector as it was.
    let result = vector.try_emplace(1, || "not a number".parse::<u32>());
    match result {
        Err(Error::Element(e)) => println!("Construction failed ({e}); vector is still {vector:?}"),
        Err(e) => println!("Unexpected failure: {e}"),
        Ok(position) => println!("Unexpectedly inserted at {position}"),
    }

    let copy = vector.clone();
    vector.clear();

    println!(
        "Cleared original (length {}, capacity {}); copy is {copy:?} with capacity {}",
        vector.len(),
        vector.capacity(),
        copy.capacity()
    );

    let total: u32 = copy.into_iter().sum();
    println!("Sum of copied elements: {total}");

    println!("Example completed successfully!");
}
