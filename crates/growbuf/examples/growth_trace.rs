//! Prints how a `Vector` and a `ByteString` grow as data arrives, once with
//! the default policy and once with a small minimum capacity.
//!
//! ```text
//! cargo run -p growbuf --example growth_trace -- 4
//! ```
//!
//! The optional argument sets the minimum capacity of the second run.
#![allow(missing_docs)]

use growbuf::{ByteString, DEFAULT_MIN_CAPACITY, GrowthPolicy, Vector};

fn trace_vector(policy: GrowthPolicy, pushes: usize) {
    let mut v: Vector<usize> = Vector::with_options(policy);
    let mut last = v.capacity();
    println!("Vector<usize>, min_capacity {}: starts at {last}", policy.min_capacity);
    for i in 0..pushes {
        v.push_back(i);
        if v.capacity() != last {
            println!("  push #{:<4} capacity {last:>4} -> {:>4}", i + 1, v.capacity());
            last = v.capacity();
        }
    }
}

fn trace_bytes(policy: GrowthPolicy, words: &[&str]) {
    let mut s = ByteString::with_options(policy);
    let mut last = s.capacity();
    println!("ByteString, min_capacity {}: starts at {last}", policy.min_capacity);
    for word in words {
        s.append(word.as_bytes());
        s.push(b' ');
        if s.capacity() != last {
            println!("  len {:<4} capacity {last:>4} -> {:>4}", s.len(), s.capacity());
            last = s.capacity();
        }
    }
    println!("  final text: {s:?}");
}

fn main() {
    let small = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2);
    let words = ["growable", "buffers", "keep", "a", "terminator", "after", "the", "last", "unit"];

    for min_capacity in [DEFAULT_MIN_CAPACITY, small] {
        let policy = GrowthPolicy { min_capacity };
        trace_vector(policy, 300);
        trace_bytes(policy, &words);
        println!();
    }
}
