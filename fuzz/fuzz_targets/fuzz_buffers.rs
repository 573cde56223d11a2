#![no_main]
//! Drives `Vector` and `ByteString` through arbitrary operation sequences and
//! checks them against `Vec` after every step.

use arbitrary::Arbitrary;
use growbuf::{ByteString, GrowthPolicy, Vector};
use libfuzzer_sys::fuzz_target;

/// Keeps single requests small enough that runs stay fast.
const MAX_COUNT: usize = 512;

#[derive(Debug, Arbitrary)]
enum VectorOp {
    PushBack(u32),
    PopBack,
    Insert(usize, u32),
    InsertN(usize, usize, u32),
    Erase(usize),
    EraseRange(usize, usize),
    Resize(usize, u32),
    Reserve(usize),
    Truncate(usize),
    Clear,
    CloneAndCompare,
}

#[derive(Debug, Arbitrary)]
enum BytesOp {
    Append(Vec<u8>),
    AppendFill(usize, u8),
    Push(u8),
    Reserve(usize),
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    min_capacity: u8,
    vector_ops: Vec<VectorOp>,
    bytes_ops: Vec<BytesOp>,
}

fn run_vector(policy: GrowthPolicy, ops: &[VectorOp]) {
    let mut v = Vector::with_options(policy);
    let mut model: Vec<u32> = Vec::new();
    for op in ops {
        let slot = model.len() + 1;
        match *op {
            VectorOp::PushBack(x) => {
                v.push_back(x);
                model.push(x);
            }
            VectorOp::PopBack => assert_eq!(v.pop_back(), model.pop()),
            VectorOp::Insert(pos, x) => {
                v.insert(pos % slot, x);
                model.insert(pos % slot, x);
            }
            VectorOp::InsertN(pos, count, x) => {
                let count = count % MAX_COUNT;
                v.insert_n(pos % slot, count, x);
                model.splice(pos % slot..pos % slot, std::iter::repeat_n(x, count));
            }
            VectorOp::Erase(pos) => {
                if !model.is_empty() {
                    assert_eq!(v.erase(pos % model.len()), model.remove(pos % model.len()));
                }
            }
            VectorOp::EraseRange(a, b) => {
                let (a, b) = (a % slot, b % slot);
                let range = a.min(b)..a.max(b);
                v.erase_range(range.clone());
                model.drain(range);
            }
            VectorOp::Resize(len, x) => {
                v.resize(len % MAX_COUNT, x);
                model.resize(len % MAX_COUNT, x);
            }
            VectorOp::Reserve(n) => {
                let before = v.capacity();
                v.reserve(n % MAX_COUNT);
                assert!(v.capacity() >= before);
                assert!(v.capacity() - v.len() >= n % MAX_COUNT);
            }
            VectorOp::Truncate(len) => {
                v.truncate(len % slot);
                model.truncate(len % slot);
            }
            VectorOp::Clear => {
                v.clear();
                model.clear();
            }
            VectorOp::CloneAndCompare => {
                let copy = v.clone();
                copy.check_invariants();
                assert_eq!(copy, v);
            }
        }
        v.check_invariants();
        assert_eq!(v.as_slice(), model.as_slice());
    }
}

fn run_bytes(policy: GrowthPolicy, ops: &[BytesOp]) {
    let mut s = ByteString::with_options(policy);
    let mut model: Vec<u8> = Vec::new();
    for op in ops {
        match op {
            BytesOp::Append(units) => {
                s.append(units);
                model.extend_from_slice(units);
            }
            BytesOp::AppendFill(count, unit) => {
                let count = count % MAX_COUNT;
                s.append_fill(count, *unit);
                model.extend(std::iter::repeat_n(*unit, count));
            }
            BytesOp::Push(unit) => {
                s.push(*unit);
                model.push(*unit);
            }
            BytesOp::Reserve(n) => {
                s.reserve(n % MAX_COUNT);
                assert!(s.capacity() > s.len() + n % MAX_COUNT);
            }
            BytesOp::Clear => {
                s.clear();
                model.clear();
            }
        }
        s.check_invariants();
        assert_eq!(s.as_units(), model.as_slice());
    }
}

fuzz_target!(|input: Input| {
    let policy = GrowthPolicy {
        min_capacity: usize::from(input.min_capacity),
    };
    run_vector(policy, &input.vector_ops);
    run_bytes(policy, &input.bytes_ops);
});
