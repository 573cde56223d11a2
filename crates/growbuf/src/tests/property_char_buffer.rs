use alloc::{string::String, vec::Vec};

use quickcheck::QuickCheck;

use super::arbitrary::{CharOp, SmallPolicy};
use crate::{ByteString, U16String, WideString};

fn tests() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Property: appends concatenate, the terminator follows the last unit after
/// every call, and at least one slot is always left for it.
#[test]
fn matches_byte_model_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(policy: SmallPolicy, ops: Vec<CharOp>) -> bool {
        let mut s = ByteString::with_options(policy.0);
        let mut model: Vec<u8> = Vec::new();
        for op in &ops {
            match op {
                CharOp::Append(units) => {
                    s.append(units);
                    model.extend_from_slice(units);
                }
                CharOp::AppendFill(count, unit) => {
                    s.append_fill(usize::from(*count), *unit);
                    model.extend(core::iter::repeat_n(*unit, usize::from(*count)));
                }
                CharOp::Push(unit) => {
                    s.push(*unit);
                    model.push(*unit);
                }
                CharOp::Reserve(n) => {
                    let len = s.len();
                    s.reserve(usize::from(*n));
                    if s.capacity() <= len + usize::from(*n) {
                        return false;
                    }
                }
                CharOp::Clear => {
                    s.clear();
                    model.clear();
                }
            }
            s.check_invariants();
            if s.as_units() != model.as_slice() {
                return false;
            }
        }
        true
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(SmallPolicy, Vec<CharOp>) -> bool);
}

/// Property: wide buffers decode back to the text they were built from.
#[test]
fn text_round_trips_through_wide_units_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String) -> bool {
        use alloc::string::ToString;

        let utf16 = U16String::from(text.as_str());
        let wide = WideString::from(text.as_str());
        utf16.to_string() == text
            && wide.to_string() == text
            && wide.len() == text.chars().count()
            && utf16[utf16.len()] == 0
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(String) -> bool);
}

/// Property: ordering agrees with slice ordering of the live units.
#[test]
fn ordering_matches_slices_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(a: Vec<u8>, b: Vec<u8>) -> bool {
        let x = ByteString::from_units(&a);
        let y = ByteString::from_units(&b);
        x.cmp(&y) == a.cmp(&b) && (x == y) == (a == b)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<u8>, Vec<u8>) -> bool);
}
