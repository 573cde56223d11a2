#![expect(missing_docs)]

use std::ffi::CString;

use growbuf::{ByteString, CharBuffer, GrowthPolicy, U16String, U32String, WideString};
use insta::assert_snapshot;
use quickcheck_macros::quickcheck;

#[test]
fn terminated_pointer_reads_back_as_c_string() {
    let mut s = ByteString::from("path/to");
    s.append(b"/file");
    // SAFETY: the buffer keeps a NUL after the last byte.
    let c = unsafe { std::ffi::CStr::from_ptr(s.as_ptr().cast()) };
    assert_eq!(c.to_bytes(), b"path/to/file");

    let owned = CString::new("round trip").unwrap();
    assert_eq!(ByteString::from(owned.as_c_str()), "round trip");
}

#[test]
fn appending_in_small_steps() {
    let mut s = ByteString::with_options(GrowthPolicy { min_capacity: 4 });
    let mut trace = vec![s.capacity().to_string()];
    for unit in b"abcdefghijklmnop" {
        s.push(*unit);
        let capacity = s.capacity().to_string();
        if trace.last() != Some(&capacity) {
            trace.push(capacity);
        }
    }
    assert_eq!(s, "abcdefghijklmnop");
    assert_snapshot!(trace.join(" -> "), @"4 -> 6 -> 9 -> 13 -> 19");
}

#[test]
fn renders_every_unit_width() {
    let bytes = ByteString::from("say \"hi\"");
    let utf16 = U16String::from("snow ☃");
    let utf32 = U32String::from("ünï");
    let wide = WideString::from("wide");
    assert_snapshot!(
        format!("{bytes} | {bytes:?}\n{utf16} | {utf16:?}\n{utf32} | {utf32:?}\n{wide} | {wide:?}"),
        @r#"
    say "hi" | "say \"hi\""
    snow ☃ | "snow ☃"
    ünï | "ünï"
    wide | "wide"
    "#
    );
}

#[test]
fn sorts_like_strings() {
    let mut words: Vec<ByteString> = ["pear", "apple", "fig", "app"].into_iter().map(ByteString::from).collect();
    words.sort();
    let sorted: Vec<String> = words.iter().map(ToString::to_string).collect();
    assert_eq!(sorted, ["app", "apple", "fig", "pear"]);
}

#[test]
fn generic_over_unit_type() {
    fn count_terminated<C: growbuf::CharUnit>(s: &CharBuffer<C>) -> usize {
        s.as_units_with_terminator().len()
    }

    assert_eq!(count_terminated(&ByteString::from("abc")), 4);
    assert_eq!(count_terminated(&U16String::from("abc")), 4);
    assert_eq!(count_terminated(&WideString::from("")), 1);
}

#[quickcheck]
fn extend_matches_append(a: Vec<u16>, b: Vec<u16>) -> bool {
    let mut appended = U16String::from_units(&a);
    appended.append(&b);
    let mut extended = U16String::from_units(&a);
    extended.extend(b.iter());
    appended == extended && appended[appended.len()] == 0
}
