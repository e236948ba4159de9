use std::io::{self, Write};

use crate::builtins::{lookup, puts, BUILTINS};
use crate::types::Key;
use crate::{eval_str as eval, Object};


macro_rules! assert_seq {
    ($x:expr , $y:expr $(,)?) => {
        assert_eq!($x, Some(Object::from($y)))
    };
}


fn err(code: &str) -> String {
    match &eval(code) {
        Some(Object::Error(e)) => e.message(),
        other => panic!("expected an error from {:?}, got {:?}", code, other),
    }
}


fn ints(values: &[i64]) -> Object {
    values.iter().copied().map(Object::from).collect()
}


#[test]
fn registry() {
    let mut names: Vec<&str> = BUILTINS.keys().copied().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["first", "last", "len", "push", "puts", "rest", "set", "sputs"]);

    assert_eq!(lookup(Key::new("len")).map(|b| b.name), Some("len"));
    assert!(lookup(Key::new("print")).is_none());
}


#[test]
fn len() {
    assert_seq!(eval("len(\"\")"), 0);
    assert_seq!(eval("len(\"four\")"), 4);
    assert_seq!(eval("len(\"hello world\")"), 11);
    assert_seq!(eval("len(\"héllo\")"), 5);
    assert_seq!(eval("len([])"), 0);
    assert_seq!(eval("len([1, 2, 3])"), 3);

    assert_eq!(err("len(1)"), "argument to `len` not supported, got INTEGER");
    assert_eq!(err("len({})"), "argument to `len` not supported, got HASH");
    assert_eq!(err("len()"), "Too few arguments, expected 1, got 0");
    assert_eq!(err("len(\"one\", \"two\")"), "Too many arguments, expected 1, got 2");
}


#[test]
fn first_and_last() {
    assert_seq!(eval("first([1, 2, 3])"), 1);
    assert_seq!(eval("last([1, 2, 3])"), 3);
    assert_seq!(eval("first([[4]])"), ints(&[4]));

    assert_eq!(err("first([])"), "argument to `first` must be a non-empty ARRAY");
    assert_eq!(err("last([])"), "argument to `last` must be a non-empty ARRAY");
    assert_eq!(err("first(1)"), "argument to `first` must be ARRAY, got INTEGER");
    assert_eq!(err("last(\"abc\")"), "argument to `last` must be ARRAY, got STRING");
    assert_eq!(err("first()"), "Too few arguments, expected 1, got 0");
}


#[test]
fn rest() {
    assert_seq!(eval("rest([1, 2, 3])"), ints(&[2, 3]));
    assert_seq!(eval("rest([1])"), ints(&[]));
    assert_seq!(eval("rest(rest([1, 2, 3]))"), ints(&[3]));

    // The argument is left untouched.
    assert_seq!(eval("let a = [1, 2, 3]; rest(a); a"), ints(&[1, 2, 3]));

    assert_eq!(err("rest([])"), "argument to `rest` must be a non-empty ARRAY");
    assert_eq!(err("rest(null)"), "argument to `rest` must be ARRAY, got NULL");
}


#[test]
fn push() {
    assert_seq!(eval("push([], 1)"), ints(&[1]));
    assert_seq!(eval("push([1, 2], 3)"), ints(&[1, 2, 3]));

    // The argument is left untouched.
    assert_seq!(eval("let a = [1]; let b = push(a, 2); len(a) * 10 + len(b)"), 12);
    assert_seq!(eval("let arr = [1, 2, 3]; rest(arr); push(arr, 4); len(arr)"), 3);
    assert_seq!(eval("let arr = [1, 2, 3]; len(push(arr, 4))"), 4);

    assert_eq!(err("push(1, 1)"), "argument to `push` must be ARRAY, got INTEGER");
    assert_eq!(err("push([])"), "Too few arguments, expected 2, got 1");
}


#[test]
fn set() {
    assert_seq!(eval("set({}, 1, 2)"), Object::NULL);
    assert_seq!(eval("let h = {}; set(h, \"k\", \"v\"); h[\"k\"]"), "v");

    assert_eq!(err("set([], 1, 2)"), "argument to `set` must be HASH, got ARRAY");
    assert_eq!(err("set({}, [], 2)"), "unusable as hash key: ARRAY");
    assert_eq!(err("set({}, 1)"), "Too few arguments, expected 3, got 2");
}


#[test]
fn puts_returns_null() {
    assert_seq!(eval("puts(\"hello\", 1, [true])"), Object::NULL);
    assert_seq!(eval("puts()"), Object::NULL);
}


struct Closed;

impl Write for Closed {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}


#[test]
fn puts_to_closed_stream() {
    let err = puts(&[Object::from(1)], &mut Closed).unwrap_err();
    assert_eq!(err.to_string(), "could not write output");
    assert_eq!(puts(&[], &mut Closed), Ok(Object::NULL));
}


#[test]
fn puts_to_buffer() {
    let mut out = Vec::new();
    assert_eq!(puts(&[Object::from("a"), Object::from(2)], &mut out), Ok(Object::NULL));
    assert_eq!(String::from_utf8(out).unwrap(), "a\n2\n");
}


#[test]
fn sputs() {
    assert_seq!(eval("sputs(\"hello\", 1, [true], {\"a\": null})"), "hello\n1\n[true]\n{a: null}");
    assert_seq!(eval("sputs()"), "");
}
