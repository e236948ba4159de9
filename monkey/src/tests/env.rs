use crate::types::Key;
use crate::{Env, Object};


#[test]
fn get_and_set() {
    let env = Env::new();
    assert_eq!(env.get(Key::new("a")), None);

    env.set(Key::new("a"), Object::from(1));
    assert_eq!(env.get(Key::new("a")), Some(Object::from(1)));

    env.set(Key::new("a"), Object::from("one"));
    assert_eq!(env.get(Key::new("a")), Some(Object::from("one")));
    assert_eq!(env.names(), vec![Key::new("a")]);
}


#[test]
fn enclosed() {
    let outer = Env::new();
    outer.set(Key::new("a"), Object::from(1));
    outer.set(Key::new("b"), Object::from(2));

    let inner = Env::enclosed(&outer);
    inner.set(Key::new("b"), Object::from(3));
    inner.set(Key::new("c"), Object::from(4));

    assert_eq!(inner.get(Key::new("a")), Some(Object::from(1)));
    assert_eq!(inner.get(Key::new("b")), Some(Object::from(3)));
    assert_eq!(inner.get(Key::new("c")), Some(Object::from(4)));

    // The outer scope is unaffected.
    assert_eq!(outer.get(Key::new("b")), Some(Object::from(2)));
    assert_eq!(outer.get(Key::new("c")), None);
}


#[test]
fn chained() {
    let global = Env::new();
    let middle = Env::enclosed(&global);
    let inner = Env::enclosed(&middle);

    global.set(Key::new("x"), Object::from(1));
    assert_eq!(inner.get(Key::new("x")), Some(Object::from(1)));

    middle.set(Key::new("x"), Object::from(2));
    assert_eq!(inner.get(Key::new("x")), Some(Object::from(2)));
    assert_eq!(global.get(Key::new("x")), Some(Object::from(1)));
}


#[test]
fn aliasing() {
    let env = Env::new();
    let alias = env.clone();
    alias.set(Key::new("z"), Object::TRUE);
    assert_eq!(env.get(Key::new("z")), Some(Object::TRUE));
}
