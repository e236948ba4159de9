use std::io::sink;

use crate::eval::eval_program;
use crate::types::Key;
use crate::{eval_str as eval, parse, Env, Object};


macro_rules! assert_seq {
    ($x:expr , $y:expr $(,)?) => {
        assert_eq!($x, Some(Object::from($y)))
    };
}


/// Evaluate code that must fail, and return the error message.
fn err(code: &str) -> String {
    match &eval(code) {
        Some(Object::Error(e)) => e.message(),
        other => panic!("expected an error from {:?}, got {:?}", code, other),
    }
}


/// Evaluate code in an existing environment.
fn eval_in(code: &str, env: &Env) -> Option<Object> {
    let (program, errors) = parse(code);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    eval_program(&program, env, &mut sink())
}


#[test]
fn integers() {
    assert_seq!(eval("5"), 5);
    assert_seq!(eval("-10"), -10);
    assert_seq!(eval("5 + 5 + 5 + 5 - 10"), 10);
    assert_seq!(eval("2 * 2 * 2 * 2 * 2"), 32);
    assert_seq!(eval("-50 + 100 + -50"), 0);
    assert_seq!(eval("20 + 2 * -10"), 0);
    assert_seq!(eval("50 / 2 * 2 + 10"), 60);
    assert_seq!(eval("3 * (3 * 3) + 10"), 37);
    assert_seq!(eval("(5 + 10 * 2 + 15 / 3) * 2 + -10"), 50);
    assert_seq!(eval("-7 / 2"), -3);
}


#[test]
fn overflow() {
    assert_seq!(eval("9223372036854775807 + 1"), i64::MIN);
    assert_seq!(eval("-9223372036854775807 - 2"), i64::MAX);
    assert_seq!(eval("let min = -9223372036854775807 - 1; -min"), i64::MIN);
    assert_seq!(eval("let min = -9223372036854775807 - 1; min / -1"), i64::MIN);
}


#[test]
fn booleans() {
    assert_seq!(eval("true"), true);
    assert_seq!(eval("1 < 2"), true);
    assert_seq!(eval("1 > 2"), false);
    assert_seq!(eval("1 == 1"), true);
    assert_seq!(eval("1 != 1"), false);
    assert_seq!(eval("true == true"), true);
    assert_seq!(eval("true != false"), true);
    assert_seq!(eval("(1 < 2) == true"), true);
    assert_seq!(eval("(1 > 2) == true"), false);
}


#[test]
fn null_comparisons() {
    assert_seq!(eval("null"), Object::NULL);
    assert_seq!(eval("null == null"), true);
    assert_seq!(eval("null == 1"), false);
    assert_seq!(eval("1 != null"), true);
    assert_seq!(eval("\"\" == null"), false);
    assert_seq!(eval("if (false) { 1 } == null"), true);
}


#[test]
fn bang() {
    assert_seq!(eval("!true"), false);
    assert_seq!(eval("!false"), true);
    assert_seq!(eval("!5"), false);
    assert_seq!(eval("!!true"), true);
    assert_seq!(eval("!!5"), true);
    assert_seq!(eval("!null"), true);
    assert_seq!(eval("!\"\""), false);
}


#[test]
fn strings() {
    assert_seq!(eval("\"Hello World!\""), "Hello World!");
    assert_seq!(eval("\"Hello\" + \" \" + \"World!\""), "Hello World!");
    assert_seq!(eval("\"\" + \"\""), "");
}


#[test]
fn conditionals() {
    assert_seq!(eval("if (true) { 10 }"), 10);
    assert_seq!(eval("if (false) { 10 }"), Object::NULL);
    assert_seq!(eval("if (1) { 10 }"), 10);
    assert_seq!(eval("if (0) { 10 }"), 10);
    assert_seq!(eval("if (null) { 10 }"), Object::NULL);
    assert_seq!(eval("if (1 < 2) { 10 } else { 20 }"), 10);
    assert_seq!(eval("if (1 > 2) { 10 } else { 20 }"), 20);
    assert_seq!(eval("if (true) {}"), Object::NULL);
}


#[test]
fn ternary() {
    assert_seq!(eval("1 < 2 ? 10 : 20"), 10);
    assert_seq!(eval("1 > 2 ? 10 : 20"), 20);
    assert_seq!(eval("false ? 1 : null ? 2 : 3"), 3);
    assert_seq!(eval("let x = 5; x > 3 ? \"big\" : \"small\""), "big");

    // Only the selected branch is evaluated.
    assert_seq!(eval("true ? 1 : nope"), 1);
}


#[test]
fn return_statements() {
    assert_seq!(eval("return 10;"), 10);
    assert_seq!(eval("return 10; 9;"), 10);
    assert_seq!(eval("return 2 * 5; 9;"), 10);
    assert_seq!(eval("9; return 2 * 5; 9;"), 10);
    assert_seq!(eval("return;"), Object::NULL);
    assert_seq!(eval("if (10 > 1) { if (10 > 1) { return 10; } return 1; }"), 10);
    assert_seq!(eval("let f = fn(x) { return x; x + 10; }; f(10);"), 10);
    assert_seq!(eval("let f = fn(x) { let result = x + 10; return result; return 10; }; f(10);"), 20);

    // A return only leaves the innermost function.
    assert_seq!(eval("let f = fn() { let g = fn() { return 1; }; g(); 2 }; f()"), 2);
}


#[test]
fn let_statements() {
    assert_seq!(eval("let a = 5; a;"), 5);
    assert_seq!(eval("let a = 5 * 5; a;"), 25);
    assert_seq!(eval("let a = 5; let b = a; b;"), 5);
    assert_seq!(eval("let a = 5; let b = a; let c = a + b + 5; c;"), 15);
    assert_seq!(eval("let a = 1; let a = a + 1; a"), 2);

    // Bindings produce no value.
    assert_eq!(eval("let a = 5;"), None);
    assert_eq!(eval("1; let a = 5;"), None);
    assert_eq!(eval(""), None);
}


#[test]
fn functions() {
    let f = eval("fn(x) { x + 2; };").unwrap();
    assert_eq!(f.type_of(), crate::types::Type::Function);
    assert_eq!(f.to_string(), "fn(x) {\n(x + 2)\n}");

    assert_seq!(eval("let identity = fn(x) { x; }; identity(5);"), 5);
    assert_seq!(eval("let identity = fn(x) { return x; }; identity(5);"), 5);
    assert_seq!(eval("let double = fn(x) { x * 2; }; double(5);"), 10);
    assert_seq!(eval("let add = fn(x, y) { x + y; }; add(5, 5);"), 10);
    assert_seq!(eval("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));"), 20);
    assert_seq!(eval("fn(x) { x; }(5)"), 5);
    assert_seq!(eval("fn() {}()"), Object::NULL);

    // Parameters may shadow builtins.
    assert_seq!(eval("fn(len) { len }(3)"), 3);
}


#[test]
fn closures() {
    assert_seq!(eval("
        let newAdder = fn(x) {
            fn(y) { x + y };
        };
        let addTwo = newAdder(2);
        addTwo(2);
    "), 4);

    assert_seq!(eval("let adder = fn(x) { fn(y) { x + y } }; let add5 = adder(5); add5(3)"), 8);

    assert_seq!(eval("
        let counter = fn(x) { fn() { x } };
        let a = counter(1);
        let b = counter(2);
        a() + b() * 10
    "), 21);

    // The closure sees later bindings of its defining scope.
    assert_seq!(eval("let f = fn() { later }; let later = 7; f()"), 7);

    // Calls don't leak bindings into the caller.
    assert_eq!(err("let f = fn(x) { let y = x; y }; f(1); y"), "identifier not found: y");
}


#[test]
fn recursion() {
    assert_seq!(eval("
        let fib = fn(n) {
            if (n < 2) { return n; }
            fib(n - 1) + fib(n - 2)
        };
        fib(15)
    "), 610);

    assert_seq!(eval("
        let map = fn(arr, f) {
            let iter = fn(arr, acc) {
                if (len(arr) == 0) { acc } else { iter(rest(arr), push(acc, f(first(arr)))) }
            };
            iter(arr, []);
        };
        map([1, 2, 3], fn(x) { x * x })
    "), Object::array(vec![Object::from(1), Object::from(4), Object::from(9)]));

    assert_seq!(eval("
        let reduce = fn(arr, initial, f) {
            let iter = fn(arr, result) {
                if (len(arr) == 0) { result } else { iter(rest(arr), f(result, first(arr))) }
            };
            iter(arr, initial);
        };
        reduce([1, 2, 3, 4, 5], 0, fn(a, b) { a + b })
    "), 15);
}


#[test]
fn arrays() {
    assert_seq!(eval("[1, 2 * 2, 3 + 3]"), Object::array(vec![
        Object::from(1),
        Object::from(4),
        Object::from(6),
    ]));

    assert_seq!(eval("[1, 2, 3][0]"), 1);
    assert_seq!(eval("[1, 2, 3][1]"), 2);
    assert_seq!(eval("let i = 0; [1][i];"), 1);
    assert_seq!(eval("[1, 2, 3][1 + 1];"), 3);
    assert_seq!(eval("let myArray = [1, 2, 3]; myArray[2];"), 3);
    assert_seq!(eval("let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];"), 6);
    assert_seq!(eval("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]"), 2);
    assert_seq!(eval("[1, 2, 3][3]"), Object::NULL);
    assert_seq!(eval("[1, 2, 3][-1]"), Object::NULL);
    assert_seq!(eval("[][0]"), Object::NULL);
}


#[test]
fn hashes() {
    let hash = eval("
        let two = \"two\";
        {
            \"one\": 10 - 9,
            two: 1 + 1,
            \"thr\" + \"ee\": 6 / 2,
            4: 4,
            true: 5,
            false: 6
        }
    ").unwrap();
    assert_eq!(hash.to_string(), "{one: 1, two: 2, three: 3, 4: 4, true: 5, false: 6}");

    assert_seq!(eval("{\"foo\": 5}[\"foo\"]"), 5);
    assert_seq!(eval("{\"foo\": 5}[\"bar\"]"), Object::NULL);
    assert_seq!(eval("let key = \"foo\"; {\"foo\": 5}[key]"), 5);
    assert_seq!(eval("{}[\"foo\"]"), Object::NULL);
    assert_seq!(eval("{5: 5}[5]"), 5);
    assert_seq!(eval("{true: 5}[true]"), 5);
    assert_seq!(eval("{false: 5}[false]"), 5);
    assert_seq!(eval("{1: 5}[\"1\"]"), Object::NULL);

    // Later duplicates win.
    assert_seq!(eval("{\"a\": 1, \"a\": 2}[\"a\"]"), 2);
}


#[test]
fn hash_mutation() {
    assert_seq!(eval("let h = {}; set(h, \"a\", 1); h[\"a\"]"), 1);
    assert_seq!(eval("let h = {\"a\": 1}; set(h, \"a\", 2); h[\"a\"]"), 2);

    // Mutation is visible through every reference.
    assert_seq!(eval("let h = {}; let g = h; set(g, 1, 2); h[1]"), 2);
    assert_seq!(eval("let h = {}; let f = fn(x) { set(x, true, 3) }; f(h); h[true]"), 3);
    assert_eq!(eval("let h = {}; set(h, 1, 2); set(h, 3, 4); h").unwrap().to_string(), "{1: 2, 3: 4}");
}


#[test]
fn self_containing_hashes() {
    assert_eq!(eval("let h = {}; set(h, 1, h); h").unwrap().to_string(), "{1: {...}}");
    assert_eq!(
        eval("let h = {}; let a = [h]; set(h, \"a\", a); a").unwrap().to_string(),
        "[{a: [...]}]",
    );
    assert_seq!(eval("let h = {}; set(h, 1, h); h[1][1][1] == null"), false);
}


#[test]
fn builtin_values() {
    let len = eval("len").unwrap();
    assert_eq!(len.type_of(), crate::types::Type::Builtin);
    assert_eq!(len.to_string(), "builtin function");
    assert_seq!(eval("let l = len; l(\"four\")"), 4);
}


#[test]
fn errors() {
    assert_eq!(err("5 + true;"), "type mismatch: INTEGER + BOOLEAN");
    assert_eq!(err("5 + true; 5;"), "type mismatch: INTEGER + BOOLEAN");
    assert_eq!(err("-true"), "unknown operator: -BOOLEAN");
    assert_eq!(err("-\"a\""), "unknown operator: -STRING");
    assert_eq!(err("true + false;"), "unknown operator: BOOLEAN + BOOLEAN");
    assert_eq!(err("5; true + false; 5"), "unknown operator: BOOLEAN + BOOLEAN");
    assert_eq!(err("if (10 > 1) { true + false; }"), "unknown operator: BOOLEAN + BOOLEAN");
    assert_eq!(err("
        if (10 > 1) {
            if (10 > 1) {
                return true + false;
            }
            return 1;
        }
    "), "unknown operator: BOOLEAN + BOOLEAN");
    assert_eq!(err("\"Hello\" - \"World\""), "unknown operator: STRING - STRING");
    assert_eq!(err("\"a\" == \"a\""), "unknown operator: STRING == STRING");
    assert_eq!(err("[1] == [1]"), "unknown operator: ARRAY == ARRAY");
    assert_eq!(err("true < false"), "unknown operator: BOOLEAN < BOOLEAN");
    assert_eq!(err("1 == true"), "type mismatch: INTEGER == BOOLEAN");
    assert_eq!(err("\"1\" + 1"), "type mismatch: STRING + INTEGER");
    assert_eq!(err("foobar"), "identifier not found: foobar");
    assert_eq!(err("{\"name\": \"Monkey\"}[fn(x) { x }];"), "unusable as hash key: FUNCTION");
    assert_eq!(err("{[]: 1}"), "unusable as hash key: ARRAY");
    assert_eq!(err("{}[null]"), "unusable as hash key: NULL");
    assert_eq!(err("1[0]"), "index operator not supported: INTEGER");
    assert_eq!(err("[1][true]"), "index operator not supported: ARRAY");
    assert_eq!(err("5()"), "not a function: INTEGER");
    assert_eq!(err("\"f\"(1)"), "not a function: STRING");
    assert_eq!(err("1 / 0"), "division by zero");
    assert_eq!(err("let len = 1;"), "can't assign to len, it is a builtin function");
    assert_eq!(err("fn(x) { x }()"), "Too few arguments, expected 1, got 0");
    assert_eq!(err("fn(x) { x }(1, 2)"), "Too many arguments, expected 1, got 2");

    // Errors render with a prefix.
    assert_eq!(eval("-true").unwrap().to_string(), "ERROR: unknown operator: -BOOLEAN");
}


#[test]
fn errors_stop_evaluation() {
    let env = Env::new();
    let result = eval_in("let a = 1; let b = a + true; let c = 3;", &env);
    assert_eq!(result.map(|r| r.to_string()), Some("ERROR: type mismatch: INTEGER + BOOLEAN".to_owned()));
    assert_eq!(env.get(Key::new("a")), Some(Object::from(1)));
    assert_eq!(env.get(Key::new("b")), None);
    assert_eq!(env.get(Key::new("c")), None);

    // Arguments after a failing one are not evaluated.
    let env = Env::new();
    eval_in("let h = {}; [foo, set(h, 1, 1)]", &env);
    assert_eq!(eval_in("h[1]", &env), Some(Object::NULL));

    // Errors pass through function calls.
    assert_eq!(err("let f = fn() { 1 + null }; f() + 1"), "type mismatch: INTEGER + NULL");

    // A builtin name is rejected before the value is evaluated.
    let env = Env::new();
    eval_in("let h = {}; let len = set(h, 1, 1);", &env);
    assert_eq!(eval_in("h[1]", &env), Some(Object::NULL));
}


#[test]
fn top_level_return() {
    let env = Env::new();
    assert_eq!(eval_in("let a = 1; return 2; let a = 3;", &env), Some(Object::from(2)));
    assert_eq!(env.get(Key::new("a")), Some(Object::from(1)));
}


#[test]
fn persistent_environment() {
    let env = Env::new();
    assert_eq!(eval_in("let x = 10;", &env), None);
    assert_eq!(eval_in("let double = fn(y) { y * 2 };", &env), None);
    assert_eq!(eval_in("double(x)", &env), Some(Object::from(20)));
}
