use std::collections::HashMap;
use std::io::Write;

use gc::GcCellRef;
use log::warn;

use crate::error::{Arity, Error, Reason, TypeMismatch};
use crate::object::{Array, Builtin, HashPair, Object};
use crate::types::{Key, Type};


macro_rules! builtin {
    ($m: ident, $e: ident) => {
        $m.insert(
            stringify!($e),
            Builtin {
                func: $e,
                name: stringify!($e),
            },
        )
    };
}


lazy_static! {
    pub static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let mut m = HashMap::new();
        builtin!(m, len);
        builtin!(m, first);
        builtin!(m, last);
        builtin!(m, rest);
        builtin!(m, push);
        builtin!(m, set);
        builtin!(m, puts);
        builtin!(m, sputs);
        m
    };
}


/// Find a builtin function by name.
pub fn lookup(name: Key) -> Option<Builtin> {
    BUILTINS.get(name.as_str()).copied()
}


/// Check that exactly `expected` arguments were passed.
fn arity(args: &[Object], expected: usize) -> Result<(), Error> {
    Arity::check(expected, args.len()).map_or(Ok(()), |reason| Err(Error::new(reason)))
}


/// Extract an array argument, or fail with a message naming the builtin.
fn array<'a>(name: &'static str, arg: &'a Object) -> Result<GcCellRef<'a, Array>, Error> {
    arg.get_array().ok_or_else(|| Error::new(TypeMismatch::ExpectedArg {
        builtin: name,
        expected: Type::Array,
        received: arg.type_of(),
    }))
}


/// Extract a non-empty array argument.
fn nonempty_array<'a>(name: &'static str, arg: &'a Object) -> Result<GcCellRef<'a, Array>, Error> {
    let elements = array(name, arg)?;
    if elements.is_empty() {
        return Err(Error::new(TypeMismatch::EmptyArray(name)));
    }
    Ok(elements)
}


/// Length of a string, in characters, or of an array.
pub fn len(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    arity(args, 1)?;
    match &args[0] {
        Object::String(x) => Ok(Object::Integer(x.chars().count() as i64)),
        Object::Array(x) => Ok(Object::Integer(x.borrow().len() as i64)),
        x => Err(Error::new(TypeMismatch::UnsupportedArg("len", x.type_of()))),
    }
}


pub fn first(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    arity(args, 1)?;
    let elements = nonempty_array("first", &args[0])?;
    Ok(elements[0].clone())
}


pub fn last(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    arity(args, 1)?;
    let elements = nonempty_array("last", &args[0])?;
    Ok(elements[elements.len() - 1].clone())
}


/// A new array holding all but the first element. The argument is left
/// untouched.
pub fn rest(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    arity(args, 1)?;
    let elements = nonempty_array("rest", &args[0])?;
    Ok(Object::array(elements[1..].iter().cloned()))
}


/// A new array with one more element at the end. The argument is left
/// untouched.
pub fn push(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    arity(args, 2)?;
    let elements = array("push", &args[0])?;
    Ok(Object::array(elements.iter().cloned().chain(std::iter::once(args[1].clone()))))
}


/// Insert a key-value pair into a hash, in place. This is the only builtin
/// that mutates its argument.
pub fn set(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    arity(args, 3)?;
    let Object::Hash(hash) = &args[0] else {
        return Err(Error::new(TypeMismatch::ExpectedArg {
            builtin: "set",
            expected: Type::Hash,
            received: args[0].type_of(),
        }));
    };

    let key = args[1].hash_key()?;
    hash.borrow_mut().insert(key, HashPair {
        key: args[1].clone(),
        value: args[2].clone(),
    });

    Ok(Object::NULL)
}


/// Write each argument on its own line to the output stream.
pub fn puts(args: &[Object], out: &mut dyn Write) -> Result<Object, Error> {
    for arg in args {
        if let Err(err) = writeln!(out, "{}", arg) {
            warn!("puts: {}", err);
            return Err(Error::new(Reason::Output));
        }
    }
    Ok(Object::NULL)
}


/// Like `puts`, but return the lines joined as a string instead of printing.
pub fn sputs(args: &[Object], _: &mut dyn Write) -> Result<Object, Error> {
    let lines: Vec<String> = args.iter().map(Object::inspect).collect();
    Ok(Object::string(lines.join("\n")))
}
