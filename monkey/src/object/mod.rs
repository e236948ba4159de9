//! A Monkey value is represented by the [`Object`] type.
//!
//! Scalars (integers, booleans, strings and null) are plain values. Arrays and
//! hashes live behind garbage-collected cells: cloning an `Object` that holds
//! one aliases the same storage, so a mutation through one reference (see the
//! `set` builtin) is visible through all of them. Functions are shared in the
//! same way.

mod function;

use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use gc::{Finalize, Gc, GcCellRef, Trace};

use crate::error::{Error, Reason};
use crate::types::{GcCell, OrderedMap, Type};

pub use function::{Builtin, Function};


/// A hash key is the identity of a hashable value. Keys of different types
/// never compare equal, so two keys are equal if and only if the values they
/// were derived from are equal.
///
/// String keys share the text of the string object rather than interning it,
/// so keys built at runtime are freed along with the hashes that hold them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
}


/// A hash entry retains the original key object alongside the value, for
/// rendering.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}


pub type Array = Vec<Object>;
pub type Hash = OrderedMap<HashKey, HashPair>;


/// The universal runtime value.
#[derive(Clone, Trace, Finalize)]
pub enum Object {
    /// 64-bit signed integers with wrapping arithmetic
    Integer(i64),

    /// Booleans
    Boolean(bool),

    /// Immutable strings
    String(#[unsafe_ignore_trace] Rc<str>),

    /// Absence of a meaningful value
    Null,

    /// Arrays, with shared storage
    Array(GcCell<Array>),

    /// Hashes, with shared storage
    Hash(GcCell<Hash>),

    /// User-defined closures
    Function(Gc<Function>),

    /// Native functions
    Builtin(#[unsafe_ignore_trace] Builtin),

    /// A runtime error that reached the top level
    Error(Error),
}

impl Object {
    pub const TRUE: Object = Object::Boolean(true);
    pub const FALSE: Object = Object::Boolean(false);
    pub const NULL: Object = Object::Null;

    /// Construct a string object.
    pub fn string(value: impl AsRef<str>) -> Object {
        Object::String(Rc::from(value.as_ref()))
    }

    /// Construct a new array object with fresh storage.
    pub fn array(elements: impl IntoIterator<Item = Object>) -> Object {
        Object::Array(GcCell::new(elements.into_iter().collect()))
    }

    /// Construct a new hash object with fresh storage from key-value pairs.
    ///
    /// Fails if any of the keys are unhashable. Later duplicates overwrite
    /// earlier ones.
    pub fn hash(pairs: impl IntoIterator<Item = (Object, Object)>) -> Result<Object, Error> {
        let mut hash = Hash::new();
        for (key, value) in pairs {
            hash.insert(key.hash_key()?, HashPair { key, value });
        }
        Ok(Object::Hash(GcCell::new(hash)))
    }

    /// Construct a boolean object.
    pub fn bool(value: bool) -> Object {
        if value { Object::TRUE } else { Object::FALSE }
    }

    /// Return the type of this object.
    pub fn type_of(&self) -> Type {
        match self {
            Self::Integer(_) => Type::Integer,
            Self::Boolean(_) => Type::Boolean,
            Self::String(_) => Type::String,
            Self::Null => Type::Null,
            Self::Array(_) => Type::Array,
            Self::Hash(_) => Type::Hash,
            Self::Function(_) => Type::Function,
            Self::Builtin(_) => Type::Builtin,
            Self::Error(_) => Type::Error,
        }
    }

    /// Determine whether the object is truthy. Only `false` and null are falsy.
    pub fn truthy(&self) -> bool {
        !matches!(self, Self::Boolean(false) | Self::Null)
    }

    /// Return the human-readable rendering used by the REPL and by `puts`.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    /// Derive the hash key of this object. Only integers, booleans and strings
    /// are hashable.
    pub fn hash_key(&self) -> Result<HashKey, Error> {
        match self {
            Self::Integer(x) => Ok(HashKey::Integer(*x)),
            Self::Boolean(x) => Ok(HashKey::Boolean(*x)),
            Self::String(x) => Ok(HashKey::String(x.clone())),
            _ => Err(Error::new(Reason::HashKey(self.type_of()))),
        }
    }

    pub fn get_array(&self) -> Option<GcCellRef<'_, Array>> {
        match self {
            Self::Array(x) => Some(x.borrow()),
            _ => None,
        }
    }

    pub fn get_hash(&self) -> Option<GcCellRef<'_, Hash>> {
        match self {
            Self::Hash(x) => Some(x.borrow()),
            _ => None,
        }
    }

    /// Identity comparison, as used by the `==` operator on operands other
    /// than integers and strings. Scalars compare by value; containers and
    /// functions compare by reference.
    pub fn same(&self, other: &Object) -> bool {
        match (self, other) {
            (Self::Array(x), Self::Array(y)) => x.ptr_eq(y),
            (Self::Hash(x), Self::Hash(y)) => x.ptr_eq(y),
            (Self::Function(x), Self::Function(y)) => Gc::ptr_eq(x, y),
            _ => self == other,
        }
    }
}


/// Structural equality. Containers compare by contents and functions by
/// reference. This is the equality used by tests and by hash lookups on
/// values, not the language's `==` operator (see [`Object::same`]).
impl PartialEq<Object> for Object {
    fn eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => x == y,
            (Self::Boolean(x), Self::Boolean(y)) => x == y,
            (Self::String(x), Self::String(y)) => x == y,
            (Self::Null, Self::Null) => true,
            (Self::Array(x), Self::Array(y)) => x.ptr_eq(y) || *x.borrow() == *y.borrow(),
            (Self::Hash(x), Self::Hash(y)) => {
                if x.ptr_eq(y) {
                    return true;
                }
                let x = x.borrow();
                let y = y.borrow();
                x.len() == y.len() && x.iter().all(
                    |(k, pair)| y.get(k).is_some_and(|other| pair.value == other.value)
                )
            }
            (Self::Function(x), Self::Function(y)) => Gc::ptr_eq(x, y),
            (Self::Builtin(x), Self::Builtin(y)) => x == y,
            (Self::Error(x), Self::Error(y)) => x == y,
            _ => false,
        }
    }
}


thread_local! {
    /// Containers whose rendering is in progress on this thread.
    static RENDERING: RefCell<Vec<*const ()>> = RefCell::new(Vec::new());
}

/// Marks a container as being rendered for as long as the guard lives.
struct RenderGuard(*const ());

impl RenderGuard {
    /// Returns `None` if the container is already being rendered, i.e. it
    /// contains itself.
    fn enter(ptr: *const ()) -> Option<RenderGuard> {
        RENDERING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&ptr) {
                return None;
            }
            stack.push(ptr);
            Some(RenderGuard(ptr))
        })
    }
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        RENDERING.with(|stack| stack.borrow_mut().retain(|ptr| *ptr != self.0));
    }
}


/// A container that (directly or transitively) contains itself renders the
/// inner occurrence as `[...]` or `{...}`.
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(x) => Display::fmt(x, f),
            Self::Boolean(x) => Display::fmt(x, f),
            Self::String(x) => f.write_str(x),
            Self::Null => f.write_str("null"),

            Self::Array(x) => {
                let Some(_guard) = RenderGuard::enter(x.as_ptr()) else {
                    return f.write_str("[...]");
                };
                f.write_str("[")?;
                for (i, element) in x.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(element, f)?;
                }
                f.write_str("]")
            }

            Self::Hash(x) => {
                let Some(_guard) = RenderGuard::enter(x.as_ptr()) else {
                    return f.write_str("{...}");
                };
                f.write_str("{")?;
                for (i, (_, pair)) in x.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                f.write_str("}")
            }

            Self::Function(x) => Display::fmt(&**x, f),
            Self::Builtin(_) => f.write_str("builtin function"),
            Self::Error(x) => write!(f, "ERROR: {}", x),
        }
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(x) => f.debug_tuple("Integer").field(x).finish(),
            Self::Boolean(x) => f.debug_tuple("Boolean").field(x).finish(),
            Self::String(x) => f.debug_tuple("String").field(x).finish(),
            Self::Null => f.write_str("Null"),
            Self::Array(x) => f.debug_tuple("Array").field(&*x.borrow()).finish(),
            Self::Hash(x) => f.debug_tuple("Hash").field(&*x.borrow()).finish(),
            Self::Function(x) => f.debug_tuple("Function").field(&**x).finish(),
            Self::Builtin(x) => Debug::fmt(x, f),
            Self::Error(x) => f.debug_tuple("Error").field(x).finish(),
        }
    }
}


impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::bool(value)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::string(value)
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::string(value)
    }
}

impl From<Error> for Object {
    fn from(value: Error) -> Self {
        Object::Error(value)
    }
}

impl FromIterator<Object> for Object {
    fn from_iter<T: IntoIterator<Item = Object>>(iter: T) -> Self {
        Object::array(iter)
    }
}
