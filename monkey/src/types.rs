use std::fmt::{Debug, Display};
use std::hash::Hash;

use gc::custom_trace;
use indexmap::{map::Iter, IndexMap};
use symbol_table::GlobalSymbol;

/// Type used for all interned strings: identifiers, parameter names and
/// string hash keys.
pub type Key = GlobalSymbol;


/// Enumeration of all the different types a Monkey object can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// i64
    Integer,

    /// bool
    Boolean,

    /// Immutable text
    String,

    /// The empty variant
    Null,

    /// Vec<Object>
    Array,

    /// Map from hash keys to key-value pairs
    Hash,

    /// User-defined closure
    Function,

    /// Native function
    Builtin,

    /// Runtime error surfaced as a value
    Error,
}

// These names appear verbatim in error messages, e.g. 'type mismatch: INTEGER + BOOLEAN'.
impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => f.write_str("INTEGER"),
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::String => f.write_str("STRING"),
            Self::Null => f.write_str("NULL"),
            Self::Array => f.write_str("ARRAY"),
            Self::Hash => f.write_str("HASH"),
            Self::Function => f.write_str("FUNCTION"),
            Self::Builtin => f.write_str("BUILTIN"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}


/// A garbage-collected, shared and interior-mutable cell. Cloning a `GcCell`
/// aliases the same storage.
#[derive(gc::Trace, gc::Finalize)]
pub struct GcCell<T: gc::Trace + 'static>(gc::Gc<gc::GcCell<T>>);

impl<T: gc::Trace> Clone for GcCell<T> {
    fn clone(&self) -> Self {
        GcCell(self.0.clone())
    }
}

impl<T: gc::Trace> GcCell<T> {
    pub fn new(obj: T) -> GcCell<T> {
        GcCell(gc::Gc::new(gc::GcCell::new(obj)))
    }

    pub fn borrow(&self) -> gc::GcCellRef<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> gc::GcCellRefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Identity comparison: true if both cells alias the same storage.
    pub fn ptr_eq(&self, other: &GcCell<T>) -> bool {
        gc::Gc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared storage, usable as an identity token.
    pub fn as_ptr(&self) -> *const () {
        &*self.0 as *const gc::GcCell<T> as *const ()
    }
}

impl<T: gc::Trace + Debug> Debug for GcCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&*self.0.borrow(), f)
    }
}


/// Insertion-ordered map whose values are traced by the garbage collector.
/// Keys are never traced, so they must not hold GC pointers.
#[derive(Clone, Debug)]
pub struct OrderedMap<K, V>(IndexMap<K, V>);

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.0.iter()
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    pub fn get(&self, k: &K) -> Option<&V> {
        self.0.get(k)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }
}

impl<K, V: gc::Finalize> gc::Finalize for OrderedMap<K, V> {
    fn finalize(&self) {
        for (_, v) in self {
            v.finalize();
        }
    }
}

unsafe impl<K, V: gc::Trace> gc::Trace for OrderedMap<K, V> {
    custom_trace!(this, {
        for (_, v) in this {
            mark(v);
        }
    });
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = <&'a IndexMap<K, V> as IntoIterator>::Item;
    type IntoIter = <&'a IndexMap<K, V> as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        (&self.0).into_iter()
    }
}


/// Enumerates all the prefix operators in the Monkey language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Arithmetical negation (unary minus)
    ArithmeticalNegate,

    /// Logical negation (bang)
    LogicalNegate,
}

impl Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArithmeticalNegate => f.write_str("-"),
            Self::LogicalNegate => f.write_str("!"),
        }
    }
}


/// Enumerates all the infix operators in the Monkey language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition, or concatenation of strings
    Add,

    /// Subtraction
    Subtract,

    /// Multiplication
    Multiply,

    /// Truncating integer division
    Divide,

    /// Less-than
    Less,

    /// Greater-than
    Greater,

    /// Equality
    Equal,

    /// Inequality
    NotEqual,
}

impl Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => f.write_str("+"),
            Self::Subtract => f.write_str("-"),
            Self::Multiply => f.write_str("*"),
            Self::Divide => f.write_str("/"),
            Self::Less => f.write_str("<"),
            Self::Greater => f.write_str(">"),
            Self::Equal => f.write_str("=="),
            Self::NotEqual => f.write_str("!="),
        }
    }
}
