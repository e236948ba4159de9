//! Runtime and syntax errors.
//!
//! A runtime [`Error`] is an ordinary value in Monkey: native functions return
//! it, the evaluator relays it untouched up to the nearest top-level entry
//! point, and the driver prints it like any other object. Its [`Reason`]
//! enumerates what went wrong; the rendered message is the Monkey wording
//! (e.g. `type mismatch: INTEGER + BOOLEAN`).

use std::fmt::Display;

use gc::{Finalize, Trace};
use thiserror::Error as ThisError;

use crate::lexing::TokenType;
use crate::types::{BinOp, Key, Type, UnOp};


/// Wrong number of arguments to a builtin or a user-defined function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Arity {
    #[error("Too few arguments, expected {expected}, got {received}")]
    TooFew { expected: usize, received: usize },

    #[error("Too many arguments, expected {expected}, got {received}")]
    TooMany { expected: usize, received: usize },
}

impl Arity {
    /// Check an exact argument count. Returns `None` if the count matches.
    pub fn check(expected: usize, received: usize) -> Option<Arity> {
        if received < expected {
            Some(Arity::TooFew { expected, received })
        } else if received > expected {
            Some(Arity::TooMany { expected, received })
        } else {
            None
        }
    }
}


/// Operand or argument types that an operation does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum TypeMismatch {
    /// A type was incompatible with a prefix operator.
    #[error("unknown operator: {0}{1}")]
    UnOp(UnOp, Type),

    /// Two operands of the same type were incompatible with an infix operator.
    #[error("unknown operator: {0} {1} {2}")]
    BinOp(Type, BinOp, Type),

    /// Two operands of different types met in an infix operator.
    #[error("type mismatch: {0} {1} {2}")]
    Operands(Type, BinOp, Type),

    /// A builtin received an argument of a type it can't handle at all.
    #[error("argument to `{0}` not supported, got {1}")]
    UnsupportedArg(&'static str, Type),

    /// A builtin expected an argument of a specific type.
    #[error("argument to `{builtin}` must be {expected}, got {received}")]
    ExpectedArg {
        builtin: &'static str,
        expected: Type,
        received: Type,
    },

    /// A builtin required a non-empty array.
    #[error("argument to `{0}` must be a non-empty ARRAY")]
    EmptyArray(&'static str),
}


/// Failed name or index resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Lookup {
    /// An identifier bound neither in scope nor in the builtin registry.
    #[error("identifier not found: {0}")]
    Unbound(Key),

    /// Attempted to index something that is not an array or a hash.
    #[error("index operator not supported: {0}")]
    Index(Type),

    /// Attempted to shadow a builtin with a let binding.
    #[error("can't assign to {0}, it is a builtin function")]
    Builtin(Key),
}


/// Enumerates all possible reasons for a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Reason {
    #[error(transparent)]
    Arity(#[from] Arity),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    #[error(transparent)]
    Lookup(#[from] Lookup),

    /// Attempted to call a non-callable value.
    #[error("not a function: {0}")]
    Call(Type),

    /// Attempted to use a non-hashable value as a hash key.
    #[error("unusable as hash key: {0}")]
    HashKey(Type),

    /// Integer division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// A builtin failed to write to the output stream.
    #[error("could not write output")]
    Output,
}


/// A runtime error.
#[derive(Debug, Clone, PartialEq, Eq, Trace, Finalize)]
pub struct Error {
    #[unsafe_ignore_trace]
    reason: Reason,
}

impl Error {
    /// Construct a new error from anything that converts to a [`Reason`].
    pub fn new<T>(reason: T) -> Error where Reason: From<T> {
        Error { reason: Reason::from(reason) }
    }

    /// The user-facing message, without the `ERROR: ` prefix that
    /// `inspect` adds.
    pub fn message(&self) -> String {
        self.reason.to_string()
    }
}

impl From<Reason> for Error {
    fn from(reason: Reason) -> Self {
        Error { reason }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.reason.fmt(f)
    }
}

impl std::error::Error for Error {}


/// Enumerates all the possible reasons for a syntax error.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SyntaxError {
    /// Expected one kind of token but found another.
    #[error("expected next token to be {expected}, got {found} instead")]
    Expected {
        expected: TokenType,
        found: TokenType,
    },

    /// A token that cannot begin an expression.
    #[error("no prefix parse function for {0} found")]
    NoPrefix(TokenType),

    /// An integer literal outside the 64-bit signed range.
    #[error("could not parse {0} as integer")]
    Integer(String),

    /// Catch-all for failures reported by parser combinators.
    #[error("unexpected {0}")]
    Unexpected(TokenType),
}
