//! Function implementation.

use std::fmt::{Debug, Display};
use std::io::Write;
use std::rc::Rc;

use gc::{Finalize, Trace};

use super::Object;
use crate::ast::Block;
use crate::env::Env;
use crate::error::Error;
use crate::types::Key;


/// A builtin function is a native function implemented in Rust associated
/// with a name. Builtins are found by name in the registry (see
/// [`crate::builtins::BUILTINS`]) when an identifier isn't bound in scope.
///
/// Builtins that produce output write it to the sink of the current
/// evaluation, never directly to the process stdout.
#[derive(Copy, Clone)]
pub struct Builtin {
    /// The rust callable for evaluating the function.
    pub func: fn(&[Object], &mut dyn Write) -> Result<Object, Error>,

    /// The name of the function.
    pub name: &'static str,
}

impl Builtin {
    pub fn call(&self, args: &[Object], out: &mut dyn Write) -> Result<Object, Error> {
        (self.func)(args, out)
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Builtin").field(&self.name).finish()
    }
}

// Builtins are compared by name: the registry holds exactly one callable per
// name.
impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}


/// A user-defined function: a parameter list and a body, closed over the
/// environment that was active where the function literal was evaluated.
///
/// The closure environment may (directly or transitively) contain this very
/// function, e.g. for recursive functions bound with `let`. Such cycles are
/// reclaimed by the garbage collector.
#[derive(Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Vec<Key>,

    #[unsafe_ignore_trace]
    pub body: Rc<Block>,

    pub env: Env,
}

impl Function {
    pub fn new(parameters: Vec<Key>, body: Rc<Block>, env: Env) -> Function {
        Function { parameters, body, env }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(param, f)?;
        }
        write!(f, ") {{\n{}\n}}", self.body)
    }
}

// The environment is deliberately left out: it usually contains the function
// itself.
impl Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}
