//! The tree-walking evaluator.
//!
//! Internally every evaluation step returns `Result<_, Signal>`. A signal is
//! either an early `return` or a runtime error; both unwind through the `?`
//! operator until something handles them. Returns are caught at the nearest
//! function call boundary. Errors are never caught: they reach the top level
//! (see [`eval_program`]) and become [`Object::Error`] values there.
//!
//! Every step also carries the output stream of the evaluation, which is where
//! builtins such as `puts` write.

use std::io::Write;

use gc::Gc;
use log::trace;

use crate::ast::{Block, Expr, Program, Statement};
use crate::builtins;
use crate::env::Env;
use crate::error::{Arity, Error, Lookup, Reason, TypeMismatch};
use crate::object::{Function, Hash, HashPair, Object};
use crate::types::{BinOp, GcCell, Key, UnOp};


/// A non-local exit from an evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A `return` statement was executed with this value.
    Return(Object),

    /// A runtime error occurred.
    Error(Error),
}

impl From<Error> for Signal {
    fn from(value: Error) -> Self {
        Signal::Error(value)
    }
}

type Res<T> = Result<T, Signal>;


/// Evaluate a program in the given environment.
///
/// Returns `None` if no value was produced, which is the case if the program
/// is empty or if its last statement is a let binding. A `return` at the top
/// level stops evaluation and yields the returned value. A runtime error stops
/// evaluation and yields an [`Object::Error`].
pub fn eval_program(program: &Program, env: &Env, out: &mut dyn Write) -> Option<Object> {
    let mut result = None;

    for stmt in &program.statements {
        match eval_statement(stmt, env, out) {
            Ok(value) => { result = value; }
            Err(Signal::Return(value)) => { return Some(value); }
            Err(Signal::Error(err)) => {
                trace!("evaluation stopped: {}", err);
                return Some(Object::Error(err));
            }
        }
    }

    result
}


/// Evaluate a block of statements in sequence. The value of a block is the
/// value of its last statement, or null if there is none.
pub fn eval_block(block: &Block, env: &Env, out: &mut dyn Write) -> Res<Object> {
    let mut result = Object::NULL;
    for stmt in &block.statements {
        result = eval_statement(stmt, env, out)?.unwrap_or(Object::NULL);
    }
    Ok(result)
}


/// Evaluate a single statement. Let bindings produce no value.
pub fn eval_statement(stmt: &Statement, env: &Env, out: &mut dyn Write) -> Res<Option<Object>> {
    match stmt {
        Statement::Let { name, value } => {
            if builtins::lookup(*name).is_some() {
                return Err(Error::new(Lookup::Builtin(*name)).into());
            }
            let value = eval(value, env, out)?;
            env.set(*name, value);
            Ok(None)
        }

        Statement::Return(value) => {
            let value = match value {
                Some(expr) => eval(expr, env, out)?,
                None => Object::NULL,
            };
            Err(Signal::Return(value))
        }

        Statement::Expression(expr) => eval(expr, env, out).map(Some),
    }
}


/// Evaluate an expression.
pub fn eval(expr: &Expr, env: &Env, out: &mut dyn Write) -> Res<Object> {
    match expr {
        Expr::Identifier(name) => eval_identifier(*name, env),
        Expr::Integer(value) => Ok(Object::Integer(*value)),
        Expr::String(value) => Ok(Object::string(value)),
        Expr::Boolean(value) => Ok(Object::bool(*value)),
        Expr::Null => Ok(Object::NULL),

        Expr::Prefix { operator, operand } => {
            let operand = eval(operand, env, out)?;
            Ok(eval_prefix(*operator, &operand)?)
        }

        Expr::Infix { left, operator, right } => {
            let left = eval(left, env, out)?;
            let right = eval(right, env, out)?;
            Ok(eval_infix(*operator, &left, &right)?)
        }

        Expr::If { condition, consequence, alternative } => {
            if eval(condition, env, out)?.truthy() {
                eval_block(consequence, env, out)
            } else if let Some(alt) = alternative {
                eval_block(alt, env, out)
            } else {
                Ok(Object::NULL)
            }
        }

        Expr::Ternary { condition, consequence, alternative } => {
            if eval(condition, env, out)?.truthy() {
                eval(consequence, env, out)
            } else {
                eval(alternative, env, out)
            }
        }

        Expr::Function { parameters, body } => Ok(Object::Function(Gc::new(
            Function::new(parameters.clone(), body.clone(), env.clone())
        ))),

        Expr::Call { function, arguments } => {
            let function = eval(function, env, out)?;
            let args = eval_all(arguments, env, out)?;
            apply(&function, &args, out)
        }

        Expr::Array(elements) => Ok(Object::array(eval_all(elements, env, out)?)),

        Expr::Hash(pairs) => {
            let mut hash = Hash::new();
            for (key_expr, value_expr) in pairs {
                let key = eval(key_expr, env, out)?;
                let hash_key = key.hash_key()?;
                let value = eval(value_expr, env, out)?;
                hash.insert(hash_key, HashPair { key, value });
            }
            Ok(Object::Hash(GcCell::new(hash)))
        }

        Expr::Index { left, index } => {
            let left = eval(left, env, out)?;
            let index = eval(index, env, out)?;
            Ok(eval_index(&left, &index)?)
        }
    }
}


/// Evaluate a list of expressions left to right, stopping at the first signal.
fn eval_all(exprs: &[Expr], env: &Env, out: &mut dyn Write) -> Res<Vec<Object>> {
    exprs.iter().map(|expr| eval(expr, env, out)).collect()
}


/// Resolve a name: first in scope, then among the builtins.
fn eval_identifier(name: Key, env: &Env) -> Res<Object> {
    env.get(name)
        .or_else(|| builtins::lookup(name).map(Object::Builtin))
        .ok_or_else(|| Error::new(Lookup::Unbound(name)).into())
}


fn eval_prefix(operator: UnOp, operand: &Object) -> Result<Object, Error> {
    match (operator, operand) {
        (UnOp::LogicalNegate, x) => Ok(Object::bool(!x.truthy())),
        (UnOp::ArithmeticalNegate, Object::Integer(x)) => Ok(Object::Integer(x.wrapping_neg())),
        (UnOp::ArithmeticalNegate, x) => Err(Error::new(TypeMismatch::UnOp(operator, x.type_of()))),
    }
}


fn eval_infix(operator: BinOp, left: &Object, right: &Object) -> Result<Object, Error> {
    match (left, right) {
        (Object::Integer(x), Object::Integer(y)) => eval_integer_infix(operator, *x, *y),

        (Object::String(x), Object::String(y)) if operator == BinOp::Add => {
            let mut result = String::with_capacity(x.len() + y.len());
            result.push_str(x);
            result.push_str(y);
            Ok(Object::string(result))
        }

        // Null compares unequal to anything but itself, and booleans compare
        // among themselves.
        (Object::Null, _) | (_, Object::Null) | (Object::Boolean(_), Object::Boolean(_))
            if matches!(operator, BinOp::Equal | BinOp::NotEqual) =>
        {
            let same = left.same(right);
            Ok(Object::bool(if operator == BinOp::Equal { same } else { !same }))
        }

        _ if left.type_of() != right.type_of() => {
            Err(Error::new(TypeMismatch::Operands(left.type_of(), operator, right.type_of())))
        }

        _ => Err(Error::new(TypeMismatch::BinOp(left.type_of(), operator, right.type_of()))),
    }
}


/// Integer arithmetic wraps on overflow. Division truncates toward zero.
fn eval_integer_infix(operator: BinOp, x: i64, y: i64) -> Result<Object, Error> {
    Ok(match operator {
        BinOp::Add => Object::Integer(x.wrapping_add(y)),
        BinOp::Subtract => Object::Integer(x.wrapping_sub(y)),
        BinOp::Multiply => Object::Integer(x.wrapping_mul(y)),
        BinOp::Divide => {
            if y == 0 {
                return Err(Error::new(Reason::DivisionByZero));
            }
            Object::Integer(x.wrapping_div(y))
        }
        BinOp::Less => Object::bool(x < y),
        BinOp::Greater => Object::bool(x > y),
        BinOp::Equal => Object::bool(x == y),
        BinOp::NotEqual => Object::bool(x != y),
    })
}


/// Subscript an array or a hash. Out-of-range array indices and missing hash
/// keys both yield null.
fn eval_index(left: &Object, index: &Object) -> Result<Object, Error> {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => {
            let elements = elements.borrow();
            Ok(usize::try_from(*i).ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .unwrap_or(Object::NULL))
        }

        (Object::Hash(hash), _) => {
            let key = index.hash_key()?;
            Ok(hash.borrow().get(&key).map_or(Object::NULL, |pair| pair.value.clone()))
        }

        _ => Err(Error::new(Lookup::Index(left.type_of()))),
    }
}


/// Call a function or a builtin with already evaluated arguments.
///
/// A `return` inside a user-defined function is caught here and becomes the
/// value of the call.
pub fn apply(function: &Object, args: &[Object], out: &mut dyn Write) -> Res<Object> {
    match function {
        Object::Builtin(builtin) => Ok(builtin.call(args, out)?),

        Object::Function(func) => {
            if let Some(reason) = Arity::check(func.parameters.len(), args.len()) {
                return Err(Error::new(reason).into());
            }

            let env = Env::enclosed(&func.env);
            for (name, value) in func.parameters.iter().zip(args) {
                env.set(*name, value.clone());
            }

            match eval_block(&func.body, &env, out) {
                Err(Signal::Return(value)) => Ok(value),
                other => other,
            }
        }

        _ => Err(Error::new(Reason::Call(function.type_of())).into()),
    }
}
