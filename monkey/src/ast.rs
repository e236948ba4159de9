use std::fmt::{Display, Write};
use std::rc::Rc;

use crate::types::{BinOp, Key, UnOp};


/// Write a list of displayable items separated by a delimiter.
fn write_joined<T: Display>(f: &mut std::fmt::Formatter<'_>, items: &[T], sep: &str) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        item.fmt(f)?;
    }
    Ok(())
}


// Block
// ------------------------------------------------------------------------------------------------

/// A braced sequence of statements: the body of a function or a branch of a
/// conditional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Block {
        Block { statements }
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            stmt.fmt(f)?;
        }
        Ok(())
    }
}


// Statement
// ------------------------------------------------------------------------------------------------

/// Enumerates all the statement types in the Monkey language.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A let binding: `let name = value;`
    Let {
        name: Key,
        value: Expr,
    },

    /// A return statement. The value may be omitted, in which case the
    /// function returns null.
    Return(Option<Expr>),

    /// A bare expression whose value becomes the value of the statement.
    Expression(Expr),
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Let { name, value } => write!(f, "let {} = {};", name, value),
            Self::Return(Some(value)) => write!(f, "return {};", value),
            Self::Return(None) => f.write_str("return;"),
            Self::Expression(expr) => expr.fmt(f),
        }
    }
}


// Expr
// ------------------------------------------------------------------------------------------------

/// Enumerates all the expression types in the Monkey language.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An identifier to be looked up by name.
    Identifier(Key),

    /// Integer literal.
    Integer(i64),

    /// String literal. No escape sequences are processed.
    String(String),

    /// Boolean literal.
    Boolean(bool),

    /// The null literal.
    Null,

    /// A prefix operator applied to an operand.
    Prefix {
        operator: UnOp,
        operand: Box<Expr>,
    },

    /// An infix operator applied to two operands.
    Infix {
        left: Box<Expr>,
        operator: BinOp,
        right: Box<Expr>,
    },

    /// `if (condition) { ... } else { ... }`, where the else branch is optional.
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },

    /// `condition ? consequence : alternative`
    Ternary {
        condition: Box<Expr>,
        consequence: Box<Expr>,
        alternative: Box<Expr>,
    },

    /// A function literal. The body is shared with every function object
    /// created from this literal.
    Function {
        parameters: Vec<Key>,
        body: Rc<Block>,
    },

    /// A function call.
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// An array literal.
    Array(Vec<Expr>),

    /// A hash literal, as a list of key-value pairs in source order.
    Hash(Vec<(Expr, Expr)>),

    /// Subscripting: `left[index]`.
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
}

impl Expr {
    pub fn prefix(operator: UnOp, operand: Expr) -> Expr {
        Expr::Prefix { operator, operand: Box::new(operand) }
    }

    pub fn infix(left: Expr, operator: BinOp, right: Expr) -> Expr {
        Expr::Infix { left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn call(function: Expr, arguments: Vec<Expr>) -> Expr {
        Expr::Call { function: Box::new(function), arguments }
    }

    pub fn index(left: Expr, index: Expr) -> Expr {
        Expr::Index { left: Box::new(left), index: Box::new(index) }
    }

    pub fn function(parameters: Vec<Key>, body: Block) -> Expr {
        Expr::Function { parameters, body: Rc::new(body) }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(name) => name.fmt(f),
            Self::Integer(value) => value.fmt(f),
            Self::String(value) => f.write_str(value),
            Self::Boolean(value) => value.fmt(f),
            Self::Null => f.write_str("null"),

            Self::Prefix { operator, operand } => write!(f, "({}{})", operator, operand),
            Self::Infix { left, operator, right } => write!(f, "({} {} {})", left, operator, right),

            Self::If { condition, consequence, alternative } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else {}", alt)?;
                }
                Ok(())
            }

            Self::Ternary { condition, consequence, alternative } => {
                write!(f, "({} ? {} : {})", condition, consequence, alternative)
            }

            Self::Function { parameters, body } => {
                f.write_str("fn(")?;
                write_joined(f, parameters, ", ")?;
                write!(f, ") {}", body)
            }

            Self::Call { function, arguments } => {
                write!(f, "{}(", function)?;
                write_joined(f, arguments, ", ")?;
                f.write_char(')')
            }

            Self::Array(elements) => {
                f.write_char('[')?;
                write_joined(f, elements, ", ")?;
                f.write_char(']')
            }

            Self::Hash(pairs) => {
                f.write_char('{')?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_char('}')
            }

            Self::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}


// Program
// ------------------------------------------------------------------------------------------------

/// The root node: a whole source file or one line of REPL input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            stmt.fmt(f)?;
        }
        Ok(())
    }
}
