#[macro_use]
extern crate lazy_static;

pub mod ast;
mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexing;
pub mod object;
pub mod parsing;
pub mod repl;
pub mod types;

#[cfg(test)]
mod tests;

use std::fs::read_to_string;
use std::io::{self, sink, Write};
use std::path::Path;

use log::{debug, trace};

pub use env::Env;
pub use object::Object;
pub use parsing::parse;


/// Write parse errors under the standard banner, one tab-indented message per
/// line.
pub fn print_parser_errors(out: &mut impl Write, errors: &[String]) -> io::Result<()> {
    writeln!(out, "Woops! We ran into some monkey business here!")?;
    writeln!(out, " parser errors:")?;
    for msg in errors {
        writeln!(out, "\t{}", msg)?;
    }
    Ok(())
}


/// Parse and evaluate source code against an environment, writing parse
/// errors (if any) and then the resulting value (if any) to `out`. Output
/// from `puts` goes to `out` as well, as it happens.
///
/// Parse errors do not prevent evaluation: every statement that did parse is
/// evaluated.
pub fn run(code: &str, env: &Env, out: &mut impl Write) -> io::Result<()> {
    let (program, errors) = parse(code);
    if !errors.is_empty() {
        debug!("{} parse error(s)", errors.len());
        print_parser_errors(out, &errors)?;
    }

    if let Some(value) = eval::eval_program(&program, env, out) {
        trace!("result of type {}", value.type_of());
        writeln!(out, "{}", value)?;
    }

    Ok(())
}


/// Evaluate source code in a fresh environment and return the resulting value,
/// if any. Parse errors are ignored, and so is output from `puts`.
pub fn eval_str(code: &str) -> Option<Object> {
    let (program, _) = parse(code);
    eval::eval_program(&program, &Env::new(), &mut sink())
}


/// Read a file and run it in a fresh environment. See [`run`].
pub fn run_file(path: &Path, out: &mut impl Write) -> io::Result<()> {
    debug!("running {}", path.display());
    let contents = read_to_string(path)?;
    run(&contents, &Env::new(), out)
}
