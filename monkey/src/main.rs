use std::io::stdout;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::debug;

use monkey::repl::Repl;
use monkey::{run, run_file, Env};

/// The Monkey programming language.
///
/// With no arguments, start an interactive session. With a path, run that
/// file and print the final value.
#[derive(Parser)]
#[command(name = "monkey")]
struct Cli {
    /// Evaluate this code instead of reading a file
    #[arg(short = 'c', long = "code")]
    code: Option<String>,

    /// Don't load or save the interactive history file
    #[arg(long = "no-history")]
    no_history: bool,

    /// Program file to run
    paths: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Cli::parse();
    let mut out = stdout().lock();

    if let Some(code) = args.code {
        debug!("mode: inline code");
        if let Err(err) = run(&code, &Env::new(), &mut out) {
            eprintln!("Error: {}", err);
            exit(1);
        }
        return;
    }

    match args.paths.as_slice() {
        [] => {
            debug!("mode: interactive");
            let result = Repl::new(!args.no_history).and_then(|mut repl| repl.run(&mut out));
            if let Err(err) = result {
                eprintln!("Error: {}", err);
                exit(1);
            }
        }

        [path] => {
            debug!("mode: file");
            if let Err(err) = run_file(path, &mut out) {
                eprintln!("Error: {}: {}", path.display(), err);
                exit(1);
            }
        }

        _ => {
            println!("Usage: monkey [PATH]");
            println!("Only a single program file is supported.");
        }
    }
}
