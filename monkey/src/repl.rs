//! Interactive read-eval-print loop.

use std::io::{self, Write};
use std::path::PathBuf;

use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};

use crate::env::Env;
use crate::run;

pub const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".monkey_history";


fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}


/// The greeting printed when a session starts.
pub fn greeting(user: &str) -> String {
    format!("Hello {}! This is the Monkey programming language!", user)
}


/// REPL state. The environment persists across lines for the whole session.
pub struct Repl {
    editor: DefaultEditor,
    env: Env,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new session. If `history` is set, line history is loaded from
    /// and saved to `~/.monkey_history`.
    pub fn new(history: bool) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = if history { home_dir().map(|h| h.join(HISTORY_FILE)) } else { None };

        if let Some(path) = &history_path {
            if editor.load_history(path).is_err() {
                debug!("no history loaded from {}", path.display());
            }
        }

        Ok(Repl {
            editor,
            env: Env::new(),
            history_path,
        })
    }

    /// Run the loop until end of input.
    pub fn run(&mut self, out: &mut impl Write) -> RlResult<()> {
        let user = std::env::var("USER").unwrap_or_else(|_| "there".to_owned());
        writeln!(out, "{}", greeting(&user))?;
        writeln!(out, "Feel free to type in commands")?;
        debug!("session started");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line.as_str());
                    self.eval_line(&line, out)?;
                }
                Err(ReadlineError::Interrupted) => {
                    writeln!(out, "^C")?;
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    warn!("readline failed: {}", err);
                    return Err(err);
                }
            }
        }

        if let Some(path) = &self.history_path {
            if let Err(err) = self.editor.save_history(path) {
                warn!("could not save history to {}: {}", path.display(), err);
            }
        }

        debug!("session ended");
        Ok(())
    }

    /// Evaluate one line of input against the session environment, writing
    /// parse errors and the resulting value to `out`.
    pub fn eval_line(&self, line: &str, out: &mut impl Write) -> io::Result<()> {
        run(line, &self.env, out)
    }
}
