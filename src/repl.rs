//! Line-oriented interactive prompt.
//!
//! One [`Interpreter`] lives for the whole session, so functions and
//! top-level variables accumulate across input lines. Errors are printed
//! and the session keeps going with the environment intact; only the
//! evaluator's transient state (frames, recursion counter, pending return)
//! is reset after a failed line.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::error::Result;
use crate::interpreter::{self, Interpreter};

/// Runs the prompt until `/exit` or end of input.
pub fn run() -> Result<()> {
    println!("Enter /exit to finish:");
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!(">>> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line == "/exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Err(error) = interpreter::run_source(&mut interpreter, line) {
            eprintln!("{}", error.to_string().red());
            interpreter.reset();
        }
    }
    Ok(())
}
