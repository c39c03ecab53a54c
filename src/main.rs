//! XD - Interpreter for the XD Scripting Language
//!
//! This is the entry point for `xd`, a tree-walking interpreter for a small
//! dynamically typed scripting language. Given a `.xd` source file it runs
//! the file; given no arguments it opens a line-oriented interactive prompt
//! that keeps definitions alive between entries.
//!
//! ## Architecture Overview
//!
//! The interpreter is a straight pipeline of modules:
//! - **reader**: positioned character stream over the source text
//! - **lexer**: tokenizes the character stream into positioned tokens
//! - **parser**: recursive descent over the token stream, producing the AST
//! - **ast**: node types for statements, expressions and runtime values
//! - **environment**: the global scope, call frames and function table
//! - **builtin**: the fixed set of functions every program can call
//! - **interpreter**: walks the AST and executes it
//! - **repl**: the interactive prompt
//! - **error**: lexer/parser/interpreter error taxonomies with positions
//!
//! ## Exit Behavior
//!
//! A clean run exits 0. Any lexer, parser or interpreter error reaching the
//! top level is written to stderr as one diagnostic line and the process
//! exits 1. The interactive prompt reports errors inline instead and only
//! ends on `/exit` or end of input.

mod ast;
mod builtin;
mod environment;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod reader;
mod repl;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as CParser;
use log::debug;

use crate::interpreter::Interpreter;

#[derive(CParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Source file to run (.xd); opens the interactive prompt when omitted
    source: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();

    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    simple_logger::init_with_level(level).unwrap();

    let result = match &args.source {
        Some(path) => {
            if path.extension().and_then(|e| e.to_str()) != Some("xd") {
                eprintln!("Only .xd files are supported");
                process::exit(1);
            }
            run_file(path)
        }
        None => repl::run(),
    };

    if let Err(error) = result {
        eprintln!("{}", error);
        process::exit(1);
    }
}

/// Loads and runs a single source file.
fn run_file(path: &Path) -> error::Result<()> {
    let source = fs::read_to_string(path)?;
    debug!("loaded {} ({} bytes)", path.display(), source.len());

    let mut interpreter = Interpreter::new();
    interpreter::run_source(&mut interpreter, &source)
}
