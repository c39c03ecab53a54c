//! Error Handling for the XD Interpreter
//!
//! This module defines the error system used throughout the interpreter
//! pipeline. Every phase reports failures through its own taxonomy so that a
//! diagnostic always names the phase that produced it and, where one is
//! known, the source position it refers to.
//!
//! ## Error Categories
//!
//! ### Lexical Errors (`LexerError`)
//! - Unknown or malformed tokens
//! - Identifier, integer, float and string limits
//! - Invalid escape sequences and unterminated strings
//!
//! ### Syntax Errors (`ParserError`)
//! - Missing delimiters (`(`, `)`, `{`, `}`)
//! - Missing names, expressions, parameters or arguments
//! - Unexpected tokens at the program level
//!
//! ### Runtime Errors (`InterpreterError`)
//! - Duplicate and undefined names
//! - Type errors in binary/unary operations and builtin arguments
//! - Division by zero, bad dot accesses, argument counts, recursion depth
//!
//! ## Error Flow
//!
//! Errors propagate through the pipeline using Rust's `Result` type:
//! ```text
//! Source Code → Lexer → Parser → Interpreter → Output
//!      |           |        |           |
//!  LexerError ParserError InterpreterError  Success
//! ```
//!
//! All three converge into [`XdError`] at the top level, where the file
//! runner turns them into a diagnostic line and a nonzero exit status, and
//! the interactive prompt prints them and keeps going.

use std::error::Error;
use std::fmt;

use crate::lexer::{IDENTIFIER_MAX_LENGTH, STRING_MAX_LENGTH};

/// A location in the source text, 1-based in both coordinates.
///
/// Lines advance on `\n`; the column resets to 1 on a newline and increments
/// on every other consumed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line: {}, Column: {}", self.line, self.column)
    }
}

/// The distinct ways tokenization can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LexerErrorKind {
    /// No token rule matched the current character.
    UnknownToken,
    /// An identifier ran past [`IDENTIFIER_MAX_LENGTH`] characters.
    IdentifierTooLong,
    /// An integer literal does not fit a signed 64-bit value.
    IntegerOverflow,
    /// A float literal carries more fractional digits than are representable.
    FloatOverflow,
    /// A string literal hit a raw newline or the end of the source.
    UnterminatedString,
    /// A string literal ran past [`STRING_MAX_LENGTH`] characters.
    StringTooLong,
    /// A backslash escape other than `\n`, `\t`, `\"` or `\\`.
    InvalidEscape(char),
    /// A lone `&` or `|`; the language only has the doubled forms.
    IncompleteOperator(char),
}

impl fmt::Display for LexerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexerErrorKind::UnknownToken => write!(f, "Unknown token"),
            LexerErrorKind::IdentifierTooLong => write!(
                f,
                "Identifier exceeds the maximum length of {}",
                IDENTIFIER_MAX_LENGTH
            ),
            LexerErrorKind::IntegerOverflow => write!(f, "Integer overflow"),
            LexerErrorKind::FloatOverflow => write!(f, "Float overflow"),
            LexerErrorKind::UnterminatedString => write!(f, "Unterminated string literal"),
            LexerErrorKind::StringTooLong => write!(
                f,
                "String exceeds the maximum length of {}",
                STRING_MAX_LENGTH
            ),
            LexerErrorKind::InvalidEscape(c) => {
                write!(f, "Invalid escape character '\\{}'", c)
            }
            LexerErrorKind::IncompleteOperator(c) => write!(f, "Expected '{}{}'", c, c),
        }
    }
}

/// A tokenization failure at a known position.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub position: Position,
}

impl LexerError {
    pub fn new(kind: LexerErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.position)
    }
}

/// The distinct ways parsing can fail.
///
/// Each variant maps to one grammar rule that could not be completed; the
/// message names the token the parser was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErrorKind {
    UnexpectedToken,
    ExpectedFunctionName,
    ExpectedLeftParenAfterFunctionName,
    ExpectedRightParenAfterParameters,
    ExpectedBlock,
    ExpectedParameterAfterComma,
    ExpectedRightBrace,
    ExpectedLoopVariable,
    ExpectedIn,
    ExpectedExpression,
    ExpectedCondition,
    ExpectedVariableName,
    ExpectedAssignmentOrCall,
    ExpectedRightParenAfterCall,
    ExpectedArgumentAfterComma,
    ExpectedRightParenAfterExpression,
    ExpectedIdentifierAfterDot,
}

impl fmt::Display for ParserErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let message = match self {
            ParserErrorKind::UnexpectedToken => "Unexpected token",
            ParserErrorKind::ExpectedFunctionName => "Expected function name",
            ParserErrorKind::ExpectedLeftParenAfterFunctionName => {
                "Expected '(' after function name"
            }
            ParserErrorKind::ExpectedRightParenAfterParameters => {
                "Expected ')' after function parameters"
            }
            ParserErrorKind::ExpectedBlock => "Expected block",
            ParserErrorKind::ExpectedParameterAfterComma => "Expected parameter after ','",
            ParserErrorKind::ExpectedRightBrace => "Expected '}' to close block",
            ParserErrorKind::ExpectedLoopVariable => "Expected loop variable",
            ParserErrorKind::ExpectedIn => "Expected 'in'",
            ParserErrorKind::ExpectedExpression => "Expected expression",
            ParserErrorKind::ExpectedCondition => "Expected condition",
            ParserErrorKind::ExpectedVariableName => "Expected variable name",
            ParserErrorKind::ExpectedAssignmentOrCall => {
                "Expected '(' or '=' after identifier"
            }
            ParserErrorKind::ExpectedRightParenAfterCall => {
                "Expected ')' to close function call"
            }
            ParserErrorKind::ExpectedArgumentAfterComma => "Expected argument after ','",
            ParserErrorKind::ExpectedRightParenAfterExpression => {
                "Expected ')' after expression"
            }
            ParserErrorKind::ExpectedIdentifierAfterDot => "Expected identifier after '.'",
        };
        f.write_str(message)
    }
}

/// A syntax failure at a known position.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub position: Position,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.position)
    }
}

/// The distinct ways evaluation can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpreterErrorKind {
    DuplicateFunctionDeclaration(String),
    DuplicateVariableDeclaration(String),
    UndefinedFunction(String),
    UndefinedVariable(String),
    DivisionByZero,
    /// Operand types do not fit the binary operator.
    TypeBinary,
    /// Operand type does not fit the unary operator.
    TypeUnary,
    /// A builtin or loop received a value of the wrong type; carries the
    /// name of the operation that rejected it.
    UnexpectedType(String),
    /// A dot call that is not `toUpper`/`toLower` on a string.
    UnexpectedMethod(String),
    /// A dot read that is not `length` on a string.
    UnexpectedAttribute(String),
    InvalidArgsCount(String),
    RecursionLimit,
}

impl fmt::Display for InterpreterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InterpreterErrorKind::DuplicateFunctionDeclaration(name) => {
                write!(f, "Function '{}' already declared", name)
            }
            InterpreterErrorKind::DuplicateVariableDeclaration(name) => {
                write!(f, "Variable '{}' already declared", name)
            }
            InterpreterErrorKind::UndefinedFunction(name) => {
                write!(f, "Function '{}' not defined", name)
            }
            InterpreterErrorKind::UndefinedVariable(name) => {
                write!(f, "Variable '{}' not defined", name)
            }
            InterpreterErrorKind::DivisionByZero => {
                write!(f, "Division by zero is not allowed")
            }
            InterpreterErrorKind::TypeBinary => {
                write!(f, "Invalid operand types for binary operator")
            }
            InterpreterErrorKind::TypeUnary => {
                write!(f, "Invalid operand type for unary operator")
            }
            InterpreterErrorKind::UnexpectedType(name) => {
                write!(f, "Invalid argument type for {}", name)
            }
            InterpreterErrorKind::UnexpectedMethod(name) => {
                write!(f, "Invalid method '{}' in dot call", name)
            }
            InterpreterErrorKind::UnexpectedAttribute(name) => {
                write!(f, "Invalid attribute '{}' in dot access", name)
            }
            InterpreterErrorKind::InvalidArgsCount(name) => {
                write!(f, "Invalid argument count for '{}'", name)
            }
            InterpreterErrorKind::RecursionLimit => {
                write!(f, "Maximum recursion depth exceeded")
            }
        }
    }
}

/// A runtime failure, with the nearest known source position.
///
/// A few sites (the scope table in particular) cannot know where in the
/// source they were triggered from; they construct the error without a
/// position and the evaluator fills one in via [`with_position`] before the
/// error leaves the statement that caused it.
///
/// [`with_position`]: InterpreterError::with_position
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterError {
    pub kind: InterpreterErrorKind,
    pub position: Option<Position>,
}

impl InterpreterError {
    pub fn new(kind: InterpreterErrorKind) -> Self {
        Self { kind, position: None }
    }

    pub fn at(kind: InterpreterErrorKind, position: Position) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }

    /// Attaches a position if the error does not already carry one.
    pub fn with_position(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{}: {}", self.kind, position),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Top-level error type for a full interpreter run.
///
/// Wraps the three phase taxonomies plus I/O failures from reading source
/// files or writing program output.
#[derive(Debug, Clone, PartialEq)]
pub enum XdError {
    Lexer(LexerError),
    Parser(ParserError),
    Interpreter(InterpreterError),
    Io(String),
}

impl fmt::Display for XdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            XdError::Lexer(e) => write!(f, "Lexical error: {}", e),
            XdError::Parser(e) => write!(f, "Syntax error: {}", e),
            XdError::Interpreter(e) => write!(f, "Runtime error: {}", e),
            XdError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl Error for XdError {}

impl From<LexerError> for XdError {
    fn from(e: LexerError) -> Self {
        XdError::Lexer(e)
    }
}

impl From<ParserError> for XdError {
    fn from(e: ParserError) -> Self {
        XdError::Parser(e)
    }
}

impl From<InterpreterError> for XdError {
    fn from(e: InterpreterError) -> Self {
        XdError::Interpreter(e)
    }
}

impl From<std::io::Error> for XdError {
    fn from(e: std::io::Error) -> Self {
        XdError::Io(e.to_string())
    }
}

/// Convenience alias used by every phase of the pipeline.
pub type Result<T> = std::result::Result<T, XdError>;
