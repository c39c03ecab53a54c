//! Built-in Functions for the XD Scripting Language
//!
//! This module implements the fixed set of functions available to every XD
//! program. They are registered in the global function table at interpreter
//! startup, so user code resolves them exactly like its own functions and
//! cannot redefine their names.
//!
//! ## Function Categories
//!
//! ### Output
//! - `print(...)` - writes its arguments, space separated, as one line
//!
//! ### Conversions
//! - `int(v)` - integer, truncating float, or decimal string to `Int`
//! - `float(v)` - numeric value or numeric string to `Float`
//! - `bool(v)` - truthiness of any value
//! - `str(v)` - display form of any value
//!
//! ### String Methods
//! - `toUpper(v)` / `toLower(v)` - case conversion, strings only; usually
//!   reached through dot syntax (`"x".toUpper()`)
//!
//! ## Implementation Notes
//!
//! Each builtin is a free function dispatched by the [`Builtin`] tag.
//! `print` is the only one with a side effect; it writes through the output
//! sink the interpreter passes in, which is how tests capture program
//! output without touching process stdout.

use std::io::Write;

use crate::ast::Value;
use crate::error::{InterpreterError, InterpreterErrorKind, Position, Result, XdError};

/// Tag for one of the registered builtin functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Int,
    Float,
    Bool,
    Str,
    ToUpper,
    ToLower,
}

impl Builtin {
    /// Every builtin, in registration order.
    pub const ALL: [Builtin; 7] = [
        Builtin::Print,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::Str,
        Builtin::ToUpper,
        Builtin::ToLower,
    ];

    /// The name user code calls this builtin by.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::Str => "str",
            Builtin::ToUpper => "toUpper",
            Builtin::ToLower => "toLower",
        }
    }
}

/// Dispatches a builtin call.
///
/// # Arguments
/// * `builtin` - which builtin to run
/// * `args` - already evaluated argument values
/// * `position` - call site, attached to any error
/// * `output` - sink that `print` writes to
pub fn call(
    builtin: Builtin,
    args: &[Value],
    position: Position,
    output: &mut dyn Write,
) -> Result<Value> {
    match builtin {
        Builtin::Print => builtin_print(args, output),
        Builtin::Int => builtin_int(args, position),
        Builtin::Float => builtin_float(args, position),
        Builtin::Bool => builtin_bool(args, position),
        Builtin::Str => builtin_str(args, position),
        Builtin::ToUpper => builtin_to_upper(args, position),
        Builtin::ToLower => builtin_to_lower(args, position),
    }
}

/// `print(...args)` - one line of output.
///
/// Every argument is coerced to its display form; arguments are separated
/// by a single space and the line ends with a single newline.
fn builtin_print(args: &[Value], output: &mut dyn Write) -> Result<Value> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(output, "{}", line)?;
    output.flush()?;
    Ok(Value::Null)
}

/// `int(v)` - conversion to `Int`.
///
/// Floats truncate toward zero; strings must hold a decimal integer.
fn builtin_int(args: &[Value], position: Position) -> Result<Value> {
    let value = single_argument(Builtin::Int, args, position)?;
    match value {
        Value::Int(v) => Ok(Value::Int(*v)),
        Value::Float(v) => Ok(Value::Int(*v as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| unexpected_type("int()", position)),
        _ => Err(unexpected_type("int()", position)),
    }
}

/// `float(v)` - conversion to `Float`.
fn builtin_float(args: &[Value], position: Position) -> Result<Value> {
    let value = single_argument(Builtin::Float, args, position)?;
    match value {
        Value::Int(v) => Ok(Value::Float(*v as f64)),
        Value::Float(v) => Ok(Value::Float(*v)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| unexpected_type("float()", position)),
        _ => Err(unexpected_type("float()", position)),
    }
}

/// `bool(v)` - truthiness of any value; never fails.
fn builtin_bool(args: &[Value], position: Position) -> Result<Value> {
    let value = single_argument(Builtin::Bool, args, position)?;
    Ok(Value::Bool(value.is_truthy()))
}

/// `str(v)` - display form of any value; never fails.
fn builtin_str(args: &[Value], position: Position) -> Result<Value> {
    let value = single_argument(Builtin::Str, args, position)?;
    Ok(Value::Str(value.to_string()))
}

/// `toUpper(v)` - uppercase copy of a string.
fn builtin_to_upper(args: &[Value], position: Position) -> Result<Value> {
    match single_argument(Builtin::ToUpper, args, position)? {
        Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
        _ => Err(unexpected_type("toUpper()", position)),
    }
}

/// `toLower(v)` - lowercase copy of a string.
fn builtin_to_lower(args: &[Value], position: Position) -> Result<Value> {
    match single_argument(Builtin::ToLower, args, position)? {
        Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
        _ => Err(unexpected_type("toLower()", position)),
    }
}

fn single_argument<'a>(
    builtin: Builtin,
    args: &'a [Value],
    position: Position,
) -> Result<&'a Value> {
    match args {
        [value] => Ok(value),
        _ => Err(InterpreterError::at(
            InterpreterErrorKind::InvalidArgsCount(builtin.name().to_string()),
            position,
        )
        .into()),
    }
}

fn unexpected_type(name: &str, position: Position) -> XdError {
    InterpreterError::at(InterpreterErrorKind::UnexpectedType(name.to_string()), position).into()
}
