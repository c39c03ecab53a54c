//! Interpreter for the XD Scripting Language
//!
//! This module implements the execution engine that walks the parsed AST
//! and runs it. The interpreter owns all runtime state: the environment of
//! scopes and functions, the output sink that `print` writes to, and the
//! bookkeeping that drives `return` and the recursion bound.
//!
//! ## Execution Model
//!
//! A program runs in two passes. First every top-level function definition
//! is registered, in source order, so functions may call each other
//! regardless of where they appear in the file. Then the remaining
//! top-level statements execute in source order.
//!
//! `return` is a one-shot flag: it stops the enclosing blocks until the
//! nearest function call captures the value, and is silently discarded if
//! it reaches the top level. User function calls are the only thing the
//! recursion counter tracks; once a call would exceed
//! [`MAX_RECURSION_DEPTH`] frames the call fails instead of exhausting the
//! native stack.
//!
//! ## Expression Semantics
//!
//! - Arithmetic preserves `Int` when both operands are integers and
//!   promotes to `Float` on any mix; `/` always produces a `Float`
//! - `+` concatenates display forms as soon as either operand is a string;
//!   `*` repeats a string by an integer count
//! - Equality compares like types only (`Int`/`Int`, `Float`/`Float`,
//!   `Str`/`Str`); ordering comparisons are numeric only
//! - `&&`/`||` short-circuit and yield the deciding operand's value
//! - Dot access supports `length` on strings; dot calls support `toUpper`
//!   and `toLower` on strings
//!
//! ## Error Handling
//!
//! Every failure aborts evaluation and bubbles up as an
//! [`InterpreterError`](crate::error::InterpreterError) carrying the
//! nearest source position. The interactive prompt calls
//! [`Interpreter::reset`] afterwards so the global scope survives the
//! failed line.

use std::io::{self, Write};

use log::debug;

use crate::ast::{Block, Expression, FunctionDefinition, Operator, Program, Statement, Value};
use crate::builtin::{self, Builtin};
use crate::environment::{Environment, Function};
use crate::error::{InterpreterError, InterpreterErrorKind, Position, Result};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::reader::CharacterReader;

/// Upper bound on nested user function calls.
pub const MAX_RECURSION_DEPTH: usize = 80;

/// Lexes, parses and evaluates one source text against an interpreter.
///
/// This is the whole pipeline behind both the file runner and each line of
/// the interactive prompt.
pub fn run_source(interpreter: &mut Interpreter, source: &str) -> Result<()> {
    let reader = CharacterReader::new(source);
    let lexer = Lexer::new(reader);
    let mut parser = Parser::new(lexer)?;
    let program = parser.parse_program()?;
    debug!("parsed {} top-level statements", program.statements.len());
    interpreter.interpret(&program)
}

/// Tree-walking evaluator with all of the language's runtime state.
pub struct Interpreter {
    environment: Environment,
    output: Box<dyn Write>,
    return_flag: bool,
    return_value: Value,
    recursion_depth: usize,
}

impl Interpreter {
    /// Creates an interpreter that prints to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an interpreter with a custom `print` sink.
    ///
    /// The builtin functions are registered in the global scope here, so
    /// they resolve like any user function from the first statement on.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let mut environment = Environment::new();
        for builtin in Builtin::ALL {
            environment.register_builtin(builtin);
        }
        Self {
            environment,
            output,
            return_flag: false,
            return_value: Value::Null,
            recursion_depth: 0,
        }
    }

    /// Executes a program against the current environment.
    ///
    /// Top-level function definitions are all registered before any other
    /// statement runs, which permits forward references between them.
    pub fn interpret(&mut self, program: &Program) -> Result<()> {
        for statement in &program.statements {
            if let Statement::FunctionDefinition(definition) = statement {
                self.environment
                    .declare_function(&definition.name, Function::User(definition.clone()))
                    .map_err(|e| e.with_position(definition.position))?;
            }
        }
        for statement in &program.statements {
            if matches!(statement, Statement::FunctionDefinition(_)) {
                continue;
            }
            self.execute_statement(statement)?;
            // A stray top-level return is ignored rather than left armed.
            self.return_flag = false;
            self.return_value = Value::Null;
        }
        Ok(())
    }

    /// Clears transient evaluation state after a failed run.
    ///
    /// Declared variables and functions survive; call frames, the recursion
    /// counter and any pending return are dropped.
    pub fn reset(&mut self) {
        self.environment.reset_frames();
        self.return_flag = false;
        self.return_value = Value::Null;
        self.recursion_depth = 0;
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            // Handled up front by interpret(); blocks cannot contain one.
            Statement::FunctionDefinition(_) => Ok(()),

            Statement::VariableDeclaration {
                name,
                value_expr,
                position,
            } => {
                let value = match value_expr {
                    Some(expression) => self.evaluate_expression(expression)?,
                    None => Value::Null,
                };
                self.environment
                    .declare_variable(name, value)
                    .map_err(|e| e.with_position(*position))?;
                Ok(())
            }

            Statement::Assignment {
                name,
                value_expr,
                position,
            } => {
                let value = self.evaluate_expression(value_expr)?;
                self.environment
                    .set_variable(name, value)
                    .map_err(|e| e.with_position(*position))?;
                Ok(())
            }

            Statement::Expression(expression) => {
                self.evaluate_expression(expression)?;
                Ok(())
            }

            Statement::If {
                condition, block, ..
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_block(block)?;
                }
                Ok(())
            }

            Statement::While {
                condition, block, ..
            } => {
                while self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_block(block)?;
                    if self.return_flag {
                        break;
                    }
                }
                Ok(())
            }

            Statement::Foreach {
                variable,
                iterable,
                block,
                ..
            } => self.execute_foreach(variable, iterable, block),

            Statement::Return {
                value_expr, ..
            } => {
                self.return_value = match value_expr {
                    Some(expression) => self.evaluate_expression(expression)?,
                    None => Value::Null,
                };
                self.return_flag = true;
                Ok(())
            }
        }
    }

    fn execute_block(&mut self, block: &Block) -> Result<()> {
        for statement in &block.statements {
            if self.return_flag {
                break;
            }
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    /// Iterates a string one character at a time.
    ///
    /// The loop variable is updated in place when it already exists and
    /// declared otherwise; either way it lives in the enclosing scope and
    /// keeps its last character once the loop ends.
    fn execute_foreach(
        &mut self,
        variable: &str,
        iterable: &Expression,
        block: &Block,
    ) -> Result<()> {
        let position = iterable.position();
        let value = self.evaluate_expression(iterable)?;
        let Value::Str(text) = value else {
            return Err(InterpreterError::at(
                InterpreterErrorKind::UnexpectedType("foreach".to_string()),
                position,
            )
            .into());
        };

        for character in text.chars() {
            let item = Value::Str(character.to_string());
            if self.environment.get_variable(variable).is_some() {
                self.environment
                    .set_variable(variable, item)
                    .map_err(|e| e.with_position(position))?;
            } else {
                self.environment
                    .declare_variable(variable, item)
                    .map_err(|e| e.with_position(position))?;
            }
            self.execute_block(block)?;
            if self.return_flag {
                break;
            }
        }
        Ok(())
    }

    fn evaluate_expression(&mut self, expression: &Expression) -> Result<Value> {
        match expression {
            Expression::Literal { value, .. } => Ok(Value::from(value)),
            Expression::Identifier {
                name,
                parent,
                position,
            } => self.evaluate_identifier(name, parent.as_deref(), *position),
            Expression::FunctionCall {
                name,
                args,
                parent,
                position,
            } => self.evaluate_call(name, args, parent.as_deref(), *position),
            Expression::Binary {
                op,
                left,
                right,
                position,
            } => self.evaluate_binary(*op, left, right, *position),
            Expression::Unary {
                op,
                right,
                position,
            } => self.evaluate_unary(*op, right, *position),
        }
    }

    /// A plain identifier reads a variable; one with a parent is a dot
    /// access, and the only legal attribute is `length` on a string.
    fn evaluate_identifier(
        &mut self,
        name: &str,
        parent: Option<&Expression>,
        position: Position,
    ) -> Result<Value> {
        let Some(parent) = parent else {
            return self.environment.get_variable(name).ok_or_else(|| {
                InterpreterError::at(
                    InterpreterErrorKind::UndefinedVariable(name.to_string()),
                    position,
                )
                .into()
            });
        };

        let value = self.evaluate_expression(parent)?;
        match value {
            Value::Str(text) if name == "length" => {
                Ok(Value::Int(text.chars().count() as i64))
            }
            _ => Err(InterpreterError::at(
                InterpreterErrorKind::UnexpectedAttribute(name.to_string()),
                position,
            )
            .into()),
        }
    }

    fn evaluate_call(
        &mut self,
        name: &str,
        args: &[Expression],
        parent: Option<&Expression>,
        position: Position,
    ) -> Result<Value> {
        let Some(function) = self.environment.get_function(name) else {
            return Err(InterpreterError::at(
                InterpreterErrorKind::UndefinedFunction(name.to_string()),
                position,
            )
            .into());
        };
        let function = function.clone();

        // A call with a parent is a method call on the parent's value; its
        // argument list is not evaluated.
        if let Some(parent) = parent {
            let value = self.evaluate_expression(parent)?;
            return self.evaluate_method(name, value, position);
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expression(arg)?);
        }

        match function {
            Function::Builtin(builtin) => {
                builtin::call(builtin, &values, position, self.output.as_mut())
            }
            Function::User(definition) => self.call_function(&definition, values, position),
        }
    }

    /// Only `toUpper` and `toLower`, on strings, are callable through a
    /// dot; everything else is an unexpected method.
    fn evaluate_method(&mut self, name: &str, value: Value, position: Position) -> Result<Value> {
        let builtin = match (&value, name) {
            (Value::Str(_), "toUpper") => Builtin::ToUpper,
            (Value::Str(_), "toLower") => Builtin::ToLower,
            _ => {
                return Err(InterpreterError::at(
                    InterpreterErrorKind::UnexpectedMethod(name.to_string()),
                    position,
                )
                .into())
            }
        };
        builtin::call(builtin, &[value], position, self.output.as_mut())
    }

    /// Invokes a user function: arity check, recursion bound, fresh frame,
    /// body execution, and capture of the returned value.
    fn call_function(
        &mut self,
        definition: &FunctionDefinition,
        args: Vec<Value>,
        position: Position,
    ) -> Result<Value> {
        if args.len() != definition.parameters.len() {
            return Err(InterpreterError::at(
                InterpreterErrorKind::InvalidArgsCount(definition.name.clone()),
                position,
            )
            .into());
        }

        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.recursion_depth -= 1;
            return Err(
                InterpreterError::at(InterpreterErrorKind::RecursionLimit, position).into(),
            );
        }

        self.environment.push_frame(&definition.parameters, args);
        let saved_flag = self.return_flag;
        let saved_value = std::mem::replace(&mut self.return_value, Value::Null);
        self.return_flag = false;

        let outcome = self.execute_block(&definition.block);

        let result = std::mem::replace(&mut self.return_value, saved_value);
        self.return_flag = saved_flag;
        self.environment.pop_frame();
        self.recursion_depth -= 1;

        outcome?;
        Ok(result)
    }

    fn evaluate_binary(
        &mut self,
        op: Operator,
        left: &Expression,
        right: &Expression,
        position: Position,
    ) -> Result<Value> {
        match op {
            // Short-circuit operators yield the deciding operand's value.
            Operator::And => {
                let left = self.evaluate_expression(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_expression(right)
            }
            Operator::Or => {
                let left = self.evaluate_expression(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_expression(right)
            }
            _ => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                match op {
                    Operator::Add => binary_add(left, right, position),
                    Operator::Minus => binary_minus(left, right, position),
                    Operator::Mult => binary_mult(left, right, position),
                    Operator::Div => binary_div(left, right, position),
                    Operator::Eq
                    | Operator::NotEq
                    | Operator::Less
                    | Operator::Greater
                    | Operator::LessEq
                    | Operator::GreaterEq => comparison(op, left, right, position),
                    _ => unreachable!(),
                }
            }
        }
    }

    fn evaluate_unary(
        &mut self,
        op: Operator,
        right: &Expression,
        position: Position,
    ) -> Result<Value> {
        let value = self.evaluate_expression(right)?;
        match op {
            Operator::Not => Ok(Value::Bool(!value.is_truthy())),
            Operator::Minus => match value {
                Value::Int(v) => Ok(Value::Int(-v)),
                Value::Float(v) => Ok(Value::Float(-v)),
                _ => Err(
                    InterpreterError::at(InterpreterErrorKind::TypeUnary, position).into(),
                ),
            },
            _ => unreachable!(),
        }
    }
}

/// Both operands viewed as numbers, with Int/Float promotion applied.
enum NumericPair {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numeric_pair(left: &Value, right: &Value) -> Option<NumericPair> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(NumericPair::Ints(*l, *r)),
        (Value::Int(l), Value::Float(r)) => Some(NumericPair::Floats(*l as f64, *r)),
        (Value::Float(l), Value::Int(r)) => Some(NumericPair::Floats(*l, *r as f64)),
        (Value::Float(l), Value::Float(r)) => Some(NumericPair::Floats(*l, *r)),
        _ => None,
    }
}

fn type_binary(position: Position) -> crate::error::XdError {
    InterpreterError::at(InterpreterErrorKind::TypeBinary, position).into()
}

/// `+` concatenates display forms when either side is a string, and adds
/// numerically otherwise.
fn binary_add(left: Value, right: Value, position: Position) -> Result<Value> {
    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        return Ok(Value::Str(format!("{}{}", left, right)));
    }
    match numeric_pair(&left, &right) {
        Some(NumericPair::Ints(l, r)) => Ok(Value::Int(l + r)),
        Some(NumericPair::Floats(l, r)) => Ok(Value::Float(l + r)),
        None => Err(type_binary(position)),
    }
}

fn binary_minus(left: Value, right: Value, position: Position) -> Result<Value> {
    match numeric_pair(&left, &right) {
        Some(NumericPair::Ints(l, r)) => Ok(Value::Int(l - r)),
        Some(NumericPair::Floats(l, r)) => Ok(Value::Float(l - r)),
        None => Err(type_binary(position)),
    }
}

/// `*` multiplies numbers and repeats a string by an integer count.
fn binary_mult(left: Value, right: Value, position: Position) -> Result<Value> {
    match (&left, &right) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            let count = usize::try_from(*n).unwrap_or(0);
            return Ok(Value::Str(s.repeat(count)));
        }
        _ => {}
    }
    match numeric_pair(&left, &right) {
        Some(NumericPair::Ints(l, r)) => Ok(Value::Int(l * r)),
        Some(NumericPair::Floats(l, r)) => Ok(Value::Float(l * r)),
        None => Err(type_binary(position)),
    }
}

/// `/` always produces a float; dividing by zero of either numeric kind is
/// an error before any type checking happens.
fn binary_div(left: Value, right: Value, position: Position) -> Result<Value> {
    if matches!(right, Value::Int(0)) || matches!(right, Value::Float(r) if r == 0.0) {
        return Err(
            InterpreterError::at(InterpreterErrorKind::DivisionByZero, position).into(),
        );
    }
    match numeric_pair(&left, &right) {
        Some(NumericPair::Ints(l, r)) => Ok(Value::Float(l as f64 / r as f64)),
        Some(NumericPair::Floats(l, r)) => Ok(Value::Float(l / r)),
        None => Err(type_binary(position)),
    }
}

/// Equality requires operands of the same kind; ordering requires numbers.
fn comparison(op: Operator, left: Value, right: Value, position: Position) -> Result<Value> {
    match op {
        Operator::Eq | Operator::NotEq => {
            let equal = match (&left, &right) {
                (Value::Int(l), Value::Int(r)) => l == r,
                (Value::Float(l), Value::Float(r)) => l == r,
                (Value::Str(l), Value::Str(r)) => l == r,
                _ => return Err(type_binary(position)),
            };
            Ok(Value::Bool(if op == Operator::Eq { equal } else { !equal }))
        }
        _ => {
            let ordered = match numeric_pair(&left, &right) {
                Some(NumericPair::Ints(l, r)) => match op {
                    Operator::Less => l < r,
                    Operator::Greater => l > r,
                    Operator::LessEq => l <= r,
                    Operator::GreaterEq => l >= r,
                    _ => unreachable!(),
                },
                Some(NumericPair::Floats(l, r)) => match op {
                    Operator::Less => l < r,
                    Operator::Greater => l > r,
                    Operator::LessEq => l <= r,
                    Operator::GreaterEq => l >= r,
                    _ => unreachable!(),
                },
                None => return Err(type_binary(position)),
            };
            Ok(Value::Bool(ordered))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XdError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Cloneable sink so tests can read back what `print` wrote.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    fn run(source: &str) -> (Result<()>, String) {
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
        let result = run_source(&mut interpreter, source);
        (result, buffer.contents())
    }

    fn run_ok(source: &str) -> String {
        let (result, output) = run(source);
        result.unwrap();
        output
    }

    fn run_error(source: &str) -> InterpreterError {
        let (result, _) = run(source);
        match result {
            Err(XdError::Interpreter(e)) => e,
            other => panic!("expected an interpreter error, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_and_assignment() {
        let output = run_ok("value x = 5\nx = x + 1\nprint(x)");
        assert_eq!(output, "6\n");
    }

    #[test]
    fn test_reassignment_may_change_type() {
        let output = run_ok("value x = 5\nprint(x)\nx = \"string\"\nprint(x)");
        assert_eq!(output, "5\nstring\n");
    }

    #[test]
    fn test_uninitialized_variable_is_null() {
        let output = run_ok("value x\nprint(x)");
        assert_eq!(output, "null\n");
    }

    #[test]
    fn test_function_definition_and_call() {
        let output = run_ok("function add(a, b) { return a + b }\nprint(add(3, 4))");
        assert_eq!(output, "7\n");
    }

    #[test]
    fn test_forward_reference_between_functions() {
        let output = run_ok(
            "function first() { return second() }\n\
             function second() { return 2 }\n\
             print(first())",
        );
        assert_eq!(output, "2\n");
    }

    #[test]
    fn test_early_return() {
        let output = run_ok("function f() { if 1 { return 1 } return 2 }\nprint(f())");
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_return_without_value_is_null() {
        let output = run_ok("function f() { return }\nprint(f())");
        assert_eq!(output, "null\n");
    }

    #[test]
    fn test_return_stops_while_loop() {
        let output = run_ok(
            "function f() {\n\
             value x = 0\n\
             while x < 10 { x = x + 1 if x == 3 { return x } }\n\
             return 0\n\
             }\n\
             print(f())",
        );
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_top_level_return_is_ignored() {
        let output = run_ok("return 5\nprint(1)");
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_while_loop() {
        let output = run_ok("value x = 3\nwhile x > 0 { print(x) x = x - 1 }");
        assert_eq!(output, "3\n2\n1\n");
    }

    #[test]
    fn test_foreach_iterates_characters() {
        let output = run_ok("foreach c in \"ab\" { print(c) }");
        assert_eq!(output, "a\nb\n");
    }

    #[test]
    fn test_foreach_variable_persists_after_loop() {
        let output = run_ok("foreach c in \"ab\" { }\nprint(c)");
        assert_eq!(output, "b\n");
    }

    #[test]
    fn test_foreach_requires_a_string() {
        let error = run_error("foreach c in 2 { print(c) }");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UnexpectedType("foreach".to_string())
        );
    }

    #[test]
    fn test_if_and_foreach_blocks_share_the_enclosing_scope() {
        let output = run_ok("if 1 { value y = 5 }\nprint(y)");
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_locals_do_not_leak_out_of_calls() {
        let error = run_error("function f() { value local = 1 }\nf()\nprint(local)");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UndefinedVariable("local".to_string())
        );
    }

    #[test]
    fn test_function_body_reads_globals() {
        let output = run_ok("value g = 7\nfunction f() { return g }\nprint(f())");
        assert_eq!(output, "7\n");
    }

    #[test]
    fn test_assignment_in_function_reaches_global() {
        let output = run_ok("value g = 1\nfunction f() { g = 2 }\nf()\nprint(g)");
        assert_eq!(output, "2\n");
    }

    #[test]
    fn test_arithmetic_and_promotion() {
        let output = run_ok("print(2 + 3, 10 - 2, 4 * 2, 9 / 2)");
        assert_eq!(output, "5 8 8 4.5\n");
    }

    #[test]
    fn test_division_always_yields_float() {
        let output = run_ok("print(8 / 2)");
        assert_eq!(output, "4\n");
    }

    #[test]
    fn test_int_float_mix_promotes() {
        let output = run_ok("print(1 + 0.5, 2 * 1.5)");
        assert_eq!(output, "1.5 3\n");
    }

    #[test]
    fn test_string_concatenation_coerces() {
        let output = run_ok("print(\"n = \" + 4, 1 + \"!\")");
        assert_eq!(output, "n = 4 1!\n");
    }

    #[test]
    fn test_string_repetition() {
        let output = run_ok("print(\"ab\" * 3, 2 * \"x\")");
        assert_eq!(output, "ababab xx\n");
    }

    #[test]
    fn test_comparisons() {
        let output = run_ok("print(4 <= 3, 4 > 3, 5 == 5, 5 != 3, \"a\" == \"a\")");
        assert_eq!(output, "false true true true true\n");
    }

    #[test]
    fn test_int_float_equality_is_a_type_error() {
        let error = run_error("print(5 == 5.0)");
        assert_eq!(error.kind, InterpreterErrorKind::TypeBinary);
    }

    #[test]
    fn test_mixed_relational_promotes() {
        let output = run_ok("print(1 < 1.5)");
        assert_eq!(output, "true\n");
    }

    #[test]
    fn test_minus_rejects_strings() {
        let error = run_error("value r = \"10\" - 2");
        assert_eq!(error.kind, InterpreterErrorKind::TypeBinary);
    }

    #[test]
    fn test_string_times_string_is_a_type_error() {
        let error = run_error("value r = \"a\" * \"b\"");
        assert_eq!(error.kind, InterpreterErrorKind::TypeBinary);
    }

    #[test]
    fn test_division_by_zero() {
        let error = run_error("value r = 10 / 0");
        assert_eq!(error.kind, InterpreterErrorKind::DivisionByZero);
        assert!(error.position.is_some());
    }

    #[test]
    fn test_unary_operators() {
        let output = run_ok("print(!true, -5, -2.5, !0)");
        assert_eq!(output, "false -5 -2.5 true\n");
    }

    #[test]
    fn test_unary_minus_rejects_strings() {
        let error = run_error("value r = -\"hello\"");
        assert_eq!(error.kind, InterpreterErrorKind::TypeUnary);
    }

    #[test]
    fn test_logical_operators_yield_operand_values() {
        let output = run_ok("print(2 && 2)\nprint(1 || 2)\nprint(0 && 1)");
        assert_eq!(output, "2\n1\n0\n");
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        // Neither call may run; `boom` would fail on its undefined variable.
        let output = run_ok(
            "function boom() { return missing }\n\
             print(0 && boom())\n\
             print(1 || boom())",
        );
        assert_eq!(output, "0\n1\n");
    }

    #[test]
    fn test_string_length_attribute() {
        let output = run_ok("print(\"hello\".length)");
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_string_methods() {
        let output = run_ok("print(\"hi\".toUpper(), \"HI\".toLower())");
        assert_eq!(output, "HI hi\n");
    }

    #[test]
    fn test_method_chain() {
        let output = run_ok("print(\"hi\".toUpper().toLower())");
        assert_eq!(output, "hi\n");
    }

    #[test]
    fn test_method_on_non_string_value() {
        let error = run_error("value n = 42\nvalue r = n.toUpper()");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UnexpectedMethod("toUpper".to_string())
        );
    }

    #[test]
    fn test_unknown_method_on_string() {
        let error = run_error("value r = \"hello\".f()");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UndefinedFunction("f".to_string())
        );
    }

    #[test]
    fn test_known_function_as_method_on_string() {
        let error = run_error("value r = \"hello\".print()");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UnexpectedMethod("print".to_string())
        );
    }

    #[test]
    fn test_unknown_attribute_on_string() {
        let error = run_error("value s = \"hello\"\nvalue r = s.foo");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UnexpectedAttribute("foo".to_string())
        );
    }

    #[test]
    fn test_undefined_variable() {
        let error = run_error("print(missing)");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UndefinedVariable("missing".to_string())
        );
    }

    #[test]
    fn test_undefined_function() {
        let error = run_error("missing()");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UndefinedFunction("missing".to_string())
        );
    }

    #[test]
    fn test_duplicate_variable_declaration() {
        let error = run_error("value x = 1\nvalue x = 2");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::DuplicateVariableDeclaration("x".to_string())
        );
    }

    #[test]
    fn test_duplicate_function_declaration() {
        let error = run_error("function foo() { }\nfunction foo() { }");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::DuplicateFunctionDeclaration("foo".to_string())
        );
    }

    #[test]
    fn test_redefining_a_builtin_is_a_duplicate() {
        let error = run_error("function print() { }");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::DuplicateFunctionDeclaration("print".to_string())
        );
    }

    #[test]
    fn test_wrong_argument_count() {
        let error = run_error("function f(a) { return a }\nvalue r = f(1, 2)");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::InvalidArgsCount("f".to_string())
        );
    }

    #[test]
    fn test_recursion_limit() {
        let error = run_error("function f() { return f() }\nvalue r = f()");
        assert_eq!(error.kind, InterpreterErrorKind::RecursionLimit);
    }

    #[test]
    fn test_bounded_recursion_succeeds() {
        let output = run_ok(
            "function count(n) { if n == 0 { return 0 } return count(n - 1) }\n\
             print(count(79))",
        );
        assert_eq!(output, "0\n");
    }

    #[test]
    fn test_environment_usable_after_recursion_limit() {
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));

        let error = run_source(&mut interpreter, "function f() { return f() }\nvalue r = f()");
        assert!(error.is_err());
        interpreter.reset();

        run_source(&mut interpreter, "value x = 1\nprint(x + 1)").unwrap();
        assert_eq!(buffer.contents(), "2\n");
    }

    #[test]
    fn test_state_accumulates_across_runs() {
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));

        run_source(&mut interpreter, "function double(n) { return n * 2 }").unwrap();
        run_source(&mut interpreter, "value x = 21").unwrap();
        run_source(&mut interpreter, "print(double(x))").unwrap();

        assert_eq!(buffer.contents(), "42\n");
    }

    #[test]
    fn test_builtin_conversions_end_to_end() {
        let output = run_ok(
            "print(int(\"12\"), float(\"1.5\"), bool(0), str(7), \
             \"hi\".toUpper(), \"HI\".toLower(), \"abcd\".length)",
        );
        assert_eq!(output, "12 1.5 false 7 HI hi 4\n");
    }

    #[test]
    fn test_int_of_bad_string() {
        let error = run_error("value r = int(\"a\")");
        assert_eq!(
            error.kind,
            InterpreterErrorKind::UnexpectedType("int()".to_string())
        );
    }

    #[test]
    fn test_print_multiple_arguments() {
        let output = run_ok("print(1, \"two\", 3.5, true)");
        assert_eq!(output, "1 two 3.5 true\n");
    }

    #[test]
    fn test_precedence_end_to_end() {
        let output = run_ok("value x = 5 + 3 * 2\nprint(x)\nprint(9 / 2)");
        assert_eq!(output, "11\n4.5\n");
    }

    #[test]
    fn test_parenthesized_expression() {
        let output = run_ok("print((5 + 3) * 2)");
        assert_eq!(output, "16\n");
    }

    #[test]
    fn test_plain_call_of_string_builtins() {
        let output = run_ok("print(toUpper(\"abc\"))");
        assert_eq!(output, "ABC\n");
    }

    #[test]
    fn test_foreach_updates_existing_variable() {
        let output = run_ok("value c = \"start\"\nforeach c in \"xy\" { }\nprint(c)");
        assert_eq!(output, "y\n");
    }

    #[test]
    fn test_error_carries_position() {
        let error = run_error("value x =\n  1 / 0");
        assert_eq!(error.position, Some(Position::new(2, 5)));
    }
}
