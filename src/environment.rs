//! Runtime scopes and the global function table.
//!
//! The scope model is deliberately flat: there is one global scope plus a
//! stack of call frames, and a frame's only ancestor is the global scope.
//! Lookups therefore check at most two levels (the innermost frame, then
//! globals), and locals from one call can never leak into another.
//!
//! Blocks inside `if`/`while`/`foreach` do not open scopes of their own;
//! they share whatever scope their statement executes in.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{FunctionDefinition, Parameter, Value};
use crate::builtin::Builtin;
use crate::error::{InterpreterError, InterpreterErrorKind};

/// A callable slot in the global function table.
#[derive(Debug, Clone)]
pub enum Function {
    User(Rc<FunctionDefinition>),
    Builtin(Builtin),
}

/// A single variable scope.
#[derive(Debug, Default)]
struct Scope {
    variables: HashMap<String, Value>,
}

/// The evaluator's view of all live names.
///
/// Variable reads and writes go through the current scope (the innermost
/// call frame, or the global scope when no call is active); functions live
/// in a single global table.
pub struct Environment {
    globals: Scope,
    functions: HashMap<String, Function>,
    frames: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            globals: Scope::default(),
            functions: HashMap::new(),
            frames: Vec::new(),
        }
    }

    fn current_scope(&mut self) -> &mut Scope {
        self.frames.last_mut().unwrap_or(&mut self.globals)
    }

    /// Defines a new variable in the current scope.
    ///
    /// Redeclaring a name that already exists in that scope is an error;
    /// a frame-local declaration may still occlude a global of the same
    /// name for reads inside the frame.
    pub fn declare_variable(&mut self, name: &str, value: Value) -> Result<(), InterpreterError> {
        let scope = self.current_scope();
        if scope.variables.contains_key(name) {
            return Err(InterpreterError::new(
                InterpreterErrorKind::DuplicateVariableDeclaration(name.to_string()),
            ));
        }
        scope.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Assigns to an existing variable.
    ///
    /// The name is looked up in the current frame first and in the global
    /// scope second; assigning to a name defined in neither is an error.
    pub fn set_variable(&mut self, name: &str, value: Value) -> Result<(), InterpreterError> {
        if let Some(frame) = self.frames.last_mut() {
            if frame.variables.contains_key(name) {
                frame.variables.insert(name.to_string(), value);
                return Ok(());
            }
        }
        if self.globals.variables.contains_key(name) {
            self.globals.variables.insert(name.to_string(), value);
            return Ok(());
        }
        Err(InterpreterError::new(
            InterpreterErrorKind::UndefinedVariable(name.to_string()),
        ))
    }

    /// Reads a variable from the nearest scope that defines it.
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        if let Some(frame) = self.frames.last() {
            if let Some(value) = frame.variables.get(name) {
                return Some(value.clone());
            }
        }
        self.globals.variables.get(name).cloned()
    }

    /// Registers a function in the global table; duplicates are an error.
    pub fn declare_function(
        &mut self,
        name: &str,
        function: Function,
    ) -> Result<(), InterpreterError> {
        if self.functions.contains_key(name) {
            return Err(InterpreterError::new(
                InterpreterErrorKind::DuplicateFunctionDeclaration(name.to_string()),
            ));
        }
        self.functions.insert(name.to_string(), function);
        Ok(())
    }

    /// Installs a builtin in the function table. Called once per builtin at
    /// interpreter startup, before any user code runs.
    pub fn register_builtin(&mut self, builtin: Builtin) {
        self.functions
            .insert(builtin.name().to_string(), Function::Builtin(builtin));
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Opens a fresh call frame with each parameter bound to its argument.
    pub fn push_frame(&mut self, parameters: &[Parameter], args: Vec<Value>) {
        let mut scope = Scope::default();
        for (parameter, arg) in parameters.iter().zip(args) {
            scope.variables.insert(parameter.name.clone(), arg);
        }
        self.frames.push(scope);
    }

    /// Closes the innermost call frame; with no frames left the current
    /// scope is the global scope again.
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Drops all call frames. Used to recover after a runtime error so the
    /// global scope stays usable.
    pub fn reset_frames(&mut self) {
        self.frames.clear();
    }
}
