//! Parser for the XD Scripting Language
//!
//! This module implements a recursive descent parser that turns the lexer's
//! token stream into an Abstract Syntax Tree. Tokens are pulled lazily, one
//! at a time; the parser never holds more than the single lookahead token.
//!
//! ## Parser Architecture
//!
//! Two primitives drive everything:
//! - `maybe(kind)` consumes and returns the current token if it matches,
//!   and otherwise leaves it in place
//! - `expect(kind, error)` consumes the current token or fails with the
//!   given error at its position
//!
//! Statement rules return `Ok(None)` when their leading token is absent, so
//! alternatives chain cheaply without backtracking.
//!
//! ### Expression Parsing with Operator Precedence
//!
//! ```text
//! Precedence Levels (lowest to highest):
//! 1. Logical OR (||)            - left-associative
//! 2. Logical AND (&&)           - left-associative
//! 3. Equality (==, !=)          - non-associative, one comparison at most
//! 4. Relational (<, >, <=, >=)  - left-associative
//! 5. Additive (+, -)            - left-associative
//! 6. Multiplicative (*, /)      - left-associative
//! 7. Unary (-, !)               - cannot be stacked
//! 8. Primary (literals, identifiers, calls, parentheses)
//! ```
//!
//! ### Dot Chains
//!
//! `a.b.c()` builds left-associatively: each `.name` produces an identifier
//! (attribute access) or call (method call) whose `parent` field holds the
//! expression before the dot. The parser accepts any identifier after a
//! dot; which attributes and methods actually exist is checked at
//! evaluation time.

use std::rc::Rc;

use crate::ast::{
    Block, Expression, FunctionDefinition, Literal, Operator, Parameter, Program, Statement,
};
use crate::error::{ParserError, ParserErrorKind, Position, Result};
use crate::lexer::{Lexer, Token, TokenKind, TokenValue};

/// Recursive descent parser with a single token of lookahead.
pub struct Parser {
    lexer: Lexer,
    token: Token,
}

impl Parser {
    /// Creates a parser and primes the lookahead token.
    pub fn new(mut lexer: Lexer) -> Result<Self> {
        let token = lexer.next_token()?;
        Ok(Self { lexer, token })
    }

    /// Parses a complete program: statements until end-of-text.
    ///
    /// Anything left over once no statement rule matches is an
    /// unexpected-token error at that position.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        while let Some(statement) = self.parse_statement()? {
            statements.push(statement);
        }
        self.expect(TokenKind::Etx, ParserErrorKind::UnexpectedToken)?;
        Ok(Program { statements })
    }

    /// Consumes the current token if it matches `kind`.
    fn maybe(&mut self, kind: TokenKind) -> Result<Option<Token>> {
        if self.token.kind != kind {
            return Ok(None);
        }
        let next = self.lexer.next_token()?;
        Ok(Some(std::mem::replace(&mut self.token, next)))
    }

    /// Consumes the current token or fails with `error` at its position.
    fn expect(&mut self, kind: TokenKind, error: ParserErrorKind) -> Result<Token> {
        match self.maybe(kind)? {
            Some(token) => Ok(token),
            None => Err(ParserError::new(error, self.token.position).into()),
        }
    }

    /// Consumes one operator token out of `table`, returning its mapped
    /// [`Operator`] and position.
    fn maybe_operator(
        &mut self,
        table: &[(TokenKind, Operator)],
    ) -> Result<Option<(Operator, Position)>> {
        for (kind, op) in table {
            if let Some(token) = self.maybe(*kind)? {
                return Ok(Some((*op, token.position)));
            }
        }
        Ok(None)
    }

    // === STATEMENTS ===

    fn parse_statement(&mut self) -> Result<Option<Statement>> {
        if let Some(statement) = self.parse_function_definition()? {
            return Ok(Some(statement));
        }
        self.parse_block_statement()
    }

    /// A statement legal inside a block; function definitions are only
    /// allowed at the top level.
    fn parse_block_statement(&mut self) -> Result<Option<Statement>> {
        if let Some(statement) = self.parse_variable_declaration()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_if_statement()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_while_statement()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_foreach_statement()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_return_statement()? {
            return Ok(Some(statement));
        }
        self.parse_assignment_or_call()
    }

    /// `function name ( parameters ) block`
    fn parse_function_definition(&mut self) -> Result<Option<Statement>> {
        let Some(keyword) = self.maybe(TokenKind::Function)? else {
            return Ok(None);
        };
        let name = self.expect(TokenKind::Identifier, ParserErrorKind::ExpectedFunctionName)?;
        self.expect(
            TokenKind::LParen,
            ParserErrorKind::ExpectedLeftParenAfterFunctionName,
        )?;
        let parameters = self.parse_parameters()?;
        self.expect(
            TokenKind::RParen,
            ParserErrorKind::ExpectedRightParenAfterParameters,
        )?;
        let block = self.parse_required_block()?;

        Ok(Some(Statement::FunctionDefinition(Rc::new(
            FunctionDefinition {
                name: name.text().to_string(),
                parameters,
                block,
                position: keyword.position,
            },
        ))))
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let Some(first) = self.maybe(TokenKind::Identifier)? else {
            return Ok(parameters);
        };
        parameters.push(Parameter {
            name: first.text().to_string(),
            position: first.position,
        });
        while self.maybe(TokenKind::Comma)?.is_some() {
            let parameter = self.expect(
                TokenKind::Identifier,
                ParserErrorKind::ExpectedParameterAfterComma,
            )?;
            parameters.push(Parameter {
                name: parameter.text().to_string(),
                position: parameter.position,
            });
        }
        Ok(parameters)
    }

    /// `{ block_statement* }`
    fn parse_block(&mut self) -> Result<Option<Block>> {
        if self.maybe(TokenKind::LBrace)?.is_none() {
            return Ok(None);
        }
        let mut statements = Vec::new();
        while let Some(statement) = self.parse_block_statement()? {
            statements.push(statement);
        }
        self.expect(TokenKind::RBrace, ParserErrorKind::ExpectedRightBrace)?;
        Ok(Some(Block { statements }))
    }

    fn parse_required_block(&mut self) -> Result<Block> {
        match self.parse_block()? {
            Some(block) => Ok(block),
            None => {
                Err(ParserError::new(ParserErrorKind::ExpectedBlock, self.token.position).into())
            }
        }
    }

    /// `value name [= expression]`
    fn parse_variable_declaration(&mut self) -> Result<Option<Statement>> {
        let Some(keyword) = self.maybe(TokenKind::Value)? else {
            return Ok(None);
        };
        let name = self.expect(TokenKind::Identifier, ParserErrorKind::ExpectedVariableName)?;
        let value_expr = if self.maybe(TokenKind::Equal)?.is_some() {
            Some(self.parse_required_expression()?)
        } else {
            None
        };
        Ok(Some(Statement::VariableDeclaration {
            name: name.text().to_string(),
            value_expr,
            position: keyword.position,
        }))
    }

    /// `if expression block`
    fn parse_if_statement(&mut self) -> Result<Option<Statement>> {
        let Some(keyword) = self.maybe(TokenKind::If)? else {
            return Ok(None);
        };
        let Some(condition) = self.parse_expression()? else {
            return Err(
                ParserError::new(ParserErrorKind::ExpectedCondition, self.token.position).into(),
            );
        };
        let block = self.parse_required_block()?;
        Ok(Some(Statement::If {
            condition,
            block,
            position: keyword.position,
        }))
    }

    /// `while expression block`
    fn parse_while_statement(&mut self) -> Result<Option<Statement>> {
        let Some(keyword) = self.maybe(TokenKind::While)? else {
            return Ok(None);
        };
        let Some(condition) = self.parse_expression()? else {
            return Err(
                ParserError::new(ParserErrorKind::ExpectedCondition, self.token.position).into(),
            );
        };
        let block = self.parse_required_block()?;
        Ok(Some(Statement::While {
            condition,
            block,
            position: keyword.position,
        }))
    }

    /// `foreach name in expression block`
    fn parse_foreach_statement(&mut self) -> Result<Option<Statement>> {
        let Some(keyword) = self.maybe(TokenKind::Foreach)? else {
            return Ok(None);
        };
        let variable = self.expect(TokenKind::Identifier, ParserErrorKind::ExpectedLoopVariable)?;
        self.expect(TokenKind::In, ParserErrorKind::ExpectedIn)?;
        let iterable = self.parse_required_expression()?;
        let block = self.parse_required_block()?;
        Ok(Some(Statement::Foreach {
            variable: variable.text().to_string(),
            iterable,
            block,
            position: keyword.position,
        }))
    }

    /// `return [expression]`
    fn parse_return_statement(&mut self) -> Result<Option<Statement>> {
        let Some(keyword) = self.maybe(TokenKind::Return)? else {
            return Ok(None);
        };
        let value_expr = self.parse_expression()?;
        Ok(Some(Statement::Return {
            value_expr,
            position: keyword.position,
        }))
    }

    /// `name ( args ) dot_chain?` or `name = expression`
    ///
    /// At statement position an identifier must either start a call or an
    /// assignment; a bare identifier is an error.
    fn parse_assignment_or_call(&mut self) -> Result<Option<Statement>> {
        let Some(identifier) = self.maybe(TokenKind::Identifier)? else {
            return Ok(None);
        };
        let name = identifier.text().to_string();
        let position = identifier.position;

        if let Some(args) = self.maybe_call_args()? {
            let call = Expression::FunctionCall {
                name,
                args,
                parent: None,
                position,
            };
            let expression = self.parse_dot_chain(call)?;
            return Ok(Some(Statement::Expression(expression)));
        }

        if self.maybe(TokenKind::Equal)?.is_some() {
            let value_expr = self.parse_required_expression()?;
            return Ok(Some(Statement::Assignment {
                name,
                value_expr,
                position,
            }));
        }

        Err(ParserError::new(
            ParserErrorKind::ExpectedAssignmentOrCall,
            self.token.position,
        )
        .into())
    }

    // === EXPRESSIONS ===

    fn parse_expression(&mut self) -> Result<Option<Expression>> {
        self.parse_logical_or()
    }

    fn parse_required_expression(&mut self) -> Result<Expression> {
        match self.parse_expression()? {
            Some(expression) => Ok(expression),
            None => {
                Err(ParserError::new(ParserErrorKind::ExpectedExpression, self.token.position)
                    .into())
            }
        }
    }

    fn parse_logical_or(&mut self) -> Result<Option<Expression>> {
        let Some(mut left) = self.parse_logical_and()? else {
            return Ok(None);
        };
        while let Some(token) = self.maybe(TokenKind::Or)? {
            let right = self.required_operand(Self::parse_logical_and)?;
            left = Expression::Binary {
                op: Operator::Or,
                left: Box::new(left),
                right: Box::new(right),
                position: token.position,
            };
        }
        Ok(Some(left))
    }

    fn parse_logical_and(&mut self) -> Result<Option<Expression>> {
        let Some(mut left) = self.parse_equality()? else {
            return Ok(None);
        };
        while let Some(token) = self.maybe(TokenKind::And)? {
            let right = self.required_operand(Self::parse_equality)?;
            left = Expression::Binary {
                op: Operator::And,
                left: Box::new(left),
                right: Box::new(right),
                position: token.position,
            };
        }
        Ok(Some(left))
    }

    /// Equality does not chain: at most one `==`/`!=` per level.
    fn parse_equality(&mut self) -> Result<Option<Expression>> {
        let Some(mut left) = self.parse_relational()? else {
            return Ok(None);
        };
        const TABLE: &[(TokenKind, Operator)] = &[
            (TokenKind::Eq, Operator::Eq),
            (TokenKind::NotEq, Operator::NotEq),
        ];
        if let Some((op, position)) = self.maybe_operator(TABLE)? {
            let right = self.required_operand(Self::parse_relational)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(Some(left))
    }

    fn parse_relational(&mut self) -> Result<Option<Expression>> {
        let Some(mut left) = self.parse_additive()? else {
            return Ok(None);
        };
        const TABLE: &[(TokenKind, Operator)] = &[
            (TokenKind::Less, Operator::Less),
            (TokenKind::Greater, Operator::Greater),
            (TokenKind::LessEq, Operator::LessEq),
            (TokenKind::GreaterEq, Operator::GreaterEq),
        ];
        while let Some((op, position)) = self.maybe_operator(TABLE)? {
            let right = self.required_operand(Self::parse_additive)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(Some(left))
    }

    fn parse_additive(&mut self) -> Result<Option<Expression>> {
        let Some(mut left) = self.parse_multiplicative()? else {
            return Ok(None);
        };
        const TABLE: &[(TokenKind, Operator)] = &[
            (TokenKind::Add, Operator::Add),
            (TokenKind::Minus, Operator::Minus),
        ];
        while let Some((op, position)) = self.maybe_operator(TABLE)? {
            let right = self.required_operand(Self::parse_multiplicative)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(Some(left))
    }

    fn parse_multiplicative(&mut self) -> Result<Option<Expression>> {
        let Some(mut left) = self.parse_unary()? else {
            return Ok(None);
        };
        const TABLE: &[(TokenKind, Operator)] = &[
            (TokenKind::Mult, Operator::Mult),
            (TokenKind::Div, Operator::Div),
        ];
        while let Some((op, position)) = self.maybe_operator(TABLE)? {
            let right = self.required_operand(Self::parse_unary)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(Some(left))
    }

    /// `-x` and `!x` bind to a primary, so unary operators cannot stack.
    fn parse_unary(&mut self) -> Result<Option<Expression>> {
        const TABLE: &[(TokenKind, Operator)] = &[
            (TokenKind::Minus, Operator::Minus),
            (TokenKind::Not, Operator::Not),
        ];
        if let Some((op, position)) = self.maybe_operator(TABLE)? {
            let right = self.required_operand(Self::parse_primary)?;
            return Ok(Some(Expression::Unary {
                op,
                right: Box::new(right),
                position,
            }));
        }
        self.parse_primary()
    }

    /// Parses the right operand of a binary or unary operator, which must
    /// be present once the operator has been consumed.
    fn required_operand(
        &mut self,
        parse: fn(&mut Self) -> Result<Option<Expression>>,
    ) -> Result<Expression> {
        match parse(self)? {
            Some(expression) => Ok(expression),
            None => {
                Err(ParserError::new(ParserErrorKind::ExpectedExpression, self.token.position)
                    .into())
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Option<Expression>> {
        if let Some(expression) = self.parse_identifier_or_call()? {
            return Ok(Some(expression));
        }
        if let Some(expression) = self.parse_literal()? {
            return Ok(Some(expression));
        }
        self.parse_parenthesized()
    }

    fn parse_identifier_or_call(&mut self) -> Result<Option<Expression>> {
        let Some(identifier) = self.maybe(TokenKind::Identifier)? else {
            return Ok(None);
        };
        let name = identifier.text().to_string();
        let position = identifier.position;
        let item = match self.maybe_call_args()? {
            Some(args) => Expression::FunctionCall {
                name,
                args,
                parent: None,
                position,
            },
            None => Expression::Identifier {
                name,
                parent: None,
                position,
            },
        };
        Ok(Some(self.parse_dot_chain(item)?))
    }

    /// `{ "." identifier [ "(" args ")" ] }` suffixes, left-associative.
    fn parse_dot_chain(&mut self, mut parent: Expression) -> Result<Expression> {
        while self.maybe(TokenKind::Dot)?.is_some() {
            let identifier = self.expect(
                TokenKind::Identifier,
                ParserErrorKind::ExpectedIdentifierAfterDot,
            )?;
            let name = identifier.text().to_string();
            let position = identifier.position;
            parent = match self.maybe_call_args()? {
                Some(args) => Expression::FunctionCall {
                    name,
                    args,
                    parent: Some(Box::new(parent)),
                    position,
                },
                None => Expression::Identifier {
                    name,
                    parent: Some(Box::new(parent)),
                    position,
                },
            };
        }
        Ok(parent)
    }

    /// Parses `( args )` when the current token opens a call.
    fn maybe_call_args(&mut self) -> Result<Option<Vec<Expression>>> {
        if self.maybe(TokenKind::LParen)?.is_none() {
            return Ok(None);
        }
        let args = self.parse_arguments()?;
        self.expect(
            TokenKind::RParen,
            ParserErrorKind::ExpectedRightParenAfterCall,
        )?;
        Ok(Some(args))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        let Some(first) = self.parse_expression()? else {
            return Ok(args);
        };
        args.push(first);
        while self.maybe(TokenKind::Comma)?.is_some() {
            match self.parse_expression()? {
                Some(arg) => args.push(arg),
                None => {
                    return Err(ParserError::new(
                        ParserErrorKind::ExpectedArgumentAfterComma,
                        self.token.position,
                    )
                    .into())
                }
            }
        }
        Ok(args)
    }

    fn parse_literal(&mut self) -> Result<Option<Expression>> {
        let position = self.token.position;
        if let Some(token) = self.maybe(TokenKind::IntConst)? {
            let value = match token.value {
                Some(TokenValue::Int(v)) => v,
                _ => unreachable!(),
            };
            return Ok(Some(Expression::Literal {
                value: Literal::Int(value),
                position,
            }));
        }
        if let Some(token) = self.maybe(TokenKind::FloatConst)? {
            let value = match token.value {
                Some(TokenValue::Float(v)) => v,
                _ => unreachable!(),
            };
            return Ok(Some(Expression::Literal {
                value: Literal::Float(value),
                position,
            }));
        }
        if self.maybe(TokenKind::TrueConst)?.is_some() {
            return Ok(Some(Expression::Literal {
                value: Literal::Bool(true),
                position,
            }));
        }
        if self.maybe(TokenKind::FalseConst)?.is_some() {
            return Ok(Some(Expression::Literal {
                value: Literal::Bool(false),
                position,
            }));
        }
        if let Some(token) = self.maybe(TokenKind::Str)? {
            let literal = Expression::Literal {
                value: Literal::Str(token.text().to_string()),
                position,
            };
            // Strings are the one literal kind with attributes and methods.
            return Ok(Some(self.parse_dot_chain(literal)?));
        }
        Ok(None)
    }

    fn parse_parenthesized(&mut self) -> Result<Option<Expression>> {
        if self.maybe(TokenKind::LParen)?.is_none() {
            return Ok(None);
        }
        let Some(expression) = self.parse_expression()? else {
            return Err(
                ParserError::new(ParserErrorKind::ExpectedExpression, self.token.position).into(),
            );
        };
        self.expect(
            TokenKind::RParen,
            ParserErrorKind::ExpectedRightParenAfterExpression,
        )?;
        Ok(Some(expression))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XdError;
    use crate::reader::CharacterReader;

    fn parse(source: &str) -> Program {
        let lexer = Lexer::new(CharacterReader::new(source));
        let mut parser = Parser::new(lexer).unwrap();
        parser.parse_program().unwrap()
    }

    fn parse_error(source: &str) -> ParserError {
        let lexer = Lexer::new(CharacterReader::new(source));
        let result = Parser::new(lexer).and_then(|mut p| p.parse_program());
        match result {
            Err(XdError::Parser(e)) => e,
            other => panic!("expected a parser error, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_declaration() {
        let program = parse("value x = 10");

        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::VariableDeclaration {
                name, value_expr, ..
            } => {
                assert_eq!(name, "x");
                assert!(matches!(
                    value_expr,
                    Some(Expression::Literal {
                        value: Literal::Int(10),
                        ..
                    })
                ));
            }
            other => panic!("expected a variable declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_declaration_without_initializer() {
        let program = parse("value x");

        match &program.statements[0] {
            Statement::VariableDeclaration { value_expr, .. } => assert!(value_expr.is_none()),
            other => panic!("expected a variable declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_if_statement() {
        let program = parse("if x > 2 { x = x + 1 }");

        match &program.statements[0] {
            Statement::If {
                condition, block, ..
            } => {
                assert!(matches!(
                    condition,
                    Expression::Binary {
                        op: Operator::Greater,
                        ..
                    }
                ));
                assert_eq!(block.statements.len(), 1);
            }
            other => panic!("expected an if statement, got {other:?}"),
        }
    }

    #[test]
    fn test_while_statement() {
        let program = parse("while x < 2 { x = x + 1 }");

        match &program.statements[0] {
            Statement::While { block, .. } => assert_eq!(block.statements.len(), 1),
            other => panic!("expected a while statement, got {other:?}"),
        }
    }

    #[test]
    fn test_foreach_statement() {
        let program = parse("foreach c in \"word\" { print(c) }");

        match &program.statements[0] {
            Statement::Foreach {
                variable, iterable, ..
            } => {
                assert_eq!(variable, "c");
                assert!(matches!(
                    iterable,
                    Expression::Literal {
                        value: Literal::Str(_),
                        ..
                    }
                ));
            }
            other => panic!("expected a foreach statement, got {other:?}"),
        }
    }

    #[test]
    fn test_function_definition() {
        let program = parse("function add(a, b) { return a + b }");

        match &program.statements[0] {
            Statement::FunctionDefinition(def) => {
                assert_eq!(def.name, "add");
                assert_eq!(def.parameters.len(), 2);
                assert_eq!(def.parameters[0].name, "a");
                assert_eq!(def.parameters[1].name, "b");
                assert_eq!(def.block.statements.len(), 1);
            }
            other => panic!("expected a function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_return_without_value() {
        let program = parse("function f() { return }");

        match &program.statements[0] {
            Statement::FunctionDefinition(def) => match &def.block.statements[0] {
                Statement::Return { value_expr, .. } => assert!(value_expr.is_none()),
                other => panic!("expected a return, got {other:?}"),
            },
            other => panic!("expected a function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let program = parse("value r = 1 - 2 - 3");

        let Statement::VariableDeclaration {
            value_expr: Some(expr),
            ..
        } = &program.statements[0]
        else {
            panic!("expected a variable declaration");
        };
        // (1 - 2) - 3
        let Expression::Binary {
            op: Operator::Minus,
            left,
            right,
            ..
        } = expr
        else {
            panic!("expected a subtraction, got {expr:?}");
        };
        assert!(matches!(
            **right,
            Expression::Literal {
                value: Literal::Int(3),
                ..
            }
        ));
        assert!(matches!(
            **left,
            Expression::Binary {
                op: Operator::Minus,
                ..
            }
        ));
    }

    #[test]
    fn test_operator_precedence() {
        let program = parse("value r = 1 + 2 * 3 == 7 && x");

        let Statement::VariableDeclaration {
            value_expr: Some(expr),
            ..
        } = &program.statements[0]
        else {
            panic!("expected a variable declaration");
        };
        // ((1 + (2 * 3)) == 7) && x
        let Expression::Binary {
            op: Operator::And,
            left: eq,
            ..
        } = expr
        else {
            panic!("expected '&&' at the root, got {expr:?}");
        };
        let Expression::Binary {
            op: Operator::Eq,
            left: add,
            ..
        } = &**eq
        else {
            panic!("expected '==' under '&&', got {eq:?}");
        };
        let Expression::Binary {
            op: Operator::Add,
            right: mult,
            ..
        } = &**add
        else {
            panic!("expected '+' under '==', got {add:?}");
        };
        assert!(matches!(
            &**mult,
            Expression::Binary {
                op: Operator::Mult,
                ..
            }
        ));
    }

    #[test]
    fn test_equality_does_not_chain() {
        let error = parse_error("value r = 1 == 2 == 3");

        assert_eq!(error.kind, ParserErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_unary_operators_do_not_stack() {
        let error = parse_error("value r = --x");

        assert_eq!(error.kind, ParserErrorKind::ExpectedExpression);
    }

    #[test]
    fn test_dot_chain_builds_parent_links() {
        let program = parse("value r = a.b.c()");

        let Statement::VariableDeclaration {
            value_expr: Some(expr),
            ..
        } = &program.statements[0]
        else {
            panic!("expected a variable declaration");
        };
        let Expression::FunctionCall {
            name,
            parent: Some(b),
            ..
        } = expr
        else {
            panic!("expected a method call, got {expr:?}");
        };
        assert_eq!(name, "c");
        let Expression::Identifier {
            name: b_name,
            parent: Some(a),
            ..
        } = &**b
        else {
            panic!("expected an attribute access, got {b:?}");
        };
        assert_eq!(b_name, "b");
        assert!(matches!(
            &**a,
            Expression::Identifier {
                parent: None,
                ..
            }
        ));
    }

    #[test]
    fn test_string_literal_dot_chain() {
        let program = parse("value r = \"hello\".length");

        let Statement::VariableDeclaration {
            value_expr: Some(expr),
            ..
        } = &program.statements[0]
        else {
            panic!("expected a variable declaration");
        };
        let Expression::Identifier {
            name,
            parent: Some(parent),
            ..
        } = expr
        else {
            panic!("expected an attribute access, got {expr:?}");
        };
        assert_eq!(name, "length");
        assert!(matches!(
            &**parent,
            Expression::Literal {
                value: Literal::Str(_),
                ..
            }
        ));
    }

    #[test]
    fn test_call_statement_with_dot_chain() {
        let program = parse("str(1).toUpper()");

        match &program.statements[0] {
            Statement::Expression(Expression::FunctionCall {
                name,
                parent: Some(_),
                ..
            }) => assert_eq!(name, "toUpper"),
            other => panic!("expected a chained call statement, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_closing_brace_at_top_level() {
        let error = parse_error("}");

        assert_eq!(error.kind, ParserErrorKind::UnexpectedToken);
        assert_eq!(error.position, Position::new(1, 1));
    }

    #[test]
    fn test_bare_identifier_statement_is_an_error() {
        let error = parse_error("x");

        assert_eq!(error.kind, ParserErrorKind::ExpectedAssignmentOrCall);
    }

    #[test]
    fn test_missing_in_keyword() {
        let error = parse_error("foreach c \"word\" { }");

        assert_eq!(error.kind, ParserErrorKind::ExpectedIn);
    }

    #[test]
    fn test_missing_block_after_condition() {
        let error = parse_error("if x > 1 print(x)");

        assert_eq!(error.kind, ParserErrorKind::ExpectedBlock);
    }

    #[test]
    fn test_missing_condition() {
        let error = parse_error("while { }");

        assert_eq!(error.kind, ParserErrorKind::ExpectedCondition);
    }

    #[test]
    fn test_unclosed_call() {
        let error = parse_error("print(1, 2");

        assert_eq!(error.kind, ParserErrorKind::ExpectedRightParenAfterCall);
    }

    #[test]
    fn test_missing_argument_after_comma() {
        let error = parse_error("print(1,)");

        assert_eq!(error.kind, ParserErrorKind::ExpectedArgumentAfterComma);
    }

    #[test]
    fn test_missing_parameter_after_comma() {
        let error = parse_error("function f(a,) { }");

        assert_eq!(error.kind, ParserErrorKind::ExpectedParameterAfterComma);
    }

    #[test]
    fn test_missing_identifier_after_dot() {
        let error = parse_error("value r = a.1");

        assert_eq!(error.kind, ParserErrorKind::ExpectedIdentifierAfterDot);
    }

    #[test]
    fn test_missing_expression_after_operator() {
        let error = parse_error("value r = 1 +");

        assert_eq!(error.kind, ParserErrorKind::ExpectedExpression);
    }

    #[test]
    fn test_unclosed_parenthesized_expression() {
        let error = parse_error("value r = (1 + 2");

        assert_eq!(
            error.kind,
            ParserErrorKind::ExpectedRightParenAfterExpression
        );
    }

    #[test]
    fn test_comments_do_not_reach_the_parser() {
        let program = parse("# leading comment\nvalue x = 1 # trailing comment");

        assert_eq!(program.statements.len(), 1);
    }
}
