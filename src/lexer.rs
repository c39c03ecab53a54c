//! Lexical Analyzer for the XD Scripting Language
//!
//! This module implements the tokenization phase of the interpreter
//! pipeline. It converts raw source text into a stream of positioned tokens
//! that the parser consumes one at a time.
//!
//! ## Tokenization Process
//!
//! The lexer pulls characters from a [`CharacterReader`] on demand and keeps
//! a single character of lookahead. Each call to [`Lexer::next_token`]:
//! 1. Skips whitespace (any Unicode whitespace)
//! 2. Records the start position of the token
//! 3. Tries the token builders in a fixed order: end-of-text, comment,
//!    keyword/identifier, number, string, `&&`/`||`, one-or-two-character
//!    comparison operators, single-character operators
//! 4. Reports an unknown-token error if nothing matched
//!
//! ## Supported Tokens
//!
//! - **Literals**: integers (`42`), floats (`12.5`, `3.`), strings
//!   (`"hello"`), `true`, `false`
//! - **Identifiers**: `my_var`, `counter2` (at most 100 characters)
//! - **Keywords**: `value`, `if`, `while`, `foreach`, `in`, `function`,
//!   `return`
//! - **Operators**: `+ - * / = == != < <= > >= && || !`
//! - **Delimiters**: `( ) { } , .`
//!
//! ## Limits
//!
//! Identifiers are capped at [`IDENTIFIER_MAX_LENGTH`] characters and string
//! bodies at [`STRING_MAX_LENGTH`]; integer literals must fit a signed
//! 64-bit value and float literals carry a bounded number of fractional
//! digits. Exceeding any limit is a lexer error at the token's start
//! position.
//!
//! Comments run from `#` to the end of the line. They are built as tokens
//! internally but [`Lexer::next_token`] never yields them, so the parser
//! only ever sees meaningful tokens.

use crate::error::{LexerError, LexerErrorKind, Position, Result};
use crate::reader::{CharacterReader, ETX};

/// Longest accepted identifier, in characters.
pub const IDENTIFIER_MAX_LENGTH: usize = 100;
/// Longest accepted string body, in characters.
pub const STRING_MAX_LENGTH: usize = 10_000;
/// Most fractional digits a float literal may carry.
const FLOAT_FRACTION_DIGITS: u32 = 15;

/// The type of a token, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // === KEYWORDS ===
    If,
    While,
    Foreach,
    In,
    Value,
    Function,
    Return,

    // === LITERALS AND NAMES ===
    Identifier,
    IntConst,
    FloatConst,
    TrueConst,
    FalseConst,
    Str,

    // === OPERATORS ===
    Equal,
    Add,
    Minus,
    Mult,
    Div,
    Less,
    Greater,
    Eq,
    NotEq,
    LessEq,
    GreaterEq,
    And,
    Or,
    Not,

    // === DELIMITERS ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Dot,

    // === SPECIAL ===
    /// `#` to end of line; never yielded to the parser.
    Comment,
    /// End of the token stream.
    Etx,
}

/// Payload carried by literal and identifier tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// A single token: kind, start position and optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
    pub value: Option<TokenValue>,
}

impl Token {
    fn new(kind: TokenKind, position: Position) -> Self {
        Self {
            kind,
            position,
            value: None,
        }
    }

    fn with_value(kind: TokenKind, position: Position, value: TokenValue) -> Self {
        Self {
            kind,
            position,
            value: Some(value),
        }
    }

    /// Text payload of an identifier, string or comment token.
    pub fn text(&self) -> &str {
        match &self.value {
            Some(TokenValue::Text(text)) => text,
            _ => "",
        }
    }
}

/// Lexical analyzer over a positioned character stream.
///
/// Keeps one character of lookahead in `current` and the start position of
/// the token being built in `start`.
pub struct Lexer {
    reader: CharacterReader,
    current: char,
    start: Position,
}

impl Lexer {
    /// Creates a lexer and primes the one-character lookahead.
    pub fn new(mut reader: CharacterReader) -> Self {
        let current = reader.next();
        Self {
            reader,
            current,
            start: Position::default(),
        }
    }

    /// Scans and returns the next meaningful token.
    ///
    /// Comments are consumed and skipped here, so the caller never sees
    /// them. Once the source is exhausted every call returns an `Etx` token.
    ///
    /// # Returns
    /// * `Ok(Token)` - the next non-comment token
    /// * `Err(XdError)` - a lexical error with its position
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let token = self.build_token()?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
        }
    }

    fn build_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.reader.position();

        if let Some(token) = self.try_build_etx() {
            return Ok(token);
        }
        if let Some(token) = self.try_build_comment() {
            return Ok(token);
        }
        if let Some(token) = self.try_build_keyword_or_identifier()? {
            return Ok(token);
        }
        if let Some(token) = self.try_build_number()? {
            return Ok(token);
        }
        if let Some(token) = self.try_build_string()? {
            return Ok(token);
        }
        if let Some(token) = self.try_build_logical_operator('&', TokenKind::And)? {
            return Ok(token);
        }
        if let Some(token) = self.try_build_logical_operator('|', TokenKind::Or)? {
            return Ok(token);
        }
        if let Some(token) = self.try_build_comparison('=', TokenKind::Equal, TokenKind::Eq) {
            return Ok(token);
        }
        if let Some(token) = self.try_build_comparison('!', TokenKind::Not, TokenKind::NotEq) {
            return Ok(token);
        }
        if let Some(token) = self.try_build_comparison('<', TokenKind::Less, TokenKind::LessEq) {
            return Ok(token);
        }
        if let Some(token) =
            self.try_build_comparison('>', TokenKind::Greater, TokenKind::GreaterEq)
        {
            return Ok(token);
        }
        if let Some(token) = self.try_build_single_operator() {
            return Ok(token);
        }

        Err(LexerError::new(LexerErrorKind::UnknownToken, self.start).into())
    }

    fn advance(&mut self) {
        self.current = self.reader.next();
    }

    fn skip_whitespace(&mut self) {
        while self.current.is_whitespace() {
            self.advance();
        }
    }

    fn try_build_etx(&mut self) -> Option<Token> {
        if self.current != ETX {
            return None;
        }
        Some(Token::new(TokenKind::Etx, self.start))
    }

    fn try_build_comment(&mut self) -> Option<Token> {
        if self.current != '#' {
            return None;
        }
        self.advance();
        let mut text = String::new();
        while self.current != '\n' && self.current != ETX {
            text.push(self.current);
            self.advance();
        }
        Some(Token::with_value(
            TokenKind::Comment,
            self.start,
            TokenValue::Text(text),
        ))
    }

    /// Scans `[A-Za-z_][A-Za-z0-9_]*` and resolves it against the keyword
    /// table; anything not in the table is an identifier.
    fn try_build_keyword_or_identifier(&mut self) -> Result<Option<Token>> {
        if !self.current.is_alphabetic() && self.current != '_' {
            return Ok(None);
        }

        let mut lexeme = String::new();
        let mut length = 0usize;
        while self.current.is_alphanumeric() || self.current == '_' {
            if length == IDENTIFIER_MAX_LENGTH {
                return Err(LexerError::new(LexerErrorKind::IdentifierTooLong, self.start).into());
            }
            lexeme.push(self.current);
            length += 1;
            self.advance();
        }

        let token = match keyword(&lexeme) {
            Some(kind) => Token::new(kind, self.start),
            None => Token::with_value(TokenKind::Identifier, self.start, TokenValue::Text(lexeme)),
        };
        Ok(Some(token))
    }

    /// Scans an integer or float literal.
    ///
    /// The integer part accumulates with overflow checks against the signed
    /// 64-bit range. A trailing `.` switches to the fractional part, which
    /// may be empty (`3.` equals `3.0`) and is bounded in length.
    fn try_build_number(&mut self) -> Result<Option<Token>> {
        if !self.current.is_ascii_digit() {
            return Ok(None);
        }

        let mut value: i64 = 0;
        while self.current.is_ascii_digit() {
            let digit = i64::from(self.current.to_digit(10).unwrap_or(0));
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| LexerError::new(LexerErrorKind::IntegerOverflow, self.start))?;
            self.advance();
        }

        if self.current != '.' {
            return Ok(Some(Token::with_value(
                TokenKind::IntConst,
                self.start,
                TokenValue::Int(value),
            )));
        }
        self.advance();

        let mut fraction: i64 = 0;
        let mut digits: u32 = 0;
        while self.current.is_ascii_digit() {
            if digits == FLOAT_FRACTION_DIGITS {
                return Err(LexerError::new(LexerErrorKind::FloatOverflow, self.start).into());
            }
            fraction = fraction * 10 + i64::from(self.current.to_digit(10).unwrap_or(0));
            digits += 1;
            self.advance();
        }

        let value = value as f64 + fraction as f64 / 10f64.powi(digits as i32);
        Ok(Some(Token::with_value(
            TokenKind::FloatConst,
            self.start,
            TokenValue::Float(value),
        )))
    }

    /// Scans a double-quoted string literal, resolving escapes as it goes.
    ///
    /// A raw newline or end-of-text inside the body is an unterminated
    /// string; only `\n`, `\t`, `\"` and `\\` are accepted as escapes.
    fn try_build_string(&mut self) -> Result<Option<Token>> {
        if self.current != '"' {
            return Ok(None);
        }
        self.advance();

        let mut value = String::new();
        let mut length = 0usize;
        while self.current != '"' {
            if self.current == ETX || self.current == '\n' {
                return Err(LexerError::new(LexerErrorKind::UnterminatedString, self.start).into());
            }
            if length == STRING_MAX_LENGTH {
                return Err(LexerError::new(LexerErrorKind::StringTooLong, self.start).into());
            }
            value.push(self.escaped_character()?);
            length += 1;
            self.advance();
        }
        self.advance();

        Ok(Some(Token::with_value(
            TokenKind::Str,
            self.start,
            TokenValue::Text(value),
        )))
    }

    fn escaped_character(&mut self) -> Result<char> {
        if self.current != '\\' {
            return Ok(self.current);
        }
        self.advance();
        match self.current {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            other => Err(LexerError::new(LexerErrorKind::InvalidEscape(other), self.start).into()),
        }
    }

    /// Scans `&&` or `||`. A lone `&` or `|` is an error since the language
    /// has no single-character forms of either.
    fn try_build_logical_operator(
        &mut self,
        symbol: char,
        kind: TokenKind,
    ) -> Result<Option<Token>> {
        if self.current != symbol {
            return Ok(None);
        }
        self.advance();
        if self.current != symbol {
            return Err(LexerError::new(LexerErrorKind::IncompleteOperator(symbol), self.start).into());
        }
        self.advance();
        Ok(Some(Token::new(kind, self.start)))
    }

    /// Scans a one-or-two-character operator where the longer form appends
    /// `=`: `=`/`==`, `!`/`!=`, `<`/`<=`, `>`/`>=`.
    fn try_build_comparison(
        &mut self,
        first: char,
        single: TokenKind,
        double: TokenKind,
    ) -> Option<Token> {
        if self.current != first {
            return None;
        }
        self.advance();
        if self.current == '=' {
            self.advance();
            Some(Token::new(double, self.start))
        } else {
            Some(Token::new(single, self.start))
        }
    }

    fn try_build_single_operator(&mut self) -> Option<Token> {
        let kind = match self.current {
            '+' => TokenKind::Add,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Mult,
            '/' => TokenKind::Div,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            _ => return None,
        };
        self.advance();
        Some(Token::new(kind, self.start))
    }
}

fn keyword(lexeme: &str) -> Option<TokenKind> {
    let kind = match lexeme {
        "value" => TokenKind::Value,
        "if" => TokenKind::If,
        "while" => TokenKind::While,
        "foreach" => TokenKind::Foreach,
        "in" => TokenKind::In,
        "function" => TokenKind::Function,
        "return" => TokenKind::Return,
        "true" => TokenKind::TrueConst,
        "false" => TokenKind::FalseConst,
        _ => return None,
    };
    Some(kind)
}
