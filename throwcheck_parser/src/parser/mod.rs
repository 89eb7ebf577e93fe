//! Recursive descent parser.
//!
//! Converts the token stream into the typed AST in `ast`.

mod expr;
mod signature;
mod stmt;
mod types;

use crate::ast::{Block, Program};
use crate::error::{ParseError, ParseErrors, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// Parser over a single source file.
pub struct Parser<'a> {
    /// Source code
    pub(crate) source: &'a str,
    /// Lexer
    pub(crate) lexer: Lexer<'a>,
    /// Source map for line/column calculation
    pub(crate) source_map: SourceMap,
    /// Current token (one-token lookahead)
    pub(crate) current: Option<SpannedToken<'a>>,
    /// Collected errors (for error recovery)
    pub(crate) errors: ParseErrors,
}

impl<'a> std::fmt::Debug for Parser<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").field("errors", &self.errors.len()).finish()
    }
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            source_map: SourceMap::new(source),
            current: None,
            errors: ParseErrors::new(),
        }
    }

    /// Parse the source and return a Program plus any recovered errors.
    pub fn parse(mut self) -> (Program, ParseErrors) {
        let mut abstract_types = Vec::new();
        let mut structs = Vec::new();
        let mut functions = Vec::new();
        let mut main_stmts = Vec::new();

        // Prime the parser with the first token
        self.advance();

        while !self.is_at_end() {
            self.skip_separators();
            if self.is_at_end() {
                break;
            }

            let token = self.current.as_ref().map(|t| t.token.clone());
            let result = match token {
                Some(Token::KwAbstract) => {
                    self.parse_abstract_type().map(|d| abstract_types.push(d))
                }
                Some(Token::KwStruct) => self.parse_struct().map(|d| structs.push(d)),
                Some(Token::KwFunction) => {
                    self.parse_named_function().map(|d| functions.push(d))
                }
                Some(Token::KwDeclare) => {
                    self.parse_declare_function().map(|d| functions.push(d))
                }
                _ => self.parse_statement().map(|s| main_stmts.push(s)),
            };

            if let Err(e) = result {
                self.errors.push(e);
                self.synchronize();
            }
        }

        let span = self.source_map.span(0, self.source.len());
        let main_span = main_stmts
            .iter()
            .map(crate::ast::Stmt::span)
            .reduce(|a, b| a.merge(&b))
            .unwrap_or_else(|| self.source_map.span(0, 0));
        let program = Program {
            abstract_types,
            structs,
            functions,
            main: Block { stmts: main_stmts, span: main_span },
            span,
        };
        (program, self.errors)
    }

    // ==================== Token Management ====================

    /// Advance to the next token, returning the previous one.
    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let prev = self.current.take();
        loop {
            match self.lexer.next_token() {
                Some(Ok(token)) => {
                    // Skip comments
                    if matches!(token.token, Token::LineComment) {
                        continue;
                    }
                    self.current = Some(token);
                    break;
                }
                Some(Err(e)) => {
                    self.errors.push(e);
                    continue;
                }
                None => {
                    self.current = None;
                    break;
                }
            }
        }
        prev
    }

    /// Check if the current token matches.
    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.current
            .as_ref()
            .map(|t| &t.token == expected)
            .unwrap_or(false)
    }

    /// Check if the current token is any of the given tokens.
    pub(crate) fn check_any(&self, expected: &[Token]) -> bool {
        self.current
            .as_ref()
            .map(|t| expected.contains(&t.token))
            .unwrap_or(false)
    }

    /// Peek at the token after the current one without consuming anything.
    pub(crate) fn peek_next(&mut self) -> Option<Token> {
        loop {
            match self.lexer.peek() {
                Some(Ok(token)) => {
                    if matches!(token.token, Token::LineComment) {
                        let _ = self.lexer.next_token();
                        continue;
                    }
                    return Some(token.token.clone());
                }
                Some(Err(_)) => {
                    let _ = self.lexer.next_token();
                    continue;
                }
                None => return None,
            }
        }
    }

    /// Consume the current token if it matches, error otherwise.
    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        if self.check(&expected) {
            Ok(self.advance().unwrap())
        } else {
            let found = self
                .current
                .as_ref()
                .map(|t| t.text)
                .unwrap_or("end of input");
            let span = self.current_span();
            Err(ParseError::unexpected_token(found, expected.describe(), span))
        }
    }

    /// Consume an identifier and return its text.
    pub(crate) fn expect_identifier(&mut self, what: &str) -> ParseResult<(String, Span)> {
        if self.check(&Token::Identifier) {
            let tok = self.advance().unwrap();
            Ok((tok.text.to_string(), tok.span))
        } else {
            let found = self
                .current
                .as_ref()
                .map(|t| t.text)
                .unwrap_or("end of input");
            let span = self.current_span();
            Err(ParseError::unexpected_token(found, what, span))
        }
    }

    /// Get the span of the current token (or an EOF span).
    pub(crate) fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map(|t| t.span)
            .unwrap_or_else(|| self.source_map.span(self.source.len(), self.source.len()))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Skip newlines and semicolons between statements.
    pub(crate) fn skip_separators(&mut self) {
        while self.check(&Token::Newline) || self.check(&Token::Semicolon) {
            self.advance();
        }
    }

    /// Error recovery: skip tokens until a synchronization point.
    pub(crate) fn synchronize(&mut self) {
        // Always advance at least once to avoid infinite loops
        self.advance();

        while !self.is_at_end() {
            if self.check(&Token::Newline) {
                self.advance();
                return;
            }
            if self.check_any(&[
                Token::KwFunction,
                Token::KwDeclare,
                Token::KwStruct,
                Token::KwAbstract,
                Token::KwIf,
                Token::KwWhile,
                Token::KwFor,
                Token::KwTry,
                Token::KwReturn,
                Token::KwEnd,
                Token::KwCatch,
                Token::KwFinally,
                Token::KwElse,
                Token::KwElseif,
            ]) {
                return;
            }
            self.advance();
        }
    }

    // ==================== Blocks ====================

    /// Parse a block of statements until one of the given terminator tokens.
    /// The terminator is left as the current token.
    pub(crate) fn parse_block_until(&mut self, terminators: &[Token]) -> ParseResult<Block> {
        let start = self.current_span().start;
        let mut stmts = Vec::new();

        while !self.is_at_end() && !self.check_any(terminators) {
            self.skip_separators();
            if self.is_at_end() || self.check_any(terminators) {
                break;
            }

            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        let end = self.current_span().start;
        let span = self.source_map.span(start, end.max(start));
        Ok(Block { stmts, span })
    }
}

/// Parse source code into a Program, collecting recoverable errors.
pub fn parse(source: &str) -> (Program, ParseErrors) {
    Parser::new(source).parse()
}
