//! Lexer for the surface language.
//!
//! Wraps the logos-generated lexer with span bookkeeping and nested
//! block-comment handling.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span and source text.
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// Streaming lexer with one-token lookahead.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    /// Peeked token (for lookahead)
    peeked: Option<Result<SpannedToken<'a>, ParseError>>,
    /// Offset from original source (used after restarting the inner lexer)
    offset: usize,
}

impl<'a> std::fmt::Debug for Lexer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer").field("offset", &self.offset).finish()
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
            offset: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        self.source_map.span(start, end)
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let start = self.offset + span.start;
        let end = self.offset + span.end;

        match result {
            Ok(Token::BlockCommentStart) => match self.scan_block_comment(end) {
                Ok(comment_end) => {
                    self.restart_from(comment_end);
                    let span = self.make_span(start, comment_end);
                    let text = &self.source[start..comment_end];
                    // Surfaced as a comment token; the parser skips it.
                    Some(Ok(SpannedToken::new(Token::LineComment, span, text)))
                }
                Err(e) => {
                    self.restart_from(self.source.len());
                    Some(Err(e))
                }
            },

            Ok(token) => {
                let span = self.make_span(start, end);
                let text = &self.source[start..end];
                Some(Ok(SpannedToken::new(token, span, text)))
            }

            Err(()) => {
                let span = self.make_span(start, end);
                Some(Err(ParseError::LexerError { span }))
            }
        }
    }

    /// Scan a block comment (handles nesting).
    /// Uses memchr to jump to potential delimiter positions.
    fn scan_block_comment(&self, start: usize) -> ParseResult<usize> {
        let mut depth = 1;
        let mut pos = start;
        let bytes = self.source.as_bytes();

        while pos < bytes.len() && depth > 0 {
            match memchr::memchr2(b'#', b'=', &bytes[pos..]) {
                None => {
                    pos = bytes.len();
                    break;
                }
                Some(offset) => {
                    pos += offset;
                    if pos + 1 < bytes.len() {
                        if bytes[pos] == b'#' && bytes[pos + 1] == b'=' {
                            depth += 1;
                            pos += 2;
                            continue;
                        }
                        if bytes[pos] == b'=' && bytes[pos + 1] == b'#' {
                            depth -= 1;
                            pos += 2;
                            continue;
                        }
                    }
                    pos += 1;
                }
            }
        }

        if depth > 0 {
            Err(ParseError::UnterminatedBlockComment {
                span: self.make_span(start - 2, pos),
            })
        } else {
            Ok(pos)
        }
    }

    /// Restart the inner lexer from a new byte position.
    fn restart_from(&mut self, pos: usize) {
        self.peeked = None;
        if pos < self.source.len() {
            self.inner = Token::lexer(&self.source[pos..]);
            self.offset = pos;
        } else {
            self.inner = Token::lexer("");
            self.offset = pos;
        }
    }

    /// Collect all tokens (for tests and debugging).
    pub fn collect_all(mut self) -> Vec<Result<SpannedToken<'a>, ParseError>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<SpannedToken<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize source code into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    Lexer::new(source).collect_all()
}
