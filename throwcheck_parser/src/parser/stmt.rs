//! Statement parsing.

use crate::ast::{Block, CatchClause, Stmt};
use crate::error::ParseResult;
use crate::parser::Parser;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current.as_ref().map(|t| t.token.clone()) {
            Some(Token::KwIf) => self.parse_if_statement(),
            Some(Token::KwWhile) => self.parse_while_statement(),
            Some(Token::KwFor) => self.parse_for_statement(),
            Some(Token::KwTry) => self.parse_try_statement(),
            Some(Token::KwReturn) => self.parse_return_statement(),
            Some(Token::Identifier) if self.peek_next() == Some(Token::Assign) => {
                self.parse_assignment()
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span();
                Ok(Stmt::Expr { expr, span })
            }
        }
    }

    /// Parse `if cond ... [elseif cond ...]* [else ...] end`.
    ///
    /// `elseif` chains desugar into a nested `If` inside the else branch.
    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let kw = self.expect(Token::KwIf)?;
        self.parse_if_rest(kw.span)
    }

    fn parse_if_rest(&mut self, start: crate::span::Span) -> ParseResult<Stmt> {
        let condition = self.parse_expression()?;
        let then_branch =
            self.parse_block_until(&[Token::KwElseif, Token::KwElse, Token::KwEnd])?;

        let (else_branch, end_span) = if self.check(&Token::KwElseif) {
            let kw = self.advance().unwrap();
            let nested = self.parse_if_rest(kw.span)?;
            let nested_span = nested.span();
            let block = Block { stmts: vec![nested], span: nested_span };
            (Some(block), nested_span)
        } else if self.check(&Token::KwElse) {
            self.advance();
            let block = self.parse_block_until(&[Token::KwEnd])?;
            let end = self.expect(Token::KwEnd)?;
            (Some(block), end.span)
        } else {
            let end = self.expect(Token::KwEnd)?;
            (None, end.span)
        };

        let span = start.merge(&end_span);
        Ok(Stmt::If { condition, then_branch, else_branch, span })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let kw = self.expect(Token::KwWhile)?;
        let condition = self.parse_expression()?;
        let body = self.parse_block_until(&[Token::KwEnd])?;
        let end = self.expect(Token::KwEnd)?;
        Ok(Stmt::While { condition, body, span: kw.span.merge(&end.span) })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        let kw = self.expect(Token::KwFor)?;
        let (var, _) = self.expect_identifier("loop variable")?;
        self.expect(Token::KwIn)?;
        let iter = self.parse_expression()?;
        let body = self.parse_block_until(&[Token::KwEnd])?;
        let end = self.expect(Token::KwEnd)?;
        Ok(Stmt::For { var, iter, body, span: kw.span.merge(&end.span) })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        let kw = self.expect(Token::KwReturn)?;
        let value = if self.is_at_end()
            || self.check_any(&[Token::Newline, Token::Semicolon, Token::KwEnd])
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = value
            .as_ref()
            .map(|v| kw.span.merge(&v.span()))
            .unwrap_or(kw.span);
        Ok(Stmt::Return { value, span })
    }

    /// Parse `try ... [catch [e[::Type]] ...] [finally ...] end`.
    fn parse_try_statement(&mut self) -> ParseResult<Stmt> {
        let kw = self.expect(Token::KwTry)?;
        let body =
            self.parse_block_until(&[Token::KwCatch, Token::KwFinally, Token::KwEnd])?;

        let catch = if self.check(&Token::KwCatch) {
            let catch_kw = self.advance().unwrap();
            let (binding, ty) = if self.check(&Token::Identifier) {
                let (name, _) = self.expect_identifier("catch binding")?;
                let ty = if self.check(&Token::ColonColon) {
                    self.advance();
                    Some(self.parse_type()?)
                } else {
                    None
                };
                (Some(name), ty)
            } else {
                (None, None)
            };
            let catch_body = self.parse_block_until(&[Token::KwFinally, Token::KwEnd])?;
            let span = catch_kw.span.merge(&catch_body.span);
            Some(CatchClause { binding, ty, body: catch_body, span })
        } else {
            None
        };

        let finally = if self.check(&Token::KwFinally) {
            self.advance();
            Some(self.parse_block_until(&[Token::KwEnd])?)
        } else {
            None
        };

        let end = self.expect(Token::KwEnd)?;
        Ok(Stmt::Try { body, catch, finally, span: kw.span.merge(&end.span) })
    }

    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let (target, target_span) = self.expect_identifier("assignment target")?;
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        let span = target_span.merge(&value.span());
        Ok(Stmt::Assign { target, value, span })
    }
}
