//! Expression parsing (precedence climbing).

use crate::ast::{BinOp, Block, Expr, FunctionDef, Param, Signature, Stmt, ThrowsClauseAst, UnOp};
use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.check(&Token::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            let span = lhs.span().merge(&rhs.span());
            lhs = Expr::Binary { op: BinOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_comparison()?;
        while self.check(&Token::AndAnd) {
            self.advance();
            let rhs = self.parse_comparison()?;
            let span = lhs.span().merge(&rhs.span());
            lhs = Expr::Binary { op: BinOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::EqEq) => BinOp::Eq,
                Some(Token::NotEq) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            let span = lhs.span().merge(&rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span().merge(&rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let span = lhs.span().merge(&rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current.as_ref().map(|t| &t.token) {
            Some(Token::Minus) => Some(UnOp::Neg),
            Some(Token::Bang) => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let tok = self.advance().unwrap();
            let operand = self.parse_unary()?;
            let span = tok.span.merge(&operand.span());
            return Ok(Expr::Unary { op, operand: Box::new(operand), span });
        }
        self.parse_postfix()
    }

    /// Parse call chains: `f(a)(b)` applies the result of `f(a)`.
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.check(&Token::LParen) {
            self.advance();
            let mut args = Vec::new();
            if !self.check(&Token::RParen) {
                loop {
                    args.push(self.parse_expression()?);
                    if self.check(&Token::Comma) {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            let close = self.expect(Token::RParen)?;
            let span = expr.span().merge(&close.span);
            expr = Expr::Call { callee: Box::new(expr), args, span };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let tok = match self.current.as_ref() {
            Some(t) => t.clone(),
            None => {
                return Err(ParseError::unexpected_eof("expression", self.current_span()));
            }
        };

        match tok.token {
            Token::IntLiteral => {
                self.advance();
                let value = tok.text.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                    literal: tok.text.to_string(),
                    span: tok.span,
                })?;
                Ok(Expr::Int { value, span: tok.span })
            }
            Token::FloatLiteral => {
                self.advance();
                let value = tok.text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    literal: tok.text.to_string(),
                    span: tok.span,
                })?;
                Ok(Expr::Float { value, span: tok.span })
            }
            Token::True => {
                self.advance();
                Ok(Expr::Bool { value: true, span: tok.span })
            }
            Token::False => {
                self.advance();
                Ok(Expr::Bool { value: false, span: tok.span })
            }
            Token::StringLiteral => {
                self.advance();
                Ok(Expr::Str { value: unescape(tok.text), span: tok.span })
            }
            Token::Identifier => {
                // `x -> expr` is a single-parameter closure.
                if self.peek_next() == Some(Token::Arrow) {
                    return self.parse_arrow_closure();
                }
                self.advance();
                Ok(Expr::Var { name: tok.text.to_string(), span: tok.span })
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::KwThrow => {
                self.advance();
                self.expect(Token::LParen)?;
                let value = self.parse_expression()?;
                let close = self.expect(Token::RParen)?;
                let span = tok.span.merge(&close.span);
                Ok(Expr::Throw { value: Box::new(value), span })
            }
            Token::KwRethrow => {
                self.advance();
                self.expect(Token::LParen)?;
                let close = self.expect(Token::RParen)?;
                Ok(Expr::Rethrow { span: tok.span.merge(&close.span) })
            }
            Token::KwFunction => {
                let def = self.parse_anonymous_function()?;
                let span = def.span;
                Ok(Expr::Closure { def: Box::new(def), span })
            }
            _ => Err(ParseError::unexpected_token(
                tok.text,
                "expression",
                tok.span,
            )),
        }
    }

    /// Parse `x -> expr` into an unconstrained single-parameter closure.
    fn parse_arrow_closure(&mut self) -> ParseResult<Expr> {
        let (param_name, param_span) = self.expect_identifier("closure parameter")?;
        self.expect(Token::Arrow)?;
        let body_expr = self.parse_expression()?;
        let body_span = body_expr.span();
        let span = param_span.merge(&body_span);

        let def = FunctionDef {
            signature: Signature {
                name: None,
                type_params: Vec::new(),
                params: vec![Param { name: param_name, ty: None, span: param_span }],
                return_type: None,
                throws: ThrowsClauseAst::Unconstrained,
                span: param_span,
            },
            body: Some(Block {
                stmts: vec![Stmt::Return { value: Some(body_expr), span: body_span }],
                span: body_span,
            }),
            span,
        };
        Ok(Expr::Closure { def: Box::new(def), span })
    }
}

/// Strip quotes and process the escape sequences the lexer admits.
fn unescape(raw: &str) -> String {
    let inner = &raw[1..raw.len().saturating_sub(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
