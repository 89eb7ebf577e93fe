//! Callable signatures, throws clauses, and type declarations.
//!
//! The throws clause sits between the return type and the body:
//!
//! ```text
//! function name{T <: Bound}(params)::Ret throws T1, T2
//!     ...
//! end
//! ```
//!
//! Bare `throws` (no following tokens on the line) is the empty clause.
//! Omitting the keyword leaves the signature unconstrained. A trailing
//! comma or any other token sequence after `throws` is a syntax error.

use crate::ast::{
    AbstractTypeDef, FieldDef, FunctionDef, Param, Signature, StructDef, ThrowsClauseAst,
    TypeParam,
};
use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// Parse `function name(...) ... end`.
    pub(crate) fn parse_named_function(&mut self) -> ParseResult<FunctionDef> {
        let kw = self.expect(Token::KwFunction)?;
        let (name, _) = self.expect_identifier("function name")?;
        let signature = self.parse_signature_rest(Some(name), kw.span)?;
        let body = self.parse_block_until(&[Token::KwEnd])?;
        let end = self.expect(Token::KwEnd)?;
        let span = kw.span.merge(&end.span);
        Ok(FunctionDef { signature, body: Some(body), span })
    }

    /// Parse `declare function name(...)::Ret throws ...` (no body).
    pub(crate) fn parse_declare_function(&mut self) -> ParseResult<FunctionDef> {
        let kw = self.expect(Token::KwDeclare)?;
        self.expect(Token::KwFunction)?;
        let (name, _) = self.expect_identifier("function name")?;
        let signature = self.parse_signature_rest(Some(name), kw.span)?;
        let span = kw.span.merge(&signature.span);
        Ok(FunctionDef { signature, body: None, span })
    }

    /// Parse an anonymous `function (...) ... end` expression body.
    pub(crate) fn parse_anonymous_function(&mut self) -> ParseResult<FunctionDef> {
        let kw = self.expect(Token::KwFunction)?;
        let signature = self.parse_signature_rest(None, kw.span)?;
        let body = self.parse_block_until(&[Token::KwEnd])?;
        let end = self.expect(Token::KwEnd)?;
        let span = kw.span.merge(&end.span);
        Ok(FunctionDef { signature, body: Some(body), span })
    }

    /// Parse everything after the function name: type parameters, value
    /// parameters, return type, throws clause.
    fn parse_signature_rest(
        &mut self,
        name: Option<String>,
        start: crate::span::Span,
    ) -> ParseResult<Signature> {
        let type_params = if self.check(&Token::LBrace) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        let close = self.expect(Token::RParen)?;
        let mut span = start.merge(&close.span);

        let return_type = if self.check(&Token::ColonColon) {
            self.advance();
            let ty = self.parse_type()?;
            span = span.merge(&ty.span());
            Some(ty)
        } else {
            None
        };

        let throws = self.parse_throws_clause()?;
        if let ThrowsClauseAst::Declared { span: clause_span, .. } = &throws {
            span = span.merge(clause_span);
        }

        Ok(Signature { name, type_params, params, return_type, throws, span })
    }

    /// Parse `{T, S <: Bound}` generic parameters.
    fn parse_type_params(&mut self) -> ParseResult<Vec<TypeParam>> {
        self.expect(Token::LBrace)?;
        let mut type_params = Vec::new();
        loop {
            let (name, name_span) = self.expect_identifier("type parameter")?;
            let (bound, span) = if self.check(&Token::SubtypeOp) {
                self.advance();
                let bound = self.parse_type_primary()?;
                let span = name_span.merge(&bound.span());
                (Some(bound), span)
            } else {
                (None, name_span)
            };
            type_params.push(TypeParam { name, bound, span });
            if self.check(&Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(Token::RBrace)?;
        Ok(type_params)
    }

    /// Parse `name::Type, ...` value parameters (annotations optional).
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let (name, name_span) = self.expect_identifier("parameter name")?;
            let (ty, span) = if self.check(&Token::ColonColon) {
                self.advance();
                let ty = self.parse_type()?;
                let span = name_span.merge(&ty.span());
                (Some(ty), span)
            } else {
                (None, name_span)
            };
            params.push(Param { name, ty, span });
            if self.check(&Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(params)
    }

    /// Parse an optional throws clause.
    ///
    /// Grammar: `["throws" [<Type> ("," <Type>)*]]`, no trailing comma.
    fn parse_throws_clause(&mut self) -> ParseResult<ThrowsClauseAst> {
        if !self.check(&Token::KwThrows) {
            return Ok(ThrowsClauseAst::Unconstrained);
        }
        let kw = self.advance().unwrap();

        // End of line, end of signature, or end of input: the canonical
        // empty clause.
        if self.is_at_end()
            || self.check_any(&[Token::Newline, Token::Semicolon, Token::KwEnd])
        {
            return Ok(ThrowsClauseAst::Declared { types: Vec::new(), span: kw.span });
        }

        let starts_type = self
            .current
            .as_ref()
            .map(|t| t.token.starts_type())
            .unwrap_or(false);
        if !starts_type {
            // Covers `throws ,` (bare keyword plus dangling comma) and any
            // other malformed token sequence after the keyword.
            let found = self.current.as_ref().map(|t| t.text).unwrap_or("");
            return Err(ParseError::MissingThrowsType {
                found: found.to_string(),
                span: self.current_span(),
            });
        }

        let mut types = vec![self.parse_type()?];
        loop {
            if !self.check(&Token::Comma) {
                break;
            }
            let comma = self.advance().unwrap();
            let continues = self
                .current
                .as_ref()
                .map(|t| t.token.starts_type())
                .unwrap_or(false);
            if !continues {
                return Err(ParseError::TrailingCommaInThrows { span: comma.span });
            }
            types.push(self.parse_type()?);
        }

        let span = types
            .iter()
            .fold(kw.span, |acc, ty| acc.merge(&ty.span()));
        Ok(ThrowsClauseAst::Declared { types, span })
    }

    // ==================== Type Declarations ====================

    /// Parse `abstract type Name [<: Parent] end`.
    pub(crate) fn parse_abstract_type(&mut self) -> ParseResult<AbstractTypeDef> {
        let kw = self.expect(Token::KwAbstract)?;
        self.expect(Token::KwType)?;
        let (name, _) = self.expect_identifier("type name")?;
        let parent = if self.check(&Token::SubtypeOp) {
            self.advance();
            Some(self.expect_identifier("parent type name")?.0)
        } else {
            None
        };
        let end = self.expect(Token::KwEnd)?;
        Ok(AbstractTypeDef { name, parent, span: kw.span.merge(&end.span) })
    }

    /// Parse `struct Name [<: Parent] fields... end`.
    pub(crate) fn parse_struct(&mut self) -> ParseResult<StructDef> {
        let kw = self.expect(Token::KwStruct)?;
        let (name, _) = self.expect_identifier("struct name")?;
        let parent = if self.check(&Token::SubtypeOp) {
            self.advance();
            Some(self.expect_identifier("parent type name")?.0)
        } else {
            None
        };

        let mut fields = Vec::new();
        loop {
            self.skip_separators();
            if self.check(&Token::KwEnd) || self.is_at_end() {
                break;
            }
            let (field_name, field_span) = self.expect_identifier("field name")?;
            self.expect(Token::ColonColon)?;
            let ty = self.parse_type()?;
            let span = field_span.merge(&ty.span());
            fields.push(FieldDef { name: field_name, ty, span });
        }

        let end = self.expect(Token::KwEnd)?;
        Ok(StructDef { name, parent, fields, span: kw.span.merge(&end.span) })
    }
}
