//! Type expression parsing.
//!
//! The same grammar serves annotation positions (`x::T`, `::Ret`) and
//! throws clauses. Forms: bare names, `Base{Args}`, `Union{A, B}`, grouped
//! `(T)`, and conditional types `T <: Check ? A : B`.

use crate::ast::TypeExprAst;
use crate::error::ParseResult;
use crate::parser::Parser;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// Parse a type expression, including conditional types.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeExprAst> {
        let subject = self.parse_type_primary()?;

        // `T <: Check ? A : B` selects a branch once T is instantiated.
        if self.check(&Token::SubtypeOp) {
            self.advance();
            let check = self.parse_type_primary()?;
            self.expect(Token::Question)?;
            let when_true = self.parse_type()?;
            self.expect(Token::Colon)?;
            let when_false = self.parse_type()?;
            let span = subject.span().merge(&when_false.span());
            return Ok(TypeExprAst::Conditional {
                subject: Box::new(subject),
                check: Box::new(check),
                when_true: Box::new(when_true),
                when_false: Box::new(when_false),
                span,
            });
        }

        Ok(subject)
    }

    /// Parse a type without a trailing conditional: name, `Base{Args}`,
    /// `Union{...}`, or a parenthesized type.
    pub(crate) fn parse_type_primary(&mut self) -> ParseResult<TypeExprAst> {
        if self.check(&Token::LParen) {
            self.advance();
            let inner = self.parse_type()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }

        let (name, name_span) = self.expect_identifier("type name")?;

        if self.check(&Token::LBrace) {
            self.advance();
            let mut args = Vec::new();
            loop {
                args.push(self.parse_type()?);
                if self.check(&Token::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
            let close = self.expect(Token::RBrace)?;
            let span = name_span.merge(&close.span);
            if name == "Union" {
                return Ok(TypeExprAst::Union { members: args, span });
            }
            return Ok(TypeExprAst::Parameterized { base: name, args, span });
        }

        Ok(TypeExprAst::Name { name, span: name_span })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::TypeExprAst;
    use crate::parser::Parser;
    use crate::token::Token;

    fn parse_type(source: &str) -> TypeExprAst {
        let mut parser = Parser::new(source);
        parser.advance();
        let ty = parser.parse_type().expect("type should parse");
        assert!(parser.check(&Token::Newline) || parser.is_at_end());
        ty
    }

    #[test]
    fn test_bare_name() {
        assert!(matches!(
            parse_type("TypeError"),
            TypeExprAst::Name { name, .. } if name == "TypeError"
        ));
    }

    #[test]
    fn test_union() {
        match parse_type("Union{TypeError, RangeError}") {
            TypeExprAst::Union { members, .. } => assert_eq!(members.len(), 2),
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_parameterized() {
        match parse_type("Box{T}") {
            TypeExprAst::Parameterized { base, args, .. } => {
                assert_eq!(base, "Box");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected parameterized, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional() {
        match parse_type("T <: ConfigError ? ConfigError : AppError") {
            TypeExprAst::Conditional { subject, check, .. } => {
                assert!(matches!(*subject, TypeExprAst::Name { ref name, .. } if name == "T"));
                assert!(
                    matches!(*check, TypeExprAst::Name { ref name, .. } if name == "ConfigError")
                );
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_grouped_conditional() {
        assert!(matches!(
            parse_type("(T <: A ? B : C)"),
            TypeExprAst::Conditional { .. }
        ));
    }
}
