//! throwcheck_parser
//!
//! Parser for a small function language whose callable signatures carry an
//! optional `throws` clause. Produces a typed AST consumed by the
//! `throwcheck` analysis crate.
//!
//! # Example
//!
//! ```
//! use throwcheck_parser::{parse, ThrowsClauseAst};
//!
//! let source = "function f()::Int throws RangeError\n    return 1\nend";
//! let program = parse(source).expect("parse failed");
//!
//! assert_eq!(program.functions.len(), 1);
//! assert!(matches!(
//!     program.functions[0].signature.throws,
//!     ThrowsClauseAst::Declared { .. }
//! ));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

// Re-exports
pub use ast::{
    AbstractTypeDef, BinOp, Block, CatchClause, Expr, FieldDef, FunctionDef, Param, Program,
    Signature, Stmt, StructDef, ThrowsClauseAst, TypeExprAst, TypeParam, UnOp,
};
pub use error::{ParseError, ParseErrors, ParseResult};
pub use lexer::{Lexer, SpannedToken};
pub use parser::Parser;
pub use span::{SourceMap, Span};
pub use token::Token;

/// Parse source code into a [`Program`].
///
/// Returns the first error if any were encountered.
pub fn parse(source: &str) -> ParseResult<Program> {
    let (program, errors) = parser::parse(source);
    match errors.into_iter().next() {
        None => Ok(program),
        Some(first) => Err(first),
    }
}

/// Parse source code with error recovery.
///
/// Returns a [`Program`] even if there are parse errors, along with the
/// collected errors.
pub fn parse_with_errors(source: &str) -> (Program, ParseErrors) {
    parser::parse(source)
}

/// Tokenize source code.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    lexer::tokenize(source)
}

/// Get version information.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let program = parse("").unwrap();
        assert!(program.functions.is_empty());
        assert!(program.main.stmts.is_empty());
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("1 + 2");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
