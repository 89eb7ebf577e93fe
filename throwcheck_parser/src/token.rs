//! Token definitions for the lexer.

use logos::Logos;

/// Tokens of the surface language.
///
/// Whitespace is skipped; newlines are significant (statement separators)
/// and surface as [`Token::Newline`].
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\f\r]+")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("function")]
    KwFunction,
    #[token("declare")]
    KwDeclare,
    #[token("abstract")]
    KwAbstract,
    #[token("type")]
    KwType,
    #[token("struct")]
    KwStruct,
    #[token("if")]
    KwIf,
    #[token("elseif")]
    KwElseif,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("for")]
    KwFor,
    #[token("in")]
    KwIn,
    #[token("return")]
    KwReturn,
    #[token("try")]
    KwTry,
    #[token("catch")]
    KwCatch,
    #[token("finally")]
    KwFinally,
    #[token("end")]
    KwEnd,
    #[token("throws")]
    KwThrows,
    #[token("throw")]
    KwThrow,
    #[token("rethrow")]
    KwRethrow,

    // ==================== Boolean Literals ====================
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ==================== Delimiters ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // ==================== Punctuation ====================
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("\n")]
    Newline,
    #[token("::")]
    ColonColon,
    #[token("<:")]
    SubtypeOp,
    #[token("->")]
    Arrow,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // ==================== Operators ====================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Le,
    #[token("<")]
    Lt,
    #[token(">=")]
    Ge,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("=")]
    Assign,

    // ==================== Literals ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+\.[0-9]+")]
    FloatLiteral,
    #[regex(r"[0-9]+")]
    IntLiteral,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,

    // ==================== Comments ====================
    // `#=` opens a (nestable) block comment; the lexer wrapper scans for
    // the matching `=#`. A plain `#` that is not `#=` starts a line comment.
    #[token("#=")]
    BlockCommentStart,
    #[regex(r"#[^=\n][^\n]*|#")]
    LineComment,
}

impl Token {
    /// True for tokens that may begin a type expression.
    pub fn starts_type(&self) -> bool {
        matches!(self, Token::Identifier | Token::LParen)
    }

    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwFunction => "'function'",
            Token::KwDeclare => "'declare'",
            Token::KwAbstract => "'abstract'",
            Token::KwType => "'type'",
            Token::KwStruct => "'struct'",
            Token::KwIf => "'if'",
            Token::KwElseif => "'elseif'",
            Token::KwElse => "'else'",
            Token::KwWhile => "'while'",
            Token::KwFor => "'for'",
            Token::KwIn => "'in'",
            Token::KwReturn => "'return'",
            Token::KwTry => "'try'",
            Token::KwCatch => "'catch'",
            Token::KwFinally => "'finally'",
            Token::KwEnd => "'end'",
            Token::KwThrows => "'throws'",
            Token::KwThrow => "'throw'",
            Token::KwRethrow => "'rethrow'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Newline => "newline",
            Token::ColonColon => "'::'",
            Token::SubtypeOp => "'<:'",
            Token::Arrow => "'->'",
            Token::Question => "'?'",
            Token::Colon => "':'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::EqEq => "'=='",
            Token::NotEq => "'!='",
            Token::Le => "'<='",
            Token::Lt => "'<'",
            Token::Ge => "'>='",
            Token::Gt => "'>'",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Bang => "'!'",
            Token::Assign => "'='",
            Token::Identifier => "identifier",
            Token::FloatLiteral => "float literal",
            Token::IntLiteral => "integer literal",
            Token::StringLiteral => "string literal",
            Token::BlockCommentStart => "comment",
            Token::LineComment => "comment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source).filter_map(|r| r.ok()).collect()
    }

    #[test]
    fn test_keywords_and_punctuation() {
        assert_eq!(
            lex("function f()::Int throws end"),
            vec![
                Token::KwFunction,
                Token::Identifier,
                Token::LParen,
                Token::RParen,
                Token::ColonColon,
                Token::Identifier,
                Token::KwThrows,
                Token::KwEnd,
            ]
        );
    }

    #[test]
    fn test_subtype_vs_comparison() {
        assert_eq!(lex("<: < <="), vec![Token::SubtypeOp, Token::Lt, Token::Le]);
    }

    #[test]
    fn test_arrow_vs_minus() {
        assert_eq!(lex("-> -"), vec![Token::Arrow, Token::Minus]);
    }

    #[test]
    fn test_line_comment_not_block_start() {
        assert_eq!(lex("# plain comment\n1"), vec![
            Token::LineComment,
            Token::Newline,
            Token::IntLiteral,
        ]);
        assert_eq!(lex("#")[0], Token::LineComment);
        assert_eq!(lex("#= block")[0], Token::BlockCommentStart);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(lex(r#""hi \" there""#), vec![Token::StringLiteral]);
    }
}
