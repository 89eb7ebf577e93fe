//! Tests for the throws clause grammar.
//!
//! The clause occupies one position (after the return type); its type
//! expressions are ordinary type expressions.

use throwcheck_parser::{parse, parse_with_errors, ParseError, ThrowsClauseAst, TypeExprAst};

fn clause_of(source: &str) -> ThrowsClauseAst {
    let program = parse(source).expect("source should parse");
    program.functions[0].signature.throws.clone()
}

#[test]
fn omitted_keyword_is_unconstrained() {
    let clause = clause_of("function f()::Int\n    return 1\nend");
    assert!(clause.is_unconstrained());
}

#[test]
fn bare_throws_is_empty_clause() {
    let clause = clause_of("function f()::Int throws\n    return 1\nend");
    match clause {
        ThrowsClauseAst::Declared { types, .. } => assert!(types.is_empty()),
        other => panic!("expected empty declared clause, got {:?}", other),
    }
}

#[test]
fn bare_throws_before_end_is_empty_clause() {
    // `end` directly after the keyword also terminates the clause.
    let clause = clause_of("function f() throws end");
    assert!(matches!(
        clause,
        ThrowsClauseAst::Declared { ref types, .. } if types.is_empty()
    ));
}

#[test]
fn single_type_clause() {
    let clause = clause_of("function f()::Int throws RangeError\n    return 1\nend");
    match clause {
        ThrowsClauseAst::Declared { types, .. } => {
            assert_eq!(types.len(), 1);
            assert!(matches!(
                types[0],
                TypeExprAst::Name { ref name, .. } if name == "RangeError"
            ));
        }
        other => panic!("expected declared clause, got {:?}", other),
    }
}

#[test]
fn multi_type_clause() {
    let clause = clause_of(
        "function f()::Int throws TypeError, RangeError, SyntaxError\n    return 1\nend",
    );
    match clause {
        ThrowsClauseAst::Declared { types, .. } => assert_eq!(types.len(), 3),
        other => panic!("expected declared clause, got {:?}", other),
    }
}

#[test]
fn union_in_clause() {
    let clause = clause_of(
        "function f()::Int throws Union{TypeError, RangeError}\n    return 1\nend",
    );
    match clause {
        ThrowsClauseAst::Declared { types, .. } => {
            assert_eq!(types.len(), 1);
            assert!(matches!(types[0], TypeExprAst::Union { .. }));
        }
        other => panic!("expected declared clause, got {:?}", other),
    }
}

#[test]
fn conditional_in_clause() {
    let clause = clause_of(
        "function f{T <: Exception}(x::T)::Int throws (T <: ConfigError ? ConfigError : Exception)\n    return 1\nend",
    );
    match clause {
        ThrowsClauseAst::Declared { types, .. } => {
            assert!(matches!(types[0], TypeExprAst::Conditional { .. }));
        }
        other => panic!("expected declared clause, got {:?}", other),
    }
}

#[test]
fn trailing_comma_is_syntax_error() {
    let (_, errors) = parse_with_errors("function f()::Int throws RangeError,\nend");
    let first = errors.first().expect("expected an error");
    assert!(matches!(first, ParseError::TrailingCommaInThrows { .. }));
    assert_eq!(first.code(), "trailing-comma");
}

#[test]
fn trailing_comma_in_multi_type_clause_is_syntax_error() {
    let (_, errors) =
        parse_with_errors("function f()::Int throws TypeError, RangeError,\nend");
    assert!(matches!(
        errors.first(),
        Some(ParseError::TrailingCommaInThrows { .. })
    ));
}

#[test]
fn bare_throws_with_comma_is_syntax_error() {
    // Never a 0-element clause: the empty spelling has no comma.
    let (_, errors) = parse_with_errors("function f() throws ,\nend");
    let first = errors.first().expect("expected an error");
    assert!(matches!(first, ParseError::MissingThrowsType { .. }));
    assert_eq!(first.code(), "missing-type-after-throws");
}

#[test]
fn garbage_after_throws_is_syntax_error() {
    let (_, errors) = parse_with_errors("function f() throws 42\nend");
    assert!(matches!(
        errors.first(),
        Some(ParseError::MissingThrowsType { .. })
    ));
}

#[test]
fn clause_error_does_not_hide_later_functions() {
    let (program, errors) = parse_with_errors(
        "function bad()::Int throws RangeError,\nend\n\
         function good()::Int throws\n    return 1\nend",
    );
    assert!(!errors.is_empty());
    assert!(program
        .functions
        .iter()
        .any(|f| f.signature.name.as_deref() == Some("good")));
}

#[test]
fn declare_with_bare_throws_at_eof() {
    let program = parse("declare function nop()::Int throws").unwrap();
    assert!(matches!(
        program.functions[0].signature.throws,
        ThrowsClauseAst::Declared { ref types, .. } if types.is_empty()
    ));
}
