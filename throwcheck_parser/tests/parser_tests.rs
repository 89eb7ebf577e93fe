//! Integration tests for the parser: declarations, statements, expressions.

use pretty_assertions::assert_eq;
use throwcheck_parser::{parse, parse_with_errors, Expr, Stmt, ThrowsClauseAst, TypeExprAst};

#[test]
fn parses_named_function() {
    let program = parse(
        "function add(a::Int, b::Int)::Int\n    return a + b\nend",
    )
    .unwrap();

    assert_eq!(program.functions.len(), 1);
    let func = &program.functions[0];
    assert_eq!(func.signature.name.as_deref(), Some("add"));
    assert_eq!(func.signature.params.len(), 2);
    assert!(func.signature.return_type.is_some());
    assert!(func.signature.throws.is_unconstrained());
    assert!(!func.is_external());
}

#[test]
fn parses_type_parameters() {
    let program = parse(
        "function wrap{T <: Exception}(x::T)::T\n    return x\nend",
    )
    .unwrap();

    let sig = &program.functions[0].signature;
    assert_eq!(sig.type_params.len(), 1);
    assert_eq!(sig.type_params[0].name, "T");
    assert!(matches!(
        sig.type_params[0].bound,
        Some(TypeExprAst::Name { ref name, .. }) if name == "Exception"
    ));
}

#[test]
fn parses_declare_function() {
    let program = parse("declare function read_raw(path::Str)::Str throws IoError").unwrap();

    let func = &program.functions[0];
    assert!(func.is_external());
    assert_eq!(func.signature.name.as_deref(), Some("read_raw"));
    match &func.signature.throws {
        ThrowsClauseAst::Declared { types, .. } => assert_eq!(types.len(), 1),
        other => panic!("expected declared clause, got {:?}", other),
    }
}

#[test]
fn parses_abstract_type_and_struct() {
    let program = parse(
        "abstract type AppError <: Exception end\n\
         struct ConfigError <: AppError\n    path::Str\nend\n\
         struct Marker end",
    )
    .unwrap();

    assert_eq!(program.abstract_types.len(), 1);
    assert_eq!(program.abstract_types[0].name, "AppError");
    assert_eq!(program.abstract_types[0].parent.as_deref(), Some("Exception"));

    assert_eq!(program.structs.len(), 2);
    assert_eq!(program.structs[0].name, "ConfigError");
    assert_eq!(program.structs[0].fields.len(), 1);
    assert_eq!(program.structs[1].name, "Marker");
    assert!(program.structs[1].parent.is_none());
}

#[test]
fn parses_try_catch_finally() {
    let program = parse(
        "function f()::Int\n\
         \u{20}   try\n        risky()\n    catch e::Union{TypeError, RangeError}\n        rethrow()\n    finally\n        cleanup()\n    end\n\
         \u{20}   return 0\nend",
    )
    .unwrap();

    let body = program.functions[0].body.as_ref().unwrap();
    match &body.stmts[0] {
        Stmt::Try { catch, finally, .. } => {
            let catch = catch.as_ref().expect("catch clause");
            assert_eq!(catch.binding.as_deref(), Some("e"));
            assert!(matches!(catch.ty, Some(TypeExprAst::Union { .. })));
            assert!(finally.is_some());
        }
        other => panic!("expected try, got {:?}", other),
    }
}

#[test]
fn parses_catch_all() {
    let program = parse(
        "function f()::Int\n    try\n        risky()\n    catch\n        fallback()\n    end\n    return 0\nend",
    )
    .unwrap();

    let body = program.functions[0].body.as_ref().unwrap();
    match &body.stmts[0] {
        Stmt::Try { catch, .. } => {
            let catch = catch.as_ref().expect("catch clause");
            assert!(catch.binding.is_none());
            assert!(catch.ty.is_none());
        }
        other => panic!("expected try, got {:?}", other),
    }
}

#[test]
fn parses_throw_and_rethrow_expressions() {
    let program = parse(
        "function f()::Int\n    throw(TypeError())\nend",
    )
    .unwrap();

    let body = program.functions[0].body.as_ref().unwrap();
    match &body.stmts[0] {
        Stmt::Expr { expr: Expr::Throw { value, .. }, .. } => {
            assert!(matches!(**value, Expr::Call { .. }));
        }
        other => panic!("expected throw, got {:?}", other),
    }
}

#[test]
fn parses_anonymous_function_with_clause() {
    let program = parse(
        "f = function (x::Int)::Int throws RangeError\n    throw(RangeError())\nend",
    )
    .unwrap();

    match &program.main.stmts[0] {
        Stmt::Assign { value: Expr::Closure { def, .. }, .. } => {
            assert!(def.signature.name.is_none());
            assert!(matches!(
                def.signature.throws,
                ThrowsClauseAst::Declared { ref types, .. } if types.len() == 1
            ));
        }
        other => panic!("expected closure assignment, got {:?}", other),
    }
}

#[test]
fn parses_arrow_closure() {
    let program = parse("g = x -> x + 1").unwrap();

    match &program.main.stmts[0] {
        Stmt::Assign { value: Expr::Closure { def, .. }, .. } => {
            assert_eq!(def.signature.params.len(), 1);
            assert!(def.signature.throws.is_unconstrained());
        }
        other => panic!("expected closure assignment, got {:?}", other),
    }
}

#[test]
fn parses_immediately_invoked_closure() {
    let program = parse(
        "x = (function ()::Int throws TypeError\n    throw(TypeError())\nend)()",
    )
    .unwrap();

    match &program.main.stmts[0] {
        Stmt::Assign { value: Expr::Call { callee, .. }, .. } => {
            assert!(matches!(**callee, Expr::Closure { .. }));
        }
        other => panic!("expected call of closure, got {:?}", other),
    }
}

#[test]
fn parses_if_elseif_else() {
    let program = parse(
        "function f(x::Int)::Int\n\
         \u{20}   if x > 0\n        return 1\n    elseif x < 0\n        return 2\n    else\n        return 3\n    end\nend",
    )
    .unwrap();

    let body = program.functions[0].body.as_ref().unwrap();
    match &body.stmts[0] {
        Stmt::If { else_branch, .. } => {
            // elseif desugars to a nested if in the else branch
            let else_block = else_branch.as_ref().expect("else branch");
            assert!(matches!(else_block.stmts[0], Stmt::If { .. }));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn recovers_from_bad_function() {
    let (program, errors) = parse_with_errors(
        "function broken(\n\
         function ok()::Int\n    return 1\nend",
    );

    assert!(!errors.is_empty());
    assert!(program.functions.iter().any(|f| f.signature.name.as_deref() == Some("ok")));
}

#[test]
fn comments_are_skipped() {
    let program = parse(
        "# leading comment\n\
         #= block\n   comment =#\n\
         function f()::Int\n    return 1 # trailing\nend",
    )
    .unwrap();
    assert_eq!(program.functions.len(), 1);
}
