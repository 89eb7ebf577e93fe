//! Conformance checking: declared clauses against collected propagation.

use pretty_assertions::assert_eq;
use throwcheck::{check_source, CheckReport, DiagnosticCode, Severity};

fn errors_of(report: &CheckReport) -> Vec<String> {
    report.errors().map(|d| d.message.clone()).collect()
}

#[test]
fn empty_clause_with_no_throws_passes() {
    let report = check_source("function f(a::Int, b::Int)::Int throws\n    return a + b\nend");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn empty_clause_with_any_throw_fails() {
    let report = check_source("function f()::Int throws\n    throw(TypeError())\nend");
    assert!(report.has_errors());
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("TypeError"));
    assert_eq!(report.errors().next().unwrap().code, DiagnosticCode::EmptyClauseViolation);
}

#[test]
fn declared_types_cover_matching_throws() {
    let report = check_source(
        "function f(x::Int)::Int throws TypeError, RangeError\n\
         \u{20}   if x > 0\n        throw(TypeError())\n    end\n\
         \u{20}   throw(RangeError())\nend",
    );
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn undeclared_type_is_reported_with_site_and_type() {
    let report = check_source(
        "function f()::Int throws TypeError, RangeError\n    throw(SyntaxError())\nend",
    );
    assert!(report.has_errors());
    let error = report.errors().next().unwrap();
    assert_eq!(error.code, DiagnosticCode::UndeclaredException);
    assert!(error.message.contains("SyntaxError"));
    assert!(error.message.contains("'f'"));
    assert!(error.message.contains("thrown here"));
    assert_eq!(error.span.start_line, 2);
}

#[test]
fn subtype_throw_is_covered_by_declared_supertype() {
    let report = check_source(
        "abstract type AppError <: Exception end\n\
         struct ConfigError <: AppError end\n\
         function load()::Int throws AppError\n    throw(ConfigError())\nend",
    );
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn over_declaration_is_permitted() {
    let report = check_source("function f()::Int throws RangeError\n    return 1\nend");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn call_propagation_checked_against_caller_clause() {
    let report = check_source(
        "declare function risky()::Int throws RangeError\n\
         function ok()::Int throws RangeError\n    return risky()\nend\n\
         function bad()::Int throws TypeError\n    return risky()\nend",
    );
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("'bad'"));
    assert!(errors[0].contains("RangeError"));
    assert!(errors[0].contains("propagated from call to 'risky'"));
}

#[test]
fn unconstrained_callables_are_never_checked() {
    let report = check_source("function f()::Int\n    throw(TypeError())\nend");
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
}

#[test]
fn unresolved_callee_is_informational_never_an_error() {
    let report = check_source("function f()::Int throws\n    return mystery()\nend");
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    let note = report
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::UnresolvedCallee)
        .expect("expected an unresolved-callee note");
    assert_eq!(note.severity, Severity::Note);
    assert!(note.message.contains("mystery"));
}

#[test]
fn external_declaration_contributes_only_its_signature() {
    // `ext` has no clause and no body: callers track nothing from it.
    let report = check_source(
        "declare function ext()::Int\n\
         function f()::Int throws\n    return ext()\nend",
    );
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
}

#[test]
fn warn_only_downgrades_violations() {
    use throwcheck::{check_source_with_options, CheckOptions};
    let report = check_source_with_options(
        "function f()::Int throws\n    throw(TypeError())\nend",
        CheckOptions { warn_only: true, ..CheckOptions::default() },
    );
    assert!(!report.has_errors());
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning
            && d.code == DiagnosticCode::EmptyClauseViolation));
}

#[test]
fn violation_in_one_function_does_not_block_checking_others() {
    let report = check_source(
        "function bad()::Int throws\n    throw(TypeError())\nend\n\
         function also_bad()::Int throws\n    throw(RangeError())\nend",
    );
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn diagnostics_are_sorted_by_position() {
    let report = check_source(
        "function bad()::Int throws\n    throw(TypeError())\nend\n\
         function also_bad()::Int throws\n    throw(RangeError())\nend",
    );
    let spans: Vec<usize> = report.diagnostics.iter().map(|d| d.span.start).collect();
    let mut sorted = spans.clone();
    sorted.sort_unstable();
    assert_eq!(spans, sorted);
}

#[test]
fn generic_clause_checked_per_call_site() {
    let report = check_source(
        "function reraise{E <: Exception}(e::E)::Int throws E\n    throw(e)\nend\n\
         function ok()::Int throws TypeError\n    return reraise(TypeError())\nend\n\
         function bad()::Int throws TypeError\n    return reraise(RangeError())\nend",
    );
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("'bad'"));
    assert!(errors[0].contains("RangeError"));
}

#[test]
fn conditional_clause_resolves_per_call_site() {
    let report = check_source(
        "function pick{T <: Exception}(x::T)::Int throws (T <: RangeError ? RangeError : TypeError)\n\
         \u{20}   return 0\nend\n\
         function narrow()::Int throws RangeError\n    return pick(RangeError())\nend\n\
         function wide()::Int throws RangeError\n    return pick(TypeError())\nend",
    );
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("'wide'"));
    assert!(errors[0].contains("TypeError"));
}

#[test]
fn iife_with_declared_clause_propagates_at_call_site() {
    let report = check_source(
        "function f()::Int throws\n\
         \u{20}   return (function ()::Int throws TypeError\n        throw(TypeError())\n    end)()\nend",
    );
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(report.errors().next().unwrap().code, DiagnosticCode::EmptyClauseViolation);
    assert!(errors[0].contains("TypeError"));
}

#[test]
fn closure_with_declared_clause_is_checked_itself() {
    let report = check_source(
        "h = function ()::Int throws\n    throw(TypeError())\nend",
    );
    let errors = errors_of(&report);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("<anonymous function>"));
}

#[test]
fn uncalled_closure_does_not_count_toward_enclosing_callable() {
    let report = check_source(
        "function f()::Int throws\n\
         \u{20}   g = function ()::Int\n        throw(TypeError())\n    end\n\
         \u{20}   return 1\nend",
    );
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
}
