//! Clause inference: effective clauses for unconstrained callables and
//! fixed-point convergence over call-graph cycles.

use throwcheck::{
    check_source, check_source_with_options, CheckOptions, CheckReport, DiagnosticCode,
};

fn inferred_clause<'r>(report: &'r CheckReport, function: &str) -> &'r str {
    report
        .inferred
        .iter()
        .find(|i| i.function == function)
        .map(|i| i.clause.as_str())
        .unwrap_or_else(|| panic!("no inferred clause for '{function}': {:?}", report.inferred))
}

#[test]
fn simple_body_infers_its_throw_set() {
    let report = check_source("function f()::Int\n    throw(RangeError())\nend");
    assert!(!report.has_errors());
    assert_eq!(inferred_clause(&report, "f"), "throws RangeError");
}

#[test]
fn non_throwing_body_infers_the_empty_clause() {
    let report = check_source("function f()::Int\n    return 1\nend");
    assert_eq!(inferred_clause(&report, "f"), "throws");
}

#[test]
fn branch_insensitive_over_approximation() {
    // TypeError is raised only under a condition, RangeError
    // unconditionally; both are inferred.
    let report = check_source(
        "function f(x::Int)::Int\n\
         \u{20}   if x > 0\n        throw(TypeError())\n    end\n\
         \u{20}   throw(RangeError())\nend",
    );
    let clause = inferred_clause(&report, "f");
    assert!(clause.contains("TypeError"), "{clause}");
    assert!(clause.contains("RangeError"), "{clause}");
}

#[test]
fn inferred_clause_propagates_to_callers() {
    let report = check_source(
        "function leaf()::Int\n    throw(RangeError())\nend\n\
         function caller()::Int throws\n    return leaf()\nend",
    );
    assert!(report.has_errors());
    let error = report.errors().next().unwrap();
    assert!(error.message.contains("'caller'"));
    assert!(error.message.contains("RangeError"));
    assert!(error.message.contains("propagated from call to 'leaf'"));
}

#[test]
fn inference_spans_call_chains() {
    let report = check_source(
        "function a()::Int\n    throw(KeyError())\nend\n\
         function b()::Int\n    return a()\nend\n\
         function c()::Int\n    return b()\nend",
    );
    assert_eq!(inferred_clause(&report, "c"), "throws KeyError");
}

#[test]
fn mutual_recursion_converges_to_the_union() {
    let report = check_source(
        "function a(x::Int)::Int\n\
         \u{20}   if x > 0\n        throw(TypeError())\n    end\n\
         \u{20}   return b(x)\nend\n\
         function b(x::Int)::Int\n\
         \u{20}   if x < 0\n        throw(RangeError())\n    end\n\
         \u{20}   return a(x)\nend",
    );
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    for function in ["a", "b"] {
        let clause = inferred_clause(&report, function);
        assert!(clause.contains("TypeError"), "{function}: {clause}");
        assert!(clause.contains("RangeError"), "{function}: {clause}");
    }
}

#[test]
fn self_recursion_converges() {
    let report = check_source(
        "function f(x::Int)::Int\n\
         \u{20}   if x > 0\n        throw(TypeError())\n    end\n\
         \u{20}   return f(x - 1)\nend",
    );
    assert_eq!(inferred_clause(&report, "f"), "throws TypeError");
}

#[test]
fn cycle_member_with_declared_clause_is_still_checked() {
    // `a` declares empty but propagates b's raise through the cycle.
    let report = check_source(
        "function a(x::Int)::Int throws\n    return b(x)\nend\n\
         function b(x::Int)::Int\n\
         \u{20}   if x > 0\n        throw(RangeError())\n    end\n\
         \u{20}   return a(x)\nend",
    );
    assert!(report.has_errors());
    let error = report.errors().next().unwrap();
    assert!(error.message.contains("'a'"));
    assert!(error.message.contains("RangeError"));
}

#[test]
fn catch_scopes_apply_during_inference() {
    let report = check_source(
        "function f()::Int\n\
         \u{20}   try\n        throw(TypeError())\n    catch e::TypeError\n        return 0\n    end\n\
         \u{20}   return 1\nend",
    );
    assert_eq!(inferred_clause(&report, "f"), "throws");
}

#[test]
fn no_infer_disables_display_and_propagation() {
    let options = CheckOptions { infer: false, ..CheckOptions::default() };
    let report = check_source_with_options(
        "function leaf()::Int\n    throw(RangeError())\nend\n\
         function caller()::Int throws\n    return leaf()\nend",
        options,
    );
    // Without inference the unconstrained callee contributes nothing and
    // is flagged informationally instead.
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    assert!(report.inferred.is_empty());
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::UnresolvedCallee
            && d.message.contains("leaf")));
}

#[test]
fn external_declarations_are_not_inferred() {
    let report = check_source("declare function ext()::Int");
    assert!(report.inferred.is_empty());
}

#[test]
fn iife_counts_through_its_call_site() {
    let report = check_source(
        "function g()::Int\n\
         \u{20}   return (function ()::Int\n        throw(RangeError())\n    end)()\nend",
    );
    assert_eq!(inferred_clause(&report, "g"), "throws RangeError");
}
