//! Check pipeline: parse → declare types → finalize clauses → conformance.
//!
//! Parse errors become diagnostics and never abort the rest of the check;
//! recovery is isolated to the malformed construct. All results surface
//! through the returned [`CheckReport`].

use throwcheck_parser::{parse_with_errors, ParseError, Program};

use crate::analysis::{check_callable, closures_in_program, Resolver, ThrowCollector, ThrowsEngine};
use crate::api::{CheckReport, InferredClause};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::options::CheckOptions;
use crate::types::{TableError, TypeTable};

/// Run the full check over one source file.
pub fn run_check(source: &str, options: CheckOptions) -> CheckReport {
    let mut sink = DiagnosticSink::new();

    let (program, parse_errors) = parse_with_errors(source);
    for error in parse_errors {
        sink.push(Diagnostic::error(parse_code(&error), error.to_string(), error.span()));
    }

    let table = declare_types(&program, &mut sink);
    let resolver = Resolver::new(&program, &table);

    let engine = ThrowsEngine::new(&program, &resolver, options, &mut sink);
    let analysis = engine.run(&mut sink);

    // Conformance of named callables with authored clauses.
    for (idx, func) in program.functions.iter().enumerate() {
        let clause = &analysis.clauses[idx];
        if analysis.inferred[idx] || clause.is_unconstrained() {
            continue;
        }
        let name = func.signature.name.as_deref().unwrap_or("<anonymous>");
        let bounds = resolver.param_bounds(&func.signature);
        check_callable(
            name,
            clause,
            &analysis.collected[idx],
            &bounds,
            &table,
            options,
            &mut sink,
        );
    }

    // Untracked propagation is informational, never an error.
    for collected in &analysis.collected {
        for (name, span) in &collected.untracked {
            sink.push(Diagnostic::note(
                DiagnosticCode::UnresolvedCallee,
                format!("call to '{name}' has no known throws clause; its propagation is not tracked"),
                *span,
            ));
        }
    }

    // Anonymous callables with authored clauses get the same conformance
    // treatment, against the finalized clause environment.
    let collector = ThrowCollector::new(&resolver, &analysis.clauses, options.infer);
    for def in closures_in_program(&program) {
        let (clause, unknown) = resolver.lower_clause(&def.signature);
        for (name, span) in unknown {
            sink.push(Diagnostic::error(
                DiagnosticCode::UnknownType,
                format!("unknown exception type '{name}' in throws clause"),
                span,
            ));
        }
        if clause.is_unconstrained() {
            continue;
        }
        let collected = collector.collect(def);
        let bounds = resolver.param_bounds(&def.signature);
        check_callable(
            "<anonymous function>",
            &clause,
            &collected,
            &bounds,
            &table,
            options,
            &mut sink,
        );
        for (name, span) in &collected.untracked {
            sink.push(Diagnostic::note(
                DiagnosticCode::UnresolvedCallee,
                format!("call to '{name}' has no known throws clause; its propagation is not tracked"),
                *span,
            ));
        }
    }

    // Advisory display of inferred effective clauses.
    let mut inferred = Vec::new();
    if options.infer {
        for (idx, func) in program.functions.iter().enumerate() {
            if !analysis.inferred[idx] {
                continue;
            }
            let name = func.signature.name.clone().unwrap_or_else(|| "<anonymous>".to_string());
            inferred.push(InferredClause {
                function: name,
                clause: analysis.clauses[idx].display(&table),
            });
        }
    }

    CheckReport { diagnostics: sink.finish(), inferred }
}

/// Register user type declarations, tolerating forward references to
/// parents declared later in the file.
fn declare_types(program: &Program, sink: &mut DiagnosticSink) -> TypeTable {
    let mut table = TypeTable::new();

    // (name, parent, span) worklist; parents may be declared after uses.
    let mut pending: Vec<(&str, Option<&str>, throwcheck_parser::Span)> = program
        .abstract_types
        .iter()
        .map(|at| (at.name.as_str(), at.parent.as_deref(), at.span))
        .chain(
            program
                .structs
                .iter()
                .map(|st| (st.name.as_str(), st.parent.as_deref(), st.span)),
        )
        .collect();

    loop {
        let mut progressed = false;
        let mut deferred = Vec::new();
        for (name, parent, span) in pending {
            match table.register(name, parent) {
                Ok(_) => progressed = true,
                Err(TableError::UnknownParent(_)) => deferred.push((name, parent, span)),
                Err(TableError::Duplicate(_)) => {
                    sink.push(Diagnostic::error(
                        DiagnosticCode::DuplicateType,
                        format!("type '{name}' is already defined"),
                        span,
                    ));
                    progressed = true;
                }
            }
        }
        pending = deferred;
        if pending.is_empty() || !progressed {
            break;
        }
    }

    // Whatever is left has a genuinely unknown parent; register it without
    // one so later references still resolve the name.
    for (name, parent, span) in pending {
        sink.push(Diagnostic::error(
            DiagnosticCode::UnknownType,
            format!(
                "unknown parent type '{}' for '{}'",
                parent.unwrap_or("?"),
                name
            ),
            span,
        ));
        let _ = table.register(name, None);
    }

    table
}

fn parse_code(error: &ParseError) -> DiagnosticCode {
    match error {
        ParseError::TrailingCommaInThrows { .. } => DiagnosticCode::TrailingComma,
        ParseError::MissingThrowsType { .. } => DiagnosticCode::MissingThrowsType,
        _ => DiagnosticCode::Syntax,
    }
}
