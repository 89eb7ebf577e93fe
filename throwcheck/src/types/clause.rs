//! Throws clauses.
//!
//! A clause is one of: unconstrained (nothing written), an exact exception
//! set, or a conditional expression over a generic binding, resolved lazily
//! per call site. Clauses are finalized once per check run and never
//! mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::exception::ExceptionType;
use super::set::ExceptionSet;
use super::table::TypeTable;

/// Generic bindings visible at a call site: parameter name → argument type.
pub type Bindings = HashMap<String, ExceptionType>;

/// The declared (or effective) throws clause of a callable signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThrowsClause {
    /// No clause written; propagation is not tracked against a contract.
    Unconstrained,
    /// A concrete, flattened set. Empty means "cannot propagate".
    Exact(ExceptionSet),
    /// A deferred set parameterized by a generic binding.
    Conditional(Box<ConditionalThrows>),
}

/// `subject <: check ? when_true : when_false`, resolved once the subject
/// parameter is instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalThrows {
    /// Name of the generic parameter being tested.
    pub subject: String,
    pub check: ExceptionType,
    pub when_true: ThrowsClause,
    pub when_false: ThrowsClause,
}

impl ThrowsClause {
    pub fn empty() -> Self {
        ThrowsClause::Exact(ExceptionSet::empty())
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, ThrowsClause::Unconstrained)
    }

    /// Resolve under call-site bindings: substitute into exact sets and
    /// select conditional branches whose subject is bound. A pure
    /// function; unbound conditionals stay symbolic.
    pub fn resolve(&self, bindings: &Bindings, table: &TypeTable) -> ThrowsClause {
        match self {
            ThrowsClause::Unconstrained => ThrowsClause::Unconstrained,
            ThrowsClause::Exact(set) => ThrowsClause::Exact(set.substitute(bindings, table)),
            ThrowsClause::Conditional(cond) => {
                let check = match &cond.check {
                    ExceptionType::Param(p) => {
                        bindings.get(p).cloned().unwrap_or_else(|| cond.check.clone())
                    }
                    other => other.clone(),
                };
                match (bindings.get(&cond.subject), &check) {
                    (Some(ExceptionType::Nominal(subject)), ExceptionType::Nominal(target)) => {
                        // Same branch-selection rule as an ordinary `<:` test.
                        let branch = if table.is_assignable(*subject, *target) {
                            &cond.when_true
                        } else {
                            &cond.when_false
                        };
                        branch.resolve(bindings, table)
                    }
                    _ => ThrowsClause::Conditional(Box::new(ConditionalThrows {
                        subject: cond.subject.clone(),
                        check,
                        when_true: cond.when_true.resolve(bindings, table),
                        when_false: cond.when_false.resolve(bindings, table),
                    })),
                }
            }
        }
    }

    /// The set this clause admits, conservatively: for a conditional clause
    /// still unresolved, the union of both branches. Used when a concrete
    /// set is needed without bindings (conformance of the declaring body,
    /// propagation through an uninstantiated call).
    pub fn admitted_set(&self, table: &TypeTable) -> Option<ExceptionSet> {
        match self {
            ThrowsClause::Unconstrained => None,
            ThrowsClause::Exact(set) => Some(set.clone()),
            ThrowsClause::Conditional(cond) => {
                let mut out = cond.when_true.admitted_set(table).unwrap_or_default();
                if let Some(rest) = cond.when_false.admitted_set(table) {
                    out.merge_from(&rest, table);
                }
                Some(out)
            }
        }
    }

    /// Render for diagnostics and advisory display.
    pub fn display(&self, table: &TypeTable) -> String {
        match self {
            ThrowsClause::Unconstrained => "<unconstrained>".to_string(),
            ThrowsClause::Exact(set) if set.is_empty() => "throws".to_string(),
            ThrowsClause::Exact(set) => format!("throws {}", set.display(table)),
            ThrowsClause::Conditional(cond) => format!(
                "throws {} <: {} ? {{{}}} : {{{}}}",
                cond.subject,
                table.display(&cond.check),
                cond.when_true.display(table),
                cond.when_false.display(table),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::exception::ExceptionType;

    fn nominal(table: &TypeTable, name: &str) -> ExceptionType {
        ExceptionType::Nominal(table.lookup(name).unwrap())
    }

    fn conditional(table: &TypeTable) -> ThrowsClause {
        // T <: RangeError ? RangeError : TypeError
        ThrowsClause::Conditional(Box::new(ConditionalThrows {
            subject: "T".to_string(),
            check: nominal(table, "RangeError"),
            when_true: ThrowsClause::Exact(ExceptionSet::singleton(nominal(table, "RangeError"))),
            when_false: ThrowsClause::Exact(ExceptionSet::singleton(nominal(table, "TypeError"))),
        }))
    }

    #[test]
    fn test_resolve_selects_true_branch() {
        let table = TypeTable::new();
        let clause = conditional(&table);
        let mut bindings = Bindings::new();
        bindings.insert("T".to_string(), nominal(&table, "RangeError"));

        match clause.resolve(&bindings, &table) {
            ThrowsClause::Exact(set) => {
                assert!(set.contains(&nominal(&table, "RangeError"), &table));
                assert!(!set.contains(&nominal(&table, "TypeError"), &table));
            }
            other => panic!("expected exact set, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_selects_false_branch() {
        let table = TypeTable::new();
        let clause = conditional(&table);
        let mut bindings = Bindings::new();
        bindings.insert("T".to_string(), nominal(&table, "KeyError"));

        match clause.resolve(&bindings, &table) {
            ThrowsClause::Exact(set) => {
                assert!(set.contains(&nominal(&table, "TypeError"), &table));
            }
            other => panic!("expected exact set, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_subject_stays_symbolic() {
        let table = TypeTable::new();
        let clause = conditional(&table);
        let resolved = clause.resolve(&Bindings::new(), &table);
        assert!(matches!(resolved, ThrowsClause::Conditional(_)));
    }

    #[test]
    fn test_admitted_set_unions_branches() {
        let table = TypeTable::new();
        let set = conditional(&table).admitted_set(&table).unwrap();
        assert!(set.contains(&nominal(&table, "RangeError"), &table));
        assert!(set.contains(&nominal(&table, "TypeError"), &table));
    }
}
