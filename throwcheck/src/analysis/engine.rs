//! Clause finalization engine.
//!
//! Schedules collection along call-graph topology. Acyclic callables are
//! collected once, dependencies first. Cyclic components iterate from the
//! empty set, re-collecting all members until the sets stop growing;
//! collection only unions types in, so the iteration is monotone over a
//! finite type universe and terminates. A defensive cap guards against
//! modeling defects and is reported as an internal diagnostic, distinct
//! from user-facing conformance findings.

use throwcheck_parser::{Block, Expr, FunctionDef, Program, Stmt};

use super::call_graph::{CallGraph, FuncId};
use super::collect::{Collected, ThrowCollector};
use super::resolve::Resolver;
use super::scc::{is_recursive_component, strongly_connected_components};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::options::CheckOptions;
use crate::types::{ExceptionSet, ThrowsClause};

/// Iteration cap per cyclic component. Hitting it indicates a defect in
/// the model, not in user code.
pub const MAX_FIXED_POINT_ITERATIONS: usize = 64;

/// Finalized analysis state for one program.
#[derive(Debug)]
pub struct Analysis {
    /// Final clause per callable: declared, inferred effective, or
    /// unconstrained.
    pub clauses: Vec<ThrowsClause>,
    /// Final collection result per callable (empty for external
    /// declarations).
    pub collected: Vec<Collected>,
    /// Whether the callable's clause is an inferred effective clause
    /// rather than an authored contract.
    pub inferred: Vec<bool>,
}

/// Drives collection to a fixed point and finalizes clauses.
#[derive(Debug)]
pub struct ThrowsEngine<'a, 'p> {
    resolver: &'a Resolver<'p>,
    program: &'p Program,
    graph: CallGraph,
    options: CheckOptions,
    clauses: Vec<ThrowsClause>,
    inferable: Vec<bool>,
}

impl<'a, 'p> ThrowsEngine<'a, 'p> {
    /// Lower declared clauses and set up working state. Unknown type names
    /// in clauses are diagnosed here.
    pub fn new(
        program: &'p Program,
        resolver: &'a Resolver<'p>,
        options: CheckOptions,
        sink: &mut DiagnosticSink,
    ) -> Self {
        let graph = CallGraph::build(program);
        let mut clauses = Vec::with_capacity(program.functions.len());
        let mut inferable = Vec::with_capacity(program.functions.len());

        for func in &program.functions {
            let (clause, unknown) = resolver.lower_clause(&func.signature);
            for (name, span) in unknown {
                sink.push(Diagnostic::error(
                    DiagnosticCode::UnknownType,
                    format!("unknown exception type '{name}' in throws clause"),
                    span,
                ));
            }
            let declared = !clause.is_unconstrained();
            let can_infer = !declared && func.body.is_some() && options.infer;
            // Working approximation for inference starts at the empty set,
            // so in-cycle callees read a concrete (growing) set.
            clauses.push(if can_infer { ThrowsClause::empty() } else { clause });
            inferable.push(can_infer);
        }

        Self { resolver, program, graph, options, clauses, inferable }
    }

    /// Run scheduling and fixed-point iteration, then a final collection
    /// pass against the finalized clauses.
    pub fn run(mut self, sink: &mut DiagnosticSink) -> Analysis {
        let sccs = strongly_connected_components(&self.graph);

        for scc in &sccs {
            if is_recursive_component(scc, &self.graph) {
                self.solve_cycle(scc, sink);
            } else {
                for &id in scc {
                    if self.inferable[id.index()] {
                        let collected = self.collect_one(id);
                        self.clauses[id.index()] = ThrowsClause::Exact(collected.escaping);
                    }
                }
            }
        }

        // Final pass: every body re-collected against finalized clauses,
        // producing the sites and notes the checker consumes.
        let collector =
            ThrowCollector::new(self.resolver, &self.clauses, self.options.infer);
        let collected: Vec<Collected> = self
            .program
            .functions
            .iter()
            .map(|func| collector.collect(func))
            .collect();

        Analysis { clauses: self.clauses, collected, inferred: self.inferable }
    }

    fn collect_one(&self, id: FuncId) -> Collected {
        let collector = ThrowCollector::new(self.resolver, &self.clauses, self.options.infer);
        collector.collect(self.resolver.func(id))
    }

    /// Fixed-point iteration across one cyclic component.
    fn solve_cycle(&mut self, scc: &[FuncId], sink: &mut DiagnosticSink) {
        let table = self.resolver.table();
        for round in 0.. {
            let mut changed = false;

            for &id in scc {
                if !self.inferable[id.index()] {
                    continue;
                }
                let collected = self.collect_one(id);
                let current = match &self.clauses[id.index()] {
                    ThrowsClause::Exact(set) => set.clone(),
                    _ => ExceptionSet::empty(),
                };
                let mut grown = current.clone();
                grown.merge_from(&collected.escaping, table);
                if grown != current {
                    self.clauses[id.index()] = ThrowsClause::Exact(grown);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
            if round + 1 >= MAX_FIXED_POINT_ITERATIONS {
                let names: Vec<&str> = scc
                    .iter()
                    .map(|id| self.graph.node(*id).name.as_str())
                    .collect();
                let span = self.resolver.func(scc[0]).signature.span;
                sink.push(Diagnostic::warning(
                    DiagnosticCode::FixedPointCap,
                    format!(
                        "internal: fixed-point iteration over {} did not converge \
                         after {} rounds; inferred clauses may be incomplete",
                        names.join(", "),
                        MAX_FIXED_POINT_ITERATIONS
                    ),
                    span,
                ));
                break;
            }
        }
    }
}

/// Every closure literal in the program, including closures nested inside
/// other closures. Used to conformance-check anonymous callables with
/// declared clauses.
pub fn closures_in_program(program: &Program) -> Vec<&FunctionDef> {
    let mut out = Vec::new();
    for func in &program.functions {
        if let Some(body) = &func.body {
            closures_in_block(body, &mut out);
        }
    }
    closures_in_block(&program.main, &mut out);
    out
}

fn closures_in_block<'p>(block: &'p Block, out: &mut Vec<&'p FunctionDef>) {
    for stmt in &block.stmts {
        closures_in_stmt(stmt, out);
    }
}

fn closures_in_stmt<'p>(stmt: &'p Stmt, out: &mut Vec<&'p FunctionDef>) {
    match stmt {
        Stmt::Expr { expr, .. } => closures_in_expr(expr, out),
        Stmt::Assign { value, .. } => closures_in_expr(value, out),
        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                closures_in_expr(expr, out);
            }
        }
        Stmt::If { condition, then_branch, else_branch, .. } => {
            closures_in_expr(condition, out);
            closures_in_block(then_branch, out);
            if let Some(block) = else_branch {
                closures_in_block(block, out);
            }
        }
        Stmt::While { condition, body, .. } => {
            closures_in_expr(condition, out);
            closures_in_block(body, out);
        }
        Stmt::For { iter, body, .. } => {
            closures_in_expr(iter, out);
            closures_in_block(body, out);
        }
        Stmt::Try { body, catch, finally, .. } => {
            closures_in_block(body, out);
            if let Some(catch) = catch {
                closures_in_block(&catch.body, out);
            }
            if let Some(block) = finally {
                closures_in_block(block, out);
            }
        }
    }
}

fn closures_in_expr<'p>(expr: &'p Expr, out: &mut Vec<&'p FunctionDef>) {
    match expr {
        Expr::Closure { def, .. } => {
            out.push(def);
            if let Some(body) = &def.body {
                closures_in_block(body, out);
            }
        }
        Expr::Call { callee, args, .. } => {
            closures_in_expr(callee, out);
            for arg in args {
                closures_in_expr(arg, out);
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            closures_in_expr(lhs, out);
            closures_in_expr(rhs, out);
        }
        Expr::Unary { operand, .. } => closures_in_expr(operand, out),
        Expr::Throw { value, .. } => closures_in_expr(value, out),
        Expr::Int { .. }
        | Expr::Float { .. }
        | Expr::Bool { .. }
        | Expr::Str { .. }
        | Expr::Var { .. }
        | Expr::Rethrow { .. } => {}
    }
}
