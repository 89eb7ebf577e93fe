//! Throw collection.
//!
//! Derives, per callable body, the set of exception types that can escape
//! it. A single forward syntax-directed pass: flow-insensitive beyond
//! catch-scope nesting, so branch conditions never prune throw sites (a
//! deliberate over-approximation). Explicit raises contribute their
//! operand's static type; calls contribute the callee's resolved clause;
//! catch scopes subtract what they handle and rethrow re-admits what was
//! caught. Nested closures are collected independently and contribute only
//! at their own call sites.

use throwcheck_parser::{Block, Expr, FunctionDef, Signature, Span, Stmt};

use super::resolve::{CallTarget, LocalEnv, Resolver};
use crate::types::{
    covered_by, ExceptionSet, ExceptionType, ParamBounds, ThrowsClause, TypeTable,
};

/// Why a location propagates.
#[derive(Debug, Clone, PartialEq)]
pub enum ThrowOrigin {
    /// An explicit `throw(...)`.
    Throw,
    /// A `rethrow()` inside a catch body.
    Rethrow,
    /// Propagation from a call with a non-empty resolved clause.
    Call { callee: String },
}

/// A location producing propagation, with the type it propagates.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowSite {
    pub span: Span,
    pub thrown: ExceptionType,
    pub origin: ThrowOrigin,
}

impl ThrowSite {
    /// Human-readable origin for diagnostics.
    pub fn describe_origin(&self) -> String {
        match &self.origin {
            ThrowOrigin::Throw => "thrown here".to_string(),
            ThrowOrigin::Rethrow => "rethrown here".to_string(),
            ThrowOrigin::Call { callee } => format!("propagated from call to '{callee}'"),
        }
    }
}

/// Result of collecting one callable body.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Types that can escape the body, flattened.
    pub escaping: ExceptionSet,
    /// The contributing sites, one per (location, type).
    pub sites: Vec<ThrowSite>,
    /// Calls whose propagation is not tracked (unresolved or unconstrained
    /// callee). Informational, never an error.
    pub untracked: Vec<(String, Span)>,
}

impl Collected {
    fn absorb(&mut self, other: Collected, table: &TypeTable) {
        self.escaping.merge_from(&other.escaping, table);
        self.sites.extend(other.sites);
        self.untracked.extend(other.untracked);
    }

    fn add_site(&mut self, span: Span, thrown: ExceptionType, origin: ThrowOrigin, table: &TypeTable) {
        self.escaping.insert(thrown.clone(), table);
        self.sites.push(ThrowSite { span, thrown, origin });
    }
}

/// Per-body collection state.
struct Ctx<'s> {
    sig: &'s Signature,
    bounds: ParamBounds,
    env: LocalEnv,
    /// Innermost-last stack of caught types, consumed by `rethrow()`.
    caught: Vec<Vec<ExceptionType>>,
}

/// Collects escape sets for callable bodies against the current clause
/// assignment (one clause per named callable).
#[derive(Debug)]
pub struct ThrowCollector<'a, 'p> {
    resolver: &'a Resolver<'p>,
    clauses: &'a [ThrowsClause],
    /// Whether unconstrained closures may contribute their collected set
    /// at their call sites (inference enabled).
    infer: bool,
}

impl<'a, 'p> ThrowCollector<'a, 'p> {
    pub fn new(resolver: &'a Resolver<'p>, clauses: &'a [ThrowsClause], infer: bool) -> Self {
        Self { resolver, clauses, infer }
    }

    fn table(&self) -> &'p TypeTable {
        self.resolver.table()
    }

    /// Collect one callable body. External declarations collect to the
    /// empty result.
    pub fn collect(&self, def: &FunctionDef) -> Collected {
        let Some(body) = &def.body else {
            return Collected::default();
        };
        let mut ctx = Ctx {
            sig: &def.signature,
            bounds: self.resolver.param_bounds(&def.signature),
            env: self.resolver.initial_env(&def.signature),
            caught: Vec::new(),
        };
        self.collect_block(body, &mut ctx)
    }

    fn collect_block(&self, block: &Block, ctx: &mut Ctx<'_>) -> Collected {
        let mut out = Collected::default();
        for stmt in &block.stmts {
            let part = self.collect_stmt(stmt, ctx);
            out.absorb(part, self.table());
        }
        out
    }

    fn collect_stmt(&self, stmt: &Stmt, ctx: &mut Ctx<'_>) -> Collected {
        match stmt {
            Stmt::Expr { expr, .. } => self.collect_expr(expr, ctx),
            Stmt::Assign { target, value, .. } => {
                let out = self.collect_expr(value, ctx);
                let ty = self.resolver.static_type(value, &ctx.env, ctx.sig);
                ctx.env.insert(target.clone(), ty);
                out
            }
            Stmt::Return { value, .. } => value
                .as_ref()
                .map(|expr| self.collect_expr(expr, ctx))
                .unwrap_or_default(),
            Stmt::If { condition, then_branch, else_branch, .. } => {
                // Branch-insensitive: both arms always contribute.
                let mut out = self.collect_expr(condition, ctx);
                out.absorb(self.collect_block(then_branch, ctx), self.table());
                if let Some(block) = else_branch {
                    out.absorb(self.collect_block(block, ctx), self.table());
                }
                out
            }
            Stmt::While { condition, body, .. } => {
                let mut out = self.collect_expr(condition, ctx);
                out.absorb(self.collect_block(body, ctx), self.table());
                out
            }
            Stmt::For { var, iter, body, .. } => {
                let mut out = self.collect_expr(iter, ctx);
                ctx.env.insert(var.clone(), ExceptionType::Opaque);
                out.absorb(self.collect_block(body, ctx), self.table());
                out
            }
            Stmt::Try { body, catch, finally, .. } => {
                self.collect_try(body, catch.as_ref(), finally.as_ref(), ctx)
            }
        }
    }

    fn collect_try(
        &self,
        body: &Block,
        catch: Option<&throwcheck_parser::CatchClause>,
        finally: Option<&Block>,
        ctx: &mut Ctx<'_>,
    ) -> Collected {
        let inner = self.collect_block(body, ctx);
        let mut out = Collected::default();

        match catch {
            None => out.absorb(inner, self.table()),
            Some(catch) => {
                let handled: Option<Vec<ExceptionType>> = match &catch.ty {
                    None => None,
                    Some(ty) => {
                        let (members, _unknown) = self.resolver.exception_types(ty, ctx.sig);
                        Some(members)
                    }
                };

                let (kept, suppressed) = inner.escaping.subtract_handled(
                    handled.as_deref(),
                    &ctx.bounds,
                    self.table(),
                );

                // Sites whose type the handler absorbs stop propagating.
                let kept_sites: Vec<ThrowSite> = inner
                    .sites
                    .into_iter()
                    .filter(|site| match handled.as_deref() {
                        None => false,
                        Some(handled) => !handled
                            .iter()
                            .any(|h| covered_by(&site.thrown, h, &ctx.bounds, self.table())),
                    })
                    .collect();
                out.escaping.merge_from(&kept, self.table());
                out.sites.extend(kept_sites);
                out.untracked.extend(inner.untracked);

                // What a rethrow re-admits: the types this scope actually
                // suppressed (narrowed), or the declared handled types when
                // nothing was observed in flight.
                let caught_types = if !suppressed.is_empty() {
                    suppressed
                } else {
                    handled.clone().unwrap_or_default()
                };

                let binding_ty = match handled.as_deref() {
                    Some([single]) => single.clone(),
                    _ => ExceptionType::Opaque,
                };
                let saved = catch
                    .binding
                    .as_ref()
                    .map(|name| (name.clone(), ctx.env.insert(name.clone(), binding_ty)));

                ctx.caught.push(caught_types);
                let catch_out = self.collect_block(&catch.body, ctx);
                ctx.caught.pop();

                if let Some((name, previous)) = saved {
                    match previous {
                        Some(ty) => ctx.env.insert(name, ty),
                        None => ctx.env.remove(&name),
                    };
                }

                out.absorb(catch_out, self.table());
            }
        }

        if let Some(block) = finally {
            let finally_out = self.collect_block(block, ctx);
            out.absorb(finally_out, self.table());
        }

        out
    }

    fn collect_expr(&self, expr: &Expr, ctx: &mut Ctx<'_>) -> Collected {
        match expr {
            Expr::Throw { value, span } => {
                let mut out = self.collect_expr(value, ctx);
                let thrown = self.resolver.static_type(value, &ctx.env, ctx.sig);
                out.add_site(*span, thrown, ThrowOrigin::Throw, self.table());
                out
            }
            Expr::Rethrow { span } => {
                let mut out = Collected::default();
                match ctx.caught.last() {
                    Some(types) => {
                        for ty in types.clone() {
                            out.add_site(*span, ty, ThrowOrigin::Rethrow, self.table());
                        }
                    }
                    // Outside any catch scope nothing is in flight; the
                    // escape is unknowable, not absent.
                    None => {
                        out.add_site(
                            *span,
                            ExceptionType::Opaque,
                            ThrowOrigin::Rethrow,
                            self.table(),
                        );
                    }
                }
                out
            }
            Expr::Call { callee, args, span } => {
                let mut out = Collected::default();
                for arg in args {
                    out.absorb(self.collect_expr(arg, ctx), self.table());
                }
                self.collect_call(callee, args, *span, ctx, &mut out);
                out
            }
            Expr::Binary { lhs, rhs, .. } => {
                let mut out = self.collect_expr(lhs, ctx);
                out.absorb(self.collect_expr(rhs, ctx), self.table());
                out
            }
            Expr::Unary { operand, .. } => self.collect_expr(operand, ctx),
            // A closure literal that is not called contributes nothing
            // here; its clause matters only at call sites.
            Expr::Closure { .. }
            | Expr::Int { .. }
            | Expr::Float { .. }
            | Expr::Bool { .. }
            | Expr::Str { .. }
            | Expr::Var { .. } => Collected::default(),
        }
    }

    fn collect_call(
        &self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        ctx: &mut Ctx<'_>,
        out: &mut Collected,
    ) {
        match callee {
            Expr::Var { name, .. } => match self.resolver.call_target(name) {
                CallTarget::Constructor(_) => {}
                CallTarget::Unresolved => out.untracked.push((name.clone(), span)),
                CallTarget::Function(id) => {
                    let clause = &self.clauses[id.index()];
                    if clause.is_unconstrained() {
                        out.untracked.push((name.clone(), span));
                        return;
                    }
                    let callee_sig = &self.resolver.func(id).signature;
                    let set = self.resolve_callee_set(clause, callee_sig, args, ctx);
                    for member in set.iter() {
                        out.add_site(
                            span,
                            member.clone(),
                            ThrowOrigin::Call { callee: name.clone() },
                            self.table(),
                        );
                    }
                }
            },
            Expr::Closure { def, .. } => {
                // Immediately-invoked literal: the target is statically
                // known, so the closure's clause applies right here.
                let (clause, _unknown) = self.resolver.lower_clause(&def.signature);
                let set = match clause {
                    ThrowsClause::Unconstrained => {
                        if self.infer {
                            let sub = self.collect(def);
                            out.untracked.extend(sub.untracked);
                            sub.escaping
                        } else {
                            out.untracked.push(("<anonymous function>".to_string(), span));
                            return;
                        }
                    }
                    declared => self.resolve_callee_set(&declared, &def.signature, args, ctx),
                };
                for member in set.iter() {
                    out.add_site(
                        span,
                        member.clone(),
                        ThrowOrigin::Call { callee: "<anonymous function>".to_string() },
                        self.table(),
                    );
                }
            }
            // Calling the result of another expression: no signature to
            // consult.
            other => out.untracked.push(("<dynamic call>".to_string(), other.span())),
        }
    }

    /// Resolve a callee clause at a call site: apply inferred bindings,
    /// select conditional branches where decidable, then close any callee
    /// parameters that stayed symbolic over their bounds.
    fn resolve_callee_set(
        &self,
        clause: &ThrowsClause,
        callee_sig: &Signature,
        args: &[Expr],
        ctx: &Ctx<'_>,
    ) -> ExceptionSet {
        let bindings = self.resolver.call_bindings(callee_sig, args, &ctx.env, ctx.sig);
        let resolved = clause.resolve(&bindings, self.table());
        let set = resolved.admitted_set(self.table()).unwrap_or_default();

        // Callee parameters that no argument bound are closed over their
        // declared bound (or stay unknown), so no foreign parameter names
        // leak into the caller's scope.
        let callee_bounds = self.resolver.param_bounds(callee_sig);
        let mut fallback = crate::types::Bindings::new();
        for param in &callee_sig.type_params {
            if bindings.contains_key(&param.name) {
                continue;
            }
            let closed = callee_bounds
                .get(&param.name)
                .map(|id| ExceptionType::Nominal(*id))
                .unwrap_or(ExceptionType::Opaque);
            fallback.insert(param.name.clone(), closed);
        }
        if fallback.is_empty() {
            set
        } else {
            set.substitute(&fallback, self.table())
        }
    }
}
