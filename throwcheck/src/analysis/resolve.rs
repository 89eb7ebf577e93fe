//! Resolution services consumed by the collector and checker.
//!
//! Bundles the three seams to the host compiler: assignability (via the
//! type table), static typing of expressions (`static_type`), and call
//! target resolution (`call_target`). Also lowers parsed clause syntax into
//! the model's [`ThrowsClause`].

use std::collections::HashMap;

use throwcheck_parser::{Expr, FunctionDef, Program, Signature, Span, ThrowsClauseAst, TypeExprAst};

use super::call_graph::FuncId;
use crate::types::{
    Bindings, ConditionalThrows, ExceptionSet, ExceptionType, ParamBounds, ThrowsClause, TypeId,
    TypeTable,
};

/// Resolution of a call by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    /// A known callable (named function or `declare`d signature).
    Function(FuncId),
    /// Implicit constructor of a nominal type; cannot throw.
    Constructor(TypeId),
    /// No known signature; treated as unconstrained.
    Unresolved,
}

/// Local variable types, by name.
pub type LocalEnv = HashMap<String, ExceptionType>;

/// Name resolution and expression typing over one program.
#[derive(Debug)]
pub struct Resolver<'p> {
    program: &'p Program,
    table: &'p TypeTable,
    functions: HashMap<&'p str, FuncId>,
}

impl<'p> Resolver<'p> {
    pub fn new(program: &'p Program, table: &'p TypeTable) -> Self {
        let mut functions = HashMap::new();
        for (idx, func) in program.functions.iter().enumerate() {
            if let Some(name) = func.signature.name.as_deref() {
                // First definition wins; duplicates are diagnosed elsewhere.
                functions.entry(name).or_insert(FuncId(idx as u32));
            }
        }
        Self { program, table, functions }
    }

    pub fn table(&self) -> &'p TypeTable {
        self.table
    }

    pub fn func(&self, id: FuncId) -> &'p FunctionDef {
        &self.program.functions[id.index()]
    }

    /// Resolve a call by name: outer constructors (functions named after a
    /// type) shadow the implicit constructor.
    pub fn call_target(&self, name: &str) -> CallTarget {
        if let Some(&id) = self.functions.get(name) {
            return CallTarget::Function(id);
        }
        if let Some(id) = self.table.lookup(name) {
            return CallTarget::Constructor(id);
        }
        CallTarget::Unresolved
    }

    fn is_type_param(sig: &Signature, name: &str) -> bool {
        sig.type_params.iter().any(|p| p.name == name)
    }

    /// Nominal id behind a bound annotation, if any.
    fn bound_type_id(&self, ty: &TypeExprAst) -> Option<TypeId> {
        match ty {
            TypeExprAst::Name { name, .. } => self.table.lookup(name),
            TypeExprAst::Parameterized { base, .. } => self.table.lookup(base),
            _ => None,
        }
    }

    /// Upper bounds of a signature's generic parameters.
    pub fn param_bounds(&self, sig: &Signature) -> ParamBounds {
        let mut bounds = ParamBounds::new();
        for param in &sig.type_params {
            if let Some(id) = param.bound.as_ref().and_then(|b| self.bound_type_id(b)) {
                bounds.insert(param.name.clone(), id);
            }
        }
        bounds
    }

    /// Seed a local environment from a signature's value parameters.
    pub fn initial_env(&self, sig: &Signature) -> LocalEnv {
        let mut env = LocalEnv::new();
        for param in &sig.params {
            let ty = match &param.ty {
                Some(TypeExprAst::Name { name, .. }) => {
                    if Self::is_type_param(sig, name) {
                        ExceptionType::Param(name.clone())
                    } else {
                        self.table
                            .lookup(name)
                            .map(ExceptionType::Nominal)
                            .unwrap_or(ExceptionType::Opaque)
                    }
                }
                _ => ExceptionType::Opaque,
            };
            env.insert(param.name.clone(), ty);
        }
        env
    }

    /// Flatten a type expression into exception-type members.
    ///
    /// Unions flatten; a conditional used as a plain type (outside the
    /// clause model) contributes both branches; parameterized types are
    /// identified by their base name. Unknown names are reported, not
    /// silently defaulted.
    pub fn exception_types(
        &self,
        ty: &TypeExprAst,
        sig: &Signature,
    ) -> (Vec<ExceptionType>, Vec<(String, Span)>) {
        let mut members = Vec::new();
        let mut unknown = Vec::new();
        self.flatten_type(ty, sig, &mut members, &mut unknown);
        (members, unknown)
    }

    fn flatten_type(
        &self,
        ty: &TypeExprAst,
        sig: &Signature,
        members: &mut Vec<ExceptionType>,
        unknown: &mut Vec<(String, Span)>,
    ) {
        match ty {
            TypeExprAst::Name { name, span } => {
                if Self::is_type_param(sig, name) {
                    members.push(ExceptionType::Param(name.clone()));
                } else if let Some(id) = self.table.lookup(name) {
                    members.push(ExceptionType::Nominal(id));
                } else {
                    unknown.push((name.clone(), *span));
                }
            }
            TypeExprAst::Parameterized { base, span, .. } => {
                if let Some(id) = self.table.lookup(base) {
                    members.push(ExceptionType::Nominal(id));
                } else {
                    unknown.push((base.clone(), *span));
                }
            }
            TypeExprAst::Union { members: parts, .. } => {
                for part in parts {
                    self.flatten_type(part, sig, members, unknown);
                }
            }
            TypeExprAst::Conditional { when_true, when_false, .. } => {
                self.flatten_type(when_true, sig, members, unknown);
                self.flatten_type(when_false, sig, members, unknown);
            }
        }
    }

    /// Lower a parsed throws clause into the model.
    ///
    /// A clause list mixing plain types with a conditional folds into one
    /// conditional whose branches carry the plain types, preserving the
    /// three-variant clause model.
    pub fn lower_clause(&self, sig: &Signature) -> (ThrowsClause, Vec<(String, Span)>) {
        let ThrowsClauseAst::Declared { types, .. } = &sig.throws else {
            return (ThrowsClause::Unconstrained, Vec::new());
        };

        let mut unknown = Vec::new();
        let mut clause = ThrowsClause::empty();
        for ty in types {
            let atom = self.clause_atom(ty, sig, &mut unknown);
            clause = combine_clauses(clause, atom, self.table);
        }
        (clause, unknown)
    }

    fn clause_atom(
        &self,
        ty: &TypeExprAst,
        sig: &Signature,
        unknown: &mut Vec<(String, Span)>,
    ) -> ThrowsClause {
        if let TypeExprAst::Conditional { subject, check, when_true, when_false, .. } = ty {
            let check_ty = {
                let (mut members, unk) = self.exception_types(check, sig);
                unknown.extend(unk);
                members.pop().unwrap_or(ExceptionType::Opaque)
            };

            // Symbolic subject: defer branch selection to instantiation.
            if let TypeExprAst::Name { name, .. } = &**subject {
                if Self::is_type_param(sig, name) {
                    return ThrowsClause::Conditional(Box::new(ConditionalThrows {
                        subject: name.clone(),
                        check: check_ty,
                        when_true: self.clause_atom(when_true, sig, unknown),
                        when_false: self.clause_atom(when_false, sig, unknown),
                    }));
                }
            }

            // Concrete subject: the branch is decidable at lowering time.
            let (subject_members, unk) = self.exception_types(subject, sig);
            unknown.extend(unk);
            match (subject_members.first(), &check_ty) {
                (Some(ExceptionType::Nominal(s)), ExceptionType::Nominal(c)) => {
                    let branch = if self.table.is_assignable(*s, *c) {
                        when_true
                    } else {
                        when_false
                    };
                    return self.clause_atom(branch, sig, unknown);
                }
                _ => {
                    // Undecidable: admit both branches.
                    let a = self.clause_atom(when_true, sig, unknown);
                    let b = self.clause_atom(when_false, sig, unknown);
                    return combine_clauses(a, b, self.table);
                }
            }
        }

        let (members, unk) = self.exception_types(ty, sig);
        unknown.extend(unk);
        ThrowsClause::Exact(ExceptionSet::from_types(members, self.table))
    }

    /// Static type of an expression, as far as the model needs: literals,
    /// locals, and call results. Everything else is `Opaque`.
    pub fn static_type(&self, expr: &Expr, env: &LocalEnv, _sig: &Signature) -> ExceptionType {
        match expr {
            Expr::Int { .. } => self.scalar("Int"),
            Expr::Float { .. } => self.scalar("Float"),
            Expr::Bool { .. } => self.scalar("Bool"),
            Expr::Str { .. } => self.scalar("Str"),
            Expr::Var { name, .. } => env.get(name).cloned().unwrap_or(ExceptionType::Opaque),
            Expr::Call { callee, .. } => match &**callee {
                Expr::Var { name, .. } => match self.call_target(name) {
                    CallTarget::Constructor(id) => ExceptionType::Nominal(id),
                    CallTarget::Function(id) => self.return_type(&self.func(id).signature),
                    CallTarget::Unresolved => ExceptionType::Opaque,
                },
                Expr::Closure { def, .. } => self.return_type(&def.signature),
                _ => ExceptionType::Opaque,
            },
            Expr::Binary { op, .. } => {
                use throwcheck_parser::BinOp::*;
                match op {
                    Eq | Ne | Lt | Le | Gt | Ge | And | Or => self.scalar("Bool"),
                    Add | Sub | Mul | Div => ExceptionType::Opaque,
                }
            }
            Expr::Unary { op, .. } => match op {
                throwcheck_parser::UnOp::Not => self.scalar("Bool"),
                throwcheck_parser::UnOp::Neg => ExceptionType::Opaque,
            },
            Expr::Throw { .. } | Expr::Rethrow { .. } | Expr::Closure { .. } => {
                ExceptionType::Opaque
            }
        }
    }

    fn scalar(&self, name: &str) -> ExceptionType {
        self.table
            .lookup(name)
            .map(ExceptionType::Nominal)
            .unwrap_or(ExceptionType::Opaque)
    }

    /// Declared return type of a signature, for call-result typing.
    pub fn return_type(&self, sig: &Signature) -> ExceptionType {
        match &sig.return_type {
            Some(TypeExprAst::Name { name, .. }) => {
                if Self::is_type_param(sig, name) {
                    ExceptionType::Param(name.clone())
                } else {
                    self.table
                        .lookup(name)
                        .map(ExceptionType::Nominal)
                        .unwrap_or(ExceptionType::Opaque)
                }
            }
            _ => ExceptionType::Opaque,
        }
    }

    /// Infer generic bindings at a call site from argument static types.
    ///
    /// Only direct `x::T` parameter positions bind; an opaque argument
    /// leaves the parameter symbolic rather than binding it to unknown.
    pub fn call_bindings(
        &self,
        callee_sig: &Signature,
        args: &[Expr],
        env: &LocalEnv,
        caller_sig: &Signature,
    ) -> Bindings {
        let mut bindings = Bindings::new();
        for (param, arg) in callee_sig.params.iter().zip(args) {
            let Some(TypeExprAst::Name { name, .. }) = &param.ty else {
                continue;
            };
            if !Self::is_type_param(callee_sig, name) || bindings.contains_key(name) {
                continue;
            }
            let arg_ty = self.static_type(arg, env, caller_sig);
            if !arg_ty.is_opaque() {
                bindings.insert(name.clone(), arg_ty);
            }
        }
        bindings
    }
}

/// Union two clause atoms, pushing sets into conditional branches so the
/// result stays within the three-variant model.
fn combine_clauses(a: ThrowsClause, b: ThrowsClause, table: &TypeTable) -> ThrowsClause {
    match (a, b) {
        (ThrowsClause::Unconstrained, other) | (other, ThrowsClause::Unconstrained) => other,
        (ThrowsClause::Exact(x), ThrowsClause::Exact(y)) => {
            ThrowsClause::Exact(ExceptionSet::union(&x, &y, table))
        }
        (ThrowsClause::Exact(x), ThrowsClause::Conditional(c)) => {
            ThrowsClause::Conditional(Box::new(ConditionalThrows {
                subject: c.subject,
                check: c.check,
                when_true: combine_clauses(
                    ThrowsClause::Exact(x.clone()),
                    c.when_true,
                    table,
                ),
                when_false: combine_clauses(ThrowsClause::Exact(x), c.when_false, table),
            }))
        }
        (ThrowsClause::Conditional(c), y) => {
            ThrowsClause::Conditional(Box::new(ConditionalThrows {
                subject: c.subject,
                check: c.check,
                when_true: combine_clauses(c.when_true, y.clone(), table),
                when_false: combine_clauses(c.when_false, y, table),
            }))
        }
    }
}
