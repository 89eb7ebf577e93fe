//! Abstract syntax tree for the surface language.
//!
//! The parser produces this tree directly. Every node carries a [`Span`] so
//! later passes can report diagnostics without access to the token stream.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub abstract_types: Vec<AbstractTypeDef>,
    pub structs: Vec<StructDef>,
    pub functions: Vec<FunctionDef>,
    /// Top-level statements outside any function.
    pub main: Block,
    pub span: Span,
}

/// Abstract type declaration: `abstract type AppError <: Exception end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractTypeDef {
    pub name: String,
    /// Parent type name. `None` means the hierarchy root decides.
    pub parent: Option<String>,
    pub span: Span,
}

/// Struct declaration: `struct ConfigError <: AppError ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,
    pub parent: Option<String>,
    pub fields: Vec<FieldDef>,
    pub span: Span,
}

/// A struct field: `path::Str`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeExprAst,
    pub span: Span,
}

/// A callable definition.
///
/// `body` is `None` for `declare function ...` external signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub signature: Signature,
    pub body: Option<Block>,
    pub span: Span,
}

impl FunctionDef {
    /// True for `declare function` signatures without a body.
    pub fn is_external(&self) -> bool {
        self.body.is_none()
    }
}

/// A callable signature, the attachment point for a throws clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// `None` for anonymous functions.
    pub name: Option<String>,
    /// Generic parameters: `function f{T <: Exception}(...)`
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExprAst>,
    pub throws: ThrowsClauseAst,
    pub span: Span,
}

/// A generic parameter with optional upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<TypeExprAst>,
    pub span: Span,
}

/// A value parameter with optional type annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExprAst>,
    pub span: Span,
}

/// The parsed form of a throws clause.
///
/// `Unconstrained` means the keyword was omitted entirely. A declared clause
/// with an empty type list is the canonical "cannot propagate" spelling:
/// bare `throws` with no following tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThrowsClauseAst {
    Unconstrained,
    Declared { types: Vec<TypeExprAst>, span: Span },
}

impl ThrowsClauseAst {
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, ThrowsClauseAst::Unconstrained)
    }
}

/// A type expression.
///
/// Clause type expressions reuse this grammar verbatim; only the clause
/// position is specific to the effect system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExprAst {
    /// Bare name: `TypeError`, or a type-parameter reference.
    Name { name: String, span: Span },
    /// Parameterized name: `Box{T}`.
    Parameterized {
        base: String,
        args: Vec<TypeExprAst>,
        span: Span,
    },
    /// Union type: `Union{A, B}`.
    Union { members: Vec<TypeExprAst>, span: Span },
    /// Conditional type: `T <: Check ? WhenTrue : WhenFalse`.
    Conditional {
        subject: Box<TypeExprAst>,
        check: Box<TypeExprAst>,
        when_true: Box<TypeExprAst>,
        when_false: Box<TypeExprAst>,
        span: Span,
    },
}

impl TypeExprAst {
    pub fn span(&self) -> Span {
        match self {
            TypeExprAst::Name { span, .. }
            | TypeExprAst::Parameterized { span, .. }
            | TypeExprAst::Union { span, .. }
            | TypeExprAst::Conditional { span, .. } => *span,
        }
    }
}

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn empty(span: Span) -> Self {
        Self { stmts: Vec::new(), span }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr {
        expr: Expr,
        span: Span,
    },
    Assign {
        target: String,
        value: Expr,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    If {
        condition: Expr,
        then_branch: Block,
        /// `elseif` chains are desugared into a nested `If` here.
        else_branch: Option<Block>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },
    For {
        var: String,
        iter: Expr,
        body: Block,
        span: Span,
    },
    Try {
        body: Block,
        catch: Option<CatchClause>,
        finally: Option<Block>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Try { span, .. } => *span,
        }
    }
}

/// A catch handler: `catch`, `catch e`, or `catch e::Union{A, B}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub binding: Option<String>,
    /// `None` is a catch-all handler.
    pub ty: Option<TypeExprAst>,
    pub body: Block,
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Int {
        value: i64,
        span: Span,
    },
    Float {
        value: f64,
        span: Span,
    },
    Bool {
        value: bool,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    Var {
        name: String,
        span: Span,
    },
    /// A call. The callee is an arbitrary expression; name calls have a
    /// `Var` callee, immediately-invoked closures a `Closure` callee.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `throw(expr)`
    Throw {
        value: Box<Expr>,
        span: Span,
    },
    /// `rethrow()`, valid only lexically inside a catch body.
    Rethrow {
        span: Span,
    },
    /// Anonymous function: `function (x)::Int throws E ... end` or `x -> expr`.
    Closure {
        def: Box<FunctionDef>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int { span, .. }
            | Expr::Float { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Str { span, .. }
            | Expr::Var { span, .. }
            | Expr::Call { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Throw { span, .. }
            | Expr::Rethrow { span }
            | Expr::Closure { span, .. } => *span,
        }
    }
}
