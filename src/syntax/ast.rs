// src/syntax/ast.rs

use crate::model::DeclId;

/// Source location of a node, as reported by the host front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
    pub line: u32,    // Start line (1-indexed)
    pub column: u32,  // Start column (1-indexed)
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

/// A unit of analyzed source: the method bodies the host asks us to check,
/// in source order.
#[derive(Debug)]
pub struct Unit {
    pub name: String,
    pub methods: Vec<MethodBody>,
}

/// Body of a single method or constructor
#[derive(Debug)]
pub struct MethodBody {
    pub decl: DeclId,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Local(LocalStmt),
    Return(Option<Expr>, Span),
    Block(Vec<Stmt>, Span),
}

/// Local variable declaration: the initializer is exempt from the chain
/// check, but may still contain nested lambdas
#[derive(Debug, Clone)]
pub struct LocalStmt {
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(expr) => expr.span,
            Stmt::Local(local) => local.span,
            Stmt::Return(_, span) => *span,
            Stmt::Block(_, span) => *span,
        }
    }
}

/// Expressions. The variant set is closed: every analysis dispatches with one
/// exhaustive match.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Method or constructor-delegation call: `recv.step(args)` / `step(args)`
    Invocation(Box<InvocationExpr>),

    /// Field or property access: `recv.field`
    MemberAccess(Box<MemberAccessExpr>),

    /// Resolved name: a variable, parameter, field or type reference
    Identifier(DeclId),

    /// Lambda expression
    Lambda(Box<LambdaExpr>),

    /// Method or constructor reference: `recv::step`, `Type::new`
    MethodRef(Box<MethodRefExpr>),

    /// Instantiation: `new Type(args)`
    NewInstance(Box<NewInstanceExpr>),

    /// Ternary conditional
    Conditional(Box<ConditionalExpr>),

    /// Assignment: `target = value`
    Assignment(Box<AssignmentExpr>),

    /// Array element access: `base[index]`
    ArrayAccess(Box<ArrayAccessExpr>),

    /// Array literal: `{a, b, c}`
    ArrayLiteral(Vec<Expr>),
}

/// Invocation of a resolved callee on an optional receiver chain. A missing
/// receiver is an implicit-this or unqualified call.
#[derive(Debug, Clone)]
pub struct InvocationExpr {
    pub callee: DeclId,
    pub receiver: Option<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct MemberAccessExpr {
    pub target: Expr,
    pub member: DeclId,
}

/// Lambda with its resolved target functional method
#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub body: LambdaBody,
    pub functional: DeclId,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Expr),
    Block(Vec<Stmt>),
}

/// Method reference with its resolved target functional method
#[derive(Debug, Clone)]
pub struct MethodRefExpr {
    pub qualifier: Expr,
    pub referenced: DeclId,
    pub functional: DeclId,
}

#[derive(Debug, Clone)]
pub struct NewInstanceExpr {
    pub constructor: DeclId,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub cond: Expr,
    pub then_branch: Expr,
    pub else_branch: Expr,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct ArrayAccessExpr {
    pub base: Expr,
    pub index: Expr,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self.kind, ExprKind::Assignment(_))
    }
}
