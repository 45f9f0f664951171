// src/syntax/mod.rs
pub mod ast;

pub use ast::{
    ArrayAccessExpr, AssignmentExpr, ConditionalExpr, Expr, ExprKind, InvocationExpr, LambdaBody,
    LambdaExpr, LocalStmt, MemberAccessExpr, MethodBody, MethodRefExpr, NewInstanceExpr, Span,
    Stmt, Unit,
};
