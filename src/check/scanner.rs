// src/check/scanner.rs
//! The chain-completeness walk.
//!
//! One entry expression at a time: phase A accepts sentences whose
//! outermost call already terminates; phase B follows the single primary
//! path (receiver, member target, reference qualifier) looking for an
//! unmet completion obligation. Arguments are never part of the chain;
//! nested lambdas and references inside them are separate entry points,
//! discovered by the session driver.

use tracing::trace;

use crate::check::rules::{ChainContext, RuleEvaluator};
use crate::errors::ChainError;
use crate::model::{ResolveError, Resolver, TypeId};
use crate::syntax::{Expr, ExprKind, Span};

pub struct ChainScanner<'a, R: Resolver + ?Sized> {
    resolver: &'a R,
    rules: &'a RuleEvaluator,
}

impl<'a, R: Resolver + ?Sized> ChainScanner<'a, R> {
    pub fn new(resolver: &'a R, rules: &'a RuleEvaluator) -> Self {
        Self { resolver, rules }
    }

    /// Scan one entry expression; `at` locates the finding. A resolver
    /// failure mid-walk surfaces here and is handled by the caller.
    pub fn scan_entry(&self, expr: &Expr, at: Span) -> Result<Option<ChainError>, ResolveError> {
        if self.outer_terminator(expr)? {
            // an outer terminator always wins over inner deficiencies
            return Ok(None);
        }

        let mut ctx = ChainContext::new();
        let found = self.entry_obligation(expr, &mut ctx)? || self.drill(expr, &mut ctx)?;
        trace!(found, line = expr.span.line, "entry scanned");
        if !found {
            return Ok(None);
        }
        Ok(Some(ChainError::UnterminatedChain {
            message: ctx.message(),
            span: at.into(),
        }))
    }

    /// Phase A: a direct invocation (or reference) of a terminator is a
    /// complete sentence, regardless of inner structure. Captures are
    /// discarded; nothing will be reported.
    fn outer_terminator(&self, expr: &Expr) -> Result<bool, ResolveError> {
        let mut scratch = ChainContext::new();
        Ok(match &expr.kind {
            ExprKind::Invocation(inv) => self
                .rules
                .is_terminator(self.resolver.declaration(inv.callee)?, &mut scratch),
            ExprKind::MethodRef(reference) => self
                .rules
                .is_terminator(self.resolver.declaration(reference.referenced)?, &mut scratch),
            _ => false,
        })
    }

    /// The entry expression's own static type may already carry the
    /// obligation: its value is dropped, so an unterminated result type is a
    /// finding even when nothing deeper opens a sentence.
    fn entry_obligation(&self, expr: &Expr, ctx: &mut ChainContext) -> Result<bool, ResolveError> {
        match self.static_type(expr)? {
            Some(ty) => self.rules.requires_completion(ty, self.resolver, ctx),
            None => Ok(false),
        }
    }

    /// Phase B: walk the primary path only.
    fn drill(&self, expr: &Expr, ctx: &mut ChainContext) -> Result<bool, ResolveError> {
        match &expr.kind {
            ExprKind::Identifier(id) => {
                Ok(self.rules.is_opener(self.resolver.declaration(*id)?, ctx))
            }

            ExprKind::Invocation(inv) => {
                let callee = self.resolver.declaration(inv.callee)?;
                // opener wins over terminator on ties
                if self.rules.is_opener(callee, ctx) {
                    return Ok(true);
                }
                if self.rules.is_terminator(callee, ctx) {
                    return Ok(false);
                }
                if callee.is_constructor() || callee.is_static {
                    // chain boundary: only the boundary's own obligation is
                    // tested, nothing propagates across it
                    return self.completion_of(callee.ty, ctx);
                }
                match &inv.receiver {
                    None => Ok(false),
                    Some(receiver) => self.target(receiver, ctx),
                }
            }

            ExprKind::MemberAccess(access) => {
                let member = self.resolver.declaration(access.member)?;
                if self.rules.is_opener(member, ctx) {
                    return Ok(true);
                }
                if self.rules.is_terminator(member, ctx) {
                    return Ok(false);
                }
                if member.is_static {
                    return Ok(false);
                }
                self.target(&access.target, ctx)
            }

            ExprKind::NewInstance(instance) => {
                let constructor = self.resolver.declaration(instance.constructor)?;
                if self.rules.is_opener(constructor, ctx) {
                    return Ok(true);
                }
                self.completion_of(constructor.ty, ctx)
            }

            ExprKind::MethodRef(reference) => {
                let referenced = self.resolver.declaration(reference.referenced)?;
                if self.rules.is_opener(referenced, ctx) {
                    return Ok(true);
                }
                if self.rules.is_terminator(referenced, ctx) {
                    return Ok(false);
                }
                // constructed type for constructor references, return type
                // otherwise
                if self.completion_of(referenced.ty, ctx)? {
                    return Ok(true);
                }
                self.target(&reference.qualifier, ctx)
            }

            ExprKind::Conditional(conditional) => {
                // both branches are drilled; either arm can flag the entry
                let then_found = self.drill(&conditional.then_branch, ctx)?;
                let else_found = self.drill(&conditional.else_branch, ctx)?;
                Ok(then_found || else_found)
            }

            ExprKind::Assignment(_) | ExprKind::ArrayLiteral(_) => Ok(false),

            ExprKind::ArrayAccess(access) => self.drill(&access.base, ctx),

            ExprKind::Lambda(_) => Ok(false),
        }
    }

    /// A target (receiver, member target, reference qualifier). A direct
    /// terminator call settles the sub-chain before its result type is
    /// consulted; otherwise the type's obligation applies, then the drill
    /// continues into it.
    fn target(&self, expr: &Expr, ctx: &mut ChainContext) -> Result<bool, ResolveError> {
        if self.outer_terminator(expr)? {
            return Ok(false);
        }
        if let Some(ty) = self.static_type(expr)? {
            if self.rules.requires_completion(ty, self.resolver, ctx)? {
                return Ok(true);
            }
        }
        self.drill(expr, ctx)
    }

    fn completion_of(
        &self,
        ty: Option<TypeId>,
        ctx: &mut ChainContext,
    ) -> Result<bool, ResolveError> {
        match ty {
            Some(ty) => self.rules.requires_completion(ty, self.resolver, ctx),
            None => Ok(false),
        }
    }

    /// Static type of an expression, derived from its resolved declaration.
    /// A conditional takes its then-branch type; kinds with no useful
    /// declared type yield `None` and contribute no obligations.
    fn static_type(&self, expr: &Expr) -> Result<Option<TypeId>, ResolveError> {
        Ok(match &expr.kind {
            ExprKind::Invocation(inv) => self.resolver.declaration(inv.callee)?.ty,
            ExprKind::NewInstance(instance) => {
                self.resolver.declaration(instance.constructor)?.ty
            }
            ExprKind::MemberAccess(access) => self.resolver.declaration(access.member)?.ty,
            ExprKind::Identifier(id) => self.resolver.declaration(*id)?.ty,
            ExprKind::Conditional(conditional) => self.static_type(&conditional.then_branch)?,
            ExprKind::Lambda(_)
            | ExprKind::MethodRef(_)
            | ExprKind::Assignment(_)
            | ExprKind::ArrayAccess(_)
            | ExprKind::ArrayLiteral(_) => None,
        })
    }
}
