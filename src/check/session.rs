// src/check/session.rs
//! Session driver.
//!
//! A session owns the rule stores for one analysis run: registry and cache
//! are populated once, then every unit the host hands over is scanned with
//! the same stores. Entry points are discovered and checked in source
//! order; a failure inside one entry point downgrades to a warning and the
//! rest of the pass continues.

use tracing::{debug, warn};

use crate::check::marker::{CheckMarker, CHECKED_MARKER_CONTENT, CHECKED_MARKER_NAME};
use crate::check::registry::{ExternalRegistry, RegistrySource};
use crate::check::rules::RuleEvaluator;
use crate::check::scanner::ChainScanner;
use crate::errors::{CheckWarning, Diagnostic, DiagnosticEmitter, SessionError};
use crate::model::{DeclId, ResolveError, Resolver};
use crate::syntax::{Expr, ExprKind, LambdaBody, Span, Stmt, Unit};

pub struct CheckSession<'a, R: Resolver + ?Sized> {
    resolver: &'a R,
    rules: RuleEvaluator,
}

impl<'a, R: Resolver + ?Sized> CheckSession<'a, R> {
    /// Wire up a session: persist the proof-of-execution marker and load
    /// the external registry. Registry content problems are warnings; a
    /// resolver wiring failure is fatal and nothing gets scanned.
    pub fn new(
        resolver: &'a R,
        sources: &[RegistrySource],
        emitter: &mut dyn DiagnosticEmitter,
        marker: &dyn CheckMarker,
    ) -> Result<Self, SessionError> {
        if let Err(error) = marker.persist(CHECKED_MARKER_NAME, CHECKED_MARKER_CONTENT) {
            warn!(%error, "unable to persist check marker");
        }
        let registry = ExternalRegistry::load(sources, resolver, emitter)?;
        Ok(Self {
            resolver,
            rules: RuleEvaluator::new(registry),
        })
    }

    /// Check every entry point of a unit, in source order
    pub fn check_unit(&self, unit: &Unit, emitter: &mut dyn DiagnosticEmitter) {
        debug!(unit = %unit.name, methods = unit.methods.len(), "checking unit");
        for method in &unit.methods {
            match self.is_suppressed(method.decl) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(error) => {
                    self.report_aborted(error, method.span, emitter);
                    continue;
                }
            }
            for stmt in &method.body {
                self.walk_stmt(stmt, emitter);
            }
        }
    }

    pub fn rules(&self) -> &RuleEvaluator {
        &self.rules
    }

    /// The ignore marker on the method or its enclosing type suppresses
    /// everything textually inside
    fn is_suppressed(&self, decl: DeclId) -> Result<bool, ResolveError> {
        let declaration = self.resolver.declaration(decl)?;
        if declaration.is_ignored() {
            return Ok(true);
        }
        match declaration.owner {
            Some(owner) => Ok(self.resolver.type_info(owner)?.ignored),
            None => Ok(false),
        }
    }

    fn walk_stmt(&self, stmt: &Stmt, emitter: &mut dyn DiagnosticEmitter) {
        match stmt {
            Stmt::Expr(expr) => {
                // assignment targets are exempt: the open chain may still be
                // completed through the variable later. References are
                // discovered as reference entries below, not twice.
                if !expr.is_assignment() && !matches!(expr.kind, ExprKind::MethodRef(_)) {
                    self.check_entry(expr, stmt.span(), emitter);
                }
                self.walk_expr(expr, emitter);
            }
            Stmt::Local(local) => {
                if let Some(init) = &local.init {
                    self.walk_expr(init, emitter);
                }
            }
            Stmt::Return(value, _) => {
                if let Some(value) = value {
                    self.walk_expr(value, emitter);
                }
            }
            Stmt::Block(stmts, _) => {
                for stmt in stmts {
                    self.walk_stmt(stmt, emitter);
                }
            }
        }
    }

    /// Discover nested entry points: every qualifying void lambda or
    /// method reference is independent, regardless of nesting depth
    fn walk_expr(&self, expr: &Expr, emitter: &mut dyn DiagnosticEmitter) {
        match &expr.kind {
            ExprKind::Lambda(lambda) => match &lambda.body {
                LambdaBody::Expr(body) => {
                    if self.void_functional(lambda.functional, expr.span, emitter)
                        && !body.is_assignment()
                    {
                        self.check_entry(body, expr.span, emitter);
                    }
                    self.walk_expr(body, emitter);
                }
                LambdaBody::Block(stmts) => {
                    for stmt in stmts {
                        self.walk_stmt(stmt, emitter);
                    }
                }
            },
            ExprKind::MethodRef(reference) => {
                if self.void_functional(reference.functional, expr.span, emitter) {
                    self.check_entry(expr, expr.span, emitter);
                }
                self.walk_expr(&reference.qualifier, emitter);
            }
            ExprKind::Invocation(inv) => {
                if let Some(receiver) = &inv.receiver {
                    self.walk_expr(receiver, emitter);
                }
                for arg in &inv.args {
                    self.walk_expr(arg, emitter);
                }
            }
            ExprKind::MemberAccess(access) => self.walk_expr(&access.target, emitter),
            ExprKind::NewInstance(instance) => {
                for arg in &instance.args {
                    self.walk_expr(arg, emitter);
                }
            }
            ExprKind::Conditional(conditional) => {
                self.walk_expr(&conditional.cond, emitter);
                self.walk_expr(&conditional.then_branch, emitter);
                self.walk_expr(&conditional.else_branch, emitter);
            }
            ExprKind::Assignment(assignment) => {
                self.walk_expr(&assignment.target, emitter);
                self.walk_expr(&assignment.value, emitter);
            }
            ExprKind::ArrayAccess(access) => {
                self.walk_expr(&access.base, emitter);
                self.walk_expr(&access.index, emitter);
            }
            ExprKind::ArrayLiteral(elements) => {
                for element in elements {
                    self.walk_expr(element, emitter);
                }
            }
            ExprKind::Identifier(_) => {}
        }
    }

    /// Lambda/reference targets qualify when the functional method is
    /// void-returning, non-default and non-static
    fn void_functional(
        &self,
        functional: DeclId,
        span: Span,
        emitter: &mut dyn DiagnosticEmitter,
    ) -> bool {
        match self.resolver.declaration(functional) {
            Ok(decl) => decl.ty.is_none() && !decl.is_default && !decl.is_static,
            Err(error) => {
                self.report_aborted(error, span, emitter);
                false
            }
        }
    }

    fn check_entry(&self, expr: &Expr, at: Span, emitter: &mut dyn DiagnosticEmitter) {
        let scanner = ChainScanner::new(self.resolver, &self.rules);
        match scanner.scan_entry(expr, at) {
            Ok(Some(finding)) => emitter.report(Diagnostic::error(&finding, Some(at))),
            Ok(None) => {}
            Err(error) => self.report_aborted(error, at, emitter),
        }
    }

    fn report_aborted(
        &self,
        error: ResolveError,
        span: Span,
        emitter: &mut dyn DiagnosticEmitter,
    ) {
        let warning = CheckWarning::ScanAborted {
            reason: error.to_string(),
            span: span.into(),
        };
        emitter.report(Diagnostic::warning(&warning, Some(span)));
    }
}
