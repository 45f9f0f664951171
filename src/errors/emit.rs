// src/errors/emit.rs
//! The diagnostic channel consumed by the analysis.
//!
//! Hosts plug their own sink in (a compiler message table, stderr, an LSP
//! publisher); tests and simple drivers use [`CollectingEmitter`].

use miette::Diagnostic as MietteDiagnostic;

use crate::syntax::Span;

/// Severity of a reported finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One reported finding, ready for the host's sink
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code, e.g. `E0001`
    pub code: String,
    pub message: String,
    /// Missing for findings without a source location (registry
    /// configuration problems)
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Build an ERROR from a structured finding
    pub fn error(source: &dyn MietteDiagnostic, span: Option<Span>) -> Self {
        Self::from_parts(Severity::Error, source, span)
    }

    /// Build a WARNING from a structured finding
    pub fn warning(source: &dyn MietteDiagnostic, span: Option<Span>) -> Self {
        Self::from_parts(Severity::Warning, source, span)
    }

    fn from_parts(severity: Severity, source: &dyn MietteDiagnostic, span: Option<Span>) -> Self {
        Self {
            severity,
            code: source.code().map(|c| c.to_string()).unwrap_or_default(),
            message: source.to_string(),
            span,
        }
    }
}

/// Sink for findings, in emission order
pub trait DiagnosticEmitter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Vec-backed emitter
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

impl DiagnosticEmitter for CollectingEmitter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
