// src/errors/check.rs
//! Chain-check findings (E0xxx) and non-fatal warnings (W0xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::model::ResolveError;

/// The primary user-facing finding: a fluent sentence left incomplete.
/// The message is either the custom text captured from a marker or the
/// synthesized required-method listing.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ChainError {
    #[error("{message}")]
    #[diagnostic(code(E0001))]
    UnterminatedChain {
        message: String,
        #[label("fluent sentence is never completed")]
        span: SourceSpan,
    },
}

/// Non-fatal problems: malformed registry configuration and abandoned entry
/// points. None of these stop the session.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CheckWarning {
    #[error("unrecognized terminator entry '{line}' in {origin}: class not found")]
    #[diagnostic(code(W0101))]
    RegistryClassNotFound { line: String, origin: String },

    #[error(
        "unrecognized terminator entry '{line}' in {origin}: method not found; candidates are: {candidates}"
    )]
    #[diagnostic(code(W0102))]
    RegistryMethodNotFound {
        line: String,
        origin: String,
        candidates: String,
    },

    #[error("unable to complete chain check: {reason}")]
    #[diagnostic(code(W0201))]
    ScanAborted {
        reason: String,
        #[label("entry point abandoned")]
        span: SourceSpan,
    },
}

/// Startup wiring failure. The only fatal condition: nothing has been
/// scanned yet and the session never starts.
#[derive(Error, Debug, Diagnostic)]
pub enum SessionError {
    #[error("resolver wiring failed: {0}")]
    #[diagnostic(code(E0903))]
    ResolverWiring(#[from] ResolveError),
}
