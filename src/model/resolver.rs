// src/model/resolver.rs
//! Boundary between the analysis and the host's symbol tables.

use miette::Diagnostic;
use thiserror::Error;

use crate::model::{DeclId, Declaration, TypeId, TypeInfo};

/// Failure to resolve a node or type handle. Mid-walk, these are downgraded
/// to warnings at the entry-point boundary; during session wiring they are
/// fatal.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown declaration handle {0}")]
    #[diagnostic(code(E0901))]
    UnknownDeclaration(u32),

    #[error("unknown type handle {0}")]
    #[diagnostic(code(E0902))]
    UnknownType(u32),
}

/// Read-only view of the host's resolved program facts.
///
/// The analysis never mutates the program model; everything it learns is
/// memoized in its own stores.
pub trait Resolver {
    /// Resolve a declaration handle carried by a syntax node
    fn declaration(&self, id: DeclId) -> Result<&Declaration, ResolveError>;

    /// Describe a type: qualified name, ordered direct supertypes, declared
    /// methods
    fn type_info(&self, id: TypeId) -> Result<&TypeInfo, ResolveError>;

    /// Look up a type by its qualified name (registry validation)
    fn lookup_type(&self, qualified_name: &str) -> Option<TypeId>;
}
