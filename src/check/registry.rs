// src/check/registry.rs
//! External termination registry.
//!
//! Terminator methods that cannot carry a marker (third-party types) are
//! declared in plain text resources, one `QualifiedTypeName.methodName` per
//! line. Malformed entries are reported as warnings and dropped; they never
//! fail the session.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::errors::{CheckWarning, Diagnostic, DiagnosticEmitter};
use crate::model::{DeclKind, Declaration, ResolveError, Resolver, TypeId};

/// Resource name hosts conventionally merge registry lines from
pub const DEFAULT_RESOURCE_NAME: &str = "fluent-api-check-methods.txt";

/// One text source of registry lines. The origin appears in warnings about
/// malformed entries.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    pub origin: String,
    pub text: String,
}

impl RegistrySource {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self {
            origin: path.display().to_string(),
            text,
        })
    }
}

/// Extra (type, method-name) terminator pairs, validated against the
/// resolver at load time
#[derive(Debug, Default)]
pub struct ExternalRegistry {
    methods: FxHashMap<TypeId, BTreeSet<String>>,
}

impl ExternalRegistry {
    /// Load and validate all sources. Only a resolver-internal failure is
    /// propagated; malformed lines become warnings.
    pub fn load<R: Resolver + ?Sized>(
        sources: &[RegistrySource],
        resolver: &R,
        emitter: &mut dyn DiagnosticEmitter,
    ) -> Result<Self, ResolveError> {
        let mut registry = Self::default();
        for source in sources {
            for raw in source.text.lines() {
                let line = raw.trim();
                if line.is_empty() {
                    continue;
                }
                registry.add_entry(line, &source.origin, resolver, emitter)?;
            }
        }
        debug!(types = registry.methods.len(), "external termination registry loaded");
        Ok(registry)
    }

    /// Whether the declaration is named as a terminator by some registry
    /// entry on its enclosing type. Matching is by simple name, so every
    /// overload of a registered name terminates.
    pub fn is_registered_terminator(&self, decl: &Declaration) -> bool {
        decl.owner
            .and_then(|owner| self.methods.get(&owner))
            .is_some_and(|names| names.contains(&decl.name))
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn add_entry<R: Resolver + ?Sized>(
        &mut self,
        line: &str,
        origin: &str,
        resolver: &R,
        emitter: &mut dyn DiagnosticEmitter,
    ) -> Result<(), ResolveError> {
        let Some((type_name, method_name)) = line.rsplit_once('.') else {
            warn_class_not_found(line, origin, emitter);
            return Ok(());
        };
        let Some(ty) = resolver.lookup_type(type_name) else {
            warn_class_not_found(line, origin, emitter);
            return Ok(());
        };

        let info = resolver.type_info(ty)?;
        let mut candidates = Vec::new();
        let mut matched = false;
        for &method in &info.methods {
            let decl = resolver.declaration(method)?;
            if decl.kind != DeclKind::Method {
                continue;
            }
            if decl.name == method_name {
                matched = true;
            }
            candidates.push(decl.signature());
        }

        if matched {
            self.methods
                .entry(ty)
                .or_default()
                .insert(method_name.to_string());
        } else {
            let warning = CheckWarning::RegistryMethodNotFound {
                line: line.to_string(),
                origin: origin.to_string(),
                candidates: candidates.join(", "),
            };
            emitter.report(Diagnostic::warning(&warning, None));
        }
        Ok(())
    }
}

fn warn_class_not_found(line: &str, origin: &str, emitter: &mut dyn DiagnosticEmitter) {
    let warning = CheckWarning::RegistryClassNotFound {
        line: line.to_string(),
        origin: origin.to_string(),
    };
    emitter.report(Diagnostic::warning(&warning, None));
}
