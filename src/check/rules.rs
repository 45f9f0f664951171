// src/check/rules.rs
//! Marker predicates over the cache and the external registry.
//!
//! The three predicates the scanner decides with: `is_opener`,
//! `is_terminator` and `requires_completion`. Each may capture a diagnostic
//! message into the per-entry [`ChainContext`] as a side effect.

use std::sync::Arc;
use tracing::trace;

use crate::check::cache::{TerminalMethodCache, TerminalSet};
use crate::check::registry::ExternalRegistry;
use crate::model::{Declaration, ResolveError, Resolver, TypeId};

const FALLBACK_MESSAGE: &str = "Method chain must be completed by a terminal method";

/// Transient per-entry-point state: the most recently captured custom
/// message and the synthesized default from the decisive completion check.
#[derive(Debug, Default)]
pub struct ChainContext {
    custom: Option<String>,
    synthesized: Option<String>,
}

impl ChainContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a custom marker message. Later captures overwrite earlier
    /// ones.
    pub fn capture(&mut self, message: &str) {
        self.custom = Some(message.to_string());
    }

    pub fn has_custom_message(&self) -> bool {
        self.custom.is_some()
    }

    fn synthesize(&mut self, set: &TerminalSet) {
        let mut names = set.iter().map(String::as_str);
        self.synthesized = Some(if set.len() == 1 {
            format!(
                "Method chain must end with the method: {}",
                names.next().unwrap_or_default()
            )
        } else {
            format!(
                "Method chain must end with one of the following methods: {}",
                names.collect::<Vec<_>>().join(", ")
            )
        });
    }

    /// The message for the finding: custom beats synthesized
    pub fn message(&self) -> String {
        self.custom
            .clone()
            .or_else(|| self.synthesized.clone())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
    }
}

/// Evaluates the termination rules for declarations and types
#[derive(Debug)]
pub struct RuleEvaluator {
    cache: TerminalMethodCache,
    registry: ExternalRegistry,
}

impl RuleEvaluator {
    pub fn new(registry: ExternalRegistry) -> Self {
        Self {
            cache: TerminalMethodCache::new(),
            registry,
        }
    }

    /// Whether the declaration unconditionally opens a sentence
    pub fn is_opener(&self, decl: &Declaration, ctx: &mut ChainContext) -> bool {
        match decl.opener() {
            Some(marker) => {
                if let Some(message) = &marker.message {
                    ctx.capture(message);
                }
                true
            }
            None => false,
        }
    }

    /// Whether the declaration completes a sentence: marked terminator, or
    /// named by the external registry (additive, never a replacement)
    pub fn is_terminator(&self, decl: &Declaration, ctx: &mut ChainContext) -> bool {
        if let Some(marker) = decl.terminator() {
            if let Some(message) = &marker.message {
                ctx.capture(message);
            }
            return true;
        }
        self.registry.is_registered_terminator(decl)
    }

    /// Terminator signatures reachable from a type: own marked methods
    /// unioned with every direct supertype's set, in declared supertype
    /// order. Memoized per type.
    pub fn terminal_methods<R: Resolver + ?Sized>(
        &self,
        ty: TypeId,
        resolver: &R,
        ctx: &mut ChainContext,
    ) -> Result<Arc<TerminalSet>, ResolveError> {
        if let Some(set) = self.cache.get(ty) {
            return Ok(set);
        }

        let info = resolver.type_info(ty)?;
        let mut set = TerminalSet::new();
        for &method in &info.methods {
            let decl = resolver.declaration(method)?;
            if self.is_terminator(decl, ctx) {
                set.insert(decl.signature());
            }
        }
        for &supertype in &info.supertypes {
            let inherited = self.terminal_methods(supertype, resolver, ctx)?;
            set.extend(inherited.iter().cloned());
        }

        trace!(ty = %info.name, terminators = set.len(), "terminal set computed");
        Ok(self.cache.publish(ty, set))
    }

    /// Whether an expression of this type must still be completed. On a
    /// positive result, records the synthesized required-method listing
    /// unless a custom message was already captured.
    pub fn requires_completion<R: Resolver + ?Sized>(
        &self,
        ty: TypeId,
        resolver: &R,
        ctx: &mut ChainContext,
    ) -> Result<bool, ResolveError> {
        let set = self.terminal_methods(ty, resolver, ctx)?;
        if set.is_empty() {
            return Ok(false);
        }
        if !ctx.has_custom_message() {
            ctx.synthesize(&set);
        }
        Ok(true)
    }

    pub fn cache(&self) -> &TerminalMethodCache {
        &self.cache
    }

    pub fn registry(&self) -> &ExternalRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramModel;

    fn evaluator() -> RuleEvaluator {
        RuleEvaluator::new(ExternalRegistry::default())
    }

    #[test]
    fn terminal_set_unions_supertypes() {
        let mut model = ProgramModel::new();
        let completable = model.add_type("Completable");
        let end = model.add_method(completable, "end", None);
        model.mark_terminator(end, None);

        let builder = model.add_type("Builder");
        model.add_supertype(builder, completable);
        model.add_method(builder, "step", Some(builder));
        let build = model.add_method(builder, "build", None);
        model.mark_terminator(build, None);

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        let set = rules.terminal_methods(builder, &model, &mut ctx).unwrap();
        let names: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["build()", "end()"]);
    }

    #[test]
    fn terminal_set_is_memoized() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let build = model.add_method(builder, "build", None);
        model.mark_terminator(build, None);

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        let first = rules.terminal_methods(builder, &model, &mut ctx).unwrap();
        let second = rules.terminal_methods(builder, &model, &mut ctx).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(rules.cache().is_cached(builder));
    }

    #[test]
    fn empty_terminal_sets_share_canonical_empty() {
        let mut model = ProgramModel::new();
        let a = model.add_type("A");
        let b = model.add_type("B");

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        let set_a = rules.terminal_methods(a, &model, &mut ctx).unwrap();
        let set_b = rules.terminal_methods(b, &model, &mut ctx).unwrap();
        assert!(Arc::ptr_eq(&set_a, &set_b));
        assert!(set_a.is_empty());
    }

    #[test]
    fn registry_entries_count_as_terminators() {
        let mut model = ProgramModel::new();
        let chain = model.add_type("Chain");
        let finish = model.add_method(chain, "finish", None);

        let sources = vec![crate::check::registry::RegistrySource::new(
            "inline",
            "Chain.finish",
        )];
        let mut emitter = crate::errors::CollectingEmitter::new();
        let registry = ExternalRegistry::load(&sources, &model, &mut emitter).unwrap();
        let rules = RuleEvaluator::new(registry);

        let mut ctx = ChainContext::new();
        assert!(rules.is_terminator(model.declaration(finish).unwrap(), &mut ctx));
        let set = rules.terminal_methods(chain, &model, &mut ctx).unwrap();
        assert!(set.contains("finish()"));
    }

    #[test]
    fn requires_completion_synthesizes_singular_message() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let build = model.add_method(builder, "build", None);
        model.mark_terminator(build, None);

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        assert!(rules.requires_completion(builder, &model, &mut ctx).unwrap());
        assert_eq!(
            ctx.message(),
            "Method chain must end with the method: build()"
        );
    }

    #[test]
    fn requires_completion_synthesizes_plural_message_in_set_order() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let build = model.add_method(builder, "build", None);
        model.mark_terminator(build, None);
        let cancel = model.add_method(builder, "cancel", None);
        model.mark_terminator(cancel, None);

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        assert!(rules.requires_completion(builder, &model, &mut ctx).unwrap());
        assert_eq!(
            ctx.message(),
            "Method chain must end with one of the following methods: build(), cancel()"
        );
    }

    #[test]
    fn custom_message_beats_synthesized() {
        let mut model = ProgramModel::new();
        let builder = model.add_type("Builder");
        let build = model.add_method(builder, "build", None);
        model.mark_terminator(build, Some("builder left hanging"));

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        assert!(rules.requires_completion(builder, &model, &mut ctx).unwrap());
        assert_eq!(ctx.message(), "builder left hanging");
    }

    #[test]
    fn opener_captures_its_message() {
        let mut model = ProgramModel::new();
        let dsl = model.add_type("Dsl");
        let open = model.add_method(dsl, "open", None);
        model.mark_opener(open, Some("sentence must be finished"));

        let rules = evaluator();
        let mut ctx = ChainContext::new();
        assert!(rules.is_opener(model.declaration(open).unwrap(), &mut ctx));
        assert_eq!(ctx.message(), "sentence must be finished");
    }

    #[test]
    fn fallback_message_when_nothing_captured() {
        let ctx = ChainContext::new();
        assert_eq!(ctx.message(), FALLBACK_MESSAGE);
    }
}
