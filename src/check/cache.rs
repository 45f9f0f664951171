// src/check/cache.rs
//! Memoized terminal-method sets.
//!
//! One set per type for the whole session, computed lazily on first demand
//! and read-only afterwards. The store is concurrency-safe so hosts may
//! drive several units in parallel; recomputation races resolve to the
//! first published value.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use crate::model::TypeId;

/// Terminator signatures reachable from a type. BTreeSet iteration order is
/// the enumeration order used in synthesized diagnostics.
pub type TerminalSet = BTreeSet<String>;

/// Session-wide memo store for terminal-method sets
#[derive(Debug)]
pub struct TerminalMethodCache {
    entries: RwLock<FxHashMap<TypeId, Arc<TerminalSet>>>,
    empty: Arc<TerminalSet>,
}

impl Default for TerminalMethodCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalMethodCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            empty: Arc::new(TerminalSet::new()),
        }
    }

    /// The canonical shared empty set
    pub fn empty_set(&self) -> Arc<TerminalSet> {
        self.empty.clone()
    }

    pub fn get(&self, ty: TypeId) -> Option<Arc<TerminalSet>> {
        self.read().get(&ty).cloned()
    }

    pub fn is_cached(&self, ty: TypeId) -> bool {
        self.read().contains_key(&ty)
    }

    /// Publish a computed set. The first successful write for a type wins;
    /// a concurrent recomputation gets the already-published value back.
    /// Empty results collapse onto the canonical empty set.
    pub fn publish(&self, ty: TypeId, set: TerminalSet) -> Arc<TerminalSet> {
        let mut entries = self.write();
        entries
            .entry(ty)
            .or_insert_with(|| {
                if set.is_empty() {
                    self.empty.clone()
                } else {
                    Arc::new(set)
                }
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FxHashMap<TypeId, Arc<TerminalSet>>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FxHashMap<TypeId, Arc<TerminalSet>>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
