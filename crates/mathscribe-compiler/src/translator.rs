//! Per-backend node translators.
//!
//! Every node kind has one [`NodeTranslator`] per backend. The engine looks
//! the translator up by `(backend, NodeKindTag)` in a [`TranslatorTable`]
//! and dispatches to it during both passes.

use rustc_hash::FxHashMap;

use mathscribe_core::{NodeId, NodeKindTag, TranslationError};

use crate::engine::Engine;

type Result<T> = std::result::Result<T, TranslationError>;

/// Backend-specific emitter for one node kind.
pub trait NodeTranslator: Send + Sync {
    /// Called for every node visited during type discovery, after the
    /// node's children have been typed.
    fn identify_dependencies(&self, _node: NodeId, _engine: &mut Engine<'_>) -> Result<()> {
        Ok(())
    }

    /// Emit the node at the engine's current position.
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()>;

    /// Emit out-of-line definitions (e.g. a global function) ahead of the
    /// entry point.
    fn emit_definitions(&self, _node: NodeId, _engine: &mut Engine<'_>) -> Result<()> {
        Ok(())
    }
}

/// Lookup table from `(backend, node kind)` to translator.
#[derive(Default)]
pub struct TranslatorTable {
    backends: FxHashMap<String, FxHashMap<NodeKindTag, Box<dyn NodeTranslator>>>,
}

impl TranslatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a translator, returning the one it replaces.
    pub fn register(
        &mut self,
        backend: &str,
        kind: NodeKindTag,
        translator: Box<dyn NodeTranslator>,
    ) -> Option<Box<dyn NodeTranslator>> {
        self.backends
            .entry(backend.to_string())
            .or_default()
            .insert(kind, translator)
    }

    /// The translator for `kind` on `backend`.
    pub fn get(&self, backend: &str, kind: NodeKindTag) -> Result<&dyn NodeTranslator> {
        self.backends
            .get(backend)
            .and_then(|kinds| kinds.get(&kind))
            .map(|t| &**t)
            .ok_or_else(|| TranslationError::MissingNodeTranslator {
                backend: backend.to_string(),
                kind,
            })
    }

    pub fn contains(&self, backend: &str, kind: NodeKindTag) -> bool {
        self.get(backend, kind).is_ok()
    }

    /// Node kinds with no translator on `backend`.
    pub fn missing(&self, backend: &str) -> Vec<NodeKindTag> {
        NodeKindTag::ALL
            .into_iter()
            .filter(|&kind| !self.contains(backend, kind))
            .collect()
    }

    /// Registered backend names, sorted.
    pub fn backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TranslatorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for name in self.backends() {
            let count = self.backends.get(name).map_or(0, FxHashMap::len);
            map.entry(&name, &count);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl NodeTranslator for Nothing {
        fn emit_body(&self, _node: NodeId, _engine: &mut Engine<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lookup_by_backend_and_kind() {
        let mut table = TranslatorTable::new();
        assert!(table.register("native", NodeKindTag::Literal, Box::new(Nothing)).is_none());
        assert!(table.register("native", NodeKindTag::Literal, Box::new(Nothing)).is_some());

        assert!(table.contains("native", NodeKindTag::Literal));
        assert!(!table.contains("latex", NodeKindTag::Literal));
        assert_eq!(
            table.get("native", NodeKindTag::Block).err(),
            Some(TranslationError::MissingNodeTranslator {
                backend: "native".into(),
                kind: NodeKindTag::Block,
            })
        );
        assert_eq!(table.missing("native").len(), NodeKindTag::ALL.len() - 1);
    }
}
