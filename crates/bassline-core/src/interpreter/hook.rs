//! Hook objects and the side index of hooks created by `hook <name>`

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::value::Quotation;

/// A keyed handler registered with `.when`
#[derive(Debug, Clone, PartialEq)]
pub struct HookHandler {
    pub quot: Quotation,
    pub enabled: bool,
}

/// Keyed, toggle-able handlers plus one-shot handlers
#[derive(Debug, Default)]
pub struct Hook {
    name: String,
    handlers: IndexMap<String, HookHandler>,
    once: Vec<Quotation>,
}

/// Shared handle; every holder sees the same mutable hook
pub type HookRef = Arc<Mutex<Hook>>;

impl Hook {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register or replace the handler at `key`; it starts enabled.
    ///
    /// A replaced key keeps its position in the handler order.
    pub fn when(&mut self, key: &str, quot: Quotation) {
        self.handlers.insert(
            key.to_string(),
            HookHandler {
                quot,
                enabled: true,
            },
        );
    }

    pub fn push_once(&mut self, quot: Quotation) {
        self.once.push(quot);
    }

    /// No-op for unknown keys
    pub fn set_enabled(&mut self, key: &str, enabled: bool) {
        if let Some(handler) = self.handlers.get_mut(key) {
            handler.enabled = enabled;
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<HookHandler> {
        self.handlers.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
        self.once.clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn handler(&self, key: &str) -> Option<&HookHandler> {
        self.handlers.get(key)
    }

    /// First handler, in map order, whose key is not in `visited`
    pub(crate) fn next_unvisited(
        &self,
        visited: &std::collections::HashSet<String>,
    ) -> Option<(String, HookHandler)> {
        self.handlers
            .iter()
            .find(|(key, _)| !visited.contains(*key))
            .map(|(key, handler)| (key.clone(), handler.clone()))
    }

    pub(crate) fn once_at(&self, index: usize) -> Option<Quotation> {
        self.once.get(index).cloned()
    }

    pub(crate) fn drain_once(&mut self) {
        self.once.clear();
    }

    pub fn once_len(&self) -> usize {
        self.once.len()
    }
}

/// Hooks indexed by the vocabulary and name of the word that returns them.
///
/// The word itself holds its hook; this index only lets the host look a hook
/// up without running the word.
#[derive(Debug, Default)]
pub struct HookTable {
    hooks: IndexMap<(String, String), HookRef>,
}

impl HookTable {
    /// Create a fresh hook for `vocab`'s word `name`, replacing any earlier one
    pub fn create(&mut self, vocab: &str, name: &str) -> HookRef {
        let hook = Arc::new(Mutex::new(Hook::new(name)));
        self.hooks
            .insert((vocab.to_string(), name.to_string()), hook.clone());
        hook
    }

    pub fn get(&self, vocab: &str, name: &str) -> Option<HookRef> {
        self.hooks
            .get(&(vocab.to_string(), name.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_when_replaces_in_place() {
        let mut hook = Hook::new("save");
        hook.when("a", Quotation::new("1"));
        hook.when("b", Quotation::new("2"));
        hook.set_enabled("a", false);
        hook.when("a", Quotation::new("3"));

        assert_eq!(hook.keys(), vec!["a", "b"]);
        let a = hook.handler("a").unwrap();
        assert_eq!(a.quot, Quotation::new("3"));
        assert!(a.enabled);
    }

    #[test]
    fn test_table_create_replaces_entry() {
        let mut table = HookTable::default();
        let first = table.create("scratchpad", "counters");
        let second = table.create("scratchpad", "counters");
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&table.get("scratchpad", "counters").unwrap(), &second));
    }

    #[test]
    fn test_table_separates_vocabularies() {
        let mut table = HookTable::default();
        let alpha = table.create("alpha", "h");
        let beta = table.create("beta", "h");
        assert!(!Arc::ptr_eq(&alpha, &beta));
        assert!(Arc::ptr_eq(&table.get("alpha", "h").unwrap(), &alpha));
        assert!(table.get("gamma", "h").is_none());
    }
}
