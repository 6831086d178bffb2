//! Qualified action name → handler mapping

use crate::handler::Handler;
use dashmap::{DashMap, DashSet};

/// Handlers of every registered module, keyed by `"<module>/<method>"`.
///
/// Lives as long as the `App` that owns it; `clear` exists for tearing down
/// between test cases.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: DashMap<String, Handler>,
    modules: DashSet<String>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the handler for `action`
    pub fn insert(&self, action: String, handler: Handler) {
        self.handlers.insert(action, handler);
    }

    pub fn get(&self, action: &str) -> Option<Handler> {
        self.handlers.get(action).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    /// Record that `module` has been registered; true the first time only
    pub fn mark_registered(&self, module: &str) -> bool {
        self.modules.insert(module.to_string())
    }

    pub fn is_registered(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    /// All qualified action names, sorted
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&self) {
        self.handlers.clear();
        self.modules.clear();
    }
}
