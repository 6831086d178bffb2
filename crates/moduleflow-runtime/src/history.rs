//! Navigation history seen by the engine
//!
//! Non-routed components render against the history's current location, and
//! router push updates are applied through it.

use moduleflow_core::Location;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

pub trait History: Send + Sync {
    /// Current location
    fn location(&self) -> Arc<Location>;

    /// Navigate to `url`, returning the new current location
    fn push(&self, url: &str, state: Option<Value>) -> Arc<Location>;
}

/// In-memory history stack
pub struct MemoryHistory {
    entries: Mutex<Vec<Arc<Location>>>,
}

impl MemoryHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: Mutex::new(vec![Arc::new(Location::parse(initial_url))]),
        }
    }

    /// Number of entries, including the initial one
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Arc<Location> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::new(Location::new("/")))
    }

    fn push(&self, url: &str, state: Option<Value>) -> Arc<Location> {
        let location = Arc::new(Location::parse(url).with_state(state));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.clone());
        location
    }
}
