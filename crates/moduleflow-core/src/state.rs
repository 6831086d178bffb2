//! Global store state

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// In-flight operation counts keyed by loading identifier
pub type LoadingState = HashMap<String, i64>;

pub const DEFAULT_LOADING_IDENTIFIER: &str = "global";

/// A navigable location, as supplied by the routing host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub state: Option<Value>,
}

impl Location {
    pub fn new<P: Into<String>>(pathname: P) -> Self {
        Self {
            pathname: pathname.into(),
            ..Default::default()
        }
    }

    /// Parse `"/path?query#hash"` into its parts
    pub fn parse(url: &str) -> Self {
        let (rest, hash) = match url.find('#') {
            Some(i) => (&url[..i], url[i..].to_string()),
            None => (url, String::new()),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (rest[..i].to_string(), rest[i..].to_string()),
            None => (rest.to_string(), String::new()),
        };
        Self {
            pathname,
            search,
            hash,
            state: None,
        }
    }

    pub fn with_state(mut self, state: Option<Value>) -> Self {
        self.state = state;
        self
    }

    /// Path plus query string
    pub fn url(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterState {
    pub location: Option<Location>,
}

/// Root state held by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub loading: LoadingState,
    pub router: RouterState,
    pub navigation_prevented: bool,
    /// Module state slices keyed by module name
    pub app: Map<String, Value>,
}

impl State {
    pub fn module(&self, name: &str) -> Option<&Value> {
        self.app.get(name)
    }

    pub fn loading_count(&self, identifier: &str) -> i64 {
        self.loading.get(identifier).copied().unwrap_or(0)
    }
}

/// Whether any operation tagged with `identifier` is in flight
pub fn show_loading(state: &State, identifier: &str) -> bool {
    state.loading_count(identifier) > 0
}
