//! Application context
//!
//! `App` is the explicit replacement for a process-wide singleton: it owns the
//! store, the action registry, the business logger and the host collaborators,
//! and is cloned into every handler invocation.

use crate::history::History;
use crate::listeners::ErrorListener;
use crate::registry::ActionRegistry;
use moduleflow_core::{
    error_action, show_loading, Action, Exception, FrameworkConfig, Logger, LoggerConfig, State,
    Store,
};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    store: Store,
    registry: ActionRegistry,
    logger: Arc<dyn Logger>,
    masks: Vec<Regex>,
    config: FrameworkConfig,
    history: Arc<dyn History>,
    error_listener: Option<Arc<dyn ErrorListener>>,
}

pub(crate) struct AppParts {
    pub config: FrameworkConfig,
    pub logger: Arc<dyn Logger>,
    pub masks: Vec<Regex>,
    pub history: Arc<dyn History>,
    pub error_listener: Option<Arc<dyn ErrorListener>>,
}

impl App {
    pub(crate) fn from_parts(parts: AppParts) -> Self {
        Self {
            inner: Arc::new(AppInner {
                store: Store::new(),
                registry: ActionRegistry::new(),
                logger: parts.logger,
                masks: parts.masks,
                config: parts.config,
                history: parts.history,
                error_listener: parts.error_listener,
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.inner.registry
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.inner.logger
    }

    /// Business logging settings; `None` when logging is off
    pub fn logger_config(&self) -> Option<&LoggerConfig> {
        self.inner.config.logger.as_ref()
    }

    /// Compiled masked-keyword patterns
    pub fn logger_masks(&self) -> &[Regex] {
        &self.inner.masks
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.inner.config
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.inner.history
    }

    pub fn error_listener(&self) -> Option<&Arc<dyn ErrorListener>> {
        self.inner.error_listener.as_ref()
    }

    pub fn dispatch(&self, action: Action) {
        self.inner.store.dispatch(action);
    }

    pub fn get_state(&self) -> State {
        self.inner.store.get_state()
    }

    /// Whether any operation is in flight under `identifier`
    pub fn loading_status(&self, identifier: &str) -> bool {
        self.inner.store.select(|state| show_loading(state, identifier))
    }

    /// Prompt to show before leaving the page, when navigation is prevented
    pub fn navigation_prompt(&self) -> Option<&str> {
        let prevented = self.inner.store.select(|state| state.navigation_prevented);
        prevented.then_some(self.inner.config.navigation_prevention_message.as_str())
    }

    /// Report an error raised outside any handler (host callbacks, render
    /// failures). It travels the same path as handler errors.
    pub fn report_error(&self, error: anyhow::Error) {
        let exception = Exception::from_error(error);
        debug!("Reporting external error: {}", exception);
        self.dispatch(error_action(exception));
    }

    /// Drop all state and handlers. Only meant for tearing down between test cases.
    pub fn reset(&self) {
        self.inner.store.reset();
        self.inner.registry.clear();
    }
}
