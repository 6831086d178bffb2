//! Central store
//!
//! The store is the only shared mutable resource. Updates are applied
//! synchronously and in issue order; after reduction each action is handed to
//! the effect middleware (the dispatcher task) and to any subscribers.

use crate::action::Action;
use crate::reducer::root_reducer;
use crate::state::State;
use serde_json::Value;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

const SUBSCRIBER_BUFFER_SIZE: usize = 256;

pub type MiddlewareSender = mpsc::UnboundedSender<Action>;
pub type MiddlewareReceiver = mpsc::UnboundedReceiver<Action>;

pub struct Store {
    state: RwLock<State>,
    middleware: RwLock<Option<MiddlewareSender>>,
    subscribers: broadcast::Sender<Action>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(State::default())
    }

    pub fn with_state(state: State) -> Self {
        let (subscribers, _) = broadcast::channel(SUBSCRIBER_BUFFER_SIZE);
        Self {
            state: RwLock::new(state),
            middleware: RwLock::new(None),
            subscribers,
        }
    }

    /// Reduce `action` into the state, then forward it downstream.
    ///
    /// The state lock is held while forwarding so the middleware observes
    /// actions in exactly the order they were reduced.
    pub fn dispatch(&self, action: Action) {
        let mut state = self.write_state();
        root_reducer(&mut state, &action);
        trace!("Dispatched {}", action);

        let _ = self.subscribers.send(action.clone());
        if let Some(middleware) = self.read_middleware().as_ref() {
            if middleware.send(action).is_err() {
                trace!("Middleware closed, action not forwarded");
            }
        }
        drop(state);
    }

    /// Snapshot of the current state
    pub fn get_state(&self) -> State {
        self.read_state().clone()
    }

    /// Read from the state without cloning it
    pub fn select<R>(&self, selector: impl FnOnce(&State) -> R) -> R {
        selector(&self.read_state())
    }

    pub fn module_state(&self, name: &str) -> Option<Value> {
        self.select(|state| state.module(name).cloned())
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.select(|state| state.app.contains_key(name))
    }

    /// Receive every action after it has been reduced
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.subscribers.subscribe()
    }

    /// Route reduced actions to the effect middleware
    pub fn connect_middleware(&self, sender: MiddlewareSender) {
        *self.write_middleware() = Some(sender);
    }

    pub fn disconnect_middleware(&self) {
        *self.write_middleware() = None;
    }

    /// Drop all state. Only meant for tearing down between test cases.
    pub fn reset(&self) {
        *self.write_state() = State::default();
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_middleware(&self) -> RwLockReadGuard<'_, Option<MiddlewareSender>> {
        self.middleware.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_middleware(&self) -> RwLockWriteGuard<'_, Option<MiddlewareSender>> {
        self.middleware.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the channel between the store and the dispatcher task
pub fn create_middleware_channel() -> (MiddlewareSender, MiddlewareReceiver) {
    mpsc::unbounded_channel()
}
