//! moduleflow core types
//!
//! This crate provides the stable data layer of the moduleflow framework:
//! - `Action` and the framework's update records
//! - `State`, the root reducer and the `Store`
//! - the `Exception` taxonomy and `FrameworkError`
//! - the business event `Logger`
//! - configuration structures
//!
//! The execution engine (registration, decorators, lifecycle supervision)
//! lives in `moduleflow-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod action;
pub mod config;
pub mod errors;
pub mod json;
pub mod logger;
pub mod network;
pub mod reducer;
pub mod state;
pub mod store;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use action::{
    error_action, history_push_action, loading_action, location_change_action,
    navigation_prevention_action, set_state_action, Action, ActionArgs, ActionKey, ActionPayload,
    ERROR_ACTION_TYPE, HISTORY_PUSH_ACTION, LOADING_ACTION, LOCATION_CHANGE_ACTION,
    NAVIGATION_PREVENTION_ACTION, SET_STATE_ACTION,
};
pub use config::{AttachLifecycleOption, FrameworkConfig, LoggerConfig, DEFAULT_TICK_INTERVAL_SECS};
pub use errors::{Exception, FrameworkError, FrameworkResult};
pub use json::{stringify_with_mask, MASKED_OUTPUT};
pub use logger::{
    ContextValue, LogBatch, LogCompletion, LogEvent, LogInfo, LogResult, Logger, LoggerImpl,
};
pub use network::{classify_http_failure, url};
pub use reducer::root_reducer;
pub use state::{show_loading, LoadingState, Location, RouterState, State, DEFAULT_LOADING_IDENTIFIER};
pub use store::{create_middleware_channel, MiddlewareReceiver, MiddlewareSender, Store};
