//! moduleflow runtime engine
//!
//! Executes module handlers against the core store:
//! - `register` publishes a module's handlers and returns its `ModuleProxy`
//! - `execute_action` runs one handler and turns any failure into an error action
//! - decorators (`Loading`, `Log`, `Mutex`, `Lifecycle`, `Interval`) wrap handlers
//! - `LifecycleAttachment` drives `onRender`/`onTick`/`onDestroy` for host components
//! - `AppBuilder::build_and_start` wires the dispatcher and log flush tasks
//!
//! Run it on a tokio `current_thread` runtime for the single-threaded
//! cooperative model; everything is `Send`, so multi-thread also works.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod app;
pub mod builder;
pub mod decorator;
pub mod effects;
pub mod executor;
pub mod handler;
pub mod history;
pub mod lifecycle;
pub mod listeners;
pub mod module;
pub mod proxy;
pub mod registry;
pub mod tasks;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use app::App;
pub use builder::{AppBuilder, AppHandle};
pub use decorator::{
    create_action_handler_decorator, Decorator, HandlerThunk, Interval, Lifecycle, Loading, Log,
    Mutex,
};
pub use effects::{call, delay, put, EffectTask};
pub use executor::{execute_action, normalize_error};
pub use handler::{EffectProgram, Handler, HandlerMeta, Invocation, Payload};
pub use history::{History, MemoryHistory};
pub use lifecycle::{ComponentProps, LifecycleAttachment, LifecyclePhase, MountedComponent};
pub use listeners::{ErrorListener, LogTransport};
pub use module::{
    register, HandlerSet, HandlerSlot, LifecycleCapabilities, Module, ModuleContext, ON_DESTROY,
    ON_REGISTER, ON_RENDER, ON_TICK,
};
pub use proxy::{ActionCreator, ModuleProxy};
pub use registry::ActionRegistry;
pub use tasks::{DispatcherTask, LogFlushTask};

pub use moduleflow_core as core;
