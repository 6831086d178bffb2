//! Action handlers as values
//!
//! A `Handler` pairs an erased effect program factory with its metadata.
//! Decorators produce new handlers around old ones; the metadata travels with
//! the outermost value so registration and the lifecycle supervisor can read
//! it without probing the closure.

use crate::app::App;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Lazily executed, suspendable unit of business logic
pub type EffectProgram = BoxFuture<'static, anyhow::Result<()>>;

/// Argument list carried by a handler action
pub type Payload = Vec<Value>;

type HandlerFn = dyn Fn(Invocation, Payload) -> EffectProgram + Send + Sync;

/// Context of one handler invocation
#[derive(Clone)]
pub struct Invocation {
    pub app: App,
    /// Qualified action name of the outermost registered handler
    pub action: Arc<str>,
}

impl Invocation {
    pub fn new<A: Into<Arc<str>>>(app: App, action: A) -> Self {
        Self {
            app,
            action: action.into(),
        }
    }

    /// Invocation for a registered handler, named after it
    pub fn for_handler(app: App, handler: &Handler) -> Self {
        let action = handler
            .meta()
            .action_name
            .clone()
            .unwrap_or_else(|| Arc::from("anonymous"));
        Self { app, action }
    }
}

/// Metadata attached to a handler value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerMeta {
    /// `"<module>/<method>"`, stamped at registration
    pub action_name: Option<Arc<str>>,
    /// Invoked by the framework rather than only by user dispatch
    pub is_lifecycle: bool,
    /// Seconds between `onTick` invocations
    pub tick_interval: Option<u64>,
}

#[derive(Clone)]
pub struct Handler {
    meta: HandlerMeta,
    run: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Invocation, Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            meta: HandlerMeta::default(),
            run: Arc::new(move |invocation: Invocation, payload: Payload| -> EffectProgram {
                Box::pin(f(invocation, payload))
            }),
        }
    }

    pub fn meta(&self) -> &HandlerMeta {
        &self.meta
    }

    pub fn action_name(&self) -> Option<&str> {
        self.meta.action_name.as_deref()
    }

    pub fn is_lifecycle(&self) -> bool {
        self.meta.is_lifecycle
    }

    pub fn tick_interval(&self) -> Option<u64> {
        self.meta.tick_interval
    }

    /// Build the effect program for one invocation; nothing runs until it is polled
    pub fn invoke(&self, invocation: Invocation, payload: Payload) -> EffectProgram {
        (self.run)(invocation, payload)
    }

    /// Wrap this handler. The wrapper receives the inner handler and decides
    /// whether and how to run it; metadata is carried over unchanged.
    pub fn wrap<F>(self, wrapper: F) -> Handler
    where
        F: Fn(&Handler, Invocation, Payload) -> EffectProgram + Send + Sync + 'static,
    {
        let meta = self.meta.clone();
        let inner = self;
        Handler {
            meta,
            run: Arc::new(move |invocation: Invocation, payload: Payload| -> EffectProgram {
                wrapper(&inner, invocation, payload)
            }),
        }
    }

    /// Same program, adjusted metadata
    pub fn map_meta(mut self, update: impl FnOnce(&mut HandlerMeta)) -> Handler {
        update(&mut self.meta);
        self
    }

    pub(crate) fn named(self, action_name: Arc<str>) -> Handler {
        self.map_meta(|meta| meta.action_name = Some(action_name))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("meta", &self.meta).finish()
    }
}
