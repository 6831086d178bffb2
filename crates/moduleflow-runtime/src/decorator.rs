//! Cross-cutting handler wrappers
//!
//! Each decorator turns a handler into a new handler carrying the same
//! metadata. Applied in sequence, the first decorator ends up innermost.
//! Release work (loading counters, log completion, mutex flags) is tied to
//! guards so it also happens when the program errors, panics, or is
//! cancelled mid-flight.

use crate::app::App;
use crate::handler::{EffectProgram, Handler, Invocation, Payload};
use moduleflow_core::{
    loading_action, stringify_with_mask, LogCompletion, LogInfo, State, DEFAULT_LOADING_IDENTIFIER,
    MASKED_OUTPUT,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub trait Decorator: Send + Sync {
    fn decorate(&self, handler: Handler) -> Handler;
}

// ----------------------------------------------------------------------------
// Generic Interceptor
// ----------------------------------------------------------------------------

/// The wrapped handler bound to one invocation, handed to an interceptor
pub struct HandlerThunk {
    handler: Handler,
    invocation: Invocation,
    payload: Payload,
}

impl HandlerThunk {
    /// Qualified name of the action being intercepted
    pub fn action(&self) -> &str {
        &self.invocation.action
    }

    pub fn payload(&self) -> &[serde_json::Value] {
        &self.payload
    }

    pub fn app(&self) -> &App {
        &self.invocation.app
    }

    /// Run the wrapped handler
    pub fn run(self) -> EffectProgram {
        self.handler.invoke(self.invocation, self.payload)
    }
}

/// Build a decorator from an interceptor that receives the handler thunk and
/// a snapshot of the root state taken when the invocation starts.
pub fn create_action_handler_decorator<F, Fut>(interceptor: F) -> impl Decorator
where
    F: Fn(HandlerThunk, State) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    InterceptorDecorator {
        interceptor: Arc::new(interceptor),
    }
}

struct InterceptorDecorator<F> {
    interceptor: Arc<F>,
}

impl<F, Fut> Decorator for InterceptorDecorator<F>
where
    F: Fn(HandlerThunk, State) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn decorate(&self, handler: Handler) -> Handler {
        let interceptor = self.interceptor.clone();
        handler.wrap(
            move |inner: &Handler, invocation: Invocation, payload: Payload| -> EffectProgram {
                let state = invocation.app.get_state();
                let thunk = HandlerThunk {
                    handler: inner.clone(),
                    invocation,
                    payload,
                };
                Box::pin(interceptor(thunk, state))
            },
        )
    }
}

// ----------------------------------------------------------------------------
// Loading
// ----------------------------------------------------------------------------

/// Hold a loading counter up for the duration of the handler
#[derive(Debug, Clone)]
pub struct Loading {
    identifier: Arc<str>,
}

impl Loading {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: Arc::from(identifier),
        }
    }

    pub fn global() -> Self {
        Self::new(DEFAULT_LOADING_IDENTIFIER)
    }
}

impl Decorator for Loading {
    fn decorate(&self, handler: Handler) -> Handler {
        let identifier = self.identifier.clone();
        handler.wrap(
            move |inner: &Handler, invocation: Invocation, payload: Payload| -> EffectProgram {
                let inner = inner.clone();
                let identifier = identifier.clone();
                Box::pin(async move {
                    let app = invocation.app.clone();
                    app.dispatch(loading_action(true, &*identifier));
                    let _release = LoadingRelease { app, identifier };
                    inner.invoke(invocation, payload).await
                })
            },
        )
    }
}

struct LoadingRelease {
    app: App,
    identifier: Arc<str>,
}

impl Drop for LoadingRelease {
    fn drop(&mut self) {
        self.app.dispatch(loading_action(false, &*self.identifier));
    }
}

// ----------------------------------------------------------------------------
// Log
// ----------------------------------------------------------------------------

/// Append an `OK` event under the action name with the masked parameters.
/// A no-op wrapper when business logging is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

impl Decorator for Log {
    fn decorate(&self, handler: Handler) -> Handler {
        handler.wrap(
            |inner: &Handler, invocation: Invocation, payload: Payload| -> EffectProgram {
                let app = invocation.app.clone();
                if app.logger_config().is_none() {
                    return inner.invoke(invocation, payload);
                }

                let mut info = LogInfo::new();
                if let Some(params) = stringify_with_mask(app.logger_masks(), MASKED_OUTPUT, &payload) {
                    info.insert("params".to_string(), params);
                }
                let completion = app.logger().info(&invocation.action, info);
                let program = inner.invoke(invocation, payload);
                Box::pin(async move {
                    let _completion = CompleteOnDrop(Some(completion));
                    program.await
                })
            },
        )
    }
}

struct CompleteOnDrop(Option<LogCompletion>);

impl Drop for CompleteOnDrop {
    fn drop(&mut self) {
        if let Some(completion) = self.0.take() {
            completion.complete();
        }
    }
}

// ----------------------------------------------------------------------------
// Mutex
// ----------------------------------------------------------------------------

/// At most one invocation of the decorated handler in flight; overlapping
/// invocations are silently skipped. The flag is shared per decoration site.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mutex;

impl Decorator for Mutex {
    fn decorate(&self, handler: Handler) -> Handler {
        let locked = Arc::new(AtomicBool::new(false));
        handler.wrap(
            move |inner: &Handler, invocation: Invocation, payload: Payload| -> EffectProgram {
                if locked
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    debug!("{} already running, skipped", invocation.action);
                    return Box::pin(async { Ok(()) });
                }
                let unlock = Unlock(locked.clone());
                let program = inner.invoke(invocation, payload);
                Box::pin(async move {
                    let _unlock = unlock;
                    program.await
                })
            },
        )
    }
}

struct Unlock(Arc<AtomicBool>);

impl Drop for Unlock {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ----------------------------------------------------------------------------
// Markers
// ----------------------------------------------------------------------------

/// Mark a hook as eligible for framework invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle;

impl Decorator for Lifecycle {
    fn decorate(&self, handler: Handler) -> Handler {
        handler.map_meta(|meta| meta.is_lifecycle = true)
    }
}

/// Seconds between `onTick` invocations
#[derive(Debug, Clone, Copy)]
pub struct Interval(pub u64);

impl Decorator for Interval {
    fn decorate(&self, handler: Handler) -> Handler {
        let seconds = self.0;
        handler.map_meta(|meta| meta.tick_interval = Some(seconds))
    }
}
