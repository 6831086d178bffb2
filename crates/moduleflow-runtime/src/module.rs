//! Module registration
//!
//! A module declares its name, initial state and handlers. Registering it
//! seeds its state slice, publishes its handlers under qualified action names
//! and hands back a `ModuleProxy` for creating its actions.

use crate::app::App;
use crate::decorator::Decorator;
use crate::effects;
use crate::handler::{Handler, Invocation, Payload};
use crate::proxy::ModuleProxy;
use moduleflow_core::{
    history_push_action, navigation_prevention_action, set_state_action, Action, ActionArgs,
    ActionKey, FrameworkError, FrameworkResult, Location, Logger, State,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// ----------------------------------------------------------------------------
// Lifecycle Hooks
// ----------------------------------------------------------------------------

/// Once, the first time the module is registered
pub const ON_REGISTER: ActionKey<()> = ActionKey::new("onRegister");
/// On mount, and again on each route change. Receives route params and location.
pub const ON_RENDER: ActionKey<(Value, Location)> = ActionKey::new("onRender");
/// On unmount
pub const ON_DESTROY: ActionKey<()> = ActionKey::new("onDestroy");
/// Repeatedly while mounted
pub const ON_TICK: ActionKey<()> = ActionKey::new("onTick");

/// Which lifecycle hooks the framework will invoke for a module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleCapabilities {
    pub on_register: bool,
    pub on_render: bool,
    pub on_destroy: bool,
    pub on_tick: bool,
    /// Explicit tick interval in seconds, if the hook declared one
    pub tick_interval: Option<u64>,
}

impl LifecycleCapabilities {
    fn observe(&mut self, method: &str, handler: &Handler) {
        if !handler.is_lifecycle() {
            return;
        }
        if method == ON_REGISTER.method() {
            self.on_register = true;
        } else if method == ON_RENDER.method() {
            self.on_render = true;
        } else if method == ON_DESTROY.method() {
            self.on_destroy = true;
        } else if method == ON_TICK.method() {
            self.on_tick = true;
            self.tick_interval = handler.tick_interval();
        }
    }
}

// ----------------------------------------------------------------------------
// Module
// ----------------------------------------------------------------------------

pub trait Module: Send + Sync + Sized + 'static {
    type State: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Unique module name; also the key of its state slice
    fn name(&self) -> &str;

    fn initial_state(&self) -> Self::State;

    /// Declare the module's handlers
    fn handlers(&self, set: &mut HandlerSet<Self>);
}

/// Handlers declared by a module, in declaration order
pub struct HandlerSet<M: Module> {
    module: Arc<M>,
    entries: Vec<(&'static str, Handler)>,
}

impl<M: Module> HandlerSet<M> {
    fn new(module: Arc<M>) -> Self {
        Self {
            module,
            entries: Vec::new(),
        }
    }

    /// Declare the handler for `key`. Declaring the same key twice replaces
    /// the earlier handler.
    pub fn add<A, F, Fut>(&mut self, key: ActionKey<A>, f: F) -> HandlerSlot<'_>
    where
        A: ActionArgs,
        F: Fn(ModuleContext<M>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let module = self.module.clone();
        let handler = Handler::new(move |invocation: Invocation, payload: Payload| {
            let context = ModuleContext {
                module: module.clone(),
                app: invocation.app,
                action: invocation.action,
            };
            let program = A::from_payload(&payload).map(|args| f(context, args));
            async move { program?.await }
        });

        let method = key.method();
        let index = match self.entries.iter().position(|(name, _)| *name == method) {
            Some(index) => {
                self.entries[index].1 = handler;
                index
            }
            None => {
                self.entries.push((method, handler));
                self.entries.len() - 1
            }
        };
        HandlerSlot {
            handler: &mut self.entries[index].1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A freshly declared handler, open for decoration
pub struct HandlerSlot<'a> {
    handler: &'a mut Handler,
}

impl HandlerSlot<'_> {
    /// Wrap the handler; the first decorator applied ends up innermost
    pub fn with<D: Decorator>(self, decorator: D) -> Self {
        *self.handler = decorator.decorate(self.handler.clone());
        self
    }
}

// ----------------------------------------------------------------------------
// Module Context
// ----------------------------------------------------------------------------

/// What a handler sees of its module and the app
pub struct ModuleContext<M: Module> {
    module: Arc<M>,
    app: App,
    action: Arc<str>,
}

impl<M: Module> Clone for ModuleContext<M> {
    fn clone(&self) -> Self {
        Self {
            module: self.module.clone(),
            app: self.app.clone(),
            action: self.action.clone(),
        }
    }
}

impl<M: Module> ModuleContext<M> {
    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Qualified name of the running action
    pub fn action_name(&self) -> &str {
        &self.action
    }

    /// Current state slice of this module
    pub fn state(&self) -> FrameworkResult<M::State> {
        let slice = self
            .app
            .store()
            .module_state(self.name())
            .ok_or_else(|| FrameworkError::StateMissing {
                module: self.name().to_string(),
            })?;
        Ok(serde_json::from_value(slice)?)
    }

    pub fn root_state(&self) -> State {
        self.app.get_state()
    }

    /// Shallow-merge `partial` into this module's slice. `partial` must
    /// serialize to an object.
    pub fn set_state<S: Serialize>(&self, partial: S) -> FrameworkResult<()> {
        let partial = serde_json::to_value(partial)?;
        let keys = match &partial {
            Value::Object(object) => object.keys().cloned().collect::<Vec<_>>().join(","),
            _ => {
                return Err(FrameworkError::InvalidPartialState {
                    module: self.name().to_string(),
                })
            }
        };
        let tag = format!("@@{}/setState[{}]", self.name(), keys);
        self.app.dispatch(set_state_action(self.name(), partial, tag));
        Ok(())
    }

    pub fn set_navigation_prevented(&self, is_prevented: bool) {
        self.app.dispatch(navigation_prevention_action(is_prevented));
    }

    /// Navigate to `url`
    pub fn set_history(&self, url: &str, state: Option<Value>) {
        self.app.dispatch(history_push_action(url, state));
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        self.app.logger()
    }

    pub fn dispatch(&self, action: Action) {
        effects::put(&self.app, action);
    }

    pub async fn delay(&self, duration: Duration) {
        effects::delay(duration).await;
    }

    /// Suspend on a sub-call and return its result
    pub async fn call<F: Future>(&self, future: F) -> F::Output {
        effects::call(future).await
    }
}

// ----------------------------------------------------------------------------
// Registration
// ----------------------------------------------------------------------------

/// Register `module` with `app`.
///
/// The state slice is seeded only if absent, and `onRegister` runs only on
/// the first registration of the name, so registering twice is harmless.
pub fn register<M: Module>(app: &App, module: M) -> FrameworkResult<ModuleProxy<M>> {
    let module = Arc::new(module);
    let name = module.name().to_string();
    if name.is_empty() || name.contains('/') {
        return Err(FrameworkError::config_error(format!(
            "invalid module name {:?}",
            name
        )));
    }

    let initial_state = serde_json::to_value(module.initial_state())?;
    if !initial_state.is_object() {
        return Err(FrameworkError::InvalidPartialState { module: name });
    }

    if !app.store().has_module(&name) {
        let tag = format!("@@{}/@@init", name);
        app.dispatch(set_state_action(name.as_str(), initial_state.clone(), tag));
        info!("Module [{}] registered", name);
    }

    let mut set = HandlerSet::new(module.clone());
    module.handlers(&mut set);

    let mut capabilities = LifecycleCapabilities::default();
    let mut actions = Vec::with_capacity(set.len());
    for (method, handler) in set.entries {
        let qualified = format!("{}/{}", name, method);
        let handler = handler.named(Arc::from(qualified.as_str()));
        capabilities.observe(method, &handler);
        debug!("Registered action {}", qualified);
        app.registry().insert(qualified.clone(), handler);
        actions.push(qualified);
    }

    let first_registration = app.registry().mark_registered(&name);
    if first_registration && capabilities.on_register {
        app.dispatch(Action::new(format!("{}/{}", name, ON_REGISTER.method()), Vec::new()));
    }

    Ok(ModuleProxy::new(
        app.clone(),
        module,
        actions,
        capabilities,
        initial_state,
    ))
}
