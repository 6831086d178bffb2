//! Module proxy: the public face of a registered module

use crate::app::App;
use crate::lifecycle::LifecycleAttachment;
use crate::module::{LifecycleCapabilities, Module};
use moduleflow_core::{
    Action, ActionArgs, ActionKey, AttachLifecycleOption, FrameworkError, FrameworkResult,
};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Handle returned by registration. Exposes only action creation and
/// lifecycle attachment; handlers themselves stay inside the registry.
pub struct ModuleProxy<M: Module> {
    app: App,
    module: Arc<M>,
    actions: Vec<String>,
    capabilities: LifecycleCapabilities,
    initial_state: Value,
}

impl<M: Module> ModuleProxy<M> {
    pub(crate) fn new(
        app: App,
        module: Arc<M>,
        actions: Vec<String>,
        capabilities: LifecycleCapabilities,
        initial_state: Value,
    ) -> Self {
        Self {
            app,
            module,
            actions,
            capabilities,
            initial_state,
        }
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Qualified names of every action this module handles
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn capabilities(&self) -> LifecycleCapabilities {
        self.capabilities
    }

    /// Build the action invoking the handler declared under `key`
    pub fn action<A: ActionArgs>(&self, key: ActionKey<A>, args: A) -> FrameworkResult<Action> {
        self.creator(key)?.create(args)
    }

    /// Typed creator for the handler declared under `key`
    pub fn creator<A: ActionArgs>(&self, key: ActionKey<A>) -> FrameworkResult<ActionCreator<A>> {
        let action_type = format!("{}/{}", self.name(), key.method());
        if !self.actions.contains(&action_type) {
            return Err(FrameworkError::UnknownAction {
                module: self.name().to_string(),
                method: key.method().to_string(),
            });
        }
        Ok(ActionCreator {
            action_type,
            _args: PhantomData,
        })
    }

    /// Create and dispatch the action for `key`
    pub fn dispatch<A: ActionArgs>(&self, key: ActionKey<A>, args: A) -> FrameworkResult<()> {
        let action = self.action(key, args)?;
        self.app.dispatch(action);
        Ok(())
    }

    /// Bind the module's lifecycle hooks to a host component
    pub fn attach_lifecycle(&self, option: AttachLifecycleOption) -> LifecycleAttachment {
        LifecycleAttachment::new(
            self.app.clone(),
            Arc::from(self.name()),
            self.capabilities,
            self.initial_state.clone(),
            option,
        )
    }
}

/// Creates actions of one type from typed arguments
pub struct ActionCreator<A> {
    action_type: String,
    _args: PhantomData<fn(A)>,
}

impl<A: ActionArgs> ActionCreator<A> {
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn create(&self, args: A) -> FrameworkResult<Action> {
        Ok(Action::new(self.action_type.clone(), args.into_payload()?))
    }
}

impl<A> Clone for ActionCreator<A> {
    fn clone(&self) -> Self {
        Self {
            action_type: self.action_type.clone(),
            _args: PhantomData,
        }
    }
}

impl<A> fmt::Debug for ActionCreator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCreator")
            .field("action_type", &self.action_type)
            .finish()
    }
}
