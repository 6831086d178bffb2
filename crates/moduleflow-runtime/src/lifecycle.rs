//! Lifecycle supervision
//!
//! Binds a module's lifecycle hooks to a host component. Mounting spawns one
//! lifecycle task per component: it runs `onRender` once and then keeps
//! `onTick` firing at the module's interval until the component unmounts.
//!
//! Phases move `Constructed -> Rendering -> Ticking -> Destroyed`; the
//! `Rendering` and `Ticking` phases are skipped for modules without the
//! corresponding hook.

use crate::app::App;
use crate::effects::{self, EffectTask};
use crate::executor::execute_action;
use crate::module::{LifecycleCapabilities, ON_DESTROY, ON_RENDER, ON_TICK};
use moduleflow_core::{
    navigation_prevention_action, set_state_action, Action, AttachLifecycleOption, Location,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Constructed,
    Rendering,
    Ticking,
    Destroyed,
}

/// Props the host hands to a mounted component.
///
/// A component is routed when it carries both a location and route params.
/// Locations are shared via `Arc` so a route change is detected by identity.
#[derive(Debug, Clone, Default)]
pub struct ComponentProps {
    pub location: Option<Arc<Location>>,
    pub route_params: Option<Value>,
}

impl ComponentProps {
    pub fn routed(location: Arc<Location>, route_params: Value) -> Self {
        Self {
            location: Some(location),
            route_params: Some(route_params),
        }
    }

    pub fn unrouted() -> Self {
        Self::default()
    }

    fn route(&self) -> Option<(&Arc<Location>, &Value)> {
        match (&self.location, &self.route_params) {
            (Some(location), Some(params)) => Some((location, params)),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Attachment
// ----------------------------------------------------------------------------

/// A module's lifecycle bound to a component type; mount it once per
/// component instance.
#[derive(Clone)]
pub struct LifecycleAttachment {
    app: App,
    name: Arc<str>,
    capabilities: LifecycleCapabilities,
    initial_state: Value,
    option: AttachLifecycleOption,
}

impl LifecycleAttachment {
    pub(crate) fn new(
        app: App,
        name: Arc<str>,
        capabilities: LifecycleCapabilities,
        initial_state: Value,
        option: AttachLifecycleOption,
    ) -> Self {
        Self {
            app,
            name,
            capabilities,
            initial_state,
            option,
        }
    }

    pub fn display_name(&self) -> String {
        format!("ModuleBoundary({})", self.name)
    }

    pub fn option(&self) -> AttachLifecycleOption {
        self.option
    }

    /// Mount a component and start its lifecycle task
    pub fn mount(&self, props: ComponentProps) -> MountedComponent {
        debug!("Mounting {}", self.display_name());
        let (phase_sender, phase) = watch::channel(LifecyclePhase::Constructed);
        let phase_sender = Arc::new(phase_sender);

        let task = EffectTask::spawn(run_lifecycle(
            self.app.clone(),
            self.name.clone(),
            self.capabilities,
            props.clone(),
            phase_sender.clone(),
        ));

        MountedComponent {
            attachment: self.clone(),
            props,
            phase_sender,
            phase,
            task: Some(task),
        }
    }

    fn hook_name(&self, method: &str) -> String {
        format!("{}/{}", self.name, method)
    }

    fn hook_action(&self, method: &str, args: Vec<Value>) -> Action {
        Action::new(self.hook_name(method), args)
    }
}

async fn run_lifecycle(
    app: App,
    name: Arc<str>,
    capabilities: LifecycleCapabilities,
    props: ComponentProps,
    phase: Arc<watch::Sender<LifecyclePhase>>,
) {
    if capabilities.on_render {
        if let Some(handler) = app.registry().get(&format!("{}/{}", name, ON_RENDER.method())) {
            phase.send_replace(LifecyclePhase::Rendering);
            let payload = match props.route() {
                Some((location, params)) => vec![params.clone(), location_value(location)],
                None => vec![json!({}), location_value(&app.history().location())],
            };
            execute_action(app.clone(), handler, payload).await;
        }
    }

    if capabilities.on_tick {
        if let Some(handler) = app.registry().get(&format!("{}/{}", name, ON_TICK.method())) {
            phase.send_replace(LifecyclePhase::Ticking);
            let interval = capabilities
                .tick_interval
                .filter(|seconds| *seconds > 0)
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| app.config().default_tick_interval());
            loop {
                execute_action(app.clone(), handler.clone(), Vec::new()).await;
                effects::delay(interval).await;
            }
        }
    }
}

fn location_value(location: &Location) -> Value {
    serde_json::to_value(location).unwrap_or(Value::Null)
}

// ----------------------------------------------------------------------------
// Mounted Component
// ----------------------------------------------------------------------------

/// A live component instance. Dropping it without `unmount` still stops its
/// lifecycle task.
pub struct MountedComponent {
    attachment: LifecycleAttachment,
    props: ComponentProps,
    phase_sender: Arc<watch::Sender<LifecyclePhase>>,
    phase: watch::Receiver<LifecyclePhase>,
    task: Option<EffectTask>,
}

impl MountedComponent {
    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.borrow()
    }

    /// Observe phase transitions
    pub fn watch_phase(&self) -> watch::Receiver<LifecyclePhase> {
        self.phase.clone()
    }

    pub fn props(&self) -> &ComponentProps {
        &self.props
    }

    /// New props from the host. A routed component whose location changed
    /// re-runs `onRender` and clears navigation prevention.
    pub fn update(&mut self, props: ComponentProps) {
        if let Some((location, params)) = props.route() {
            let changed = match &self.props.location {
                Some(previous) => !Arc::ptr_eq(previous, location),
                None => true,
            };
            if changed && self.attachment.capabilities.on_render {
                let app = &self.attachment.app;
                app.dispatch(self.attachment.hook_action(
                    ON_RENDER.method(),
                    vec![params.clone(), location_value(location)],
                ));
                app.dispatch(navigation_prevention_action(false));
            }
        }
        self.props = props;
    }

    /// Tear down: `onDestroy` runs up to its first suspension point, then the
    /// slice is reset unless retained, navigation prevention is cleared for
    /// located components and the lifecycle task is cancelled. Calling it
    /// again does nothing.
    pub fn unmount(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let attachment = &self.attachment;
        let app = &attachment.app;

        // onDestroy reads the slice before the reset below
        if attachment.capabilities.on_destroy {
            if let Some(handler) = app.registry().get(&attachment.hook_name(ON_DESTROY.method())) {
                let _ = EffectTask::fork(execute_action(app.clone(), handler, Vec::new()));
            }
        }
        if !attachment.option.retain_state_on_leave {
            let tag = format!("@@{}/@@reset", attachment.name);
            app.dispatch(set_state_action(
                &*attachment.name,
                attachment.initial_state.clone(),
                tag,
            ));
        }
        if self.props.location.is_some() {
            app.dispatch(navigation_prevention_action(false));
        }

        task.cancel();
        self.phase_sender.send_replace(LifecyclePhase::Destroyed);
        info!("{} destroyed", attachment.display_name());
    }

    /// Whether the lifecycle task is still running
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for MountedComponent {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}
