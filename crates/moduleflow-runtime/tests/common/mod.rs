//! Shared fixtures for the runtime integration tests
//!
//! Recording collaborators plus a handful of small modules exercising the
//! decorators and lifecycle hooks.

#![allow(dead_code)]

use async_trait::async_trait;
use moduleflow_core::{ActionKey, Exception, LogBatch, Location};
use moduleflow_runtime::{
    App, ErrorListener, HandlerSet, Interval, Lifecycle, Loading, Log, LogTransport, Module,
    ModuleContext, Mutex, ON_DESTROY, ON_REGISTER, ON_RENDER, ON_TICK,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

// ----------------------------------------------------------------------------
// Recording Collaborators
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingErrorListener {
    exceptions: StdMutex<Vec<Exception>>,
}

impl RecordingErrorListener {
    pub fn exceptions(&self) -> Vec<Exception> {
        self.exceptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorListener for RecordingErrorListener {
    async fn on_error(&self, _app: App, exception: Exception) -> anyhow::Result<()> {
        self.exceptions.lock().unwrap().push(exception);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    batches: StdMutex<Vec<(String, LogBatch)>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn batches(&self) -> Vec<(String, LogBatch)> {
        self.batches.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LogTransport for RecordingTransport {
    async fn send(&self, server_url: &str, batch: &LogBatch) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("collector unavailable");
        }
        self.batches
            .lock()
            .unwrap()
            .push((server_url.to_string(), batch.clone()));
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Cart Module
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<String>,
}

pub const ADD_ITEM: ActionKey<(String,)> = ActionKey::new("addItem");
/// Holds the global loading counter for 2s, then fails when asked to
pub const CHECKOUT: ActionKey<(bool,)> = ActionKey::new("checkout");
/// Mutex-guarded, takes 10s
pub const SYNC: ActionKey<()> = ActionKey::new("sync");
pub const LOGIN: ActionKey<(Value,)> = ActionKey::new("login");
pub const GO_TO_ORDERS: ActionKey<()> = ActionKey::new("goToOrders");

#[derive(Default)]
pub struct CartModule {
    pub registrations: AtomicUsize,
    pub syncs: AtomicUsize,
}

impl Module for CartModule {
    type State = CartState;

    fn name(&self) -> &str {
        "cart"
    }

    fn initial_state(&self) -> CartState {
        CartState::default()
    }

    fn handlers(&self, set: &mut HandlerSet<Self>) {
        set.add(ON_REGISTER, |ctx: ModuleContext<CartModule>, _: ()| async move {
            ctx.module().registrations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .with(Lifecycle);

        set.add(ADD_ITEM, |ctx: ModuleContext<CartModule>, (item,): (String,)| async move {
            let mut items = ctx.state()?.items;
            items.push(item);
            ctx.set_state(json!({ "items": items }))?;
            Ok(())
        });

        set.add(CHECKOUT, |ctx: ModuleContext<CartModule>, (fail,): (bool,)| async move {
            ctx.delay(Duration::from_secs(2)).await;
            if fail {
                return Err(anyhow::Error::new(Exception::biz("payment declined")));
            }
            ctx.set_state(json!({ "items": [] }))?;
            Ok(())
        })
        .with(Loading::global());

        set.add(SYNC, |ctx: ModuleContext<CartModule>, _: ()| async move {
            ctx.module().syncs.fetch_add(1, Ordering::SeqCst);
            ctx.delay(Duration::from_secs(10)).await;
            Ok(())
        })
        .with(Mutex);

        set.add(LOGIN, |_ctx: ModuleContext<CartModule>, _: (Value,)| async { Ok(()) })
            .with(Log);

        set.add(GO_TO_ORDERS, |ctx: ModuleContext<CartModule>, _: ()| async move {
            ctx.set_history("/orders?page=2", Some(json!({ "from": "cart" })));
            Ok(())
        });
    }
}

// ----------------------------------------------------------------------------
// Clock Module
// ----------------------------------------------------------------------------

/// Ticks every 3s and fails on every tick
#[derive(Default)]
pub struct ClockModule {
    pub ticks: Arc<AtomicUsize>,
    pub destroyed: Arc<AtomicBool>,
}

impl Module for ClockModule {
    type State = Value;

    fn name(&self) -> &str {
        "clock"
    }

    fn initial_state(&self) -> Value {
        json!({ "running": false })
    }

    fn handlers(&self, set: &mut HandlerSet<Self>) {
        set.add(ON_TICK, |ctx: ModuleContext<ClockModule>, _: ()| async move {
            ctx.module().ticks.fetch_add(1, Ordering::SeqCst);
            ctx.set_state(json!({ "running": true }))?;
            Err(anyhow::anyhow!("clock drifted"))
        })
        .with(Lifecycle)
        .with(Interval(3));

        set.add(ON_DESTROY, |ctx: ModuleContext<ClockModule>, _: ()| async move {
            ctx.module().destroyed.store(true, Ordering::SeqCst);
            Ok(())
        })
        .with(Lifecycle);
    }
}

// ----------------------------------------------------------------------------
// Page Module
// ----------------------------------------------------------------------------

/// Records what each `onRender` received
#[derive(Default)]
pub struct PageModule;

impl Module for PageModule {
    type State = Value;

    fn name(&self) -> &str {
        "page"
    }

    fn initial_state(&self) -> Value {
        json!({ "renders": 0, "params": null, "path": null })
    }

    fn handlers(&self, set: &mut HandlerSet<Self>) {
        set.add(
            ON_RENDER,
            |ctx: ModuleContext<PageModule>, (params, location): (Value, Location)| async move {
                let renders = ctx.state()?["renders"].as_u64().unwrap_or(0);
                ctx.set_state(json!({
                    "renders": renders + 1,
                    "params": params,
                    "path": location.pathname,
                }))?;
                Ok(())
            },
        )
        .with(Lifecycle);
    }
}

// ----------------------------------------------------------------------------
// Draft Module
// ----------------------------------------------------------------------------

/// Captures the slice its `onDestroy` hook observes
#[derive(Default)]
pub struct DraftModule {
    pub seen_on_destroy: StdMutex<Option<Value>>,
}

impl Module for DraftModule {
    type State = Value;

    fn name(&self) -> &str {
        "draft"
    }

    fn initial_state(&self) -> Value {
        json!({ "draft": "" })
    }

    fn handlers(&self, set: &mut HandlerSet<Self>) {
        set.add(ON_DESTROY, |ctx: ModuleContext<DraftModule>, _: ()| async move {
            let state = ctx.state()?;
            *ctx.module().seen_on_destroy.lock().unwrap() = Some(state);
            Ok(())
        })
        .with(Lifecycle);
    }
}
