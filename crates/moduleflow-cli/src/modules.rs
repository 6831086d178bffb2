//! Sample modules driven by the demo

use moduleflow_core::{ActionKey, Exception, Location};
use moduleflow_runtime::{
    HandlerSet, Interval, Lifecycle, Loading, Log, Module, ModuleContext, ON_DESTROY, ON_REGISTER,
    ON_RENDER, ON_TICK,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

// ----------------------------------------------------------------------------
// Cart
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<String>,
    pub order_id: Option<String>,
}

pub const ADD_ITEM: ActionKey<(String,)> = ActionKey::new("addItem");
pub const CHECKOUT: ActionKey<(Value, bool)> = ActionKey::new("checkout");

pub struct CartModule;

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
            info!("{} ready", ctx.name());
            Ok(())
        })
        .with(Lifecycle);

        set.add(ADD_ITEM, |ctx: ModuleContext<CartModule>, (item,): (String,)| async move {
            let mut items = ctx.state()?.items;
            items.push(item);
            ctx.set_state(json!({ "items": items }))?;
            Ok(())
        })
        .with(Log);

        // Payment details are masked in the log by the `password` keyword
        set.add(
            CHECKOUT,
            |ctx: ModuleContext<CartModule>, (_payment, decline): (Value, bool)| async move {
                ctx.set_navigation_prevented(true);
                ctx.delay(Duration::from_millis(500)).await;
                if decline {
                    return Err(anyhow::Error::new(Exception::biz("payment declined")));
                }
                let order_id = format!("order-{}", ctx.state()?.items.len());
                ctx.set_state(json!({ "items": [], "order_id": order_id.clone() }))?;
                ctx.set_navigation_prevented(false);
                ctx.set_history(&format!("/orders/{}", order_id), None);
                Ok(())
            },
        )
        .with(Log)
        .with(Loading::global());
    }
}

// ----------------------------------------------------------------------------
// Clock
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClockState {
    pub ticks: u64,
    pub rendered_at: Option<String>,
}

pub struct ClockModule;

impl Module for ClockModule {
    type State = ClockState;

    fn name(&self) -> &str {
        "clock"
    }

    fn initial_state(&self) -> ClockState {
        ClockState::default()
    }

    fn handlers(&self, set: &mut HandlerSet<Self>) {
        set.add(
            ON_RENDER,
            |ctx: ModuleContext<ClockModule>, (_params, location): (Value, Location)| async move {
                ctx.set_state(json!({ "rendered_at": location.url() }))?;
                Ok(())
            },
        )
        .with(Lifecycle);

        set.add(ON_TICK, |ctx: ModuleContext<ClockModule>, _: ()| async move {
            let ticks = ctx.state()?.ticks + 1;
            ctx.set_state(json!({ "ticks": ticks }))?;
            Ok(())
        })
        .with(Lifecycle)
        .with(Interval(1));

        set.add(ON_DESTROY, |ctx: ModuleContext<ClockModule>, _: ()| async move {
            info!("{} stopped after {} ticks", ctx.name(), ctx.state()?.ticks);
            Ok(())
        })
        .with(Lifecycle);
    }
}
