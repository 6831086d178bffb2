//! Action execution supervisor
//!
//! Runs a handler's effect program to completion and routes every failure,
//! returned or panicked, into the store as an error action. Nothing escapes.

use crate::app::App;
use crate::handler::{Handler, Invocation, Payload};
use futures::FutureExt;
use moduleflow_core::{error_action, Exception};
use serde_json::json;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::warn;

/// Execute `handler` with `payload`. Failures are converted to an
/// `Exception` and dispatched as `@@framework/error`.
pub async fn execute_action(app: App, handler: Handler, payload: Payload) {
    let invocation = Invocation::for_handler(app.clone(), &handler);
    let action = invocation.action.clone();

    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(invocation, payload))) {
        Ok(program) => AssertUnwindSafe(program).catch_unwind().await,
        Err(panic) => Err(panic),
    };

    let exception = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(error)) => normalize_error(error),
        Err(panic) => panic_exception(panic),
    };

    warn!("Action {} failed: {}", action, exception);
    app.dispatch(error_action(exception));
}

/// Map any error raised by a handler onto the exception taxonomy
pub fn normalize_error(error: anyhow::Error) -> Exception {
    Exception::from_error(error)
}

fn panic_exception(panic: Box<dyn Any + Send>) -> Exception {
    let message = if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown error".to_string()
    };
    Exception::runtime(message, json!({ "panic": true }))
}
