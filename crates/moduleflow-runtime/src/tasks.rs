//! Background tasks of a running app
//!
//! - `DispatcherTask`: the effect middleware. Receives every reduced action
//!   and starts the matching handler, or routes errors and navigation.
//! - `LogFlushTask`: periodically ships the business log queue.

use crate::app::App;
use crate::executor::execute_action;
use crate::listeners::LogTransport;
use moduleflow_core::{
    location_change_action, Action, ActionPayload, Exception, LogBatch, LoggerConfig,
    MiddlewareReceiver,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// ----------------------------------------------------------------------------
// Dispatcher Task
// ----------------------------------------------------------------------------

/// Take-every dispatcher: each handler action runs as its own task, so a
/// slow handler never delays the next one.
pub struct DispatcherTask {
    app: App,
    receiver: MiddlewareReceiver,
}

impl DispatcherTask {
    pub fn new(app: App, receiver: MiddlewareReceiver) -> Self {
        Self { app, receiver }
    }

    pub async fn run(&mut self) {
        info!("Dispatcher task starting");

        while let Some(action) = self.receiver.recv().await {
            self.handle_action(action);
        }

        info!("Dispatcher task stopped");
    }

    fn handle_action(&self, action: Action) {
        match action.payload {
            ActionPayload::Error(exception) => {
                let app = self.app.clone();
                tokio::spawn(async move { handle_error(app, exception).await });
            }
            ActionPayload::HistoryPush { url, state } => {
                let location = self.app.history().push(&url, state);
                self.app.dispatch(location_change_action((*location).clone()));
            }
            ActionPayload::Args(args) => match self.app.registry().get(&action.action_type) {
                Some(handler) => {
                    tokio::spawn(execute_action(self.app.clone(), handler, args));
                }
                None => debug!("No handler for {}", action.action_type),
            },
            _ => {}
        }
    }
}

async fn handle_error(app: App, exception: Exception) {
    let app_state = serde_json::to_value(app.get_state()).ok();
    app.logger().exception(&exception, app_state.as_ref()).complete();

    if let Some(listener) = app.error_listener().cloned() {
        if let Err(e) = listener.on_error(app.clone(), exception).await {
            // Not re-dispatched: a failing listener would feed itself
            error!("Error listener failed: {:?}", e);
        }
    }
}

// ----------------------------------------------------------------------------
// Log Flush Task
// ----------------------------------------------------------------------------

pub struct LogFlushTask {
    app: App,
    config: LoggerConfig,
    transport: Arc<dyn LogTransport>,
}

impl LogFlushTask {
    pub fn new(app: App, config: LoggerConfig, transport: Arc<dyn LogTransport>) -> Self {
        Self {
            app,
            config,
            transport,
        }
    }

    pub async fn run(&mut self) {
        info!(
            "Log flush task starting, sending to {} every {:?}",
            self.config.server_url,
            self.config.sending_frequency()
        );

        loop {
            tokio::time::sleep(self.config.sending_frequency()).await;
            self.flush().await;
        }
    }

    /// Send everything queued so far. On success the sent events are
    /// dropped; on failure they stay queued for the next round.
    pub async fn flush(&self) {
        let events = self.app.logger().collect();
        if events.is_empty() {
            return;
        }

        let count = events.len();
        let batch = LogBatch { events };
        match self.transport.send(&self.config.server_url, &batch).await {
            Ok(()) => {
                self.app.logger().discard(count);
                debug!("Flushed {} log events", count);
            }
            Err(e) => warn!("Failed to send {} log events: {:?}", count, e),
        }
    }
}
