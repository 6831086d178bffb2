//! App Builder API
//!
//! Assembles an `App` from configuration and host collaborators, then starts
//! its background tasks and hands back an `AppHandle`.

use crate::app::{App, AppParts};
use crate::history::{History, MemoryHistory};
use crate::listeners::{ErrorListener, LogTransport};
use crate::tasks::{DispatcherTask, LogFlushTask};
use moduleflow_core::{
    create_middleware_channel, ContextValue, FrameworkConfig, FrameworkResult, Logger, LoggerImpl,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

// ----------------------------------------------------------------------------
// App Builder
// ----------------------------------------------------------------------------

pub struct AppBuilder {
    config: FrameworkConfig,
    logger: Option<Arc<dyn Logger>>,
    history: Option<Arc<dyn History>>,
    error_listener: Option<Arc<dyn ErrorListener>>,
    log_transport: Option<Arc<dyn LogTransport>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: FrameworkConfig::default(),
            logger: None,
            history: None,
            error_listener: None,
            log_transport: None,
        }
    }

    pub fn with_config(mut self, config: FrameworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default in-memory log queue
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_error_listener(mut self, listener: Arc<dyn ErrorListener>) -> Self {
        self.error_listener = Some(listener);
        self
    }

    /// Transport used by the log flush task
    pub fn with_log_transport(mut self, transport: Arc<dyn LogTransport>) -> Self {
        self.log_transport = Some(transport);
        self
    }

    /// Build the app without starting any background task. Dispatched
    /// handler actions are reduced but not executed.
    pub fn build(self) -> FrameworkResult<App> {
        self.into_parts().map(|(app, _)| app)
    }

    fn into_parts(self) -> FrameworkResult<(App, Option<Arc<dyn LogTransport>>)> {
        self.config.validate()?;
        let masks = match &self.config.logger {
            Some(logger) => logger.compile_masks()?,
            None => Vec::new(),
        };
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryHistory::default()));
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(LoggerImpl::new()));

        let path_source = history.clone();
        logger.add_context(vec![(
            "path".to_string(),
            ContextValue::dynamic(move || path_source.location().url()),
        )]);

        let app = App::from_parts(AppParts {
            config: self.config,
            logger,
            masks,
            history,
            error_listener: self.error_listener,
        });
        Ok((app, self.log_transport))
    }

    /// Build the app and start the dispatcher and, when configured, the log
    /// flush task. Must be called within a tokio runtime.
    pub async fn build_and_start(self) -> FrameworkResult<AppHandle> {
        info!("Starting app");
        let (app, transport) = self.into_parts()?;

        let (sender, receiver) = create_middleware_channel();
        app.store().connect_middleware(sender);
        let mut dispatcher = DispatcherTask::new(app.clone(), receiver);
        let dispatcher_handle = tokio::spawn(async move { dispatcher.run().await });

        let mut flush_handle = None;
        if let Some(config) = app.logger_config().filter(|c| c.flush_enabled).cloned() {
            match transport {
                Some(transport) => {
                    let mut task = LogFlushTask::new(app.clone(), config, transport);
                    flush_handle = Some(tokio::spawn(async move { task.run().await }));
                }
                None => warn!("Log flushing enabled but no transport configured"),
            }
        }

        info!("App started");
        Ok(AppHandle {
            app,
            dispatcher_handle: Some(dispatcher_handle),
            flush_handle,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// App Handle
// ----------------------------------------------------------------------------

/// Handle to a running app
pub struct AppHandle {
    app: App,
    dispatcher_handle: Option<JoinHandle<()>>,
    flush_handle: Option<JoinHandle<()>>,
}

impl AppHandle {
    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop background tasks. Already reduced state is kept.
    pub fn shutdown(&mut self) {
        info!("Shutting down app");
        self.app.store().disconnect_middleware();
        if let Some(handle) = self.dispatcher_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.flush_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        if self.dispatcher_handle.is_some() || self.flush_handle.is_some() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moduleflow_core::{FrameworkError, LoggerConfig};

    #[test]
    fn test_invalid_mask_pattern_rejected() {
        let config = FrameworkConfig::default().with_logger(LoggerConfig {
            masked_keywords: vec!["(".to_string()],
            ..LoggerConfig::default()
        });

        let result = AppBuilder::new().with_config(config).build();
        assert!(matches!(result, Err(FrameworkError::InvalidMaskPattern { .. })));
    }

    #[test]
    fn test_logger_context_tracks_history_path() {
        let history = Arc::new(MemoryHistory::new("/start"));
        let app = AppBuilder::new()
            .with_config(FrameworkConfig::testing())
            .with_history(history.clone())
            .build()
            .unwrap();

        history.push("/checkout", None);
        app.logger().info("cart/checkout", Default::default()).complete();

        let events = app.logger().collect();
        assert_eq!(events[0].context["path"], "/checkout");
        assert!(events[0].context.contains_key("visitorId"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_dispatcher() {
        let mut handle = AppBuilder::new().build_and_start().await.unwrap();
        assert!(handle.is_running());

        handle.shutdown();
        assert!(!handle.is_running());
    }
}
