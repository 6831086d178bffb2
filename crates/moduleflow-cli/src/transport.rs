//! Console collaborators for the demo app

use async_trait::async_trait;
use moduleflow_core::{Exception, LogBatch};
use moduleflow_runtime::{App, ErrorListener, LogTransport};
use tracing::{info, warn};

/// Prints each log batch as JSON instead of posting it
pub struct StdoutTransport {
    pub print_batches: bool,
}

#[async_trait]
impl LogTransport for StdoutTransport {
    async fn send(&self, server_url: &str, batch: &LogBatch) -> anyhow::Result<()> {
        info!("Shipping {} log events to {}", batch.events.len(), server_url);
        if self.print_batches {
            println!("{}", serde_json::to_string_pretty(batch)?);
        }
        Ok(())
    }
}

/// Reports every exception through tracing
pub struct ConsoleErrorListener;

#[async_trait]
impl ErrorListener for ConsoleErrorListener {
    async fn on_error(&self, _app: App, exception: Exception) -> anyhow::Result<()> {
        warn!("Unhandled exception: {}", serde_json::to_string(&exception)?);
        Ok(())
    }
}
