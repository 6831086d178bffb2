//! Host-supplied collaborators: error handling and log transmission

use crate::app::App;
use async_trait::async_trait;
use moduleflow_core::{Exception, LogBatch};

/// Application-wide handler for every error the framework reports
#[async_trait]
pub trait ErrorListener: Send + Sync {
    async fn on_error(&self, app: App, exception: Exception) -> anyhow::Result<()>;
}

/// Ships queued business log events to the collection server
#[async_trait]
pub trait LogTransport: Send + Sync {
    async fn send(&self, server_url: &str, batch: &LogBatch) -> anyhow::Result<()>;
}
