//! Business event logging
//!
//! Log events are appended to an in-memory queue and later drained by the log
//! flush task. This is separate from the `tracing` diagnostics the framework
//! emits about itself: the queue holds what the application wants shipped to a
//! collection server.

use crate::errors::Exception;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Free-form text attached to a log event
pub type LogInfo = BTreeMap<String, String>;

// ----------------------------------------------------------------------------
// Log Event Types
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogResult {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "ERROR")]
    Error,
}

impl fmt::Display for LogResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogResult::Ok => write!(f, "OK"),
            LogResult::Warn => write!(f, "WARN"),
            LogResult::Error => write!(f, "ERROR"),
        }
    }
}

/// One queued log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Milliseconds since the unix epoch
    pub date: u64,
    pub result: LogResult,
    /// Indexed data
    pub context: BTreeMap<String, String>,
    /// Non-indexed data
    pub info: LogInfo,
    /// Milliseconds between append and completion, 0 until completed
    pub elapsed_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Wire format sent by the flush task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogBatch {
    pub events: Vec<LogEvent>,
}

struct LogEntry {
    event: LogEvent,
    started: Instant,
    elapsed_ms: AtomicU64,
}

impl LogEntry {
    fn snapshot(&self) -> LogEvent {
        let mut event = self.event.clone();
        event.elapsed_time = self.elapsed_ms.load(Ordering::Relaxed);
        event
    }
}

/// Returned by every append; records elapsed time when completed
#[must_use = "completing the log entry records its elapsed time"]
pub struct LogCompletion {
    entry: Arc<LogEntry>,
}

impl LogCompletion {
    pub fn complete(self) {
        let elapsed = self.entry.started.elapsed().as_millis() as u64;
        self.entry.elapsed_ms.store(elapsed, Ordering::Relaxed);
    }
}

// ----------------------------------------------------------------------------
// Context Values
// ----------------------------------------------------------------------------

/// Environment context value, either fixed or computed at append time
#[derive(Clone)]
pub enum ContextValue {
    Static(String),
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl ContextValue {
    pub fn dynamic<F>(producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        ContextValue::Dynamic(Arc::new(producer))
    }

    fn resolve(&self) -> String {
        match self {
            ContextValue::Static(value) => value.clone(),
            ContextValue::Dynamic(producer) => producer(),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ContextValue::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Static(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Static(value)
    }
}

// ----------------------------------------------------------------------------
// Logger
// ----------------------------------------------------------------------------

/// Log sink used by handlers and by the framework
pub trait Logger: Send + Sync {
    fn add_context(&self, context: Vec<(String, ContextValue)>);

    /// Append an `OK` event for `action`
    fn info(&self, action: &str, info: LogInfo) -> LogCompletion;

    /// Append a `WARN` event; `error_code` is UPPER_SNAKE_CASE
    fn warn(&self, error_code: &str, action: Option<&str>, info: LogInfo) -> LogCompletion;

    /// Append an `ERROR` event; `error_code` is UPPER_SNAKE_CASE
    fn error(&self, error_code: &str, action: Option<&str>, info: LogInfo) -> LogCompletion;

    /// Append an event describing an exception. `app_state` is attached for
    /// runtime and rendering failures.
    fn exception(&self, exception: &Exception, app_state: Option<&Value>) -> LogCompletion;

    /// Queued events, oldest first
    fn collect(&self) -> Vec<LogEvent>;

    fn empty(&self);

    /// Drop the oldest `count` events, keeping anything appended since they
    /// were collected
    fn discard(&self, count: usize);
}

/// In-memory queue logger
pub struct LoggerImpl {
    environment_context: Mutex<BTreeMap<String, ContextValue>>,
    log_queue: Mutex<Vec<Arc<LogEntry>>>,
}

impl LoggerImpl {
    /// Create a logger whose context carries a fresh `visitorId`
    pub fn new() -> Self {
        let mut context = BTreeMap::new();
        context.insert(
            "visitorId".to_string(),
            ContextValue::Static(generate_visitor_id()),
        );
        Self {
            environment_context: Mutex::new(context),
            log_queue: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    fn append_log(
        &self,
        result: LogResult,
        action: Option<&str>,
        error_code: Option<&str>,
        info: LogInfo,
    ) -> LogCompletion {
        let context = self
            .environment_context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, value)| (key.clone(), value.resolve()))
            .collect();

        let entry = Arc::new(LogEntry {
            event: LogEvent {
                date: now_millis(),
                result,
                context,
                info,
                elapsed_time: 0,
                action: action.map(str::to_string),
                error_code: error_code.map(str::to_string),
            },
            started: Instant::now(),
            elapsed_ms: AtomicU64::new(0),
        });

        self.queue().push(entry.clone());
        LogCompletion { entry }
    }

    fn queue(&self) -> MutexGuard<'_, Vec<Arc<LogEntry>>> {
        self.log_queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoggerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for LoggerImpl {
    fn add_context(&self, context: Vec<(String, ContextValue)>) {
        self.environment_context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(context);
    }

    fn info(&self, action: &str, info: LogInfo) -> LogCompletion {
        self.append_log(LogResult::Ok, Some(action), None, info)
    }

    fn warn(&self, error_code: &str, action: Option<&str>, info: LogInfo) -> LogCompletion {
        self.append_log(LogResult::Warn, action, Some(error_code), info)
    }

    fn error(&self, error_code: &str, action: Option<&str>, info: LogInfo) -> LogCompletion {
        self.append_log(LogResult::Error, action, Some(error_code), info)
    }

    fn exception(&self, exception: &Exception, app_state: Option<&Value>) -> LogCompletion {
        let mut info = LogInfo::new();
        info.insert("errorMessage".to_string(), exception.message().to_string());

        let error_code = match exception {
            Exception::NetworkConnection { .. } => {
                return self.append_log(LogResult::Warn, None, Some("NETWORK_FAILURE"), info);
            }
            Exception::Api {
                status_code,
                request_url,
                error_id,
                error_code,
                ..
            } => {
                info.insert("requestURL".to_string(), request_url.clone());
                if let Some(code) = error_code {
                    info.insert("errorCode".to_string(), code.clone());
                }
                if let Some(id) = error_id {
                    info.insert("errorId".to_string(), id.clone());
                }
                format!("API_ERROR:{}", status_code)
            }
            Exception::Lifecycle {
                component_stack, ..
            } => {
                info.insert("stackTrace".to_string(), component_stack.clone());
                insert_app_state(&mut info, app_state);
                "LIFECYCLE_ERROR".to_string()
            }
            Exception::Runtime { error_object, .. } => {
                info.insert("stackTrace".to_string(), error_object.to_string());
                insert_app_state(&mut info, app_state);
                "JS_ERROR".to_string()
            }
            Exception::Biz { .. } => "ERROR".to_string(),
        };

        self.append_log(LogResult::Error, None, Some(&error_code), info)
    }

    fn collect(&self) -> Vec<LogEvent> {
        self.queue().iter().map(|entry| entry.snapshot()).collect()
    }

    fn empty(&self) {
        self.queue().clear();
    }

    fn discard(&self, count: usize) {
        let mut queue = self.queue();
        let count = count.min(queue.len());
        queue.drain(..count);
    }
}

fn insert_app_state(info: &mut LogInfo, app_state: Option<&Value>) {
    if let Some(state) = app_state {
        info.insert("appState".to_string(), state.to_string());
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn generate_visitor_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_info_appends_ok_event_with_context() {
        let logger = LoggerImpl::new();
        logger.add_context(vec![("app".to_string(), "shop".into())]);

        let mut info = LogInfo::new();
        info.insert("params".to_string(), "{}".to_string());
        logger.info("cart/addItem", info).complete();

        let events = logger.collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].result, LogResult::Ok);
        assert_eq!(events[0].action.as_deref(), Some("cart/addItem"));
        assert_eq!(events[0].context["app"], "shop");
        assert!(events[0].context.contains_key("visitorId"));
    }

    #[test]
    fn test_dynamic_context_is_resolved_per_event() {
        let logger = LoggerImpl::new();
        let counter = Arc::new(AtomicU64::new(0));
        let producer = counter.clone();
        logger.add_context(vec![(
            "seq".to_string(),
            ContextValue::dynamic(move || producer.fetch_add(1, Ordering::Relaxed).to_string()),
        )]);

        let _ = logger.info("a", LogInfo::new());
        let _ = logger.info("b", LogInfo::new());

        let events = logger.collect();
        assert_eq!(events[0].context["seq"], "0");
        assert_eq!(events[1].context["seq"], "1");
    }

    #[test]
    fn test_completion_sets_elapsed_time_after_the_fact() {
        let logger = LoggerImpl::new();
        let completion = logger.info("slow/action", LogInfo::new());
        std::thread::sleep(std::time::Duration::from_millis(15));
        assert_eq!(logger.collect()[0].elapsed_time, 0);

        completion.complete();
        assert!(logger.collect()[0].elapsed_time >= 15);
    }

    #[test]
    fn test_exception_mapping() {
        let logger = LoggerImpl::new();
        let state = json!({"cart": {"items": []}});

        let _ = logger.exception(&Exception::network("down", "/api"), Some(&state));
        let _ = logger.exception(
            &Exception::api("bad", 400, "/api/order", json!({}), Some("id-1".into()), None),
            None,
        );
        let _ = logger.exception(&Exception::runtime("boom", json!({"e": 1})), Some(&state));
        let _ = logger.exception(&Exception::lifecycle("render", "at Cart"), Some(&state));
        let _ = logger.exception(&Exception::biz("rule"), None);

        let events = logger.collect();
        assert_eq!(events[0].result, LogResult::Warn);
        assert_eq!(events[0].error_code.as_deref(), Some("NETWORK_FAILURE"));
        assert_eq!(events[1].error_code.as_deref(), Some("API_ERROR:400"));
        assert_eq!(events[1].info["errorId"], "id-1");
        assert_eq!(events[1].info["requestURL"], "/api/order");
        assert_eq!(events[2].error_code.as_deref(), Some("JS_ERROR"));
        assert!(events[2].info["appState"].contains("cart"));
        assert_eq!(events[3].error_code.as_deref(), Some("LIFECYCLE_ERROR"));
        assert_eq!(events[3].info["stackTrace"], "at Cart");
        assert_eq!(events[4].error_code.as_deref(), Some("ERROR"));
        assert_eq!(events[4].result, LogResult::Error);
    }

    #[test]
    fn test_discard_keeps_newer_events() {
        let logger = LoggerImpl::new();
        let _ = logger.info("a", LogInfo::new());
        let _ = logger.info("b", LogInfo::new());
        let collected = logger.collect();
        let _ = logger.info("c", LogInfo::new());

        logger.discard(collected.len());

        let remaining = logger.collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].action.as_deref(), Some("c"));

        logger.empty();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_log_event_serializes_camel_case() {
        let logger = LoggerImpl::new();
        let _ = logger.warn("SOME_DATA", Some("a/b"), LogInfo::new());
        let value = serde_json::to_value(&logger.collect()[0]).unwrap();
        assert_eq!(value["result"], "WARN");
        assert_eq!(value["errorCode"], "SOME_DATA");
        assert!(value.get("elapsedTime").is_some());
    }
}
